use log::debug;

use crate::bitset::BitSet128;
use crate::fa::{Automaton, MAX_STATES};
use crate::tree::{ClosureKind, NodeId, NodeKind, RegexTree};
use crate::{CompileError, CompileResult};

/// Bytes matched by `\s`.
const WHITESPACE: &[u8] = b" \t\n\r\x0b\x0c";

/// Every level of a minimized tree adds at least two states to the
/// automaton, so deeper trees can't fit in [`MAX_STATES`] states. Bounding
/// the depth also bounds the recursion of the tree walk.
const MAX_DEPTH: usize = MAX_STATES / 2;

/// Compiles a [`RegexTree`] into a non-deterministic [`Automaton`] using
/// Thompson's construction.
///
/// ```
/// use scanner_fa::{parse, Compiler};
///
/// let tree = parse("a.c").unwrap();
/// let fa = Compiler::new().dot_matches_newline(false).compile(&tree).unwrap();
///
/// assert_eq!(fa.accepting().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Compiler {
    dot_matches_newline: bool,
}

impl Compiler {
    /// Create a new compiler. By default `.` matches every ASCII character
    /// except NUL, newline included.
    pub fn new() -> Self {
        Self { dot_matches_newline: true }
    }

    /// Whether `.` matches `\n`.
    pub fn dot_matches_newline(mut self, yes: bool) -> Self {
        self.dot_matches_newline = yes;
        self
    }

    /// Compile a tree into an automaton.
    ///
    /// Fails with [`CompileError::TooComplex`] if the automaton would need
    /// more than [`MAX_STATES`] states or if the tree is nested more than
    /// `MAX_STATES / 2` levels deep, and with
    /// [`CompileError::UnsupportedFeature`] if the tree contains characters
    /// outside of ASCII, or NUL.
    pub fn compile(&self, tree: &RegexTree) -> CompileResult<Automaton> {
        let fa = self.compile_node(tree, tree.root(), 0)?;
        debug!(
            "compiled {} tree nodes into {} states and {} transitions",
            tree.len(),
            fa.n_states(),
            fa.n_transitions()
        );
        Ok(fa)
    }

    fn compile_node(
        &self,
        tree: &RegexTree,
        id: NodeId,
        depth: usize,
    ) -> CompileResult<Automaton> {
        if depth > MAX_DEPTH {
            return Err(CompileError::TooComplex);
        }

        match tree.kind(id) {
            NodeKind::Literal(c) => Ok(Automaton::from_char(ascii(c)?)),
            NodeKind::EmptyLiteral => Ok(Automaton::epsilon()),
            NodeKind::Range { low, high } => {
                Ok(Automaton::from_bytes((ascii(low)?..=ascii(high)?).collect()))
            }
            NodeKind::Wildcard => Ok(Automaton::from_bytes(self.wildcard())),
            NodeKind::AnyWhitespace => {
                Ok(Automaton::from_bytes(BitSet128::from_elements(WHITESPACE)))
            }
            NodeKind::Concatenation => self.compile_concat(tree, id, depth + 1),
            NodeKind::Alternation => self.compile_alternation(tree, id, depth + 1),
            NodeKind::Closure(kind) => self.compile_closure(tree, id, kind, depth + 1),
        }
    }

    fn compile_concat(
        &self,
        tree: &RegexTree,
        id: NodeId,
        depth: usize,
    ) -> CompileResult<Automaton> {
        let mut children = tree.children(id).iter();

        let mut fa = match children.next() {
            Some(&first) => self.compile_node(tree, first, depth)?,
            None => return Ok(Automaton::epsilon()),
        };

        for &child in children {
            let next = self.compile_node(tree, child, depth)?;
            check_size(fa.n_states() + next.n_states() - 1)?;
            fa = fa.concat(&next);
        }

        Ok(fa)
    }

    fn compile_alternation(
        &self,
        tree: &RegexTree,
        id: NodeId,
        depth: usize,
    ) -> CompileResult<Automaton> {
        let mut children = tree.children(id).iter();

        let mut fa = match children.next() {
            Some(&first) => self.compile_node(tree, first, depth)?,
            None => return Ok(Automaton::epsilon()),
        };

        for &child in children {
            let other = self.compile_node(tree, child, depth)?;
            check_size(fa.n_states() + other.n_states() + 1)?;
            fa = fa.alternate(&other);
        }

        Ok(fa)
    }

    fn compile_closure(
        &self,
        tree: &RegexTree,
        id: NodeId,
        kind: ClosureKind,
        depth: usize,
    ) -> CompileResult<Automaton> {
        let operand = match tree.children(id) {
            &[operand] => self.compile_node(tree, operand, depth)?,
            children => panic!(
                "closure node {} has {} children instead of one",
                id,
                children.len()
            ),
        };

        let n = operand.n_states();

        match kind {
            ClosureKind::Star => {
                check_size(n + 2)?;
                Ok(operand.close())
            }
            // x+ is x followed by x*
            ClosureKind::Plus => {
                check_size(2 * n + 1)?;
                Ok(operand.clone().concat(&operand.close()))
            }
            // x? is x or the empty string
            ClosureKind::Optional => {
                let empty = Automaton::epsilon();
                check_size(n + empty.n_states() + 1)?;
                Ok(operand.alternate(&empty))
            }
        }
    }

    fn wildcard(&self) -> BitSet128 {
        (1..=0x7f)
            .filter(|&b| self.dot_matches_newline || b != b'\n')
            .collect()
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

fn ascii(c: char) -> CompileResult<u8> {
    match c {
        '\0' => Err(CompileError::UnsupportedFeature(
            "NUL can't be matched, it's reserved for epsilon transitions"
                .to_string(),
        )),
        c if c.is_ascii() => Ok(c as u8),
        c => Err(CompileError::UnsupportedFeature(format!(
            "non-ASCII character {:?}",
            c
        ))),
    }
}

fn check_size(n_states: usize) -> CompileResult<()> {
    if n_states > MAX_STATES {
        Err(CompileError::TooComplex)
    } else {
        Ok(())
    }
}
