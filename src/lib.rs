/*!
Building blocks for table-driven lexers.

This crate turns a regular expression into a finite automaton small enough
to be driven byte by byte by a longest-match scanner:

1. [`parse`] reads a pattern into a [`RegexTree`] whose shape encodes the
   precedence of the operators.
2. A [`Compiler`] walks the tree and builds a non-deterministic
   [`Automaton`] with Thompson's construction.
3. A [`Matcher`] runs the automaton over input text.

[`compile`] does the first two steps at once.

```
use scanner_fa::{compile, Matcher};

let fa = compile("(ab|b)*c")?;
let matcher = Matcher::new(&fa);

assert!(matcher.is_match("abbc"));
assert_eq!(matcher.longest_match("bc!"), Some(2));
# Ok::<(), scanner_fa::CompileError>(())
```

Automata are limited to 128 states, including the error state 0, so that
sets of states fit in a [`BitSet128`]. The alphabet is ASCII, and NUL is
reserved for epsilon transitions.

# Pattern syntax

See the [`parser`] module.

# Crate features

* **ascii-tree** - Enables [`RegexTree::ascii_tree`].
* **cli** - Builds the `scanner-fa` binary, which prints the tokens, the tree
  and the automaton of the patterns given as arguments.

# Logging

Warnings, like transitions that make an automaton non-deterministic or escape
sequences the parser ignores, are emitted through the [`log`] crate.
*/

use std::fmt;

pub mod bitset;
pub mod compiler;
pub mod fa;
pub mod matcher;
pub mod parser;
pub mod tokenizer;
pub mod tree;
mod thompson;

pub use bitset::BitSet128;
pub use compiler::Compiler;
pub use fa::{Automaton, StateId, Transition, EPSILON, ERROR_STATE, MAX_STATES};
pub use matcher::{MatchResult, Matcher};
pub use parser::{parse, ParseError, ParseErrorKind, Parser};
pub use tokenizer::{tokenize, TokenKind, Tokenizer, Tokens};
pub use tree::{ClosureKind, NodeId, NodeKind, RegexTree};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

/// The result of compiling a pattern.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The pattern couldn't be parsed.
    Parse(ParseError),
    /// The automaton would need more than [`MAX_STATES`] states.
    TooComplex,
    /// The pattern uses characters the automaton can't represent.
    UnsupportedFeature(String),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "parse error: {}", err),
            CompileError::TooComplex => write!(
                f,
                "regex pattern is too complex, it needs more than {} states",
                MAX_STATES
            ),
            CompileError::UnsupportedFeature(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

/// Parses `pattern` and compiles it with the default [`Compiler`].
pub fn compile(pattern: &str) -> CompileResult<Automaton> {
    let tree = parse(pattern)?;
    Compiler::new().compile(&tree)
}
