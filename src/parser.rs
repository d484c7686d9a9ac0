/*! One-pass regex parser.

The grammar understood by the parser:

| Syntax      | Meaning                                             |
|-------------|-----------------------------------------------------|
| `a`         | the literal character `a`                           |
| `ab`        | concatenation                                       |
| `a\|b`      | alternation                                         |
| `(...)`     | grouping                                            |
| `*` `+` `?` | closures applied to the preceding item              |
| `.`         | any character                                       |
| `[x-y]`     | any character in the range, exactly five characters |
| `"..."`     | quoted span, where only `\` and `"` are special     |
| `\\` `\"`   | literal backslash and quote                         |
| `\t` `\r` `\n` | tab, carriage return and newline                 |
| `\s`        | any whitespace character                            |
| `\e`        | the empty string                                    |
*/

use std::fmt;

use log::warn;

use crate::tree::{ClosureKind, NodeId, NodeKind, RegexTree};

/// The kinds of errors the parser and the tokenizer can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A backslash is the last character of the pattern.
    UnterminatedBackslash,
    /// A `[` that doesn't start a well-formed `[x-y]` range, or a stray `]`.
    MalformedRange,
    /// A `)` without a matching `(`.
    UnexpectedClosingParen,
    /// A `(` that is never closed.
    UnmatchedOpeningParen,
    /// A `*`, `+` or `?` with nothing before it to repeat.
    MissingClosureOperand,
    /// The pattern ends inside a quoted span. Only the tokenizer reports
    /// this one.
    UnterminatedQuote,
}

/// Error returned when a pattern can't be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset in the pattern where the error was detected.
    pub offset: usize,
    pub message: &'static str,
}

impl ParseError {
    pub(crate) fn new(
        kind: ParseErrorKind,
        offset: usize,
        message: &'static str,
    ) -> Self {
        ParseError { kind, offset, message }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// Parses `pattern` into a minimized [`RegexTree`].
pub fn parse(pattern: &str) -> Result<RegexTree, ParseError> {
    Parser::new(pattern).parse()
}

/// Characters of a `[x-y]` range, including the brackets.
pub(crate) const RANGE_LEN: usize = 5;

/// Checks the five characters of a range definition starting at `start`,
/// returning its bounds.
pub(crate) fn parse_range(
    chars: &[(usize, char)],
    start: usize,
) -> Result<(char, char), ParseError> {
    let offset = chars[start].0;

    let def = match chars.get(start..start + RANGE_LEN) {
        Some(def) => def,
        None => {
            return Err(ParseError::new(
                ParseErrorKind::MalformedRange,
                offset,
                "unfinished range definition",
            ))
        }
    };

    let (low, dash, high, close) = (def[1].1, def[2].1, def[3].1, def[4].1);

    if dash != '-'
        || close != ']'
        || !low.is_ascii_alphanumeric()
        || !high.is_ascii_alphanumeric()
    {
        return Err(ParseError::new(
            ParseErrorKind::MalformedRange,
            offset,
            "incorrect range definition, expecting [x-y]",
        ));
    }

    if low > high {
        return Err(ParseError::new(
            ParseErrorKind::MalformedRange,
            offset,
            "range bounds are out of order",
        ));
    }

    Ok((low, high))
}

/// A single-use parser for one pattern.
///
/// The parser keeps a cursor into the tree: `alt` is the innermost open
/// alternation and `conc` its last branch, where new items are appended.
pub struct Parser<'src> {
    pattern: &'src str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tree: RegexTree,
    alt: NodeId,
    conc: NodeId,
    depth: usize,
    quoted: bool,
}

impl<'src> Parser<'src> {
    pub fn new(pattern: &'src str) -> Self {
        let mut tree = RegexTree::new(NodeKind::Alternation);
        let alt = tree.root();
        let conc = tree.create(NodeKind::Concatenation);
        tree.add_child(alt, conc);

        Parser {
            pattern,
            chars: pattern.char_indices().collect(),
            pos: 0,
            tree,
            alt,
            conc,
            depth: 0,
            quoted: false,
        }
    }

    /// Consumes the parser, returning the minimized tree.
    ///
    /// On error the partially built tree is dropped.
    pub fn parse(mut self) -> Result<RegexTree, ParseError> {
        while self.pos < self.chars.len() {
            self.step()?;
        }

        if self.depth > 0 {
            return Err(ParseError::new(
                ParseErrorKind::UnmatchedOpeningParen,
                self.pattern.len(),
                "unmatched parenthesis: too many opening '('",
            ));
        }

        if self.quoted {
            warn!(
                "pattern {:?} ends inside a quoted literal, closing it implicitly",
                self.pattern
            );
        }

        debug_assert_eq!(self.tree.topmost(self.alt), self.tree.root());

        self.tree.minimize();
        Ok(self.tree)
    }

    fn step(&mut self) -> Result<(), ParseError> {
        let (offset, c) = self.chars[self.pos];
        self.pos += 1;

        match c {
            '\\' => self.escape(offset)?,
            '"' => self.quoted = !self.quoted,
            _ if self.quoted => self.push(NodeKind::Literal(c)),
            '[' => {
                let (low, high) = parse_range(&self.chars, self.pos - 1)?;
                self.pos += RANGE_LEN - 1;
                self.push(NodeKind::Range { low, high });
            }
            ']' => {
                return Err(ParseError::new(
                    ParseErrorKind::MalformedRange,
                    offset,
                    "unexpected closing bracket",
                ))
            }
            '(' => self.open_group(),
            ')' => self.close_group(offset)?,
            '|' => {
                self.conc = self.tree.create(NodeKind::Concatenation);
                self.tree.add_child(self.alt, self.conc);
            }
            '*' => self.close(ClosureKind::Star, offset)?,
            '+' => self.close(ClosureKind::Plus, offset)?,
            '?' => self.close(ClosureKind::Optional, offset)?,
            '.' => self.push(NodeKind::Wildcard),
            _ => self.push(NodeKind::Literal(c)),
        }

        Ok(())
    }

    fn escape(&mut self, offset: usize) -> Result<(), ParseError> {
        let escaped = match self.chars.get(self.pos) {
            Some(&(_, c)) => c,
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::UnterminatedBackslash,
                    offset,
                    "unexpected backslash at the end of the pattern",
                ))
            }
        };

        // `\"` and `\\` are escapes even inside quotes.
        if escaped == '"' || escaped == '\\' {
            self.pos += 1;
            self.push(NodeKind::Literal(escaped));
            return Ok(());
        }

        // Inside quotes any other backslash is a literal, and the character
        // after it is handled on its own.
        if self.quoted {
            self.push(NodeKind::Literal('\\'));
            return Ok(());
        }

        self.pos += 1;
        match escaped {
            's' => self.push(NodeKind::AnyWhitespace),
            't' => self.push(NodeKind::Literal('\t')),
            'r' => self.push(NodeKind::Literal('\r')),
            'n' => self.push(NodeKind::Literal('\n')),
            'e' => self.push(NodeKind::EmptyLiteral),
            _ => warn!(
                "ignoring unknown escape sequence \\{} at offset {} in {:?}",
                escaped, offset, self.pattern
            ),
        }

        Ok(())
    }

    fn open_group(&mut self) {
        self.depth += 1;

        let alt = self.tree.create(NodeKind::Alternation);
        self.tree.add_child(self.conc, alt);
        let conc = self.tree.create(NodeKind::Concatenation);
        self.tree.add_child(alt, conc);

        self.alt = alt;
        self.conc = conc;
    }

    fn close_group(&mut self, offset: usize) -> Result<(), ParseError> {
        // The group's alternation hangs from a concatenation, which in turn
        // belongs to the enclosing alternation.
        // Nothing can be appended to the enclosing alternation while the
        // group is open, so that concatenation is still its last branch.
        let enclosing = self.tree.parent(self.alt).and_then(|conc| {
            self.tree.parent(conc).map(|alt| (alt, conc))
        });

        let (alt, conc) = match enclosing {
            Some(cursor) => cursor,
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedClosingParen,
                    offset,
                    "unexpected closing parenthesis",
                ))
            }
        };

        debug_assert_eq!(self.tree.last_child(alt), Some(conc));

        self.depth -= 1;
        self.alt = alt;
        self.conc = conc;

        Ok(())
    }

    fn close(
        &mut self,
        closure: ClosureKind,
        offset: usize,
    ) -> Result<(), ParseError> {
        match self.tree.wrap_last_child(self.conc, closure) {
            Some(_) => Ok(()),
            None => Err(ParseError::new(
                ParseErrorKind::MissingClosureOperand,
                offset,
                "closure operator without anything to repeat",
            )),
        }
    }

    fn push(&mut self, kind: NodeKind) {
        let node = self.tree.create(kind);
        self.tree.add_child(self.conc, node);
    }
}
