/*! Splits a pattern into `(token kind, lexeme)` pairs.

The tokenizer follows the same character rules as the [parser](crate::parser)
but builds no tree. Runs of literal characters, escaped or quoted, are
coalesced into a single [`TokenKind::Literal`] token. It is meant for
diagnostics: showing how a pattern was read.
*/

use log::warn;

use crate::parser::{parse_range, ParseError, ParseErrorKind, RANGE_LEN};

/// The kinds of tokens found in a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Literal,
    ParenOpen,
    ParenClose,
    /// Ranges are reported as a single [`TokenKind::Range`] token, so the
    /// tokenizer never emits the bracket kinds on their own.
    BracketOpen,
    BracketClose,
    Alternation,
    Closure,
    PosClosure,
    ZeroOrOne,
    Range,
    Wildcard,
    EmptyStr,
    AnyWhitespace,
}

const TOKEN_NAMES: [&str; 13] = [
    "LITERAL",
    "PARENTHESIS_OPEN",
    "PARENTHESIS_CLOSE",
    "BRACKET_OPEN",
    "BRACKET_CLOSE",
    "ALTERNATION",
    "CLOSURE",
    "POS_CLOSURE",
    "OP_ZERO_OR_ONE",
    "RANGE",
    "WILDCARD",
    "EMPTYSTR",
    "ANYWHITESPACE",
];

impl TokenKind {
    /// Returns the upper-case name of the token kind, e.g. `"POS_CLOSURE"`.
    pub fn name(self) -> &'static str {
        TOKEN_NAMES[self as usize]
    }
}

/// The output of the tokenizer: two sequences of the same length, where
/// `lexemes[i]` is the text of the token `kinds[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub kinds: Vec<TokenKind>,
    pub lexemes: Vec<String>,
}

impl Tokens {
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Iterates the `(kind, lexeme)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (TokenKind, &str)> + '_ {
        self.kinds.iter().copied().zip(self.lexemes.iter().map(String::as_str))
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>) {
        self.kinds.push(kind);
        self.lexemes.push(lexeme.into());
    }
}

/// Tokenizes `pattern`.
pub fn tokenize(pattern: &str) -> Result<Tokens, ParseError> {
    Tokenizer::new(pattern).tokenize()
}

/// A single-use tokenizer for one pattern.
pub struct Tokenizer<'src> {
    pattern: &'src str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tokens: Tokens,
    literal: String,
    depth: usize,
    quoted: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(pattern: &'src str) -> Self {
        Tokenizer {
            pattern,
            chars: pattern.char_indices().collect(),
            pos: 0,
            tokens: Tokens::default(),
            literal: String::new(),
            depth: 0,
            quoted: false,
        }
    }

    pub fn tokenize(mut self) -> Result<Tokens, ParseError> {
        while self.pos < self.chars.len() {
            self.step()?;
        }

        self.flush_literal();

        if self.depth > 0 {
            return Err(ParseError::new(
                ParseErrorKind::UnmatchedOpeningParen,
                self.pattern.len(),
                "unmatched parenthesis: too many opening '('",
            ));
        }

        if self.quoted {
            return Err(ParseError::new(
                ParseErrorKind::UnterminatedQuote,
                self.pattern.len(),
                "unmatched quotes: the pattern ends inside a quoted literal",
            ));
        }

        Ok(self.tokens)
    }

    fn step(&mut self) -> Result<(), ParseError> {
        let (offset, c) = self.chars[self.pos];
        self.pos += 1;

        match c {
            '\\' => self.escape(offset)?,
            '"' => self.quoted = !self.quoted,
            _ if self.quoted => self.literal.push(c),
            '[' => {
                self.flush_literal();
                let (low, high) = parse_range(&self.chars, self.pos - 1)?;
                self.pos += RANGE_LEN - 1;
                self.tokens
                    .push(TokenKind::Range, format!("[{}-{}]", low, high));
            }
            ']' => {
                return Err(ParseError::new(
                    ParseErrorKind::MalformedRange,
                    offset,
                    "unexpected closing bracket",
                ))
            }
            '(' => {
                self.depth += 1;
                self.structural(TokenKind::ParenOpen, c);
            }
            ')' => {
                if self.depth == 0 {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedClosingParen,
                        offset,
                        "unexpected closing parenthesis",
                    ));
                }
                self.depth -= 1;
                self.structural(TokenKind::ParenClose, c);
            }
            '|' => self.structural(TokenKind::Alternation, c),
            '*' => self.structural(TokenKind::Closure, c),
            '+' => self.structural(TokenKind::PosClosure, c),
            '?' => self.structural(TokenKind::ZeroOrOne, c),
            '.' => self.structural(TokenKind::Wildcard, c),
            _ => self.literal.push(c),
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

        if escaped == '"' || escaped == '\\' {
            self.pos += 1;
            self.literal.push(escaped);
            return Ok(());
        }

        if self.quoted {
            self.literal.push('\\');
            return Ok(());
        }

        self.pos += 1;
        match escaped {
            's' => {
                self.flush_literal();
                self.tokens.push(TokenKind::AnyWhitespace, "\\s");
            }
            'e' => {
                self.flush_literal();
                self.tokens.push(TokenKind::EmptyStr, "\\e");
            }
            't' => self.literal.push('\t'),
            'r' => self.literal.push('\r'),
            'n' => self.literal.push('\n'),
            _ => warn!(
                "ignoring unknown escape sequence \\{} at offset {} in {:?}",
                escaped, offset, self.pattern
            ),
        }

        Ok(())
    }

    fn structural(&mut self, kind: TokenKind, c: char) {
        self.flush_literal();
        self.tokens.push(kind, c);
    }

    fn flush_literal(&mut self) {
        if !self.literal.is_empty() {
            let literal = std::mem::take(&mut self.literal);
            self.tokens.push(TokenKind::Literal, literal);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pairs(pattern: &str) -> Vec<(TokenKind, String)> {
        tokenize(pattern)
            .unwrap()
            .iter()
            .map(|(kind, lexeme)| (kind, lexeme.to_owned()))
            .collect()
    }

    fn error(pattern: &str) -> (ParseErrorKind, usize) {
        let err = tokenize(pattern).unwrap_err();
        (err.kind, err.offset)
    }

    #[test]
    fn group_closure() {
        let tokens = tokenize("(ab|b)*").unwrap();

        assert_eq!(tokens.len(), 6);
        assert_eq!(tokens.lexemes, vec!["(", "ab", "|", "b", ")", "*"]);
        assert_eq!(
            tokens.kinds,
            vec![
                TokenKind::ParenOpen,
                TokenKind::Literal,
                TokenKind::Alternation,
                TokenKind::Literal,
                TokenKind::ParenClose,
                TokenKind::Closure,
            ]
        );
    }

    #[test]
    fn quotes_escapes_and_ranges() {
        let tokens =
            tokenize("(a\"ab\\\"|cb\"|(asdf*b?))[0-9]\\s\\t\n end+").unwrap();

        assert_eq!(
            tokens.lexemes,
            vec![
                "(",
                "aab\"|cb",
                "|",
                "(",
                "asdf",
                "*",
                "b",
                "?",
                ")",
                ")",
                "[0-9]",
                "\\s",
                "\t\n end",
                "+",
            ]
        );
        assert_eq!(
            tokens.kinds,
            vec![
                TokenKind::ParenOpen,
                TokenKind::Literal,
                TokenKind::Alternation,
                TokenKind::ParenOpen,
                TokenKind::Literal,
                TokenKind::Closure,
                TokenKind::Literal,
                TokenKind::ZeroOrOne,
                TokenKind::ParenClose,
                TokenKind::ParenClose,
                TokenKind::Range,
                TokenKind::AnyWhitespace,
                TokenKind::Literal,
                TokenKind::PosClosure,
            ]
        );
    }

    #[test]
    fn empty_pattern() {
        let tokens = tokenize("").unwrap();
        assert!(tokens.is_empty());
        assert!(tokens.lexemes.is_empty());
    }

    #[test]
    fn wildcard_and_empty_string() {
        assert_eq!(
            pairs("a.\\eb"),
            vec![
                (TokenKind::Literal, "a".to_owned()),
                (TokenKind::Wildcard, ".".to_owned()),
                (TokenKind::EmptyStr, "\\e".to_owned()),
                (TokenKind::Literal, "b".to_owned()),
            ]
        );
    }

    #[test]
    fn quoted_backslash() {
        assert_eq!(pairs("\"\\s\""), vec![(TokenKind::Literal, "\\s".to_owned())]);
        assert_eq!(pairs("\\q"), vec![]);
    }

    #[test]
    fn errors() {
        assert_eq!(error("a\\"), (ParseErrorKind::UnterminatedBackslash, 1));
        assert_eq!(error("[a-"), (ParseErrorKind::MalformedRange, 0));
        assert_eq!(error("x[a+b]"), (ParseErrorKind::MalformedRange, 1));
        assert_eq!(error("a]"), (ParseErrorKind::MalformedRange, 1));
        assert_eq!(error("())("), (ParseErrorKind::UnexpectedClosingParen, 2));
        assert_eq!(error("(("), (ParseErrorKind::UnmatchedOpeningParen, 2));
        assert_eq!(error("\"abc"), (ParseErrorKind::UnterminatedQuote, 4));
    }

    #[test]
    fn names() {
        assert_eq!(TokenKind::Literal.name(), "LITERAL");
        assert_eq!(TokenKind::PosClosure.name(), "POS_CLOSURE");
        assert_eq!(TokenKind::ZeroOrOne.name(), "OP_ZERO_OR_ONE");
        assert_eq!(TokenKind::AnyWhitespace.name(), "ANYWHITESPACE");
    }
}
