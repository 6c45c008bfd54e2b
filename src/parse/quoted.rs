//! Quote-aware splitting of a resolved command line into tokens.
//!
//! The rules are deliberately narrower than POSIX word splitting:
//!
//! - Outside quotes, whitespace separates tokens and `\` makes the next
//!   character literal.
//! - Inside `'...'`, only `\'` is an escape. Any other backslash is literal.
//! - Inside `"..."`, `\"` and `\\` are escapes. Any other backslash is kept
//!   together with the character after it, so `"a\nb"` stays `a\nb`.
//! - A closing quote always ends the token. `"a""b"` is two tokens and `""`
//!   is one empty token.

use super::types::Token;
use crate::error::TokenizeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Bare,
    Single,
    Double,
}

/// Accumulates the token being built.
///
/// `open` distinguishes an empty token (opened by a quote) from no token.
#[derive(Default)]
struct Builder {
    tokens: Vec<Token>,
    current: String,
    open: bool,
}

impl Builder {
    fn push(&mut self, c: char) {
        self.current.push(c);
        self.open = true;
    }

    fn open(&mut self) {
        self.open = true;
    }

    fn finish(&mut self) {
        if self.open {
            self.tokens.push(std::mem::take(&mut self.current));
            self.open = false;
        }
    }
}

/// Split `text` into tokens, honouring quotes and backslash escapes.
pub fn tokenize(text: &str) -> Result<Vec<Token>, TokenizeError> {
    let mut out = Builder::default();
    let mut mode = Mode::Bare;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Bare => match c {
                c if c.is_whitespace() => out.finish(),
                '\'' => {
                    out.open();
                    mode = Mode::Single;
                }
                '"' => {
                    out.open();
                    mode = Mode::Double;
                }
                '\\' => match chars.next() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(TokenizeError::DanglingEscape),
                },
                c => out.push(c),
            },
            Mode::Single => match c {
                '\\' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    out.push('\'');
                }
                '\'' => {
                    out.finish();
                    mode = Mode::Bare;
                }
                c => out.push(c),
            },
            Mode::Double => match c {
                '\\' => match chars.next() {
                    Some(e @ ('"' | '\\')) => out.push(e),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(TokenizeError::DanglingEscape),
                },
                '"' => {
                    out.finish();
                    mode = Mode::Bare;
                }
                c => out.push(c),
            },
        }
    }

    if mode != Mode::Bare {
        return Err(TokenizeError::UnterminatedQuote);
    }
    out.finish();
    Ok(out.tokens)
}

/// Split on whitespace only. Quotes and backslashes are ordinary characters.
pub fn split_whitespace(text: &str) -> Vec<Token> {
    text.split_whitespace().map(String::from).collect()
}
