//! Types produced by the substitution scanner and the tokenizers.

/// One fully resolved argument, with quoting and escaping stripped.
pub type Token = String;

/// Which substitution construct a span covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// `${NAME}`: environment variable lookup
    EnvVar,
    /// `$(cmd)`: captured output of a shell command
    Command,
}

impl SpanKind {
    /// Classify the character following a `$`.
    pub fn from_opening(c: char) -> Option<Self> {
        match c {
            '{' => Some(SpanKind::EnvVar),
            '(' => Some(SpanKind::Command),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            SpanKind::EnvVar => '{',
            SpanKind::Command => '(',
        }
    }

    pub fn close(self) -> char {
        match self {
            SpanKind::EnvVar => '}',
            SpanKind::Command => ')',
        }
    }
}

/// A `${...}` or `$(...)` region of the raw command.
///
/// `start` is the index of the `$`. `end` is exclusive: one past the closing
/// bracket, or the length of the command when no closing bracket exists.
/// Because a closing bracket in the last position also yields `end == len`,
/// `terminated` records which of the two happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
    pub terminated: bool,
}

impl SubstitutionSpan {
    /// Text strictly between the brackets, taken verbatim.
    ///
    /// `None` for an unterminated span, or one that does not fit `chars`.
    pub fn inner(&self, chars: &[char]) -> Option<String> {
        if !self.terminated {
            return None;
        }
        // skip `$` and the opening bracket, drop the closing bracket
        let close = self.end.checked_sub(1)?;
        chars
            .get(self.start + 2..close)
            .map(|inner| inner.iter().collect())
    }
}
