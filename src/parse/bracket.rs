use super::types::{SpanKind, SubstitutionSpan};

/// Outcome of searching for a matching closing bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketMatch {
    /// Index of the matching closing bracket.
    Found(usize),
    /// The scan ran off the end of the input with brackets still open.
    Unterminated,
    /// `open_idx` is out of bounds or does not hold the opening bracket.
    NotAnOpening,
}

/// Find the bracket closing the one at `open_idx`.
///
/// Only `open` and `close` are counted; any other bracket shape is an ordinary
/// character, so `d(e{f})gh` matched from the outer `(` skips the `{}` pair
/// and lands on the outer `)`. The two characters need not form a
/// conventional pair.
pub fn find_matching(chars: &[char], open_idx: usize, open: char, close: char) -> BracketMatch {
    if chars.get(open_idx) != Some(&open) {
        return BracketMatch::NotAnOpening;
    }

    let mut depth: usize = 1;
    for (i, &c) in chars.iter().enumerate().skip(open_idx + 1) {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return BracketMatch::Found(i);
            }
        }
    }
    BracketMatch::Unterminated
}

/// Recognise a substitution span starting at the `$` at index `i`.
///
/// Returns `None` when `chars[i]` is not a `$` followed by `{` or `(`; the
/// caller then treats the `$` as an ordinary character.
pub fn span_at(chars: &[char], i: usize) -> Option<SubstitutionSpan> {
    if chars.get(i) != Some(&'$') {
        return None;
    }
    let kind = SpanKind::from_opening(*chars.get(i + 1)?)?;

    match find_matching(chars, i + 1, kind.open(), kind.close()) {
        BracketMatch::Found(close_idx) => Some(SubstitutionSpan {
            start: i,
            end: close_idx + 1,
            kind,
            terminated: true,
        }),
        BracketMatch::Unterminated => Some(SubstitutionSpan {
            start: i,
            end: chars.len(),
            kind,
            terminated: false,
        }),
        BracketMatch::NotAnOpening => None,
    }
}
