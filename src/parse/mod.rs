pub mod bracket;
pub mod quoted;
pub mod substitute;
pub mod types;

pub use bracket::{BracketMatch, find_matching, span_at};
pub use quoted::{split_whitespace, tokenize};
pub use substitute::SubstitutionResolver;
pub use types::{SpanKind, SubstitutionSpan, Token};
