//! Errors surfaced to the prompt. Every variant is terminal for the call that
//! produced it.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TokenizeError {
    #[error("unmatched '{{' in ${{...}} substitution")]
    CurlyBracketMismatch,

    #[error("unmatched '(' in $(...) substitution")]
    RoundBracketMismatch,

    #[error("environment variable not found: {name}")]
    EnvVarNotFound { name: String },

    #[error("could not execute shell substitution command: {command}: {source}")]
    ShellLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("shell substitution command timed out after {}ms: {command}", .timeout.as_millis())]
    SubstitutionTimeout { command: String, timeout: Duration },

    #[error("failed waiting on shell substitution command: {command}: {source}")]
    ShellWait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("trailing backslash with nothing to escape")]
    DanglingEscape,
}
