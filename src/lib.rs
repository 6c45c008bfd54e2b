//! promptline: tokenizer for file-manager command prompts.
//!
//! A command line typed at the prompt may reference environment variables
//! (`${NAME}`) and command substitutions (`$(cmd)`). This crate resolves both
//! to literal text in a single left-to-right pass, then splits the result into
//! a flat list of argument tokens. It is a deliberately small subset of shell
//! syntax: no globbing, no pipelines, no word splitting beyond the final
//! tokenizer.
//!
//! # Architecture
//!
//! - **[`parse`]**: Bracket matching, substitution, quote-aware tokenizer.
//! - **[`pipeline`]**: Substitution followed by tokenization, built from config.
//! - **[`env`]**: Variable lookup used by `${NAME}`.
//! - **[`exec`]**: Shell execution with a timeout, used by `$(cmd)`.
//! - **[`config`]**: Configuration loading: embedded defaults + user overlay.
//! - **[`logging`]**: File logging for the CLI.

/// Configuration types, loading, and overlay logic.
pub mod config;
/// Environment variable lookup.
pub mod env;
/// Error type shared by every stage.
pub mod error;
/// Subprocess execution for `$(...)`.
pub mod exec;
/// File-based logging.
pub mod logging;
/// Bracket matching, substitution, and tokenizing.
pub mod parse;
/// End-to-end command tokenization.
pub mod pipeline;

use std::path::Path;

pub use error::TokenizeError;
pub use parse::Token;
pub use pipeline::Pipeline;

/// Tokenize a prompt command using the default configuration.
///
/// This is the main entry point for tests and simple usage.
/// For user configuration or injected collaborators, build a [`Pipeline`].
pub fn tokenize_command(raw: &str, cwd: &Path) -> Result<Vec<Token>, TokenizeError> {
    let config = config::Config::default_config();
    Pipeline::from_config(&config).tokenize_command(raw, cwd)
}
