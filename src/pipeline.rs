//! Substitution followed by tokenization.

use std::path::Path;
use std::time::Duration;

use crate::config::{Config, SplitMode};
use crate::env::{EnvLookup, ProcessEnv};
use crate::error::TokenizeError;
use crate::exec::{ShellExecutor, SystemShell};
use crate::parse::{self, SubstitutionResolver, Token};

/// Turns a raw prompt command into argument tokens.
///
/// Holds only configuration and collaborators; every call is independent.
pub struct Pipeline {
    env: Box<dyn EnvLookup>,
    shell: Box<dyn ShellExecutor>,
    timeout: Duration,
    mode: SplitMode,
}

impl Pipeline {
    pub fn new(
        env: Box<dyn EnvLookup>,
        shell: Box<dyn ShellExecutor>,
        timeout: Duration,
        mode: SplitMode,
    ) -> Self {
        Self {
            env,
            shell,
            timeout,
            mode,
        }
    }

    /// Process environment and system shell, tuned by configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(ProcessEnv),
            Box::new(SystemShell::from_config(&config.shell)),
            config.substitution.timeout(),
            config.tokenizer.mode,
        )
    }

    /// Override the split mode (e.g. from the --whitespace CLI flag).
    pub fn set_mode(&mut self, mode: SplitMode) {
        self.mode = mode;
    }

    /// Override the substitution timeout (e.g. from --timeout-ms).
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    /// Replace `${...}` and `$(...)` spans, without tokenizing.
    pub fn resolve(&self, raw: &str, cwd: &Path) -> Result<String, TokenizeError> {
        SubstitutionResolver::new(self.env.as_ref(), self.shell.as_ref(), self.timeout)
            .resolve(raw, cwd)
    }

    /// Resolve substitutions, then split into tokens.
    ///
    /// A substitution failure is returned unchanged and nothing is tokenized.
    pub fn tokenize_command(&self, raw: &str, cwd: &Path) -> Result<Vec<Token>, TokenizeError> {
        let resolved = self.resolve(raw, cwd)?;
        match self.mode {
            SplitMode::Quoted => parse::tokenize(&resolved),
            SplitMode::Whitespace => Ok(parse::split_whitespace(&resolved)),
        }
    }
}
