use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub substitution: SubstitutionConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SubstitutionConfig {
    pub timeout_ms: u64,
}

impl Default for SubstitutionConfig {
    fn default() -> Self {
        Self { timeout_ms: 1000 }
    }
}

impl SubstitutionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// How the resolved command line is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Quote and escape aware splitting.
    #[default]
    Quoted,
    /// Whitespace only; quotes are ordinary characters.
    Whitespace,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TokenizerConfig {
    #[serde(default)]
    pub mode: SplitMode,
}

/// Interpreter for `$(...)`. An empty program selects the platform default.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ShellConfig {
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            file: "~/.local/share/promptline/promptline.log".into(),
        }
    }
}

impl LoggingConfig {
    /// Parsed level; unknown names fall back to `warn`.
    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Warn)
    }

    /// Log file path with `~` expanded.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.file).into_owned())
    }
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    substitution: SubstitutionOverlay,
    #[serde(default)]
    tokenizer: TokenizerOverlay,
    #[serde(default)]
    shell: ShellOverlay,
    #[serde(default)]
    logging: LoggingOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SubstitutionOverlay {
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TokenizerOverlay {
    mode: Option<SplitMode>,
}

#[derive(Debug, Deserialize, Default)]
struct ShellOverlay {
    program: Option<String>,
    args: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct LoggingOverlay {
    level: Option<String>,
    file: Option<String>,
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Override with ~/.config/promptline/config.toml (if exists)
    ///
    /// Every key present in the user file replaces the default; absent keys
    /// keep their default values.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Path of the user overlay file.
    pub fn overlay_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(PathBuf::from(home).join(".config/promptline/config.toml"))
    }

    fn load_overlay() -> Option<ConfigOverlay> {
        let content = std::fs::read_to_string(Self::overlay_path()?).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("promptline: config parse error: {e}");
                None
            }
        }
    }

    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        if let Some(v) = overlay.substitution.timeout_ms {
            self.substitution.timeout_ms = v;
        }
        if let Some(v) = overlay.tokenizer.mode {
            self.tokenizer.mode = v;
        }

        // A new program usually needs its own flags, so args are replaced
        // wholesale rather than merged.
        let sh = overlay.shell;
        if let Some(v) = sh.program {
            self.shell.program = v;
        }
        if let Some(v) = sh.args {
            self.shell.args = v;
        }

        let l = overlay.logging;
        if let Some(v) = l.level {
            self.logging.level = v;
        }
        if let Some(v) = l.file {
            self.logging.file = v;
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
