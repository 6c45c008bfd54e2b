use std::fs::{File, OpenOptions};

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::config::LoggingConfig;
use crate::error::TokenizeError;
use crate::parse::Token;

/// Longest command prefix written to the log.
const MAX_LOGGED_CHARS: usize = 200;

/// Route `log` records to the configured file.
///
/// Best-effort: if the file cannot be opened or a logger is already installed,
/// logging stays disabled and tokenization carries on. Returns whether a
/// logger was installed.
pub fn init(config: &LoggingConfig) -> bool {
    let level = config.level_filter();
    if level == LevelFilter::Off {
        return false;
    }

    let Some(file) = open_log_file(config) else {
        return false;
    };

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, log_config, file).is_ok()
}

/// Open the log file for appending, creating parent directories as needed.
fn open_log_file(config: &LoggingConfig) -> Option<File> {
    let path = config.path();
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    OpenOptions::new().create(true).append(true).open(&path).ok()
}

/// Record the outcome of one tokenization as a single log line.
pub fn log_outcome(command: &str, result: &Result<Vec<Token>, TokenizeError>) {
    let cmd = oneline(command);
    match result {
        Ok(tokens) => log::info!("tokenized\t{cmd}\t{} token(s)", tokens.len()),
        Err(e) => log::info!("rejected\t{cmd}\t{}", oneline(&e.to_string())),
    }
}

/// Compact, truncated form of `text` that fits on one log line.
fn oneline(text: &str) -> String {
    text.chars()
        .take(MAX_LOGGED_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
