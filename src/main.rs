//! promptline: tokenize one prompt command line.
//!
//! Reads the command from stdin (raw text, or JSON with `--json`), resolves
//! `${VAR}` and `$(cmd)` substitutions, and prints the resulting tokens.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use promptline::config::{Config, SplitMode};
use promptline::{Pipeline, Token, logging};
use serde::Deserialize;

const USAGE: &str = "usage: promptline [--cwd DIR] [--json] [--format json|shell|lines] \
[--whitespace] [--timeout-ms N] [--dump-config]";

// ─── Types ───────────────────────────────────────────

#[derive(Deserialize)]
struct PromptInput {
    command: Option<String>,
    cwd: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Shell,
    Lines,
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    cwd: Option<String>,
    json: bool,
    format: Format,
    whitespace: bool,
    timeout_ms: Option<u64>,
    dump_config: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            cwd: None,
            json: false,
            format: Format::Json,
            whitespace: false,
            timeout_ms: None,
            dump_config: false,
        }
    }
}

// ─── Arguments ───────────────────────────────────────

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut args = Args::default();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--cwd" => args.cwd = Some(argv.next().ok_or("--cwd needs a directory")?),
            "--json" => args.json = true,
            "--whitespace" => args.whitespace = true,
            "--dump-config" => args.dump_config = true,
            "--format" => {
                args.format = match argv.next().as_deref() {
                    Some("json") => Format::Json,
                    Some("shell") => Format::Shell,
                    Some("lines") => Format::Lines,
                    Some(other) => return Err(format!("unknown format: {other}")),
                    None => return Err("--format needs a value".into()),
                }
            }
            "--timeout-ms" => {
                let value = argv.next().ok_or("--timeout-ms needs a value")?;
                let ms = value
                    .parse()
                    .map_err(|_| format!("invalid --timeout-ms: {value}"))?;
                args.timeout_ms = Some(ms);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

// ─── Output ──────────────────────────────────────────

fn render(tokens: &[Token], format: Format) -> Result<String, String> {
    match format {
        Format::Json => serde_json::to_string(&serde_json::json!({ "tokens": tokens }))
            .map_err(|e| e.to_string()),
        // Re-quoted so that empty tokens and embedded spaces stay visible.
        Format::Shell => {
            shlex::try_join(tokens.iter().map(String::as_str)).map_err(|e| e.to_string())
        }
        Format::Lines => Ok(tokens.join("\n")),
    }
}

/// Drop the single line terminator a pipe or heredoc appends.
fn strip_line_ending(input: &str) -> &str {
    let s = input.strip_suffix('\n').unwrap_or(input);
    s.strip_suffix('\r').unwrap_or(s)
}

fn read_input(json: bool) -> Result<(String, Option<String>), String> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .map_err(|e| format!("failed to read stdin: {e}"))?;

    if !json {
        return Ok((strip_line_ending(&input).to_string(), None));
    }
    let parsed: PromptInput =
        serde_json::from_str(&input).map_err(|e| format!("JSON parse error: {e}"))?;
    Ok((parsed.command.unwrap_or_default(), parsed.cwd))
}

fn resolve_cwd(explicit: Option<String>) -> Result<PathBuf, String> {
    match explicit {
        Some(dir) => Ok(PathBuf::from(shellexpand::tilde(&dir).into_owned())),
        None => std::env::current_dir().map_err(|e| format!("no working directory: {e}")),
    }
}

// ─── Entry point ─────────────────────────────────────

fn run(args: Args) -> Result<String, String> {
    let config = Config::load();
    if args.dump_config {
        return toml::to_string_pretty(&config).map_err(|e| e.to_string());
    }

    logging::init(&config.logging);

    let (command, input_cwd) = read_input(args.json)?;
    let cwd = resolve_cwd(args.cwd.or(input_cwd))?;

    let mut pipeline = Pipeline::from_config(&config);
    if args.whitespace {
        pipeline.set_mode(SplitMode::Whitespace);
    }
    if let Some(ms) = args.timeout_ms {
        pipeline.set_timeout(Duration::from_millis(ms));
    }

    let result = pipeline.tokenize_command(&command, &cwd);
    logging::log_outcome(&command, &result);
    let tokens = result.map_err(|e| e.to_string())?;
    render(&tokens, args.format)
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("promptline: {e}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("promptline: {e}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ───────────────────────────────────────────
