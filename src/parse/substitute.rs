//! `${NAME}` and `$(cmd)` substitution.
//!
//! A single left-to-right pass. Each span is replaced once and never
//! rescanned: the name inside `${...}` is used verbatim as the lookup key, and
//! the text inside `$(...)` is handed to the shell verbatim, so any nested
//! `$(...)` is expanded by the shell, not here. Values are inserted as-is with
//! no escaping, trimming, or newline handling.

use std::path::Path;
use std::time::Duration;

use super::bracket::span_at;
use super::types::{SpanKind, SubstitutionSpan};
use crate::env::EnvLookup;
use crate::error::TokenizeError;
use crate::exec::{ExecError, ShellExecutor};

/// Replaces substitution spans using the given collaborators.
pub struct SubstitutionResolver<'a> {
    env: &'a dyn EnvLookup,
    shell: &'a dyn ShellExecutor,
    timeout: Duration,
}

impl<'a> SubstitutionResolver<'a> {
    pub fn new(env: &'a dyn EnvLookup, shell: &'a dyn ShellExecutor, timeout: Duration) -> Self {
        Self {
            env,
            shell,
            timeout,
        }
    }

    /// Resolve every span in `raw`. The first failure aborts the whole pass.
    pub fn resolve(&self, raw: &str, cwd: &Path) -> Result<String, TokenizeError> {
        let chars: Vec<char> = raw.chars().collect();
        let mut resolved = String::with_capacity(raw.len());
        let mut i = 0;

        while i < chars.len() {
            let Some(span) = span_at(&chars, i) else {
                resolved.push(chars[i]);
                i += 1;
                continue;
            };
            resolved.push_str(&self.substitute(&span, &chars, cwd)?);
            i = span.end;
        }

        Ok(resolved)
    }

    fn substitute(
        &self,
        span: &SubstitutionSpan,
        chars: &[char],
        cwd: &Path,
    ) -> Result<String, TokenizeError> {
        match (span.kind, span.inner(chars)) {
            (SpanKind::EnvVar, None) => Err(TokenizeError::CurlyBracketMismatch),
            (SpanKind::Command, None) => Err(TokenizeError::RoundBracketMismatch),
            (SpanKind::EnvVar, Some(name)) => self.lookup_var(name),
            (SpanKind::Command, Some(command)) => self.run_command(command, cwd),
        }
    }

    fn lookup_var(&self, name: String) -> Result<String, TokenizeError> {
        match self.env.get(&name) {
            Some(value) => {
                log::debug!("substituted variable: name={name:?} len={}", value.len());
                Ok(value)
            }
            None => Err(TokenizeError::EnvVarNotFound { name }),
        }
    }

    fn run_command(&self, command: String, cwd: &Path) -> Result<String, TokenizeError> {
        match self.shell.run(self.timeout, cwd, &command) {
            Ok(output) => {
                // A failing command still contributes whatever it printed.
                if !output.success() {
                    log::debug!(
                        "substitution command exited with non-zero status: command={command:?} exit_code={:?}",
                        output.exit_code
                    );
                }
                Ok(output.stdout)
            }
            Err(ExecError::Launch(source)) => {
                log::warn!("could not launch substitution command: command={command:?} error={source}");
                Err(TokenizeError::ShellLaunch { command, source })
            }
            Err(ExecError::Timeout(timeout)) => {
                log::warn!(
                    "substitution command timed out: command={command:?} timeout_ms={}",
                    timeout.as_millis()
                );
                Err(TokenizeError::SubstitutionTimeout { command, timeout })
            }
            Err(ExecError::Wait(source)) => Err(TokenizeError::ShellWait { command, source }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::exec::ShellOutput;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// What the scripted shell does for a given command.
    #[derive(Clone)]
    pub(crate) enum Script {
        Exit(i32, &'static str),
        LaunchFailure,
        Timeout,
    }

    /// Shell fake: answers from a table and records every call.
    #[derive(Default)]
    pub(crate) struct ScriptedShell {
        scripts: HashMap<String, Script>,
        pub(crate) calls: Mutex<Vec<(String, PathBuf)>>,
    }

    impl ScriptedShell {
        pub(crate) fn with(mut self, command: &str, script: Script) -> Self {
            self.scripts.insert(command.to_string(), script);
            self
        }

        pub(crate) fn commands(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
        }
    }

    impl ShellExecutor for ScriptedShell {
        fn run(
            &self,
            timeout: Duration,
            cwd: &Path,
            command: &str,
        ) -> Result<ShellOutput, ExecError> {
            self.calls
                .lock()
                .unwrap()
                .push((command.to_string(), cwd.to_path_buf()));
            match self.scripts.get(command) {
                Some(Script::Exit(code, stdout)) => Ok(ShellOutput {
                    exit_code: Some(*code),
                    stdout: stdout.to_string(),
                }),
                Some(Script::LaunchFailure) => Err(ExecError::Launch(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "sh not found",
                ))),
                Some(Script::Timeout) => Err(ExecError::Timeout(timeout)),
                None => Ok(ShellOutput {
                    exit_code: Some(127),
                    stdout: String::new(),
                }),
            }
        }
    }

    fn env() -> HashMap<String, String> {
        HashMap::from([
            ("SPF_VAR1".to_string(), "1".to_string()),
            ("SPF_VAR2".to_string(), "hello".to_string()),
            ("SPF_EMPTY".to_string(), String::new()),
            ("SPF_MULTILINE".to_string(), "a\nb\n".to_string()),
            ("SPF_SUBST".to_string(), "$(rm -rf x) ${SPF_VAR1}".to_string()),
        ])
    }

    fn resolve(shell: &ScriptedShell, raw: &str) -> Result<String, TokenizeError> {
        let env = env();
        SubstitutionResolver::new(&env, shell, Duration::from_millis(500))
            .resolve(raw, Path::new("/work"))
    }

    #[test]
    fn passthrough_without_substitution() {
        let shell = ScriptedShell::default();
        assert_eq!(resolve(&shell, "").unwrap(), "");
        let raw = "   a b c $%^ () {} \u{7}\u{b}\t \u{87}";
        assert_eq!(resolve(&shell, raw).unwrap(), raw);
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn lone_dollars_are_literal() {
        let shell = ScriptedShell::default();
        assert_eq!(resolve(&shell, "$").unwrap(), "$");
        assert_eq!(resolve(&shell, "cost $5 $$ a$").unwrap(), "cost $5 $$ a$");
        assert_eq!(resolve(&shell, "$ {SPF_VAR1}").unwrap(), "$ {SPF_VAR1}");
    }

    #[test]
    fn env_var_values() {
        let shell = ScriptedShell::default();
        assert_eq!(resolve(&shell, "${SPF_VAR2}").unwrap(), "hello");
        assert_eq!(resolve(&shell, "x${SPF_VAR1}y").unwrap(), "x1y");
        assert_eq!(resolve(&shell, "[${SPF_EMPTY}]").unwrap(), "[]");
        assert_eq!(
            resolve(&shell, "${SPF_VAR1} ${SPF_VAR2}").unwrap(),
            "1 hello"
        );
    }

    #[test]
    fn values_are_not_sanitised_or_rescanned() {
        let shell = ScriptedShell::default();
        assert_eq!(resolve(&shell, "${SPF_MULTILINE}").unwrap(), "a\nb\n");
        assert_eq!(
            resolve(&shell, "${SPF_SUBST}").unwrap(),
            "$(rm -rf x) ${SPF_VAR1}"
        );
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn missing_env_var() {
        let shell = ScriptedShell::default();
        match resolve(&shell, "${SPF_VAR4}") {
            Err(TokenizeError::EnvVarNotFound { name }) => assert_eq!(name, "SPF_VAR4"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn var_name_is_taken_verbatim() {
        let shell = ScriptedShell::default();
        match resolve(&shell, "${$(pwd)}") {
            Err(TokenizeError::EnvVarNotFound { name }) => assert_eq!(name, "$(pwd)"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn unterminated_round_bracket() {
        let shell = ScriptedShell::default();
        assert!(matches!(
            resolve(&shell, "abc $(abc"),
            Err(TokenizeError::RoundBracketMismatch)
        ));
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn opening_at_end_of_input() {
        let shell = ScriptedShell::default();
        assert!(matches!(
            resolve(&shell, "ls $("),
            Err(TokenizeError::RoundBracketMismatch)
        ));
        assert!(matches!(
            resolve(&shell, "ls ${"),
            Err(TokenizeError::CurlyBracketMismatch)
        ));
        assert!(shell.commands().is_empty());
    }

    #[test]
    fn unterminated_curly_bracket_after_command() {
        let shell = ScriptedShell::default().with("echo abc", Script::Exit(0, "abc\n"));
        assert!(matches!(
            resolve(&shell, "abc $(echo abc) syt ${ sdfc ( {)}"),
            Err(TokenizeError::CurlyBracketMismatch)
        ));
        assert_eq!(shell.commands(), vec!["echo abc"]);
    }

    #[test]
    fn command_output_is_verbatim() {
        let shell = ScriptedShell::default().with("echo abc", Script::Exit(0, "abc\n"));
        assert_eq!(resolve(&shell, "$(echo abc)").unwrap(), "abc\n");
    }

    #[test]
    fn nested_command_is_left_to_the_shell() {
        let shell = ScriptedShell::default().with("echo $(echo abc)", Script::Exit(0, "abc\n"));
        assert_eq!(resolve(&shell, "$(echo $(echo abc))").unwrap(), "abc\n");
        assert_eq!(shell.commands(), vec!["echo $(echo abc)"]);
    }

    #[test]
    fn mixed_substitutions() {
        let shell = ScriptedShell::default().with("echo $(echo hi)", Script::Exit(0, "hi\n"));
        assert_eq!(
            resolve(&shell, "$(echo $(echo hi)) ${SPF_VAR2}").unwrap(),
            "hi\n hello"
        );
    }

    #[test]
    fn empty_output() {
        let shell = ScriptedShell::default().with("true", Script::Exit(0, ""));
        assert_eq!(resolve(&shell, "cd abc $(true)").unwrap(), "cd abc ");
    }

    #[test]
    fn nonzero_exit_keeps_output() {
        let shell = ScriptedShell::default().with("grep x f", Script::Exit(1, "partial"));
        assert_eq!(resolve(&shell, "a $(grep x f) b").unwrap(), "a partial b");
    }

    #[test]
    fn launch_failure() {
        let shell = ScriptedShell::default().with("ls", Script::LaunchFailure);
        match resolve(&shell, "x $(ls)") {
            Err(TokenizeError::ShellLaunch { command, .. }) => assert_eq!(command, "ls"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn timeout() {
        let shell = ScriptedShell::default().with("sleep 2", Script::Timeout);
        match resolve(&shell, "$(sleep 2)") {
            Err(TokenizeError::SubstitutionTimeout { command, timeout }) => {
                assert_eq!(command, "sleep 2");
                assert_eq!(timeout, Duration::from_millis(500));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn spans_run_left_to_right_and_stop_at_first_error() {
        let shell = ScriptedShell::default()
            .with("a", Script::Exit(0, "A"))
            .with("b", Script::Timeout)
            .with("c", Script::Exit(0, "C"));
        assert!(resolve(&shell, "$(a) $(b) $(c)").is_err());
        assert_eq!(shell.commands(), vec!["a", "b"]);
    }

    #[test]
    fn cwd_is_forwarded() {
        let shell = ScriptedShell::default().with("pwd", Script::Exit(0, "/work\n"));
        resolve(&shell, "$(pwd)").unwrap();
        let calls = shell.calls.lock().unwrap();
        assert_eq!(calls[0].1, PathBuf::from("/work"));
    }

    #[test]
    fn unicode_around_spans() {
        let shell = ScriptedShell::default();
        assert_eq!(resolve(&shell, "é${SPF_VAR1}ü").unwrap(), "é1ü");
    }
}
