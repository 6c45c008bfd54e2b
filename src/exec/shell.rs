use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

use super::{ExecError, ShellExecutor, ShellOutput};
use crate::config::ShellConfig;

/// Runs `<program> <args...> <command>` in a working directory.
///
/// Both output pipes are drained on their own threads so a child writing more
/// than a pipe buffer never stalls. On Unix the child leads a fresh process
/// group, and a timeout kills the whole group so grandchildren holding the
/// pipes open die with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemShell {
    program: String,
    args: Vec<String>,
}

impl Default for SystemShell {
    fn default() -> Self {
        if cfg!(windows) {
            Self::new("powershell.exe", vec!["-NoProfile".into(), "-Command".into()])
        } else {
            Self::new("sh", vec!["-c".into()])
        }
    }
}

impl SystemShell {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from the `[shell]` config section. An empty program selects the
    /// platform default.
    pub fn from_config(config: &ShellConfig) -> Self {
        if config.program.is_empty() {
            Self::default()
        } else {
            Self::new(shellexpand::tilde(&config.program), config.args.clone())
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, cwd: &Path, command: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }
}

impl ShellExecutor for SystemShell {
    fn run(
        &self,
        timeout: Duration,
        cwd: &Path,
        command: &str,
    ) -> Result<ShellOutput, ExecError> {
        let deadline = Instant::now() + timeout;
        let mut child = self.command(cwd, command).spawn().map_err(ExecError::Launch)?;
        let pid = child.id();

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                terminate(&mut child);
                return Err(ExecError::Timeout(timeout));
            }
            Err(e) => {
                terminate(&mut child);
                return Err(ExecError::Wait(e));
            }
        };

        // The shell is gone, but a background job may still hold the pipes.
        let collected = collect(&stdout, deadline, timeout)
            .and_then(|out| collect(&stderr, deadline, timeout).map(|err| (out, err)));
        let (out, err) = match collected {
            Ok(pair) => pair,
            Err(e) => {
                // A reader still short of EOF means a member of the child's
                // group holds the pipe, so the group id has not been freed.
                if matches!(e, ExecError::Timeout(_)) {
                    kill_group(pid);
                }
                return Err(e);
            }
        };

        if !err.is_empty() {
            log::debug!(
                "substitution stderr: command={command:?} stderr={:?}",
                String::from_utf8_lossy(&err)
            );
        }

        Ok(ShellOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&out).into_owned(),
        })
    }
}

type Drained = io::Result<Vec<u8>>;

/// Read a pipe to EOF on a background thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Drained> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match pipe {
            Some(mut p) => p.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        let _ = tx.send(result);
    });
    rx
}

fn collect(rx: &Receiver<Drained>, deadline: Instant, timeout: Duration) -> Result<Vec<u8>, ExecError> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(ExecError::Wait(e)),
        Err(RecvTimeoutError::Timeout) => Err(ExecError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(ExecError::Wait(io::Error::other("output reader exited early")))
        }
    }
}

/// Kill and reap a child that overran its deadline.
fn terminate(child: &mut Child) {
    kill_group(child.id());
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(unix)]
fn kill_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: killpg has no memory-safety preconditions; a group that no
    // longer exists yields ESRCH, which is ignored.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}
