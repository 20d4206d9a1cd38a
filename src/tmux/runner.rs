//! Process execution for tmux commands.
//!
//! The client talks to tmux exclusively through [`CommandRunner`], so tests
//! can swap the real subprocess for a [`ScriptedRunner`].

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use tokio::process::Command;

use super::error::TmuxError;

/// Boxed future returned by [`CommandRunner::run`].
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandOutput, TmuxError>> + Send + 'a>>;

/// Raw result of one finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A zero exit with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A non-zero exit with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Executes a single command, bounded by `timeout`.
///
/// Implementations report spawn problems and timeouts as [`TmuxError`]s and
/// leave exit-status classification to the caller.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(&'a self, program: &'a str, args: &'a [String], timeout: Duration) -> RunFuture<'a>;
}

/// Runs commands as real subprocesses via `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run<'a>(&'a self, program: &'a str, args: &'a [String], timeout: Duration) -> RunFuture<'a> {
        Box::pin(async move {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                // Dropping the wait (timeout or task cancellation) must reap the child.
                .kill_on_drop(true);

            let output = match tokio::time::timeout(timeout, command.output()).await {
                Ok(Ok(output)) => output,
                Ok(Err(err)) if err.kind() == io::ErrorKind::NotFound => {
                    return Err(TmuxError::NotRunning(format!("{program} command not found")));
                }
                Ok(Err(err)) => {
                    return Err(TmuxError::CommandFailed(format!(
                        "failed to run {program} {args:?}: {err}"
                    )));
                }
                Err(_) => return Err(TmuxError::TimedOut(timeout)),
            };

            Ok(CommandOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        })
    }
}

type Responder = Box<dyn Fn(&[String]) -> Result<CommandOutput, TmuxError> + Send + Sync>;

/// In-memory runner that answers from a closure and records every call.
///
/// Arguments are recorded without the program name or socket flags, so
/// assertions read like tmux subcommands: `["send-keys", "-t", "%1", "Enter"]`.
pub struct ScriptedRunner {
    responder: Responder,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&[String]) -> Result<CommandOutput, TmuxError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A runner where every command succeeds with empty output.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(CommandOutput::ok("")))
    }

    /// Snapshot of the recorded calls, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Recorded calls whose first argument is `subcommand`.
    pub fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.first().map(String::as_str) == Some(subcommand))
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run<'a>(&'a self, _program: &'a str, args: &'a [String], _timeout: Duration) -> RunFuture<'a> {
        let args = strip_socket_flag(args);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        let result = (self.responder)(args);
        Box::pin(async move { result })
    }
}

fn strip_socket_flag(args: &[String]) -> &[String] {
    match args {
        [flag, _, rest @ ..] if flag == "-L" => rest,
        _ => args,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn scripted_runner_records_calls_without_socket_flag() {
        let runner = ScriptedRunner::succeeding();
        let call = args(&["-L", "test", "has-session", "-t", "alpha"]);
        runner
            .run("tmux", &call, Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(runner.calls(), vec![args(&["has-session", "-t", "alpha"])]);
        assert_eq!(runner.calls_to("has-session").len(), 1);
        assert!(runner.calls_to("kill-session").is_empty());
    }

    #[tokio::test]
    async fn system_runner_reports_missing_binary_as_not_running() {
        let result = SystemRunner
            .run(
                "muxdeck-definitely-missing-binary",
                &args(&["-V"]),
                Duration::from_secs(1),
            )
            .await;
        assert!(matches!(result, Err(TmuxError::NotRunning(_))));
    }

    #[tokio::test]
    async fn system_runner_times_out_slow_commands() {
        let result = SystemRunner
            .run("sleep", &args(&["5"]), Duration::from_millis(50))
            .await;
        assert_eq!(result, Err(TmuxError::TimedOut(Duration::from_millis(50))));
    }
}
