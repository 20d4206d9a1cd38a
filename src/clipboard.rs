//! Best-effort system clipboard access.
//!
//! Tries the native `arboard` backend first, then the usual platform
//! command-line tools. Every failure is swallowed: callers only learn
//! whether some backend worked.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::fallback::{first_success, Strategy};

/// Bound on each clipboard helper process.
pub const HELPER_TIMEOUT: Duration = Duration::from_secs(1);

/// An external clipboard helper invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardCommand {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl ClipboardCommand {
    pub const fn new(program: &'static str, args: &'static [&'static str]) -> Self {
        Self { program, args }
    }
}

/// Helpers that accept clipboard contents on stdin, in order of preference.
pub const WRITE_COMMANDS: &[ClipboardCommand] = &[
    ClipboardCommand::new("pbcopy", &[]),
    ClipboardCommand::new("xclip", &["-selection", "clipboard"]),
    ClipboardCommand::new("wl-copy", &[]),
    ClipboardCommand::new("powershell", &["-NoProfile", "-Command", "Set-Clipboard"]),
    ClipboardCommand::new("clip", &[]),
];

/// Helpers that print clipboard contents on stdout, in order of preference.
pub const READ_COMMANDS: &[ClipboardCommand] = &[
    ClipboardCommand::new("pbpaste", &[]),
    ClipboardCommand::new("xclip", &["-selection", "clipboard", "-o"]),
    ClipboardCommand::new("wl-paste", &["-n"]),
    ClipboardCommand::new("powershell", &["-NoProfile", "-Command", "Get-Clipboard"]),
];

#[derive(Debug, Clone)]
pub struct Clipboard {
    native: bool,
    write_commands: Vec<ClipboardCommand>,
    read_commands: Vec<ClipboardCommand>,
    timeout: Duration,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::system()
    }
}

impl Clipboard {
    /// Native backend plus every known helper.
    pub fn system() -> Self {
        Self {
            native: true,
            write_commands: WRITE_COMMANDS.to_vec(),
            read_commands: READ_COMMANDS.to_vec(),
            timeout: HELPER_TIMEOUT,
        }
    }

    /// Only the given helpers, no native backend.
    pub fn with_commands(write: Vec<ClipboardCommand>, read: Vec<ClipboardCommand>) -> Self {
        Self {
            native: false,
            write_commands: write,
            read_commands: read,
            timeout: HELPER_TIMEOUT,
        }
    }

    /// A clipboard where every operation fails.
    pub fn disabled() -> Self {
        Self::with_commands(Vec::new(), Vec::new())
    }

    /// Write `text`; true if any backend accepted it.
    pub async fn write_text(&self, text: &str) -> bool {
        let mut strategies = Vec::new();
        if self.native {
            strategies.push(Strategy::flag("arboard", native_write(text.to_string())));
        }
        for command in &self.write_commands {
            strategies.push(Strategy::flag(
                command.program,
                pipe_to(*command, text, self.timeout),
            ));
        }
        first_success("clipboard-write", strategies)
            .await
            .is_success()
    }

    /// Read the clipboard; `None` if every backend failed or it was empty.
    pub async fn read_text(&self) -> Option<String> {
        let mut strategies = Vec::new();
        if self.native {
            strategies.push(Strategy::new("arboard", native_read()));
        }
        for command in &self.read_commands {
            strategies.push(Strategy::new(
                command.program,
                read_from(*command, self.timeout),
            ));
        }
        first_success("clipboard-read", strategies).await.value()
    }
}

async fn native_write(text: String) -> bool {
    let result = tokio::task::spawn_blocking(move || {
        arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text))
    })
    .await;
    match result {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            trace!(%err, "native clipboard write failed");
            false
        }
        Err(err) => {
            debug!(%err, "native clipboard task failed");
            false
        }
    }
}

async fn native_read() -> Option<String> {
    let result = tokio::task::spawn_blocking(|| {
        arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text())
    })
    .await;
    match result {
        Ok(Ok(text)) if !text.is_empty() => Some(text),
        Ok(Ok(_)) => None,
        Ok(Err(err)) => {
            trace!(%err, "native clipboard read failed");
            None
        }
        Err(err) => {
            debug!(%err, "native clipboard task failed");
            None
        }
    }
}

/// Feed `text` to a helper's stdin and wait for it to exit cleanly.
async fn pipe_to(command: ClipboardCommand, text: &str, limit: Duration) -> bool {
    let run = async {
        let mut child = Command::new(command.program)
            .args(command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
            stdin.shutdown().await?;
        }
        child.wait().await
    };
    match tokio::time::timeout(limit, run).await {
        Ok(Ok(status)) => status.success(),
        Ok(Err(err)) => {
            trace!(program = command.program, %err, "clipboard helper unavailable");
            false
        }
        Err(_) => {
            debug!(program = command.program, "clipboard helper timed out");
            false
        }
    }
}

/// Run a helper and take its stdout as the clipboard contents.
async fn read_from(command: ClipboardCommand, limit: Duration) -> Option<String> {
    let run = Command::new(command.program)
        .args(command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();
    match tokio::time::timeout(limit, run).await {
        Ok(Ok(output)) if output.status.success() && !output.stdout.is_empty() => {
            Some(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(Ok(_)) => None,
        Ok(Err(err)) => {
            trace!(program = command.program, %err, "clipboard helper unavailable");
            None
        }
        Err(_) => {
            debug!(program = command.program, "clipboard helper timed out");
            None
        }
    }
}
