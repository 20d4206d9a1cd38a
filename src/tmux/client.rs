//! Async tmux client built on the command-line control interface.

use std::path::PathBuf;
use std::sync::Arc;

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tracing::{debug, info, warn};

use crate::fallback::{first_success, Strategy};
use crate::session::SessionRecord;

use super::error::{Lookup, TmuxError};
use super::parser::{parse_active_pane, parse_session_line, parse_session_list, parse_version};
use super::runner::{CommandRunner, SystemRunner};
use super::signal::{foreground_group, foreground_group_from_proc, signal_group, signal_group_of};
use super::{
    session_target, session_window_target, InstanceId, TmuxSettings, INSTANCE_OPTION, MANAGED_OPTION,
    SESSION_FORMAT,
};

/// Handle to a tmux server.
///
/// Cheap to clone; clones share the runner. Every call is bounded by the
/// configured timeout, and apart from [`TmuxClient::version`] failures are
/// absorbed into `bool`, `Option` or [`Lookup`] results.
#[derive(Clone)]
pub struct TmuxClient {
    settings: TmuxSettings,
    instance: InstanceId,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for TmuxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmuxClient")
            .field("settings", &self.settings)
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

impl TmuxClient {
    /// Client that runs real tmux subprocesses.
    pub fn new(settings: TmuxSettings, instance: InstanceId) -> Self {
        Self::with_runner(settings, instance, Arc::new(SystemRunner))
    }

    pub fn with_runner(
        settings: TmuxSettings,
        instance: InstanceId,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            settings,
            instance,
            runner,
        }
    }

    pub fn instance(&self) -> &InstanceId {
        &self.instance
    }

    pub fn settings(&self) -> &TmuxSettings {
        &self.settings
    }

    fn command_args(&self, args: &[&str]) -> Vec<String> {
        let mut full = Vec::with_capacity(args.len() + 2);
        if let Some(socket) = &self.settings.socket {
            full.push("-L".to_string());
            full.push(socket.clone());
        }
        full.extend(args.iter().map(|arg| (*arg).to_string()));
        full
    }

    /// Run one tmux command and return its stdout with trailing whitespace removed.
    async fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
        let full = self.command_args(args);
        let output = self
            .runner
            .run(&self.settings.command, &full, self.settings.timeout)
            .await?;
        if !output.success {
            return Err(TmuxError::classify(&output.stderr));
        }
        Ok(output.stdout.trim_end().to_string())
    }

    /// Run a command whose only interesting outcome is success.
    async fn run_ok(&self, operation: &str, args: &[&str]) -> bool {
        match self.run(args).await {
            Ok(_) => true,
            Err(err) => {
                debug!(operation, %err, "tmux command failed");
                false
            }
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// All sessions on the server. An absent server is an empty list.
    pub async fn list_sessions(&self) -> Vec<SessionRecord> {
        match self.run(&["list-sessions", "-F", SESSION_FORMAT]).await {
            Ok(stdout) => parse_session_list(&stdout),
            Err(TmuxError::NotRunning(_)) => Vec::new(),
            Err(err) => {
                warn!(%err, "failed to list tmux sessions");
                Vec::new()
            }
        }
    }

    pub async fn get_session_info(&self, name: &str) -> Lookup<SessionRecord> {
        let target = session_window_target(name);
        match self
            .run(&["display-message", "-t", &target, "-p", SESSION_FORMAT])
            .await
        {
            Ok(stdout) => match parse_session_line(&stdout) {
                Some(record) => Lookup::Found(record),
                None => Lookup::NotFound,
            },
            Err(err) if err.is_absence() => Lookup::NotFound,
            Err(err) => Lookup::Failed(err),
        }
    }

    /// Existence probe; any failure counts as "does not exist".
    pub async fn session_exists(&self, name: &str) -> bool {
        let target = session_target(name);
        self.run(&["has-session", "-t", &target]).await.is_ok()
    }

    /// Create a session and stamp it with this instance's ownership tags.
    ///
    /// Returns false on a name conflict or execution failure. A tagging
    /// failure after successful creation is logged but does not fail the call.
    pub async fn create_session(&self, name: &str, detached: bool) -> bool {
        let mut args = vec!["new-session", "-s", name];
        if detached {
            args.push("-d");
        }
        if let Err(err) = self.run(&args).await {
            match err {
                TmuxError::CreationConflict(_) => debug!(name, %err, "session already exists"),
                _ => warn!(name, %err, "failed to create session"),
            }
            return false;
        }

        let target = session_window_target(name);
        let tagged = self
            .run_ok(
                "tag-managed",
                &["set-option", "-t", &target, MANAGED_OPTION, "true"],
            )
            .await
            && self
                .run_ok(
                    "tag-instance",
                    &["set-option", "-t", &target, INSTANCE_OPTION, self.instance.as_str()],
                )
                .await;
        if !tagged {
            warn!(name, "created session but could not tag ownership");
        }
        info!(name, detached, "created session");
        true
    }

    /// Whether `name` was created by this running instance.
    pub async fn is_owned(&self, name: &str) -> bool {
        let target = session_window_target(name);
        let managed = self
            .run(&["show-options", "-t", &target, "-v", MANAGED_OPTION])
            .await;
        if !matches!(managed.as_deref().map(str::trim), Ok("true")) {
            return false;
        }
        let instance = self
            .run(&["show-options", "-t", &target, "-v", INSTANCE_OPTION])
            .await;
        matches!(instance.as_deref().map(str::trim), Ok(id) if id == self.instance.as_str())
    }

    pub async fn rename_session(&self, old_name: &str, new_name: &str) -> bool {
        let target = session_target(old_name);
        self.run_ok("rename-session", &["rename-session", "-t", &target, new_name])
            .await
    }

    pub async fn kill_session(&self, name: &str) -> bool {
        let target = session_target(name);
        self.run_ok("kill-session", &["kill-session", "-t", &target])
            .await
    }

    /// Point the current tmux client (if any) at `name`.
    pub async fn switch_to(&self, name: &str) -> bool {
        let target = session_target(name);
        self.run_ok("switch-client", &["switch-client", "-t", &target])
            .await
    }

    /// Resize the session's visible geometry.
    ///
    /// Tries the current window, then the active pane, then a client size
    /// override; the first that succeeds wins.
    pub async fn resize_session(&self, name: &str, width: u16, height: u16) -> bool {
        let width = width.to_string();
        let height = height.to_string();
        let size = format!("{width}x{height}");
        let window = session_window_target(name);

        let strategies = vec![
            Strategy::flag("resize-window", async {
                self.run_ok(
                    "resize-window",
                    &["resize-window", "-t", &window, "-x", &width, "-y", &height],
                )
                .await
            }),
            Strategy::flag("resize-pane", async {
                match self.active_pane_id(name).await {
                    Some(pane) => {
                        self.run_ok(
                            "resize-pane",
                            &["resize-pane", "-t", &pane, "-x", &width, "-y", &height],
                        )
                        .await
                    }
                    None => false,
                }
            }),
            Strategy::flag("refresh-client", async {
                match self.attached_client(name).await {
                    Some(client) => {
                        self.run_ok(
                            "refresh-client",
                            &["refresh-client", "-t", &client, "-C", &size],
                        )
                        .await
                    }
                    None => false,
                }
            }),
        ];
        first_success("resize", strategies).await.is_success()
    }

    /// tty of the first client attached to `name`; `refresh-client -t`
    /// wants a client, not a session.
    async fn attached_client(&self, name: &str) -> Option<String> {
        let target = session_window_target(name);
        let stdout = self
            .run(&["list-clients", "-t", &target, "-F", "#{client_tty}"])
            .await
            .ok()?;
        stdout
            .lines()
            .map(str::trim)
            .find(|tty| !tty.is_empty())
            .map(str::to_string)
    }

    // =========================================================================
    // Input delivery
    // =========================================================================

    /// Send symbolic key tokens (`Enter`, `C-c`, `M-x`, ...).
    pub async fn send_keys(&self, target: &str, keys: &[&str]) -> bool {
        if keys.is_empty() {
            return true;
        }
        let mut args = vec!["send-keys", "-t", target];
        args.extend_from_slice(keys);
        self.run_ok("send-keys", &args).await
    }

    /// Send literal text, bypassing tmux's key-name interpretation.
    pub async fn send_text(&self, target: &str, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }
        self.run_ok("send-text", &["send-keys", "-t", target, "-l", text])
            .await
    }

    // =========================================================================
    // Panes
    // =========================================================================

    /// Active pane of the session's current window, else its first pane.
    pub async fn active_pane_id(&self, session: &str) -> Option<String> {
        let target = session_window_target(session);
        match self
            .run(&["list-panes", "-t", &target, "-F", "#{pane_active}:#{pane_id}"])
            .await
        {
            Ok(stdout) => parse_active_pane(&stdout),
            Err(err) => {
                debug!(session, %err, "could not list panes");
                None
            }
        }
    }

    /// Plain-text capture of the last `lines` lines of scrollback plus the
    /// visible screen.
    pub async fn capture_pane(&self, target: &str, lines: usize) -> Result<String, TmuxError> {
        let start = format!("-{lines}");
        self.run(&["capture-pane", "-p", "-t", target, "-S", &start])
            .await
    }

    pub async fn pane_pid(&self, target: &str) -> Option<i32> {
        let stdout = self
            .run(&["display-message", "-p", "-t", target, "#{pane_pid}"])
            .await
            .ok()?;
        stdout.trim().parse().ok()
    }

    pub async fn pane_tty(&self, target: &str) -> Option<PathBuf> {
        let stdout = self
            .run(&["display-message", "-p", "-t", target, "#{pane_tty}"])
            .await
            .ok()?;
        let path = stdout.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Signal the process group of the pane's top-level process.
    pub async fn send_signal_to_pane(&self, target: &str, signal: Signal) -> bool {
        let Some(pid) = self.pane_pid(target).await else {
            return false;
        };
        match signal_group_of(pid, signal) {
            Ok(pgid) => {
                debug!(target, %pgid, ?signal, "signalled pane process group");
                true
            }
            Err(err) => {
                debug!(target, pid, %err, "pane process group signal failed");
                false
            }
        }
    }

    /// Signal whatever process group currently owns the pane terminal's
    /// foreground, which may be a child of the pane's shell.
    ///
    /// Asks the tty first, then `/proc` for the pane process's `tpgid`.
    pub async fn send_signal_to_foreground(&self, target: &str, signal: Signal) -> bool {
        let Some(pgid) = self.pane_foreground_group(target).await else {
            return false;
        };
        match signal_group(pgid, signal) {
            Ok(()) => {
                debug!(target, %pgid, ?signal, "signalled foreground process group");
                true
            }
            Err(err) => {
                debug!(target, %pgid, %err, "foreground signal failed");
                false
            }
        }
    }

    async fn pane_foreground_group(&self, target: &str) -> Option<Pid> {
        if let Some(tty) = self.pane_tty(target).await {
            match foreground_group(&tty) {
                Ok(Some(pgid)) => return Some(pgid),
                Ok(None) => {}
                Err(err) => debug!(target, tty = %tty.display(), %err, "tcgetpgrp failed"),
            }
        }
        let pid = self.pane_pid(target).await?;
        match foreground_group_from_proc(pid) {
            Ok(pgid) => pgid,
            Err(err) => {
                debug!(target, pid, %err, "no foreground group in /proc");
                None
            }
        }
    }

    // =========================================================================
    // Server
    // =========================================================================

    pub async fn is_running(&self) -> bool {
        self.run(&["list-sessions"]).await.is_ok()
    }

    /// tmux version string, e.g. `3.3a`.
    pub async fn version(&self) -> Result<String, TmuxError> {
        self.run(&["-V"])
            .await
            .map(|stdout| parse_version(&stdout))
            .map_err(|err| TmuxError::Diagnostic(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::runner::{CommandOutput, ScriptedRunner};

    fn client_with(runner: ScriptedRunner) -> (TmuxClient, Arc<ScriptedRunner>) {
        let runner = Arc::new(runner);
        let client = TmuxClient::with_runner(
            TmuxSettings::default(),
            InstanceId::new("abcd1234"),
            runner.clone(),
        );
        (client, runner)
    }

    #[tokio::test]
    async fn list_sessions_is_empty_when_server_not_running() {
        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("no server running on /tmp/tmux-1000/default"))
        }));
        assert!(client.list_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn list_sessions_skips_malformed_lines() {
        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::ok("a:1700000000:0:1:@1:$0\nbroken:1\n"))
        }));
        let sessions = client.list_sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].name, "a");
    }

    #[tokio::test]
    async fn socket_name_is_prepended_to_every_command() {
        let runner = Arc::new(ScriptedRunner::succeeding());
        let settings = TmuxSettings {
            socket: Some("private".to_string()),
            ..TmuxSettings::default()
        };
        let client = TmuxClient::with_runner(settings, InstanceId::new("x"), runner.clone());
        assert_eq!(
            client.command_args(&["has-session"]),
            vec!["-L".to_string(), "private".to_string(), "has-session".to_string()]
        );
    }

    #[tokio::test]
    async fn get_session_info_maps_not_found_to_lookup() {
        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("can't find session: ghost"))
        }));
        assert_eq!(client.get_session_info("ghost").await, Lookup::NotFound);

        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("server exited unexpectedly"))
        }));
        assert!(matches!(
            client.get_session_info("ghost").await,
            Lookup::Failed(TmuxError::CommandFailed(_))
        ));

        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::ok("ghost:1700000000:1:2:@3:$9"))
        }));
        let record = client.get_session_info("ghost").await.found().unwrap();
        assert_eq!(record.session_id, "$9");
    }

    #[tokio::test]
    async fn create_session_tags_ownership() {
        let (client, runner) = client_with(ScriptedRunner::succeeding());
        assert!(client.create_session("work", true).await);

        let calls = runner.calls();
        assert_eq!(calls[0], vec!["new-session", "-s", "work", "-d"]);
        assert_eq!(
            calls[1],
            vec!["set-option", "-t", "=work:", MANAGED_OPTION, "true"]
        );
        assert_eq!(
            calls[2],
            vec!["set-option", "-t", "=work:", INSTANCE_OPTION, "abcd1234"]
        );
    }

    #[tokio::test]
    async fn create_session_reports_conflict_as_false() {
        let (client, runner) = client_with(ScriptedRunner::new(|args| {
            if args[0] == "new-session" {
                Ok(CommandOutput::failed("duplicate session: work"))
            } else {
                Ok(CommandOutput::ok(""))
            }
        }));
        assert!(!client.create_session("work", true).await);
        assert!(runner.calls_to("set-option").is_empty());
    }

    #[tokio::test]
    async fn is_owned_requires_matching_instance() {
        let (client, _) = client_with(ScriptedRunner::new(|args| {
            let value = if args.last().map(String::as_str) == Some(MANAGED_OPTION) {
                "true"
            } else {
                "abcd1234"
            };
            Ok(CommandOutput::ok(format!("{value}\n")))
        }));
        assert!(client.is_owned("work").await);

        let (client, _) = client_with(ScriptedRunner::new(|args| {
            let value = if args.last().map(String::as_str) == Some(MANAGED_OPTION) {
                "true"
            } else {
                "someone-else"
            };
            Ok(CommandOutput::ok(value))
        }));
        assert!(!client.is_owned("work").await);

        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("invalid option: @muxdeck-managed"))
        }));
        assert!(!client.is_owned("work").await);
    }

    #[tokio::test]
    async fn recoverable_failures_become_false() {
        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("can't find session: gone"))
        }));
        assert!(!client.kill_session("gone").await);
        assert!(!client.rename_session("gone", "new").await);
        assert!(!client.switch_to("gone").await);
        assert!(!client.session_exists("gone").await);

        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Err(TmuxError::TimedOut(std::time::Duration::from_secs(5)))
        }));
        assert!(!client.kill_session("slow").await);
    }

    #[tokio::test]
    async fn resize_stops_at_window_when_it_succeeds() {
        let (client, runner) = client_with(ScriptedRunner::succeeding());
        assert!(client.resize_session("work", 120, 40).await);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec!["resize-window", "-t", "=work:", "-x", "120", "-y", "40"]
        );
    }

    #[tokio::test]
    async fn window_scoped_commands_target_the_current_window() {
        let (client, runner) = client_with(ScriptedRunner::new(|args| match args[0].as_str() {
            "display-message" => Ok(CommandOutput::ok("work:1700000000:0:1:@1:$4")),
            "list-panes" => Ok(CommandOutput::ok("1:%2")),
            _ => Ok(CommandOutput::ok("true")),
        }));
        client.get_session_info("work").await;
        client.is_owned("work").await;
        client.active_pane_id("work").await;
        client.kill_session("work").await;

        assert_eq!(runner.calls_to("display-message")[0][2], "=work:");
        assert_eq!(runner.calls_to("show-options")[0][2], "=work:");
        assert_eq!(runner.calls_to("list-panes")[0][2], "=work:");
        assert_eq!(runner.calls_to("kill-session")[0][2], "=work");
    }

    #[tokio::test]
    async fn resize_falls_back_to_pane_then_client() {
        let (client, runner) = client_with(ScriptedRunner::new(|args| match args[0].as_str() {
            "resize-window" => Ok(CommandOutput::failed("no current window")),
            "list-panes" => Ok(CommandOutput::ok("1:%4")),
            "resize-pane" => Ok(CommandOutput::ok("")),
            _ => Ok(CommandOutput::failed("unexpected")),
        }));
        assert!(client.resize_session("work", 100, 30).await);
        assert_eq!(
            runner.calls_to("resize-pane")[0],
            vec!["resize-pane", "-t", "%4", "-x", "100", "-y", "30"]
        );
        assert!(runner.calls_to("refresh-client").is_empty());

        let (client, runner) = client_with(ScriptedRunner::new(|args| match args[0].as_str() {
            "list-clients" => Ok(CommandOutput::ok("/dev/pts/4\n/dev/pts/9\n")),
            "refresh-client" => Ok(CommandOutput::ok("")),
            _ => Ok(CommandOutput::failed("nope")),
        }));
        assert!(client.resize_session("work", 100, 30).await);
        assert_eq!(
            runner.calls_to("list-clients")[0],
            vec!["list-clients", "-t", "=work:", "-F", "#{client_tty}"]
        );
        assert_eq!(
            runner.calls_to("refresh-client")[0],
            vec!["refresh-client", "-t", "/dev/pts/4", "-C", "100x30"]
        );

        let (client, runner) = client_with(ScriptedRunner::new(|args| match args[0].as_str() {
            "list-clients" => Ok(CommandOutput::ok("")),
            "refresh-client" => Ok(CommandOutput::ok("")),
            _ => Ok(CommandOutput::failed("nope")),
        }));
        assert!(!client.resize_session("work", 100, 30).await);
        assert!(runner.calls_to("refresh-client").is_empty());

        let (client, _) = client_with(ScriptedRunner::new(|_| Ok(CommandOutput::failed("nope"))));
        assert!(!client.resize_session("work", 100, 30).await);
    }

    #[tokio::test]
    async fn send_text_uses_literal_flag_and_skips_empty_text() {
        let (client, runner) = client_with(ScriptedRunner::succeeding());
        assert!(client.send_text("%1", "").await);
        assert!(runner.calls().is_empty());

        assert!(client.send_text("%1", "ls -la").await);
        assert!(client.send_keys("%1", &["Enter"]).await);
        assert_eq!(
            runner.calls(),
            vec![
                vec!["send-keys", "-t", "%1", "-l", "ls -la"],
                vec!["send-keys", "-t", "%1", "Enter"],
            ]
        );
    }

    #[tokio::test]
    async fn active_pane_is_none_when_listing_fails() {
        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("can't find session: x"))
        }));
        assert_eq!(client.active_pane_id("x").await, None);
    }

    #[tokio::test]
    async fn pane_metadata_probes_parse_output() {
        let (client, _) = client_with(ScriptedRunner::new(|args| {
            let format = args.last().cloned().unwrap_or_default();
            if format == "#{pane_pid}" {
                Ok(CommandOutput::ok("4242\n"))
            } else {
                Ok(CommandOutput::ok("/dev/pts/7\n"))
            }
        }));
        assert_eq!(client.pane_pid("%1").await, Some(4242));
        assert_eq!(client.pane_tty("%1").await, Some(PathBuf::from("/dev/pts/7")));
    }

    #[tokio::test]
    async fn signal_delivery_fails_cleanly_without_pane_metadata() {
        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Ok(CommandOutput::failed("can't find pane: %99"))
        }));
        assert!(!client.send_signal_to_pane("%99", Signal::SIGINT).await);
        assert!(!client.send_signal_to_foreground("%99", Signal::SIGINT).await);
    }

    #[tokio::test]
    async fn foreground_lookup_falls_back_to_the_pane_process() {
        let (client, runner) = client_with(ScriptedRunner::new(|args| {
            match args.last().map(String::as_str) {
                Some("#{pane_tty}") => Ok(CommandOutput::ok("/dev/muxdeck-no-such-tty")),
                Some("#{pane_pid}") => Ok(CommandOutput::ok(i32::MAX.to_string())),
                _ => Ok(CommandOutput::failed("unexpected")),
            }
        }));
        assert!(!client.send_signal_to_foreground("%1", Signal::SIGINT).await);

        let formats: Vec<String> = runner
            .calls_to("display-message")
            .into_iter()
            .filter_map(|call| call.last().cloned())
            .collect();
        assert_eq!(formats, ["#{pane_tty}", "#{pane_pid}"]);
    }

    #[tokio::test]
    async fn version_parses_or_raises_diagnostic() {
        let (client, _) = client_with(ScriptedRunner::new(|_| Ok(CommandOutput::ok("tmux 3.4\n"))));
        assert_eq!(client.version().await.unwrap(), "3.4");

        let (client, _) = client_with(ScriptedRunner::new(|_| {
            Err(TmuxError::NotRunning("tmux command not found".into()))
        }));
        assert!(matches!(client.version().await, Err(TmuxError::Diagnostic(_))));
    }
}
