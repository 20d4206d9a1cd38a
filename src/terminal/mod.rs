//! The attached terminal: capture, viewport and input dispatch for one
//! tmux session at a time.

use tracing::{debug, info};

use crate::capture::{strip_ansi, CaptureSettings, CaptureState, FrameReceiver, Viewport};
use crate::clipboard::Clipboard;
use crate::fallback::{first_success, Strategy};
use crate::input::{paste_plan, translate, Disposition, KeyInput, PasteStep};
use crate::session::{ActiveTarget, SessionRecord};
use crate::tmux::{Signal, TmuxClient};

/// Result of routing a key press to the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Delivered (or attempted) to the session.
    Consumed,
    /// Not for the terminal; the caller decides.
    Unhandled,
    /// Scrollback captured for the copy view.
    CopyView(String),
    Copied,
    CopyFailed,
}

pub struct TerminalController {
    client: TmuxClient,
    clipboard: Clipboard,
    settings: CaptureSettings,
    capture: CaptureState,
    frames: Option<FrameReceiver>,
    attached: Option<String>,
    frame: String,
    viewport: Viewport,
}

impl TerminalController {
    pub fn new(client: TmuxClient, clipboard: Clipboard, settings: CaptureSettings) -> Self {
        Self {
            client,
            clipboard,
            settings,
            capture: CaptureState::Idle,
            frames: None,
            attached: None,
            frame: String::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn client(&self) -> &TmuxClient {
        &self.client
    }

    /// Name of the attached session, if any.
    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    /// Start showing `record`. Re-attaching to the current session is a no-op.
    pub async fn attach(&mut self, record: &SessionRecord) {
        if self.attached.as_deref() == Some(record.name.as_str()) {
            return;
        }
        self.reset_view();
        let frames = self
            .capture
            .start(self.client.clone(), &record.name, self.settings)
            .await;
        self.frames = Some(frames);
        self.attached = Some(record.name.clone());
        info!(session = %record.name, "attached");
    }

    /// Stop capturing and clear the view.
    pub async fn detach(&mut self) {
        self.capture.stop().await;
        self.reset_view();
        if let Some(name) = self.attached.take() {
            info!(session = %name, "detached");
        }
    }

    fn reset_view(&mut self) {
        self.frames = None;
        self.frame.clear();
        self.viewport.clear();
    }

    /// Re-resolve where input goes; panes change over a session's lifetime.
    async fn target(&self) -> Option<String> {
        let session = self.attached.as_deref()?;
        let pane = self.client.active_pane_id(session).await;
        Some(ActiveTarget::resolve(pane, session).tmux_target())
    }

    /// Type `text` and press Enter.
    pub async fn send_command_line(&mut self, text: &str) -> bool {
        let Some(target) = self.target().await else {
            return false;
        };
        self.viewport.scroll_to_bottom();
        self.client.send_text(&target, text).await && self.client.send_keys(&target, &["Enter"]).await
    }

    /// Interrupt politely: the `C-c` key first, then SIGINT to the
    /// foreground group, then to the pane's own group.
    pub async fn send_ctrl_c(&self) -> bool {
        let Some(target) = self.target().await else {
            return false;
        };
        let client = &self.client;
        let target = target.as_str();
        first_success(
            "interrupt",
            vec![
                Strategy::flag("send-keys", client.send_keys(target, &["C-c"])),
                Strategy::flag(
                    "foreground-signal",
                    client.send_signal_to_foreground(target, Signal::SIGINT),
                ),
                Strategy::flag("pane-signal", client.send_signal_to_pane(target, Signal::SIGINT)),
            ],
        )
        .await
        .is_success()
    }

    /// Interrupt forcefully: signals first, the key only as a last resort
    /// when `key_fallback` is set.
    pub async fn force_interrupt(&self, key_fallback: bool) -> bool {
        let Some(target) = self.target().await else {
            return false;
        };
        let client = &self.client;
        let target = target.as_str();
        let mut strategies = vec![
            Strategy::flag(
                "foreground-signal",
                client.send_signal_to_foreground(target, Signal::SIGINT),
            ),
            Strategy::flag("pane-signal", client.send_signal_to_pane(target, Signal::SIGINT)),
        ];
        if key_fallback {
            strategies.push(Strategy::flag("send-keys", client.send_keys(target, &["C-c"])));
        }
        first_success("force-interrupt", strategies).await.is_success()
    }

    /// Send pasted text line by line.
    pub async fn paste(&mut self, text: &str) -> bool {
        let Some(target) = self.target().await else {
            return false;
        };
        self.viewport.scroll_to_bottom();
        for step in paste_plan(text) {
            let sent = match step {
                PasteStep::Literal(chunk) => self.client.send_text(&target, &chunk).await,
                PasteStep::Key(key) => self.client.send_keys(&target, &[key]).await,
            };
            if !sent {
                debug!("paste aborted");
                return false;
            }
        }
        true
    }

    /// Full scrollback of the active pane, or the last frame if capture fails.
    pub async fn copy_text(&self) -> String {
        if let Some(target) = self.target().await {
            if let Ok(raw) = self
                .client
                .capture_pane(&target, self.settings.scrollback_lines)
                .await
            {
                return strip_ansi(&raw).into_owned();
            }
        }
        self.frame.clone()
    }

    /// Route a key press to the attached session.
    pub async fn handle_key(&mut self, input: &KeyInput) -> KeyOutcome {
        if self.attached.is_none() {
            return KeyOutcome::Unhandled;
        }
        match translate(input) {
            Disposition::Unhandled => KeyOutcome::Unhandled,
            Disposition::Ignored => KeyOutcome::Consumed,
            Disposition::ForceInterrupt { key_fallback } => {
                self.force_interrupt(key_fallback).await;
                KeyOutcome::Consumed
            }
            Disposition::Interrupt => {
                self.send_ctrl_c().await;
                KeyOutcome::Consumed
            }
            Disposition::Copy { manual: true } => KeyOutcome::CopyView(self.copy_text().await),
            Disposition::Copy { manual: false } => {
                let text = self.copy_text().await;
                if self.clipboard.write_text(&text).await {
                    KeyOutcome::Copied
                } else {
                    KeyOutcome::CopyFailed
                }
            }
            Disposition::Paste => {
                if let Some(text) = self.clipboard.read_text().await {
                    self.paste(&text).await;
                }
                KeyOutcome::Consumed
            }
            Disposition::Keys(keys) => {
                if let Some(target) = self.target().await {
                    self.viewport.scroll_to_bottom();
                    let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                    self.client.send_keys(&target, &keys).await;
                }
                KeyOutcome::Consumed
            }
            Disposition::Text(text) => {
                if let Some(target) = self.target().await {
                    self.viewport.scroll_to_bottom();
                    self.client.send_text(&target, &text).await;
                }
                KeyOutcome::Consumed
            }
        }
    }

    /// Write arbitrary text to the clipboard.
    pub async fn copy_to_clipboard(&self, text: &str) -> bool {
        self.clipboard.write_text(text).await
    }

    /// Pull the latest published frame into the viewport. Returns true if
    /// the view changed.
    pub fn sync_frame(&mut self) -> bool {
        let Some(frames) = self.frames.as_mut() else {
            return false;
        };
        if !frames.has_changed().unwrap_or(false) {
            return false;
        }
        let frame = frames.borrow_and_update().clone();
        match frame {
            Some(frame) if Some(frame.session.as_str()) == self.attached.as_deref() => {
                self.viewport.apply(&frame.text);
                self.frame = frame.text;
                true
            }
            _ => false,
        }
    }

    /// Receiver for frame notifications, for waking the UI loop.
    pub fn frames(&self) -> Option<FrameReceiver> {
        self.frames.clone()
    }

    pub fn current_frame(&self) -> &str {
        &self.frame
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_following(&self) -> bool {
        self.viewport.is_following()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.viewport.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.viewport.scroll_down(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom();
    }

    pub fn resize_viewport(&mut self, height: usize) {
        self.viewport.resize(height);
    }

    /// Ask tmux to match the attached session to the pane size.
    pub async fn resize_session(&self, width: u16, height: u16) -> bool {
        match self.attached.as_deref() {
            Some(session) => self.client.resize_session(session, width, height).await,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardCommand;
    use crate::tmux::{CommandOutput, InstanceId, ScriptedRunner, TmuxSettings};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    fn record(name: &str) -> SessionRecord {
        SessionRecord {
            name: name.to_string(),
            created: Utc::now(),
            attached: true,
            window_count: 1,
            current_window: "@1".to_string(),
            session_id: "$1".to_string(),
        }
    }

    fn pane_runner() -> Arc<ScriptedRunner> {
        Arc::new(ScriptedRunner::new(|args| match args[0].as_str() {
            "list-panes" => Ok(CommandOutput::ok("0:%1\n1:%2")),
            "capture-pane" => Ok(CommandOutput::ok("\x1b[1mprompt\x1b[0m $")),
            "display-message" => Ok(CommandOutput::failed("can't find pane")),
            _ => Ok(CommandOutput::ok("")),
        }))
    }

    fn controller(runner: Arc<ScriptedRunner>, clipboard: Clipboard) -> TerminalController {
        let client =
            TmuxClient::with_runner(TmuxSettings::default(), InstanceId::new("t"), runner);
        let settings = CaptureSettings {
            interval: Duration::from_millis(10),
            scrollback_lines: 100,
        };
        TerminalController::new(client, clipboard, settings)
    }

    fn sent_keys(runner: &ScriptedRunner) -> Vec<Vec<String>> {
        runner.calls_to("send-keys")
    }

    #[tokio::test]
    async fn keys_are_unhandled_when_detached() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        assert_eq!(
            terminal.handle_key(&KeyInput::char('a')).await,
            KeyOutcome::Unhandled
        );
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn text_and_keys_go_to_the_active_pane() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        terminal.attach(&record("work")).await;

        assert_eq!(terminal.handle_key(&KeyInput::char('l')).await, KeyOutcome::Consumed);
        assert_eq!(
            terminal.handle_key(&KeyInput::named("enter")).await,
            KeyOutcome::Consumed
        );
        assert_eq!(
            terminal.handle_key(&KeyInput::named("escape")).await,
            KeyOutcome::Unhandled
        );

        assert_eq!(
            terminal.handle_key(&KeyInput::default()).await,
            KeyOutcome::Consumed
        );

        let sends = sent_keys(&runner);
        assert_eq!(sends.len(), 2);
        assert_eq!(sends[0], vec!["send-keys", "-t", "%2", "-l", "l"]);
        assert_eq!(sends[1], vec!["send-keys", "-t", "%2", "Enter"]);
        terminal.detach().await;
    }

    #[tokio::test]
    async fn command_line_is_literal_text_then_enter() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        terminal.attach(&record("work")).await;

        assert!(terminal.send_command_line("git status").await);
        assert_eq!(
            sent_keys(&runner),
            vec![
                vec!["send-keys", "-t", "%2", "-l", "git status"],
                vec!["send-keys", "-t", "%2", "Enter"],
            ]
        );
        terminal.detach().await;
    }

    #[tokio::test]
    async fn ctrl_c_stops_after_the_key_send_succeeds() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        terminal.attach(&record("work")).await;

        assert!(terminal.send_ctrl_c().await);
        assert_eq!(sent_keys(&runner), vec![vec!["send-keys", "-t", "%2", "C-c"]]);
        assert!(runner.calls_to("display-message").is_empty());
        terminal.detach().await;
    }

    #[tokio::test]
    async fn force_interrupt_falls_back_to_the_key_only_when_allowed() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        terminal.attach(&record("work")).await;

        assert!(!terminal.force_interrupt(false).await);
        assert!(sent_keys(&runner).is_empty());
        // tty, /proc via the pane pid, then the pane's own group
        assert_eq!(runner.calls_to("display-message").len(), 3);

        assert!(terminal.force_interrupt(true).await);
        assert_eq!(sent_keys(&runner), vec![vec!["send-keys", "-t", "%2", "C-c"]]);
        terminal.detach().await;
    }

    #[tokio::test]
    async fn paste_sends_lines_with_enter_between() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        terminal.attach(&record("work")).await;

        assert!(terminal.paste("ls\n pwd").await);
        assert_eq!(
            sent_keys(&runner),
            vec![
                vec!["send-keys", "-t", "%2", "-l", "ls"],
                vec!["send-keys", "-t", "%2", "Enter"],
                vec!["send-keys", "-t", "%2", "-l", " pwd"],
            ]
        );
        terminal.detach().await;
    }

    #[tokio::test]
    async fn paste_key_reads_the_clipboard() {
        let runner = pane_runner();
        let clipboard =
            Clipboard::with_commands(Vec::new(), vec![ClipboardCommand::new("printf", &["echo hi"])]);
        let mut terminal = controller(runner.clone(), clipboard);
        terminal.attach(&record("work")).await;

        let outcome = terminal.handle_key(&KeyInput::char('v').ctrl()).await;
        assert_eq!(outcome, KeyOutcome::Consumed);
        assert_eq!(
            sent_keys(&runner),
            vec![vec!["send-keys", "-t", "%2", "-l", "echo hi"]]
        );
        terminal.detach().await;
    }

    #[tokio::test]
    async fn manual_copy_opens_the_copy_view_with_stripped_scrollback() {
        let runner = pane_runner();
        let mut terminal = controller(runner.clone(), Clipboard::disabled());
        terminal.attach(&record("work")).await;

        let outcome = terminal
            .handle_key(&KeyInput::char('Y').meta().shift())
            .await;
        assert_eq!(outcome, KeyOutcome::CopyView("prompt $".to_string()));

        let outcome = terminal.handle_key(&KeyInput::char('y').meta()).await;
        assert_eq!(outcome, KeyOutcome::CopyFailed);
        terminal.detach().await;
    }

    #[tokio::test]
    async fn frames_flow_into_the_viewport() {
        let runner = pane_runner();
        let mut terminal = controller(runner, Clipboard::disabled());
        terminal.resize_viewport(10);
        terminal.attach(&record("work")).await;

        let mut frames = terminal.frames().unwrap();
        tokio::time::timeout(Duration::from_secs(2), frames.wait_for(Option::is_some))
            .await
            .unwrap()
            .unwrap();

        assert!(terminal.sync_frame());
        assert_eq!(terminal.current_frame(), "prompt $");
        assert!(terminal.is_following());
        assert!(!terminal.sync_frame());

        terminal.detach().await;
        assert_eq!(terminal.current_frame(), "");
        assert_eq!(terminal.attached(), None);
    }
}
