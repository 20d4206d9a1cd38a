use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::session::ActiveTarget;
use crate::tmux::TmuxClient;

use super::ansi::strip_ansi;

pub const DEFAULT_CAPTURE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_SCROLLBACK_LINES: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub interval: Duration,
    pub scrollback_lines: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CAPTURE_INTERVAL,
            scrollback_lines: DEFAULT_SCROLLBACK_LINES,
        }
    }
}

/// Latest plain-text contents of a session's active pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub session: String,
    pub text: String,
    pub captured_at: DateTime<Utc>,
}

pub type FrameReceiver = watch::Receiver<Option<CapturedFrame>>;

/// A running capture task for one session.
#[derive(Debug)]
pub struct CaptureHandle {
    session: String,
    token: CancellationToken,
    join: JoinHandle<()>,
    frames: FrameReceiver,
}

impl CaptureHandle {
    /// Start polling `session`. Must be called inside a tokio runtime.
    pub fn spawn(client: TmuxClient, session: String, settings: CaptureSettings) -> Self {
        let token = CancellationToken::new();
        let (tx, frames) = watch::channel(None);
        let join = tokio::spawn(capture_loop(
            client,
            session.clone(),
            settings,
            token.clone(),
            tx,
        ));
        Self {
            session,
            token,
            join,
            frames,
        }
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn frames(&self) -> FrameReceiver {
        self.frames.clone()
    }

    /// Cancel the task and wait until it has exited.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(err) = self.join.await {
            if !err.is_cancelled() {
                warn!(session = %self.session, %err, "capture task panicked");
            }
        }
    }
}

/// Lifecycle of the capture loop for the attached session.
#[derive(Debug, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing(CaptureHandle),
    /// The previous capture was stopped and nothing replaced it.
    Cancelled,
}

impl CaptureState {
    pub fn session(&self) -> Option<&str> {
        match self {
            CaptureState::Capturing(handle) => Some(handle.session()),
            CaptureState::Idle | CaptureState::Cancelled => None,
        }
    }

    /// Stop any running capture, then start one for `session`.
    ///
    /// The previous task has fully exited before the new one is spawned, so
    /// a late frame from the old session can never reach the new receiver.
    pub async fn start(
        &mut self,
        client: TmuxClient,
        session: &str,
        settings: CaptureSettings,
    ) -> FrameReceiver {
        self.stop().await;
        let handle = CaptureHandle::spawn(client, session.to_string(), settings);
        let frames = handle.frames();
        *self = CaptureState::Capturing(handle);
        frames
    }

    /// Stop the running capture, if any, and wait for it to exit.
    pub async fn stop(&mut self) {
        if let CaptureState::Capturing(handle) = std::mem::replace(self, CaptureState::Cancelled) {
            debug!(session = handle.session(), "stopping capture");
            handle.stop().await;
        }
    }
}

async fn capture_loop(
    client: TmuxClient,
    session: String,
    settings: CaptureSettings,
    token: CancellationToken,
    tx: watch::Sender<Option<CapturedFrame>>,
) {
    debug!(session = %session, "capture started");
    loop {
        let target = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            pane = client.active_pane_id(&session) => ActiveTarget::resolve(pane, &session),
        };

        let target = target.tmux_target();
        let captured = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = client.capture_pane(&target, settings.scrollback_lines) => result,
        };

        match captured {
            Ok(raw) => {
                let text = strip_ansi(&raw).into_owned();
                tx.send_if_modified(|current| {
                    if current.as_ref().is_some_and(|frame| frame.text == text) {
                        return false;
                    }
                    *current = Some(CapturedFrame {
                        session: session.clone(),
                        text,
                        captured_at: Utc::now(),
                    });
                    true
                });
            }
            Err(err) => trace!(session = %session, %err, "capture tick failed"),
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
    debug!(session = %session, "capture stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::{CommandOutput, InstanceId, ScriptedRunner, TmuxSettings};
    use std::sync::Arc;

    fn settings() -> CaptureSettings {
        CaptureSettings {
            interval: Duration::from_millis(10),
            scrollback_lines: 50,
        }
    }

    fn client(runner: Arc<ScriptedRunner>) -> TmuxClient {
        TmuxClient::with_runner(TmuxSettings::default(), InstanceId::new("test"), runner)
    }

    fn pane_runner(screen: &'static str) -> Arc<ScriptedRunner> {
        Arc::new(ScriptedRunner::new(move |args| match args[0].as_str() {
            "list-panes" => Ok(CommandOutput::ok("1:%3")),
            "capture-pane" => Ok(CommandOutput::ok(screen)),
            _ => Ok(CommandOutput::failed("unexpected")),
        }))
    }

    async fn next_frame(frames: &mut FrameReceiver) -> CapturedFrame {
        tokio::time::timeout(Duration::from_secs(2), frames.wait_for(Option::is_some))
            .await
            .expect("frame in time")
            .expect("sender alive")
            .clone()
            .expect("frame present")
    }

    #[tokio::test]
    async fn publishes_stripped_frames_for_the_active_pane() {
        let runner = pane_runner("\x1b[32mok\x1b[0m\n$ ");
        let mut state = CaptureState::Idle;
        let mut frames = state.start(client(runner.clone()), "work", settings()).await;

        let frame = next_frame(&mut frames).await;
        assert_eq!(frame.session, "work");
        assert_eq!(frame.text, "ok\n$");
        assert_eq!(state.session(), Some("work"));

        let capture = &runner.calls_to("capture-pane")[0];
        assert_eq!(capture, &vec!["capture-pane", "-p", "-t", "%3", "-S", "-50"]);
        state.stop().await;
    }

    #[tokio::test]
    async fn falls_back_to_session_target_without_a_pane() {
        let runner = Arc::new(ScriptedRunner::new(|args| match args[0].as_str() {
            "capture-pane" => Ok(CommandOutput::ok("hello")),
            _ => Ok(CommandOutput::failed("can't find session: work")),
        }));
        let mut state = CaptureState::Idle;
        let mut frames = state.start(client(runner.clone()), "work", settings()).await;

        next_frame(&mut frames).await;
        assert_eq!(runner.calls_to("capture-pane")[0][3], "=work:");
        state.stop().await;
    }

    #[tokio::test]
    async fn stop_ends_polling() {
        let runner = pane_runner("x");
        let mut state = CaptureState::Idle;
        let mut frames = state.start(client(runner.clone()), "work", settings()).await;
        next_frame(&mut frames).await;

        state.stop().await;
        assert!(matches!(state, CaptureState::Cancelled));
        let after_stop = runner.calls().len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runner.calls().len(), after_stop);
    }

    #[tokio::test]
    async fn failed_ticks_publish_nothing_and_keep_retrying() {
        let runner = Arc::new(ScriptedRunner::new(|_| Ok(CommandOutput::failed("server exited"))));
        let mut state = CaptureState::Idle;
        let frames = state.start(client(runner.clone()), "work", settings()).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(frames.borrow().is_none());
        assert!(runner.calls_to("capture-pane").len() > 1);
        state.stop().await;
    }

    #[tokio::test]
    async fn switching_sessions_replaces_the_task() {
        let runner = pane_runner("same");
        let mut state = CaptureState::Idle;
        let first = state.start(client(runner.clone()), "one", settings()).await;
        let mut second = state.start(client(runner.clone()), "two", settings()).await;

        assert_eq!(next_frame(&mut second).await.session, "two");
        assert!(first.has_changed().is_err());
        state.stop().await;
    }
}
