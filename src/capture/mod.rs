//! Live pane capture: the polling task, its frames, and the scrollable
//! viewport that renders them.

mod ansi;
mod task;
mod viewport;

pub use ansi::strip_ansi;
pub use task::{
    CaptureHandle, CaptureSettings, CaptureState, CapturedFrame, FrameReceiver,
    DEFAULT_CAPTURE_INTERVAL, DEFAULT_SCROLLBACK_LINES,
};
pub use viewport::Viewport;
