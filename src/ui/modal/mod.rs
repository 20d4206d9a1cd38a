//! Modal dialog components for the TUI.

pub mod confirm;
pub mod copy_view;
pub mod text_input;

pub use confirm::{ConfirmModal, ConfirmResult, ConfirmState};
pub use copy_view::{CopyViewAction, CopyViewModal, CopyViewState};
pub use text_input::{PromptResult, TextInputModal, TextInputState};
