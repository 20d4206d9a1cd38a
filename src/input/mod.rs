//! Input handling: key translation, paste planning and mouse mapping.
//!
//! Everything here is pure. The terminal controller executes the results
//! against tmux.

pub mod mouse;
pub mod paste;
pub mod translator;

pub use mouse::{mouse_action, MouseAction, SCROLL_LINES};
pub use paste::{paste_plan, PasteStep, PASTE_CHUNK_CHARS};
pub use translator::{decode_control_byte, translate, Disposition, KeyInput};
