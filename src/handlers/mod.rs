//! Key, mouse and modal event routing.

pub(crate) mod keyboard;
pub(crate) mod modal;
pub(crate) mod mouse;
