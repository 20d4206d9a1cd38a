//! tmux session model: snapshots, the ordered directory, and pins.
//!
//! This module provides:
//! - `SessionRecord` - One session as reported by tmux
//! - `SessionDirectory` - Pinned-first ordering and the selection cursor
//! - `PinStore` - Pinned names persisted under the config directory

pub mod directory;
pub mod pins;
pub mod types;

pub use directory::SessionDirectory;
pub use pins::PinStore;
pub use types::{ActiveTarget, SessionRecord};
