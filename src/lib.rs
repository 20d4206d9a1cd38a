//! muxdeck library crate.
//!
//! - `tmux`: async client for the tmux command-line interface
//! - `input`, `capture`, `terminal`: key translation, live pane capture and
//!   the controller tying them to one attached session
//! - `session`: the ordered, pinnable session list
//! - `app`, `ui`, `event_loop`: the ratatui front end

pub mod app;
pub mod capture;
pub mod clipboard;
pub mod config;
pub mod event_loop;
pub mod fallback;
mod handlers;
pub mod input;
pub mod session;
pub mod terminal;
pub mod tmux;
pub mod ui;
