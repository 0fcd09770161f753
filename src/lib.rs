//! splitview - run an assistant CLI and a dashboard side by side in one terminal.
//!
//! 模块结构：
//! - tui: terminal control codes, key encoding, raw-mode/alternate-screen guard
//! - pane: one child program on its own pty
//! - layout: terminal size + ratio -> pane bounds
//! - focus: active pane and prefix chord state machine
//! - split_view: the event loop that owns the terminal
//! - shortcuts: key binding reference
//! - config: settings file and resolved configuration

pub mod config;
pub mod focus;
pub mod layout;
pub mod pane;
pub mod shortcuts;
pub mod split_view;
pub mod tui;
