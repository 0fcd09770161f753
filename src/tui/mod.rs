//! Terminal integration layer (crossterm + signal-hook).
//!
//! Everything that touches the real terminal lives here: control codes,
//! key encoding for children, and scoped raw-mode/alternate-screen state.

pub mod controller;
pub mod keys;
pub mod terminal_guard;

pub use controller::TerminalController;
pub use terminal_guard::{SignalEvent, TerminalGuard, TerminalRestorer, TerminationSignal};
