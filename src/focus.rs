//! Which pane receives keystrokes, and the prefix chord that reaches the
//! multiplexer instead of a child.
//!
//! The machine never touches the terminal or a pty. It turns keys into
//! [`FocusAction`]s that the split view executes, and takes the current time
//! as a parameter so chord timeouts can be driven from tests.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::layout::ResizeDirection;
use crate::pane::PaneId;
use crate::tui::keys::Key;

/// Ctrl+B, the chord prefix.
pub fn prefix_key() -> Key {
    Key::ctrl(KeyCode::Char('b'))
}

pub fn exit_key() -> Key {
    Key::ctrl(KeyCode::Char('d'))
}

pub fn interrupt_key() -> Key {
    Key::ctrl(KeyCode::Char('c'))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    Focused(PaneId),
    AwaitingChord { origin: PaneId, deadline: Instant },
}

/// Snapshot of the focus state for rendering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusState {
    pub active_pane_id: PaneId,
    pub chord_pending: bool,
    pub chord_deadline: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusAction {
    Forward { pane: PaneId, key: KeyEvent },
    Paste { pane: PaneId, text: String },
    SwitchFocus { from: PaneId, to: PaneId },
    Resize(ResizeDirection),
    ClosePane(PaneId),
}

/// Multiplexer command bound to the key that follows the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordCommand {
    SwitchFocus,
    Resize(ResizeDirection),
}

impl ChordCommand {
    pub fn lookup(event: &KeyEvent) -> Option<ChordCommand> {
        let plain = !event
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        if !plain {
            return None;
        }
        match event.code {
            KeyCode::Right => Some(ChordCommand::SwitchFocus),
            KeyCode::Char('<') => Some(ChordCommand::Resize(ResizeDirection::Shrink)),
            KeyCode::Char('>') => Some(ChordCommand::Resize(ResizeDirection::Grow)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct FocusManager {
    mode: FocusMode,
    available: [bool; 2],
    chord_timeout: Duration,
}

impl FocusManager {
    pub fn new(initial: PaneId, chord_timeout: Duration) -> Self {
        Self {
            mode: FocusMode::Focused(initial),
            available: [true; 2],
            chord_timeout,
        }
    }

    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    pub fn active(&self) -> PaneId {
        match self.mode {
            FocusMode::Focused(pane) => pane,
            FocusMode::AwaitingChord { origin, .. } => origin,
        }
    }

    pub fn state(&self) -> FocusState {
        let (chord_pending, chord_deadline) = match self.mode {
            FocusMode::Focused(_) => (false, None),
            FocusMode::AwaitingChord { deadline, .. } => (true, Some(deadline)),
        };
        FocusState {
            active_pane_id: self.active(),
            chord_pending,
            chord_deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.state().chord_deadline
    }

    pub fn is_available(&self, pane: PaneId) -> bool {
        self.available[pane.index()]
    }

    pub fn set_active(&mut self, pane: PaneId) {
        self.mode = FocusMode::Focused(pane);
    }

    /// Forget a closed pane. Returns the pane that is active afterwards.
    pub fn pane_closed(&mut self, pane: PaneId) -> PaneId {
        self.available[pane.index()] = false;
        let active = self.active();
        if active == pane && self.is_available(pane.other()) {
            self.mode = FocusMode::Focused(pane.other());
        } else {
            self.mode = FocusMode::Focused(active);
        }
        self.active()
    }

    /// Expire a pending chord. The swallowed prefix is replayed to the pane
    /// that was active when the chord began.
    pub fn poll(&mut self, now: Instant) -> Option<FocusAction> {
        match self.mode {
            FocusMode::AwaitingChord { origin, deadline } if now >= deadline => {
                self.mode = FocusMode::Focused(origin);
                tracing::debug!(pane = ?origin, "chord timed out, replaying prefix");
                Some(FocusAction::Forward {
                    pane: origin,
                    key: prefix_key().event(),
                })
            }
            _ => None,
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) -> Vec<FocusAction> {
        let mut actions = Vec::new();
        actions.extend(self.poll(now));

        let key = Key::from(event);
        match self.mode {
            FocusMode::Focused(active) => {
                actions.extend(self.handle_focused(active, event, key, now));
            }
            FocusMode::AwaitingChord { origin, .. } => {
                if key == exit_key() || key == interrupt_key() {
                    // Never part of a chord: settle the prefix, then handle normally.
                    self.mode = FocusMode::Focused(origin);
                    actions.push(FocusAction::Forward {
                        pane: origin,
                        key: prefix_key().event(),
                    });
                    actions.extend(self.handle_focused(origin, event, key, now));
                } else {
                    actions.extend(self.handle_chord(origin, &event));
                }
            }
        }
        actions
    }

    pub fn handle_paste(&mut self, text: String, now: Instant) -> Vec<FocusAction> {
        let mut actions = Vec::new();
        actions.extend(self.poll(now));
        match self.mode {
            FocusMode::Focused(active) => actions.push(FocusAction::Paste { pane: active, text }),
            FocusMode::AwaitingChord { origin, .. } => {
                tracing::debug!(pane = ?origin, "paste during chord swallowed");
                self.mode = FocusMode::Focused(origin);
            }
        }
        actions
    }

    fn handle_focused(
        &mut self,
        active: PaneId,
        event: KeyEvent,
        key: Key,
        now: Instant,
    ) -> Option<FocusAction> {
        if key == prefix_key() {
            self.mode = FocusMode::AwaitingChord {
                origin: active,
                deadline: now + self.chord_timeout,
            };
            return None;
        }
        if key == exit_key() {
            return Some(FocusAction::ClosePane(active));
        }
        Some(FocusAction::Forward { pane: active, key: event })
    }

    fn handle_chord(&mut self, origin: PaneId, event: &KeyEvent) -> Option<FocusAction> {
        self.mode = FocusMode::Focused(origin);
        match ChordCommand::lookup(event) {
            Some(ChordCommand::SwitchFocus) => {
                let target = origin.other();
                if !self.is_available(target) {
                    return None;
                }
                self.mode = FocusMode::Focused(target);
                Some(FocusAction::SwitchFocus {
                    from: origin,
                    to: target,
                })
            }
            Some(ChordCommand::Resize(direction)) => Some(FocusAction::Resize(direction)),
            None => {
                tracing::debug!(code = ?event.code, "unbound chord swallowed");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/focus.rs"]
mod tests;
