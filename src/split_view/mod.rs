//! Split view: two panes, one terminal.
//!
//! `SplitViewManager` is the only writer to the terminal. Pane readers, the
//! keyboard reader and the signal thread all feed one channel; the loop in
//! [`SplitViewManager::run`] consumes it, routes keys through the
//! [`FocusManager`], paints pane screens into their bounds, and relayouts on
//! resize.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::config::SplitViewConfig;
use crate::focus::{FocusAction, FocusManager};
use crate::layout::{self, Layout, PaneBounds, ResizeDirection};
use crate::pane::{locate_executable, Pane, PaneId, ReadOutcome, SpawnError};
use crate::tui::controller::is_unrecoverable;
use crate::tui::keys::{encode_key, is_press};
use crate::tui::{SignalEvent, TerminalController, TerminationSignal};

mod event;
mod render;

pub use event::{pane_notifier, spawn_input_reader, Event};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const IDLE_WAIT: Duration = Duration::from_millis(250);
const MAX_EVENTS_PER_TICK: usize = 512;
const MAX_WRITE_FAILURES: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    PanesClosed,
    Signal(TerminationSignal),
    TerminalLost,
}

impl ExitReason {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitReason::PanesClosed => 0,
            ExitReason::Signal(signal) => signal.exit_code(),
            ExitReason::TerminalLost => 1,
        }
    }
}

#[derive(Debug)]
pub enum SplitViewError {
    Terminal(io::Error),
    NoPanes(SpawnError),
}

impl std::fmt::Display for SplitViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SplitViewError::Terminal(err) => write!(f, "terminal error: {err}"),
            SplitViewError::NoPanes(err) => write!(f, "no pane could be started: {err}"),
        }
    }
}

impl std::error::Error for SplitViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SplitViewError::Terminal(err) => Some(err),
            SplitViewError::NoPanes(err) => Some(err),
        }
    }
}

impl From<io::Error> for SplitViewError {
    fn from(err: io::Error) -> Self {
        SplitViewError::Terminal(err)
    }
}

/// What is on screen right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Split {
        left: PaneBounds,
        right: PaneBounds,
        separator_x: u16,
    },
    Single {
        pane: PaneId,
        bounds: PaneBounds,
    },
    Empty,
}

impl View {
    pub fn bounds_of(&self, id: PaneId) -> Option<PaneBounds> {
        match *self {
            View::Split { left, right, .. } => Some(match id {
                PaneId::Left => left,
                PaneId::Right => right,
            }),
            View::Single { pane, bounds } if pane == id => Some(bounds),
            _ => None,
        }
    }
}

pub struct SplitViewManager<W: Write> {
    config: SplitViewConfig,
    term: TerminalController<W>,
    panes: [Option<Pane>; 2],
    focus: FocusManager,
    split_ratio: f64,
    size: (u16, u16),
    layout: Layout,
    phase: Phase,
    exit: Option<ExitReason>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    dirty: [bool; 2],
    chrome_dirty: bool,
    last_render: Option<Instant>,
    write_failures: u32,
}

impl<W: Write> SplitViewManager<W> {
    pub fn new(config: SplitViewConfig, out: W, size: (u16, u16)) -> Self {
        let (tx, rx) = mpsc::channel();
        let focus = FocusManager::new(PaneId::Left, config.chord_timeout);
        let split_ratio = config.split_ratio;
        let layout = layout::compute_bounds(size.0, size.1, &config);
        Self {
            config,
            term: TerminalController::new(out),
            panes: [None, None],
            focus,
            split_ratio,
            size,
            layout,
            phase: Phase::Starting,
            exit: None,
            tx,
            rx,
            dirty: [false; 2],
            chrome_dirty: true,
            last_render: None,
            write_failures: 0,
        }
    }

    /// Producers (input reader, signal thread) send through clones of this.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn split_ratio(&self) -> f64 {
        self.split_ratio
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes[id.index()].as_ref()
    }

    pub fn terminal(&self) -> &TerminalController<W> {
        &self.term
    }

    fn is_live(&self, id: PaneId) -> bool {
        self.panes[id.index()]
            .as_ref()
            .is_some_and(Pane::is_alive)
    }

    pub fn view(&self) -> View {
        self.presentation([self.is_live(PaneId::Left), self.is_live(PaneId::Right)])
    }

    fn presentation(&self, present: [bool; 2]) -> View {
        let (width, height) = self.size;
        match (present, self.layout) {
            (
                [true, true],
                Layout::Split {
                    left,
                    right,
                    separator_x,
                },
            ) => View::Split {
                left,
                right,
                separator_x,
            },
            ([false, false], _) => View::Empty,
            _ => {
                let active = self.focus.active();
                let pane = if present[active.index()] {
                    active
                } else {
                    active.other()
                };
                View::Single {
                    pane,
                    bounds: layout::single_bounds(width, height),
                }
            }
        }
    }

    /// Spawn the panes and draw the first frame. The terminal is expected to
    /// be in raw mode on the alternate screen already (see `TerminalGuard`).
    ///
    /// The assistant runs on the left, the dashboard on the right. A missing
    /// assistant is reported on screen and the view continues with the
    /// dashboard alone.
    pub fn start(&mut self) -> Result<(), SplitViewError> {
        self.set_phase(Phase::Starting);

        let mut spawn_left = !self.config.single_pane;
        if spawn_left && locate_executable(&self.config.left.program).is_none() {
            let program = self.config.left.program.clone();
            tracing::warn!(program = %program, "assistant executable not found");
            self.show_fallback(&program, "executable not found on PATH");
            spawn_left = false;
        }

        let initial = if spawn_left { PaneId::Left } else { PaneId::Right };
        self.focus = FocusManager::new(initial, self.config.chord_timeout);
        if !spawn_left {
            self.focus.pane_closed(PaneId::Left);
        }

        let view = self.presentation([spawn_left, true]);
        let full = layout::single_bounds(self.size.0, self.size.1);
        let mut last_err = None;

        if spawn_left {
            let bounds = view.bounds_of(PaneId::Left).unwrap_or(full);
            match self.spawn_pane(PaneId::Left, bounds) {
                Ok(pane) => self.panes[0] = Some(pane),
                Err(err) => {
                    tracing::error!(error = %err, "assistant pane failed to start");
                    let program = self.config.left.program.clone();
                    self.show_fallback(&program, &err.to_string());
                    self.focus.pane_closed(PaneId::Left);
                    last_err = Some(err);
                }
            }
        }

        let view = self.view_with_right_pending();
        let bounds = view.bounds_of(PaneId::Right).unwrap_or(full);
        match self.spawn_pane(PaneId::Right, bounds) {
            Ok(pane) => self.panes[1] = Some(pane),
            Err(err) => {
                tracing::error!(error = %err, "dashboard pane failed to start");
                self.focus.pane_closed(PaneId::Right);
                last_err = Some(err);
            }
        }

        if !self.is_live(PaneId::Left) && !self.is_live(PaneId::Right) {
            let err = last_err
                .unwrap_or_else(|| SpawnError::NotFound(self.config.right.program.clone()));
            self.shutdown();
            return Err(SplitViewError::NoPanes(err));
        }

        self.relayout();
        self.render(Instant::now());
        self.set_phase(Phase::Running);
        Ok(())
    }

    fn view_with_right_pending(&self) -> View {
        self.presentation([self.is_live(PaneId::Left), true])
    }

    fn spawn_pane(&self, id: PaneId, bounds: PaneBounds) -> Result<Pane, SpawnError> {
        let command = match id {
            PaneId::Left => &self.config.left,
            PaneId::Right => &self.config.right,
        };
        Pane::spawn(id, command, bounds, pane_notifier(self.tx.clone()))
    }

    fn show_fallback(&mut self, program: &str, reason: &str) {
        if let Err(e) = self.draw_missing_executable(program, reason) {
            tracing::warn!(error = %e, "failed to draw fallback notice");
        }
        if !self.config.fallback_delay.is_zero() {
            std::thread::sleep(self.config.fallback_delay);
        }
    }

    /// Start, loop until something ends the session, then tear down.
    pub fn run(&mut self) -> Result<ExitReason, SplitViewError> {
        self.start()?;
        while self.phase == Phase::Running {
            let wait = self.next_wakeup(Instant::now());
            self.pump(wait);
        }
        self.shutdown();
        Ok(self.exit.unwrap_or(ExitReason::PanesClosed))
    }

    /// Wait up to `wait` for events, handle everything queued, then tick.
    /// Returns whether any event was handled.
    pub fn pump(&mut self, wait: Duration) -> bool {
        let mut handled = false;
        match self.rx.recv_timeout(wait) {
            Ok(event) => {
                handled = true;
                self.handle_event(event, Instant::now());
                let mut drained = 1usize;
                while self.phase == Phase::Running && drained < MAX_EVENTS_PER_TICK {
                    match self.rx.try_recv() {
                        Ok(event) => {
                            drained += 1;
                            self.handle_event(event, Instant::now());
                        }
                        Err(_) => break,
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // We hold a sender ourselves, so this cannot happen while alive.
            Err(RecvTimeoutError::Disconnected) => {}
        }
        self.tick(Instant::now());
        handled
    }

    fn next_wakeup(&self, now: Instant) -> Duration {
        let mut wait = IDLE_WAIT;
        if let Some(deadline) = self.focus.deadline() {
            wait = wait.min(deadline.saturating_duration_since(now));
        }
        if self.needs_render() {
            let due = self
                .last_render
                .map(|at| (at + FRAME_INTERVAL).saturating_duration_since(now))
                .unwrap_or(Duration::ZERO);
            wait = wait.min(due);
        }
        wait
    }

    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::PaneOutput(id) => self.drain_pane(id),
            Event::Input(crossterm::event::Event::Key(key)) => {
                if is_press(&key) {
                    let actions = self.focus.handle_key(key, now);
                    self.apply(actions);
                }
            }
            Event::Input(crossterm::event::Event::Paste(text)) => {
                let actions = self.focus.handle_paste(text, now);
                self.apply(actions);
            }
            Event::Input(crossterm::event::Event::Resize(width, height)) => {
                self.handle_resize(width, height);
            }
            Event::Input(_) => {}
            Event::Signal(SignalEvent::Resize) => match crossterm::terminal::size() {
                Ok((width, height)) => self.handle_resize(width, height),
                Err(e) => tracing::warn!(error = %e, "terminal size query failed"),
            },
            Event::Signal(SignalEvent::Terminate(signal)) => {
                self.begin_shutdown(ExitReason::Signal(signal));
            }
            Event::InputClosed => self.begin_shutdown(ExitReason::TerminalLost),
        }
    }

    /// Expire chords and paint if a frame is due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(action) = self.focus.poll(now) {
            self.apply(vec![action]);
        }
        let due = self
            .last_render
            .map_or(true, |at| now.duration_since(at) >= FRAME_INTERVAL);
        if self.phase == Phase::Running && self.needs_render() && due {
            self.render(now);
        }
    }

    fn drain_pane(&mut self, id: PaneId) {
        let Some(pane) = self.panes[id.index()].as_mut() else {
            return;
        };
        match pane.read() {
            ReadOutcome::Data(_) => self.dirty[id.index()] = true,
            ReadOutcome::Empty => {}
            ReadOutcome::Eof => {
                if self.focus.is_available(id) {
                    tracing::info!(pane = ?id, exit_code = ?pane.exit_code(), "child exited");
                    self.close_pane(id);
                }
            }
        }
    }

    fn apply(&mut self, actions: Vec<FocusAction>) {
        for action in actions {
            match action {
                FocusAction::Forward { pane, key } => {
                    if let Some(target) = self.live_pane_mut(pane) {
                        let bytes = encode_key(&key, target.application_cursor());
                        if bytes.is_empty() {
                            continue;
                        }
                        if let Err(e) = target.write(&bytes) {
                            tracing::warn!(pane = ?pane, error = %e, "forwarding key failed");
                        }
                    }
                }
                FocusAction::Paste { pane, text } => {
                    if let Some(target) = self.live_pane_mut(pane) {
                        let bytes = if target.screen().bracketed_paste() {
                            format!("\x1b[200~{text}\x1b[201~").into_bytes()
                        } else {
                            text.into_bytes()
                        };
                        if let Err(e) = target.write(&bytes) {
                            tracing::warn!(pane = ?pane, error = %e, "paste failed");
                        }
                    }
                }
                FocusAction::SwitchFocus { from, to } => {
                    tracing::debug!(from = ?from, to = ?to, "focus switched");
                    if self.layout.is_degraded() {
                        // The hidden pane takes over the screen.
                        self.relayout();
                    } else {
                        self.chrome_dirty = true;
                    }
                }
                FocusAction::Resize(direction) => self.adjust_split(direction),
                FocusAction::ClosePane(pane) => {
                    tracing::info!(pane = ?pane, "pane closed by operator");
                    self.close_pane(pane);
                }
            }
        }
    }

    fn live_pane_mut(&mut self, id: PaneId) -> Option<&mut Pane> {
        self.panes[id.index()].as_mut().filter(|p| p.is_alive())
    }

    fn adjust_split(&mut self, direction: ResizeDirection) {
        let ratio = layout::adjust_ratio(
            self.split_ratio,
            direction,
            self.config.ratio_step,
            self.size.0,
            self.config.min_pane_width,
        );
        if (ratio - self.split_ratio).abs() < f64::EPSILON {
            return;
        }
        // The clamp is in whole-terminal terms; the last step can still leave
        // a pane one column short once the separator is taken out. Stop at
        // exactly the minimum width instead.
        let (width, height) = self.size;
        let min = self.config.min_pane_width;
        let collapses = |r: f64| layout::split_bounds(width, height, r, min).is_degraded();
        let ratio = if collapses(ratio) && !self.layout.is_degraded() {
            let usable = f64::from(width.saturating_sub(layout::SEPARATOR_WIDTH).max(1));
            let edge = match direction {
                ResizeDirection::Shrink => f64::from(min) / usable,
                ResizeDirection::Grow => (usable - f64::from(min)) / usable,
            };
            if collapses(edge) || (edge - self.split_ratio).abs() < f64::EPSILON {
                tracing::debug!(ratio, "split adjustment would collapse a pane");
                return;
            }
            edge
        } else {
            ratio
        };
        self.split_ratio = ratio;
        self.relayout();
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        if (width, height) == self.size {
            return;
        }
        tracing::debug!(width, height, "terminal resized");
        self.size = (width, height);
        self.relayout();
    }

    /// Recompute the layout from scratch and push new sizes to the panes.
    fn relayout(&mut self) {
        let (width, height) = self.size;
        self.layout =
            layout::split_bounds(width, height, self.split_ratio, self.config.min_pane_width);
        let view = self.view();
        for id in PaneId::ALL {
            let Some(bounds) = view.bounds_of(id) else {
                continue;
            };
            let Some(pane) = self.live_pane_mut(id) else {
                continue;
            };
            if let Err(e) = pane.resize(bounds) {
                tracing::warn!(pane = ?id, error = %e, "pane resize failed");
            }
        }
        self.chrome_dirty = true;
        self.dirty = [true; 2];
    }

    fn close_pane(&mut self, id: PaneId) {
        // Where the pane was last drawn, even if its child already exited.
        let mut shown = [self.is_live(PaneId::Left), self.is_live(PaneId::Right)];
        shown[id.index()] = true;
        let region = self.presentation(shown).bounds_of(id);
        let Some(pane) = self.panes[id.index()].as_mut() else {
            return;
        };
        pane.close();
        self.dirty[id.index()] = false;
        if let Some(region) = region {
            if let Err(e) = self.term.clear_region(region) {
                self.record_write_error(e);
            }
        }

        let active = self.focus.pane_closed(id);
        if !self.is_live(PaneId::Left) && !self.is_live(PaneId::Right) {
            self.begin_shutdown(ExitReason::PanesClosed);
            return;
        }
        tracing::debug!(closed = ?id, active = ?active, "pane removed");
        self.relayout();
    }

    fn needs_render(&self) -> bool {
        self.chrome_dirty || self.dirty.iter().any(|d| *d)
    }

    pub fn render(&mut self, now: Instant) {
        let result = self.render_frame();
        self.last_render = Some(now);
        match result {
            Ok(()) => {
                self.write_failures = 0;
                self.chrome_dirty = false;
                self.dirty = [false; 2];
            }
            Err(e) => self.record_write_error(e),
        }
    }

    fn render_frame(&mut self) -> io::Result<()> {
        if self.chrome_dirty {
            self.draw_chrome()?;
            self.dirty = [true; 2];
        }
        for id in PaneId::ALL {
            if self.dirty[id.index()] {
                self.paint_pane(id)?;
            }
        }
        self.place_cursor()?;
        self.term.flush()
    }

    /// A failed frame is skipped; a dead terminal ends the session.
    fn record_write_error(&mut self, err: io::Error) {
        self.write_failures = self.write_failures.saturating_add(1);
        if is_unrecoverable(&err) || self.write_failures >= MAX_WRITE_FAILURES {
            tracing::error!(error = %err, failures = self.write_failures, "terminal write failed");
            self.begin_shutdown(ExitReason::TerminalLost);
        } else {
            tracing::warn!(error = %err, "terminal write failed, frame skipped");
            self.chrome_dirty = true;
        }
    }

    fn begin_shutdown(&mut self, reason: ExitReason) {
        if matches!(self.phase, Phase::ShuttingDown | Phase::Stopped) {
            return;
        }
        self.exit.get_or_insert(reason);
        self.set_phase(Phase::ShuttingDown);
    }

    /// Close every pane and leave the screen blank. Raw mode, the alternate
    /// screen and the cursor belong to the `TerminalGuard`. Errors are
    /// ignored: there is nothing left to fall back to.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.set_phase(Phase::ShuttingDown);
        for pane in self.panes.iter_mut().flatten() {
            pane.close();
        }
        let _ = self.term.reset_attributes();
        let _ = self.term.clear_screen();
        let _ = self.term.flush();
        self.set_phase(Phase::Stopped);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            tracing::info!(from = ?self.phase, to = ?phase, "split view phase");
        }
        self.phase = phase;
    }
}

impl<W: Write> Drop for SplitViewManager<W> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/split_view.rs"]
mod tests;
