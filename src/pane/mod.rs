//! One child program on its own pseudo-terminal.
//!
//! A `Pane` owns the pty master, the child handle, and a screen model
//! (`vt100`) that the child's output is fed into in arrival order. A single
//! reader thread per pane blocks on the pty and hands owned chunks to the
//! pane through a channel; [`Pane::read`] drains that channel without
//! blocking.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::{Duration, Instant};

use portable_pty::{native_pty_system, Child, ChildKiller, CommandBuilder, MasterPty, PtySize};

use crate::config::PaneCommand;
use crate::layout::PaneBounds;

pub mod discovery;

pub use discovery::locate_executable;

const READ_CHUNK: usize = 8 * 1024;
const MAX_DRAIN_BYTES: usize = 256 * 1024;
const CLOSE_GRACE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneId {
    Left,
    Right,
}

impl PaneId {
    pub const ALL: [PaneId; 2] = [PaneId::Left, PaneId::Right];

    pub fn other(self) -> PaneId {
        match self {
            PaneId::Left => PaneId::Right,
            PaneId::Right => PaneId::Left,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PaneId::Left => 0,
            PaneId::Right => 1,
        }
    }
}

#[derive(Debug)]
pub enum SpawnError {
    NotFound(String),
    Pty(String),
    Spawn(String),
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpawnError::NotFound(program) => write!(f, "executable not found: {program}"),
            SpawnError::Pty(msg) => write!(f, "pty allocation failed: {msg}"),
            SpawnError::Spawn(msg) => write!(f, "spawn failed: {msg}"),
        }
    }
}

impl std::error::Error for SpawnError {}

#[derive(Debug)]
pub enum PaneError {
    Io(io::Error),
    Resize(String),
    Closed,
}

impl std::fmt::Display for PaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaneError::Io(err) => write!(f, "pty I/O error: {err}"),
            PaneError::Resize(msg) => write!(f, "pty resize failed: {msg}"),
            PaneError::Closed => write!(f, "pane is closed"),
        }
    }
}

impl std::error::Error for PaneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PaneError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for PaneError {
    fn from(err: io::Error) -> Self {
        PaneError::Io(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Data(Vec<u8>),
    Empty,
    Eof,
}

enum PaneChunk {
    Data(Vec<u8>),
    Eof,
}

pub struct Pane {
    id: PaneId,
    title: String,
    bounds: PaneBounds,
    master: Option<Box<dyn MasterPty + Send>>,
    writer: Option<Box<dyn Write + Send>>,
    child: Option<Box<dyn Child + Send + Sync>>,
    output_rx: Receiver<PaneChunk>,
    screen: vt100::Parser,
    alive: bool,
    eof_pending: bool,
    exit_code: Option<u32>,
}

impl Pane {
    /// Start `command` on a fresh pty sized to `bounds` minus the border.
    ///
    /// `notify` runs on the reader thread after every chunk (and at EOF) so
    /// the owner can wake up and call [`Pane::read`].
    pub fn spawn<F>(
        id: PaneId,
        command: &PaneCommand,
        bounds: PaneBounds,
        notify: F,
    ) -> Result<Self, SpawnError>
    where
        F: Fn(PaneId) -> bool + Send + 'static,
    {
        let program = locate_executable(&command.program)
            .ok_or_else(|| SpawnError::NotFound(command.program.clone()))?;

        let (cols, rows) = bounds.inner_size();
        let pair = native_pty_system()
            .openpty(pty_size(cols, rows))
            .map_err(|e| SpawnError::Pty(e.to_string()))?;

        let mut cmd = CommandBuilder::new(&program);
        cmd.args(&command.args);
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }
        cmd.env("TERM", "xterm-256color");

        let child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| SpawnError::Spawn(format!("{}: {e}", program.display())))?;
        // The child holds the slave now; keeping ours open would hide EOF.
        drop(pair.slave);

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| SpawnError::Pty(format!("failed to clone reader: {e}")))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| SpawnError::Pty(format!("failed to take writer: {e}")))?;

        let (tx, output_rx) = mpsc::channel();
        std::thread::Builder::new()
            .name(format!("pane-{id:?}-reader").to_lowercase())
            .spawn(move || reader_loop(id, reader, tx, notify))
            .map_err(|e| SpawnError::Spawn(format!("failed to start reader: {e}")))?;

        tracing::info!(
            pane = ?id,
            program = %program.display(),
            pid = ?child.process_id(),
            cols,
            rows,
            "pane spawned"
        );

        Ok(Self {
            id,
            title: command.title.clone(),
            bounds,
            master: Some(pair.master),
            writer: Some(writer),
            child: Some(child),
            output_rx,
            screen: vt100::Parser::new(rows, cols, 0),
            alive: true,
            eof_pending: false,
            exit_code: None,
        })
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bounds(&self) -> PaneBounds {
        self.bounds
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    pub fn screen(&self) -> &vt100::Screen {
        self.screen.screen()
    }

    pub fn application_cursor(&self) -> bool {
        self.screen.screen().application_cursor()
    }

    /// Returns `Ok(false)` without touching the pty when nothing changed.
    pub fn resize(&mut self, bounds: PaneBounds) -> Result<bool, PaneError> {
        if bounds == self.bounds {
            return Ok(false);
        }
        self.bounds = bounds;

        let (cols, rows) = bounds.inner_size();
        self.screen.screen_mut().set_size(rows, cols);
        if let Some(master) = self.master.as_ref() {
            master
                .resize(pty_size(cols, rows))
                .map_err(|e| PaneError::Resize(e.to_string()))?;
        }
        tracing::debug!(pane = ?self.id, cols, rows, "pane resized");
        Ok(true)
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), PaneError> {
        if !self.alive {
            return Err(PaneError::Closed);
        }
        let writer = self.writer.as_mut().ok_or(PaneError::Closed)?;
        writer.write_all(bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Drain whatever the child has written since the last call. Never blocks.
    pub fn read(&mut self) -> ReadOutcome {
        if self.eof_pending || !self.alive {
            self.mark_exited();
            return ReadOutcome::Eof;
        }

        let mut data = Vec::new();
        loop {
            if data.len() >= MAX_DRAIN_BYTES {
                break;
            }
            match self.output_rx.try_recv() {
                Ok(PaneChunk::Data(chunk)) => data.extend_from_slice(&chunk),
                Ok(PaneChunk::Eof) | Err(TryRecvError::Disconnected) => {
                    self.eof_pending = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if !data.is_empty() {
            self.screen.process(&data);
            return ReadOutcome::Data(data);
        }
        if self.eof_pending {
            self.mark_exited();
            return ReadOutcome::Eof;
        }
        ReadOutcome::Empty
    }

    fn mark_exited(&mut self) {
        if self.alive {
            tracing::info!(pane = ?self.id, "pane output reached EOF");
        }
        self.alive = false;
        if self.exit_code.is_none() {
            if let Some(child) = self.child.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    self.exit_code = Some(status.exit_code());
                }
            }
        }
    }

    /// Stop the child (SIGHUP, then kill), reap it, and drop the pty.
    /// Safe to call any number of times.
    pub fn close(&mut self) {
        self.alive = false;
        self.writer = None;

        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(status)) => {
                    self.exit_code.get_or_insert(status.exit_code());
                }
                _ => {
                    hangup(child.process_id());
                    let deadline = Instant::now() + CLOSE_GRACE;
                    let mut exited = None;
                    while Instant::now() < deadline {
                        if let Ok(Some(status)) = child.try_wait() {
                            exited = Some(status);
                            break;
                        }
                        std::thread::sleep(Duration::from_millis(10));
                    }
                    let status = match exited {
                        Some(status) => Some(status),
                        None => {
                            if let Err(e) = child.kill() {
                                tracing::debug!(pane = ?self.id, error = %e, "kill failed");
                            }
                            child.wait().ok()
                        }
                    };
                    if let Some(status) = status {
                        self.exit_code.get_or_insert(status.exit_code());
                    }
                }
            }
            tracing::info!(pane = ?self.id, exit_code = ?self.exit_code, "pane closed");
        }

        self.master = None;
    }
}

impl Drop for Pane {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Pane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pane")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("bounds", &self.bounds)
            .field("alive", &self.alive)
            .finish()
    }
}

fn reader_loop<F>(id: PaneId, mut reader: Box<dyn Read + Send>, tx: Sender<PaneChunk>, notify: F)
where
    F: Fn(PaneId) -> bool,
{
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(PaneChunk::Data(buf[..n].to_vec())).is_err() {
                    return;
                }
                if !notify(id) {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            // EIO once the child side is gone.
            Err(e) => {
                tracing::debug!(pane = ?id, error = %e, "pty read ended");
                break;
            }
        }
    }
    let _ = tx.send(PaneChunk::Eof);
    notify(id);
}

fn pty_size(cols: u16, rows: u16) -> PtySize {
    PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}

#[cfg(unix)]
fn hangup(pid: Option<u32>) {
    let Some(pid) = pid.and_then(|p| libc::pid_t::try_from(p).ok()) else {
        return;
    };
    // SAFETY: kill(2) with a pid we spawned; failure only means it is gone.
    unsafe {
        libc::kill(pid, libc::SIGHUP);
    }
}

#[cfg(not(unix))]
fn hangup(_pid: Option<u32>) {}

#[cfg(test)]
#[path = "../../tests/unit/pane/mod.rs"]
mod tests;
