use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait TerminalOps: Send + Sync + 'static {
    fn setup(&self) -> io::Result<()>;
    fn restore(&self) -> io::Result<()>;
}

/// Raw mode, alternate screen, bracketed paste, hidden cursor.
#[derive(Debug, Default)]
pub struct CrosstermTerminalOps;

impl TerminalOps for CrosstermTerminalOps {
    fn setup(&self) -> io::Result<()> {
        use crossterm::{
            cursor,
            event::EnableBracketedPaste,
            execute,
            terminal::{enable_raw_mode, Clear, ClearType, EnterAlternateScreen},
        };

        enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableBracketedPaste,
            Clear(ClearType::All),
            cursor::Hide
        )?;
        Ok(())
    }

    fn restore(&self) -> io::Result<()> {
        use crossterm::{
            cursor,
            event::DisableBracketedPaste,
            execute, style,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
        };

        // Best-effort restore: try all steps even if one fails.
        let mut first_err: Option<io::Error> = None;

        if let Err(err) = execute!(
            io::stdout(),
            style::ResetColor,
            DisableBracketedPaste,
            cursor::Show,
            LeaveAlternateScreen
        ) {
            first_err.get_or_insert(err);
        }
        if let Err(err) = disable_raw_mode() {
            first_err.get_or_insert(err);
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct TerminalRestorer {
    restored: Arc<AtomicBool>,
    ops: Arc<dyn TerminalOps>,
}

impl TerminalRestorer {
    pub fn restore(&self) -> io::Result<()> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ops.restore()
    }

    pub fn is_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }
}

pub struct TerminalGuard {
    restorer: TerminalRestorer,
}

impl TerminalGuard {
    pub fn new() -> io::Result<Self> {
        Self::with_ops(Arc::new(CrosstermTerminalOps))
    }

    pub fn with_ops(ops: Arc<dyn TerminalOps>) -> io::Result<Self> {
        if let Err(err) = ops.setup() {
            // Partial setup (raw mode on, screen switch failed) still needs undoing.
            let _ = ops.restore();
            return Err(err);
        }
        Ok(Self {
            restorer: TerminalRestorer {
                restored: Arc::new(AtomicBool::new(false)),
                ops,
            },
        })
    }

    pub fn restorer(&self) -> TerminalRestorer {
        self.restorer.clone()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restorer.restore();
    }
}

/// Restore the terminal before the default panic message is printed, so the
/// message lands on the normal screen.
pub fn install_panic_hook(restorer: TerminalRestorer) {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restorer.restore();
        previous(panic_info);
    }));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
    SigHup,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
            TerminationSignal::SigHup => 129,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// SIGWINCH: the controlling terminal changed size.
    Resize,
    Terminate(TerminationSignal),
}

/// Forward signals as events. Nothing is done in signal context: the
/// iterator thread only sends. Termination arms a grace period after which
/// the terminal is restored and the process exits even if the main loop is
/// wedged.
#[cfg(unix)]
pub fn install_signal_handlers<T>(
    restorer: TerminalRestorer,
    tx: std::sync::mpsc::Sender<T>,
) -> io::Result<std::thread::JoinHandle<()>>
where
    T: From<SignalEvent> + Send + 'static,
{
    use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGWINCH};
    use signal_hook::iterator::Signals;
    use std::time::Duration;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGWINCH])?;
    std::thread::Builder::new()
        .name("splitview-signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                let signal = match sig {
                    SIGWINCH => {
                        if tx.send(T::from(SignalEvent::Resize)).is_err() {
                            return;
                        }
                        continue;
                    }
                    SIGINT => TerminationSignal::SigInt,
                    SIGTERM => TerminationSignal::SigTerm,
                    SIGHUP => TerminationSignal::SigHup,
                    _ => continue,
                };

                tracing::info!(signal = ?signal, "termination signal received");
                let _ = tx.send(T::from(SignalEvent::Terminate(signal)));

                // Grace period: if the main loop is wedged, restore + hard-exit.
                std::thread::sleep(Duration::from_secs(2));
                let _ = restorer.restore();
                std::process::exit(signal.exit_code());
            }
        })
}

#[cfg(test)]
#[path = "../../tests/unit/tui/terminal_guard.rs"]
mod tests;
