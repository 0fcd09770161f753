use std::io;
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use crate::pane::PaneId;
use crate::tui::SignalEvent;

/// Everything the split view loop reacts to. Producers only ever send owned
/// values; the loop is the single consumer.
#[derive(Debug, Clone)]
pub enum Event {
    Input(crossterm::event::Event),
    /// The pane's reader has new output (or reached EOF).
    PaneOutput(PaneId),
    Signal(SignalEvent),
    /// Operator input stream failed; nothing more will arrive.
    InputClosed,
}

impl From<SignalEvent> for Event {
    fn from(event: SignalEvent) -> Self {
        Event::Signal(event)
    }
}

/// Block on crossterm's reader and forward every event.
pub fn spawn_input_reader(tx: Sender<Event>) -> io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("splitview-input".to_string())
        .spawn(move || loop {
            match crossterm::event::read() {
                Ok(event) => {
                    if tx.send(Event::Input(event)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "terminal input failed");
                    let _ = tx.send(Event::InputClosed);
                    return;
                }
            }
        })
}

/// Reader callback handed to each pane: wake the loop, stop once it is gone.
pub fn pane_notifier(tx: Sender<Event>) -> impl Fn(PaneId) -> bool + Send + 'static {
    move |id| tx.send(Event::PaneOutput(id)).is_ok()
}
