use super::*;
use crate::config::PaneCommand;
use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyModifiers};

fn sh(script: &str, title: &str) -> PaneCommand {
    PaneCommand::new("/bin/sh", vec!["-c".to_string(), script.to_string()], title)
}

fn config(left: PaneCommand, right: PaneCommand) -> SplitViewConfig {
    SplitViewConfig {
        left,
        right,
        fallback_delay: Duration::ZERO,
        ..SplitViewConfig::default()
    }
}

fn manager(config: SplitViewConfig, size: (u16, u16)) -> SplitViewManager<Vec<u8>> {
    let mut manager = SplitViewManager::new(config, Vec::new(), size);
    manager.start().unwrap();
    manager
}

fn key(manager: &mut SplitViewManager<Vec<u8>>, code: KeyCode, modifiers: KeyModifiers) {
    let event = Event::Input(TermEvent::Key(KeyEvent::new(code, modifiers)));
    manager.handle_event(event, Instant::now());
}

fn switch_focus(manager: &mut SplitViewManager<Vec<u8>>) {
    key(manager, KeyCode::Char('b'), KeyModifiers::CONTROL);
    key(manager, KeyCode::Right, KeyModifiers::NONE);
}

fn pump_until(
    manager: &mut SplitViewManager<Vec<u8>>,
    done: impl Fn(&SplitViewManager<Vec<u8>>) -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done(manager) {
            return true;
        }
        manager.pump(Duration::from_millis(50));
    }
    done(manager)
}

fn output(manager: &SplitViewManager<Vec<u8>>) -> String {
    String::from_utf8_lossy(manager.terminal().get_ref()).into_owned()
}

fn alive(manager: &SplitViewManager<Vec<u8>>, id: PaneId) -> bool {
    manager.pane(id).is_some_and(Pane::is_alive)
}

#[test]
fn exit_codes_by_reason() {
    assert_eq!(ExitReason::PanesClosed.exit_code(), 0);
    assert_eq!(ExitReason::TerminalLost.exit_code(), 1);
    assert_eq!(ExitReason::Signal(TerminationSignal::SigTerm).exit_code(), 143);
}

#[test]
fn view_bounds_only_for_visible_panes() {
    let bounds = PaneBounds::new(0, 0, 80, 24);
    let view = View::Single {
        pane: PaneId::Right,
        bounds,
    };
    assert_eq!(view.bounds_of(PaneId::Right), Some(bounds));
    assert_eq!(view.bounds_of(PaneId::Left), None);
    assert_eq!(View::Empty.bounds_of(PaneId::Left), None);
}

#[cfg(unix)]
#[test]
fn panes_fill_their_halves() {
    let mut cfg = config(sh("sleep 10", "assistant"), sh("sleep 10", "dashboard"));
    cfg.split_ratio = 0.4;
    cfg.min_pane_width = 20;
    let mut manager = manager(cfg, (82, 24));

    assert_eq!(manager.phase(), Phase::Running);
    assert_eq!(
        manager.view(),
        View::Split {
            left: PaneBounds::new(0, 0, 32, 24),
            right: PaneBounds::new(33, 0, 49, 24),
            separator_x: 32,
        }
    );
    let left = manager.pane(PaneId::Left).unwrap();
    let right = manager.pane(PaneId::Right).unwrap();
    assert_eq!(left.bounds().width + right.bounds().width + 1, 82);
    assert_eq!(left.screen().size(), (22, 30));
    assert_eq!(right.screen().size(), (22, 47));
    assert_eq!(manager.focus().active(), PaneId::Left);

    // The guard owns the alternate screen; the manager only draws.
    let frame = output(&manager);
    assert!(!frame.contains("\x1b[?1049h"));
    assert!(frame.contains("assistant"));
    assert!(frame.contains("dashboard"));

    manager.shutdown();
    assert_eq!(manager.phase(), Phase::Stopped);
}

#[cfg(unix)]
#[test]
fn narrow_terminal_shows_only_the_active_pane() {
    let mut cfg = config(sh("sleep 10", "assistant"), sh("sleep 10", "dashboard"));
    cfg.min_pane_width = 35;
    let mut manager = manager(cfg, (100, 24));
    assert!(!manager.layout().is_degraded());

    manager.handle_resize(60, 24);
    assert!(manager.layout().is_degraded());
    let full = PaneBounds::new(0, 0, 60, 24);
    assert_eq!(
        manager.view(),
        View::Single {
            pane: PaneId::Left,
            bounds: full,
        }
    );
    assert_eq!(manager.pane(PaneId::Left).unwrap().bounds(), full);

    // Switching focus brings the hidden pane to the front.
    switch_focus(&mut manager);
    assert_eq!(
        manager.view(),
        View::Single {
            pane: PaneId::Right,
            bounds: full,
        }
    );
    assert_eq!(manager.pane(PaneId::Right).unwrap().bounds(), full);

    manager.handle_resize(100, 24);
    assert!(!manager.layout().is_degraded());
    assert_eq!(
        manager.pane(PaneId::Left).unwrap().bounds(),
        PaneBounds::new(0, 0, 49, 24)
    );
}

#[cfg(unix)]
#[test]
fn chord_resizes_the_split() {
    let mut manager = manager(
        config(sh("sleep 10", "assistant"), sh("sleep 10", "dashboard")),
        (100, 24),
    );

    key(&mut manager, KeyCode::Char('b'), KeyModifiers::CONTROL);
    key(&mut manager, KeyCode::Char('>'), KeyModifiers::NONE);
    assert!((manager.split_ratio() - 0.55).abs() < 1e-9);
    assert_eq!(manager.pane(PaneId::Left).unwrap().bounds().width, 54);

    key(&mut manager, KeyCode::Char('b'), KeyModifiers::CONTROL);
    key(&mut manager, KeyCode::Char('<'), KeyModifiers::NONE);
    key(&mut manager, KeyCode::Char('b'), KeyModifiers::CONTROL);
    key(&mut manager, KeyCode::Char('<'), KeyModifiers::NONE);
    assert!((manager.split_ratio() - 0.45).abs() < 1e-9);
    assert_eq!(manager.focus().active(), PaneId::Left);
}

#[cfg(unix)]
#[test]
fn exited_child_hands_screen_to_survivor() {
    let mut manager = manager(
        config(sh("sleep 10", "assistant"), sh("sleep 0.3", "dashboard")),
        (100, 24),
    );
    switch_focus(&mut manager);
    assert_eq!(manager.focus().active(), PaneId::Right);
    let before = manager.terminal().get_ref().len();

    assert!(pump_until(&mut manager, |m| !alive(m, PaneId::Right)));
    // The right pane's columns (x = 50) are blanked once its child is gone.
    let written = String::from_utf8_lossy(&manager.terminal().get_ref()[before..]).into_owned();
    assert!(
        written.contains(&format!("\x1b[1;51H{}", " ".repeat(50))),
        "right pane region was not cleared"
    );
    assert_eq!(manager.phase(), Phase::Running);
    assert_eq!(manager.focus().active(), PaneId::Left);
    assert!(!manager.focus().is_available(PaneId::Right));
    assert_eq!(
        manager.view(),
        View::Single {
            pane: PaneId::Left,
            bounds: PaneBounds::new(0, 0, 100, 24),
        }
    );
    assert_eq!(
        manager.pane(PaneId::Left).unwrap().bounds(),
        PaneBounds::new(0, 0, 100, 24)
    );
}

#[cfg(unix)]
#[test]
fn ctrl_c_interrupts_only_the_active_child() {
    let mut manager = manager(
        config(sh("sleep 10", "assistant"), sh("cat", "dashboard")),
        (100, 24),
    );
    switch_focus(&mut manager);
    // Let the shell settle on its tty before signalling it.
    std::thread::sleep(Duration::from_millis(200));

    key(&mut manager, KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert!(pump_until(&mut manager, |m| !alive(m, PaneId::Right)));
    assert!(alive(&manager, PaneId::Left));
    assert_eq!(manager.phase(), Phase::Running);
}

#[cfg(unix)]
#[test]
fn ctrl_d_closes_the_active_pane() {
    let mut manager = manager(
        config(sh("sleep 10", "assistant"), sh("sleep 10", "dashboard")),
        (100, 24),
    );

    key(&mut manager, KeyCode::Char('d'), KeyModifiers::CONTROL);
    assert!(!alive(&manager, PaneId::Left));
    assert_eq!(manager.focus().active(), PaneId::Right);
    assert_eq!(manager.phase(), Phase::Running);

    key(&mut manager, KeyCode::Char('d'), KeyModifiers::CONTROL);
    assert_eq!(manager.phase(), Phase::ShuttingDown);
    assert_eq!(manager.exit_reason(), Some(ExitReason::PanesClosed));
}

#[cfg(unix)]
#[test]
fn both_children_exiting_ends_the_session() {
    let mut manager = manager(
        config(sh("exit 0", "assistant"), sh("exit 0", "dashboard")),
        (100, 24),
    );

    assert!(pump_until(&mut manager, |m| m.phase() != Phase::Running));
    assert_eq!(manager.exit_reason(), Some(ExitReason::PanesClosed));

    let before = manager.terminal().get_ref().len();
    manager.shutdown();
    assert_eq!(manager.phase(), Phase::Stopped);
    assert!(!alive(&manager, PaneId::Left));
    assert!(!alive(&manager, PaneId::Right));
    let out = String::from_utf8_lossy(&manager.terminal().get_ref()[before..]).into_owned();
    assert!(out.contains("\x1b[2J"));
    assert!(!out.contains("\x1b[?1049l"));
}

#[cfg(unix)]
#[test]
fn missing_assistant_falls_back_to_dashboard() {
    let left = PaneCommand::new("definitely-not-a-real-program-4821", Vec::new(), "assistant");
    let manager = manager(config(left, sh("sleep 10", "dashboard")), (100, 24));

    assert!(manager.pane(PaneId::Left).is_none());
    assert!(alive(&manager, PaneId::Right));
    assert_eq!(manager.focus().active(), PaneId::Right);
    assert_eq!(
        manager.view(),
        View::Single {
            pane: PaneId::Right,
            bounds: PaneBounds::new(0, 0, 100, 24),
        }
    );
    let out = output(&manager);
    assert!(out.contains("definitely-not-a-real-program-4821"));
    assert!(out.contains("--no-split"));
}

#[cfg(unix)]
#[test]
fn single_pane_mode_skips_the_assistant() {
    let mut cfg = config(sh("sleep 10", "assistant"), sh("sleep 10", "dashboard"));
    cfg.single_pane = true;
    let manager = manager(cfg, (100, 24));

    assert!(manager.pane(PaneId::Left).is_none());
    assert_eq!(manager.focus().active(), PaneId::Right);
    assert!(!output(&manager).contains("not available"));
}

#[cfg(unix)]
#[test]
fn nothing_to_run_is_an_error() {
    let missing = PaneCommand::new("definitely-not-a-real-program-4821", Vec::new(), "x");
    let mut manager = SplitViewManager::new(config(missing.clone(), missing), Vec::new(), (80, 24));

    assert!(matches!(manager.start(), Err(SplitViewError::NoPanes(_))));
    assert_eq!(manager.phase(), Phase::Stopped);
}

#[test]
fn termination_signal_starts_shutdown() {
    let mut manager = SplitViewManager::new(SplitViewConfig::default(), Vec::new(), (80, 24));
    manager.phase = Phase::Running;

    let event = Event::from(SignalEvent::Terminate(TerminationSignal::SigInt));
    manager.handle_event(event, Instant::now());
    assert_eq!(manager.phase(), Phase::ShuttingDown);
    assert_eq!(manager.exit_reason(), Some(ExitReason::Signal(TerminationSignal::SigInt)));

    manager.handle_event(Event::InputClosed, Instant::now());
    assert_eq!(manager.exit_reason(), Some(ExitReason::Signal(TerminationSignal::SigInt)));
}

#[test]
fn split_adjustment_stops_at_min_width() {
    let mut manager = SplitViewManager::new(SplitViewConfig::default(), Vec::new(), (100, 24));
    assert_eq!(manager.config.min_pane_width, 20);

    for _ in 0..20 {
        manager.adjust_split(ResizeDirection::Shrink);
        assert!(!manager.layout().is_degraded(), "ratio {}", manager.split_ratio());
    }
    match manager.layout() {
        Layout::Split { left, .. } => assert_eq!(left.width, 20),
        Layout::Degraded => unreachable!(),
    }

    for _ in 0..20 {
        manager.adjust_split(ResizeDirection::Grow);
        assert!(!manager.layout().is_degraded(), "ratio {}", manager.split_ratio());
    }
    match manager.layout() {
        Layout::Split { right, .. } => assert_eq!(right.width, 20),
        Layout::Degraded => unreachable!(),
    }
}
