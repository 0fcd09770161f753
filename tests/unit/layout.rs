use super::*;

fn config(split_ratio: f64, min_pane_width: u16) -> SplitViewConfig {
    SplitViewConfig {
        split_ratio,
        min_pane_width,
        ..SplitViewConfig::default()
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn split_rounds_left_pane_down() {
    let layout = compute_bounds(82, 24, &config(0.4, 20));
    assert_eq!(
        layout,
        Layout::Split {
            left: PaneBounds::new(0, 0, 32, 24),
            right: PaneBounds::new(33, 0, 49, 24),
            separator_x: 32,
        }
    );
}

#[test]
fn exact_products_are_not_rounded_down() {
    match split_bounds(101, 24, 0.29, 10) {
        Layout::Split { left, right, .. } => {
            assert_eq!(left.width, 29);
            assert_eq!(right.width, 71);
        }
        Layout::Degraded => panic!("101 columns should split"),
    }
}

#[test]
fn widths_and_separator_fill_the_terminal() {
    for width in 41..=300u16 {
        match compute_bounds(width, 30, &config(0.5, 20)) {
            Layout::Split {
                left,
                right,
                separator_x,
            } => {
                assert_eq!(left.width + SEPARATOR_WIDTH + right.width, width);
                assert_eq!(separator_x, left.right());
                assert_eq!(right.x, separator_x + SEPARATOR_WIDTH);
                assert!(!left.overlaps(&right));
                assert_eq!(left.height, 30);
                assert_eq!(right.height, 30);
            }
            Layout::Degraded => panic!("width {width} should split"),
        }
    }
}

#[test]
fn narrow_terminal_degrades() {
    for width in 0..41u16 {
        for ratio in [0.1, 0.4, 0.5, 0.6, 0.9] {
            assert_eq!(
                compute_bounds(width, 24, &config(ratio, 20)),
                Layout::Degraded,
                "width {width} ratio {ratio}"
            );
        }
    }
}

#[test]
fn lopsided_ratio_degrades_even_when_wide() {
    assert!(compute_bounds(200, 24, &config(0.05, 20)).is_degraded());
    assert!(compute_bounds(200, 24, &config(0.95, 20)).is_degraded());
}

#[test]
fn shrinking_below_breakpoint_degrades() {
    let cfg = config(0.5, 35);
    assert!(!compute_bounds(100, 24, &cfg).is_degraded());
    assert!(compute_bounds(60, 24, &cfg).is_degraded());
}

#[test]
fn zero_height_degrades() {
    assert!(compute_bounds(120, 0, &config(0.5, 20)).is_degraded());
}

#[test]
fn adjust_ratio_steps_both_ways() {
    assert!(approx(
        adjust_ratio(0.5, ResizeDirection::Grow, 0.05, 100, 20),
        0.55
    ));
    assert!(approx(
        adjust_ratio(0.5, ResizeDirection::Shrink, 0.05, 100, 20),
        0.45
    ));
}

#[test]
fn adjust_ratio_clamps_to_min_width_share() {
    let grown = adjust_ratio(0.78, ResizeDirection::Grow, 0.05, 100, 20);
    assert!(approx(grown, 0.8), "{grown}");
    let shrunk = adjust_ratio(0.22, ResizeDirection::Shrink, 0.05, 100, 20);
    assert!(approx(shrunk, 0.2), "{shrunk}");
}

#[test]
fn adjust_ratio_keeps_value_when_range_is_empty() {
    assert!(approx(
        adjust_ratio(0.5, ResizeDirection::Grow, 0.05, 100, 60),
        0.5
    ));
    assert!(approx(
        adjust_ratio(0.5, ResizeDirection::Grow, 0.05, 0, 20),
        0.5
    ));
}

#[test]
fn inner_size_never_reaches_zero() {
    assert_eq!(PaneBounds::new(0, 0, 1, 1).inner_size(), (1, 1));
    assert_eq!(PaneBounds::new(0, 0, 10, 5).inner_size(), (8, 3));
    assert_eq!(
        PaneBounds::new(3, 2, 10, 5).inner(),
        PaneBounds::new(4, 3, 8, 3)
    );
}

#[test]
fn single_bounds_cover_the_terminal() {
    assert_eq!(single_bounds(60, 24), PaneBounds::new(0, 0, 60, 24));
    assert_eq!(single_bounds(0, 0), PaneBounds::new(0, 0, 1, 1));
}
