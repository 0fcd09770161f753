//! Split layout: terminal size + ratio -> two pane rectangles and a separator.
//!
//! Everything here is a pure function of its inputs. Resizes always recompute
//! from scratch so bounds never drift.

use crate::config::SplitViewConfig;

/// Columns reserved between the two panes.
pub const SEPARATOR_WIDTH: u16 = 1;

const RATIO_EPSILON: f64 = 1e-9;

/// 0-indexed rectangle in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaneBounds {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl PaneBounds {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Size of the child's window: the bounds minus a one-cell border.
    pub fn inner_size(&self) -> (u16, u16) {
        let cols = self.width.saturating_sub(2).max(1);
        let rows = self.height.saturating_sub(2).max(1);
        (cols, rows)
    }

    pub fn inner(&self) -> PaneBounds {
        let (cols, rows) = self.inner_size();
        PaneBounds::new(
            self.x.saturating_add(1),
            self.y.saturating_add(1),
            cols,
            rows,
        )
    }

    pub fn overlaps(&self, other: &PaneBounds) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Split {
        left: PaneBounds,
        right: PaneBounds,
        separator_x: u16,
    },
    /// Too narrow to honor the ratio and minimum width; show one pane.
    Degraded,
}

impl Layout {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Layout::Degraded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    /// Move the separator left.
    Shrink,
    /// Move the separator right.
    Grow,
}

pub fn compute_bounds(terminal_width: u16, terminal_height: u16, config: &SplitViewConfig) -> Layout {
    split_bounds(
        terminal_width,
        terminal_height,
        config.split_ratio,
        config.min_pane_width,
    )
}

pub fn split_bounds(
    terminal_width: u16,
    terminal_height: u16,
    split_ratio: f64,
    min_pane_width: u16,
) -> Layout {
    if terminal_height == 0 || terminal_width <= SEPARATOR_WIDTH {
        return Layout::Degraded;
    }

    let usable = terminal_width - SEPARATOR_WIDTH;
    let ratio = split_ratio.clamp(0.0, 1.0);
    // Products like 100 * 0.29 land just under the integer.
    let left_width = (f64::from(usable) * ratio + RATIO_EPSILON).floor() as u16;
    let left_width = left_width.min(usable);
    let right_width = usable - left_width;

    let min = min_pane_width.max(1);
    if left_width < min || right_width < min {
        return Layout::Degraded;
    }

    let separator_x = left_width;
    Layout::Split {
        left: PaneBounds::new(0, 0, left_width, terminal_height),
        right: PaneBounds::new(
            separator_x + SEPARATOR_WIDTH,
            0,
            right_width,
            terminal_height,
        ),
        separator_x,
    }
}

/// Full-screen bounds used by degraded and single-pane presentations.
pub fn single_bounds(terminal_width: u16, terminal_height: u16) -> PaneBounds {
    PaneBounds::new(0, 0, terminal_width.max(1), terminal_height.max(1))
}

pub fn adjust_ratio(
    current_ratio: f64,
    direction: ResizeDirection,
    step: f64,
    terminal_width: u16,
    min_pane_width: u16,
) -> f64 {
    let next = match direction {
        ResizeDirection::Shrink => current_ratio - step,
        ResizeDirection::Grow => current_ratio + step,
    };

    if terminal_width == 0 {
        return current_ratio;
    }
    let lo = f64::from(min_pane_width) / f64::from(terminal_width);
    let hi = 1.0 - lo;
    if lo > hi {
        return current_ratio;
    }
    next.clamp(lo, hi)
}

#[cfg(test)]
#[path = "../tests/unit/layout.rs"]
mod tests;
