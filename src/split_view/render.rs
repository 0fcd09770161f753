use std::io::{self, Write};

use unicode_width::UnicodeWidthStr;

use super::{SplitViewManager, View};
use crate::layout::PaneBounds;
use crate::pane::{Pane, PaneId};
use crate::shortcuts;
use crate::tui::controller::{COLOR_ACTIVE, COLOR_INACTIVE, COLOR_RESET};
use crate::tui::TerminalController;

impl<W: Write> SplitViewManager<W> {
    /// Borders, titles, separator and footer hint for the current view.
    pub(super) fn draw_chrome(&mut self) -> io::Result<()> {
        let view = self.view();
        let active = self.focus.active();
        let border = self.config.border_style;
        let (width, height) = self.size;

        self.term.reset_attributes()?;
        self.term.clear_screen()?;
        match view {
            View::Split {
                left,
                right,
                separator_x,
            } => {
                self.term
                    .clear_region(PaneBounds::new(separator_x, 0, 1, height))?;
                for (id, bounds) in [(PaneId::Left, left), (PaneId::Right, right)] {
                    let color = if id == active {
                        COLOR_ACTIVE
                    } else {
                        COLOR_INACTIVE
                    };
                    self.term.draw_border(bounds, color, border)?;
                    self.draw_title(id, bounds, color)?;
                }
                let active_bounds = if active == PaneId::Left { left } else { right };
                draw_hint(&mut self.term, active_bounds)?;
            }
            View::Single { pane, bounds } => {
                self.term.draw_border(bounds, COLOR_ACTIVE, border)?;
                self.draw_title(pane, bounds, COLOR_ACTIVE)?;
                draw_hint(&mut self.term, bounds)?;
            }
            View::Empty => {
                self.term
                    .clear_region(PaneBounds::new(0, 0, width.max(1), height.max(1)))?;
            }
        }
        Ok(())
    }

    fn draw_title(&mut self, id: PaneId, bounds: PaneBounds, color: &str) -> io::Result<()> {
        let Some(pane) = self.panes[id.index()].as_ref() else {
            return Ok(());
        };
        if bounds.width < 5 {
            return Ok(());
        }
        let title = format!(" {} ", pane.title());
        self.term.set_color(color)?;
        self.term
            .write_at(bounds.y, bounds.x + 2, &title, bounds.width - 4)?;
        self.term.set_color(COLOR_RESET)
    }

    /// Copy the pane's screen model into its bounds.
    pub(super) fn paint_pane(&mut self, id: PaneId) -> io::Result<()> {
        let Some(bounds) = self.view().bounds_of(id) else {
            return Ok(());
        };
        let Some(pane) = self.panes[id.index()].as_ref() else {
            return Ok(());
        };
        paint_screen(&mut self.term, pane, bounds)
    }

    /// Park the real cursor where the active child expects it.
    pub(super) fn place_cursor(&mut self) -> io::Result<()> {
        let active = self.focus.active();
        let target = self
            .view()
            .bounds_of(active)
            .zip(self.panes[active.index()].as_ref())
            .filter(|(_, pane)| pane.is_alive() && !pane.screen().hide_cursor());

        match target {
            Some((bounds, pane)) => {
                let inner = bounds.inner();
                let (row, col) = pane.screen().cursor_position();
                let row = row.min(inner.height.saturating_sub(1));
                let col = col.min(inner.width.saturating_sub(1));
                self.term
                    .move_cursor(i32::from(inner.y + row), i32::from(inner.x + col))?;
                self.term.show_cursor()
            }
            None => self.term.hide_cursor(),
        }
    }

    /// Boxed notice shown when the assistant cannot be started.
    pub(super) fn draw_missing_executable(&mut self, program: &str, reason: &str) -> io::Result<()> {
        let (width, height) = self.size;
        let lines = [
            format!("Assistant not available: {program}"),
            reason.to_string(),
            String::new(),
            format!("Install it: {}", self.config.install_hint),
            "Run with --no-split to skip the split view.".to_string(),
            String::new(),
            "Continuing with the dashboard only...".to_string(),
        ];
        let content_w = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let box_w = content_w.saturating_add(4).min(width.max(1));
        let box_h = (lines.len() as u16).saturating_add(2).min(height.max(1));
        let bounds = PaneBounds::new(
            width.saturating_sub(box_w) / 2,
            height.saturating_sub(box_h) / 2,
            box_w,
            box_h,
        );

        self.term.reset_attributes()?;
        self.term.clear_screen()?;
        self.term
            .draw_border(bounds, COLOR_ACTIVE, self.config.border_style)?;
        for (i, line) in lines.iter().enumerate() {
            let row = bounds.y + 1 + i as u16;
            if row + 1 >= bounds.bottom() {
                break;
            }
            self.term
                .write_at(row, bounds.x + 2, line, bounds.width.saturating_sub(4))?;
        }
        self.term.flush()
    }
}

fn draw_hint<W: Write>(term: &mut TerminalController<W>, bounds: PaneBounds) -> io::Result<()> {
    let hint = format!(" {} ", shortcuts::compact_hint());
    let room = bounds.width.saturating_sub(4);
    if bounds.height < 2 || (hint.width() as u16) > room {
        return Ok(());
    }
    term.set_color(COLOR_INACTIVE)?;
    term.write_at(bounds.bottom() - 1, bounds.x + 2, &hint, room)?;
    term.set_color(COLOR_RESET)
}

fn paint_screen<W: Write>(
    term: &mut TerminalController<W>,
    pane: &Pane,
    bounds: PaneBounds,
) -> io::Result<()> {
    let inner = bounds.inner();
    let blank = " ".repeat(usize::from(inner.width));
    for (offset, row) in pane
        .screen()
        .rows_formatted(0, inner.width)
        .take(usize::from(inner.height))
        .enumerate()
    {
        let y = i32::from(inner.y) + offset as i32;
        term.reset_attributes()?;
        term.move_cursor(y, i32::from(inner.x))?;
        term.write_bytes(blank.as_bytes())?;
        term.move_cursor(y, i32::from(inner.x))?;
        term.write_bytes(&row)?;
    }
    term.reset_attributes()
}
