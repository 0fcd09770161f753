//! Raw terminal control codes for the split view chrome.
//!
//! `TerminalController` keeps no state besides the writer it drives. Every
//! method queues crossterm commands; nothing reaches the terminal until
//! [`TerminalController::flush`].

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color},
    terminal, queue,
};
use unicode_width::UnicodeWidthChar;

use crate::config::BorderStyle;
use crate::layout::PaneBounds;

pub const COLOR_ACTIVE: &str = "active";
pub const COLOR_INACTIVE: &str = "inactive";
pub const COLOR_RESET: &str = "reset";

enum PaletteEntry {
    Foreground(Color),
    Reset,
}

fn palette(name: &str) -> Option<PaletteEntry> {
    match name {
        COLOR_ACTIVE => Some(PaletteEntry::Foreground(Color::Cyan)),
        COLOR_INACTIVE => Some(PaletteEntry::Foreground(Color::DarkGrey)),
        COLOR_RESET => Some(PaletteEntry::Reset),
        _ => None,
    }
}

/// Broken pipes and friends mean the terminal is gone; everything else is
/// worth retrying on the next frame.
pub fn is_unrecoverable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe | io::ErrorKind::WriteZero | io::ErrorKind::NotConnected
    )
}

pub struct TerminalController<W: Write> {
    out: W,
}

impl<W: Write> TerminalController<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        queue!(self.out, terminal::EnterAlternateScreen)
    }

    pub fn exit_alt_screen(&mut self) -> io::Result<()> {
        queue!(self.out, terminal::LeaveAlternateScreen)
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, terminal::Clear(terminal::ClearType::All))
    }

    /// 0-indexed; negative coordinates clamp to the first row/column.
    pub fn move_cursor(&mut self, row: i32, col: i32) -> io::Result<()> {
        let max = i32::from(u16::MAX - 1);
        let row = row.clamp(0, max) as u16;
        let col = col.clamp(0, max) as u16;
        queue!(self.out, cursor::MoveTo(col, row))
    }

    pub fn hide_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, cursor::Hide)
    }

    pub fn show_cursor(&mut self) -> io::Result<()> {
        queue!(self.out, cursor::Show)
    }

    /// Unknown names are ignored.
    pub fn set_color(&mut self, name: &str) -> io::Result<()> {
        match palette(name) {
            Some(PaletteEntry::Foreground(color)) => {
                queue!(self.out, style::SetForegroundColor(color))
            }
            Some(PaletteEntry::Reset) => queue!(self.out, style::ResetColor),
            None => Ok(()),
        }
    }

    pub fn reset_attributes(&mut self) -> io::Result<()> {
        queue!(self.out, style::SetAttribute(style::Attribute::Reset))
    }

    pub fn draw_border(
        &mut self,
        bounds: PaneBounds,
        color_name: &str,
        border: BorderStyle,
    ) -> io::Result<()> {
        let glyphs = border.glyphs();
        let inner_w = usize::from(bounds.width.saturating_sub(2));
        let inner_h = bounds.height.saturating_sub(2);
        let top = i32::from(bounds.y);
        let left = i32::from(bounds.x);
        let bottom = top + i32::from(bounds.height.max(1)) - 1;
        let right = left + i32::from(bounds.width.max(1)) - 1;
        let horizontal = glyphs.horizontal.to_string().repeat(inner_w);

        self.set_color(color_name)?;

        self.move_cursor(top, left)?;
        write!(self.out, "{}{}", glyphs.top_left, horizontal)?;
        self.move_cursor(top, right)?;
        write!(self.out, "{}", glyphs.top_right)?;

        for offset in 1..=i32::from(inner_h) {
            self.move_cursor(top + offset, left)?;
            write!(self.out, "{}", glyphs.vertical)?;
            self.move_cursor(top + offset, right)?;
            write!(self.out, "{}", glyphs.vertical)?;
        }

        self.move_cursor(bottom, left)?;
        write!(self.out, "{}{}", glyphs.bottom_left, horizontal)?;
        self.move_cursor(bottom, right)?;
        write!(self.out, "{}", glyphs.bottom_right)?;

        self.set_color(COLOR_RESET)
    }

    /// Blank every cell of `bounds`.
    pub fn clear_region(&mut self, bounds: PaneBounds) -> io::Result<()> {
        let blank = " ".repeat(usize::from(bounds.width));
        self.reset_attributes()?;
        for row in 0..bounds.height {
            self.move_cursor(i32::from(bounds.y + row), i32::from(bounds.x))?;
            self.out.write_all(blank.as_bytes())?;
        }
        Ok(())
    }

    /// Write `text` at a position, cut to `max_width` display columns.
    pub fn write_at(&mut self, row: u16, col: u16, text: &str, max_width: u16) -> io::Result<()> {
        let clipped = clip_to_width(text, usize::from(max_width));
        if clipped.is_empty() {
            return Ok(());
        }
        self.move_cursor(i32::from(row), i32::from(col))?;
        self.out.write_all(clipped.as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

pub fn clip_to_width(text: &str, max_width: usize) -> &str {
    let mut used = 0usize;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            return &text[..idx];
        }
        used += w;
    }
    text
}

#[cfg(test)]
#[path = "../../tests/unit/tui/controller.rs"]
mod tests;
