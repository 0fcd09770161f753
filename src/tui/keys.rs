//! Operator key events -> bytes a child expects on its pty.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub fn event(self) -> KeyEvent {
        KeyEvent::new(self.code, self.modifiers)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let mut code = event.code;
        let mut modifiers = event.modifiers;

        if let KeyCode::Char(ch) = code {
            if ch.is_ascii_uppercase() {
                code = KeyCode::Char(ch.to_ascii_lowercase());
                modifiers |= KeyModifiers::SHIFT;
            }
        }

        Self::new(code, modifiers)
    }
}

pub fn is_press(event: &KeyEvent) -> bool {
    matches!(event.kind, KeyEventKind::Press | KeyEventKind::Repeat)
}

/// Encode a key the way xterm would send it. `application_cursor` mirrors
/// DECCKM of the receiving screen.
pub fn encode_key(event: &KeyEvent, application_cursor: bool) -> Vec<u8> {
    let mods = event.modifiers;
    let alt = mods.contains(KeyModifiers::ALT);
    let ctrl = mods.contains(KeyModifiers::CONTROL);
    let param = modifier_param(mods);

    let mut out = match event.code {
        KeyCode::Char(ch) => {
            if ctrl {
                match ctrl_byte(ch) {
                    Some(b) => vec![b],
                    None => ch.to_string().into_bytes(),
                }
            } else {
                ch.to_string().into_bytes()
            }
        }
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Esc => vec![0x1b],
        KeyCode::Backspace => {
            if ctrl {
                vec![0x08]
            } else {
                vec![0x7f]
            }
        }
        KeyCode::Up => cursor_key(b'A', param, application_cursor),
        KeyCode::Down => cursor_key(b'B', param, application_cursor),
        KeyCode::Right => cursor_key(b'C', param, application_cursor),
        KeyCode::Left => cursor_key(b'D', param, application_cursor),
        KeyCode::Home => cursor_key(b'H', param, application_cursor),
        KeyCode::End => cursor_key(b'F', param, application_cursor),
        KeyCode::Insert => tilde_key(2, param),
        KeyCode::Delete => tilde_key(3, param),
        KeyCode::PageUp => tilde_key(5, param),
        KeyCode::PageDown => tilde_key(6, param),
        KeyCode::F(n) => function_key(n, param),
        KeyCode::Null => vec![0],
        _ => Vec::new(),
    };

    // Alt prefixes plain characters with ESC; escape sequences already carry
    // the modifier parameter.
    if alt && matches!(event.code, KeyCode::Char(_) | KeyCode::Enter | KeyCode::Backspace | KeyCode::Esc) {
        out.insert(0, 0x1b);
    }
    out
}

fn ctrl_byte(ch: char) -> Option<u8> {
    match ch {
        'a'..='z' => Some(ch as u8 - b'a' + 1),
        'A'..='Z' => Some(ch as u8 - b'A' + 1),
        ' ' | '@' | '2' => Some(0),
        '[' | '3' => Some(0x1b),
        '\\' | '4' => Some(0x1c),
        ']' | '5' => Some(0x1d),
        '^' | '6' => Some(0x1e),
        '_' | '-' | '7' => Some(0x1f),
        '?' | '8' => Some(0x7f),
        _ => None,
    }
}

/// xterm modifier parameter: 1 + shift(1) + alt(2) + ctrl(4). `None` when
/// unmodified.
fn modifier_param(mods: KeyModifiers) -> Option<u8> {
    let mut value = 0u8;
    if mods.contains(KeyModifiers::SHIFT) {
        value |= 1;
    }
    if mods.contains(KeyModifiers::ALT) {
        value |= 2;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        value |= 4;
    }
    (value != 0).then_some(value + 1)
}

fn cursor_key(final_byte: u8, param: Option<u8>, application_cursor: bool) -> Vec<u8> {
    match param {
        Some(p) => format!("\x1b[1;{}{}", p, final_byte as char).into_bytes(),
        None if application_cursor => vec![0x1b, b'O', final_byte],
        None => vec![0x1b, b'[', final_byte],
    }
}

fn tilde_key(code: u8, param: Option<u8>) -> Vec<u8> {
    match param {
        Some(p) => format!("\x1b[{code};{p}~").into_bytes(),
        None => format!("\x1b[{code}~").into_bytes(),
    }
}

fn function_key(n: u8, param: Option<u8>) -> Vec<u8> {
    let ss3 = match n {
        1 => Some(b'P'),
        2 => Some(b'Q'),
        3 => Some(b'R'),
        4 => Some(b'S'),
        _ => None,
    };
    if let Some(final_byte) = ss3 {
        return match param {
            Some(p) => format!("\x1b[1;{}{}", p, final_byte as char).into_bytes(),
            None => vec![0x1b, b'O', final_byte],
        };
    }

    let code = match n {
        5 => 15,
        6 => 17,
        7 => 18,
        8 => 19,
        9 => 20,
        10 => 21,
        11 => 23,
        12 => 24,
        _ => return Vec::new(),
    };
    tilde_key(code, param)
}

#[cfg(test)]
#[path = "../../tests/unit/tui/keys.rs"]
mod tests;
