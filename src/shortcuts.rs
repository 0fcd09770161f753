//! Key binding reference. Both renderings derive from [`SHORTCUTS`].

use unicode_width::UnicodeWidthStr;

pub const PREFIX_LABEL: &str = "Ctrl+B";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
    /// Key after the prefix, or `None` for a direct binding.
    pub chord: Option<&'static str>,
    pub key: &'static str,
    pub description: &'static str,
    pub short: &'static str,
}

impl Shortcut {
    pub fn keys(&self) -> String {
        match self.chord {
            Some(follow) => format!("{PREFIX_LABEL} {follow}"),
            None => self.key.to_string(),
        }
    }
}

pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        chord: Some("→"),
        key: "Right",
        description: "Switch focus between panes",
        short: "switch",
    },
    Shortcut {
        chord: Some("<"),
        key: "<",
        description: "Shrink left pane, grow the other",
        short: "shrink",
    },
    Shortcut {
        chord: Some(">"),
        key: ">",
        description: "Grow left pane, shrink the other",
        short: "grow",
    },
    Shortcut {
        chord: None,
        key: "Ctrl+D",
        description: "Close the active pane",
        short: "close",
    },
    Shortcut {
        chord: None,
        key: "Ctrl+C",
        description: "Interrupt the active pane's program",
        short: "interrupt",
    },
];

/// Boxed multi-line reference.
pub fn full_help() -> String {
    let title = "Split view shortcuts";
    let rows: Vec<(String, &str)> = SHORTCUTS
        .iter()
        .map(|s| (s.keys(), s.description))
        .collect();
    let key_w = rows.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    let desc_w = rows.iter().map(|(_, d)| d.width()).max().unwrap_or(0);
    let inner = (key_w + 3 + desc_w).max(title.width());

    let mut out = String::new();
    out.push('┌');
    out.push_str(&"─".repeat(inner + 2));
    out.push_str("┐\n");
    out.push_str(&format!("│ {}{} │\n", title, " ".repeat(inner - title.width())));
    out.push('├');
    out.push_str(&"─".repeat(inner + 2));
    out.push_str("┤\n");
    for (keys, desc) in &rows {
        let line = format!("{}{}   {}", keys, " ".repeat(key_w - keys.width()), desc);
        out.push_str(&format!("│ {}{} │\n", line, " ".repeat(inner - line.width())));
    }
    out.push('└');
    out.push_str(&"─".repeat(inner + 2));
    out.push('┘');
    out
}

/// One-line hint for a footer.
pub fn compact_hint() -> String {
    let chords: Vec<&str> = SHORTCUTS.iter().filter_map(|s| s.chord).collect();
    let mut parts = vec![format!(
        "{PREFIX_LABEL} {} {}",
        chords.join("/"),
        SHORTCUTS
            .iter()
            .filter(|s| s.chord.is_some())
            .map(|s| s.short)
            .collect::<Vec<_>>()
            .join("/")
    )];
    parts.extend(
        SHORTCUTS
            .iter()
            .filter(|s| s.chord.is_none())
            .map(|s| format!("{} {}", s.key, s.short)),
    );
    parts.join(" · ")
}

#[cfg(test)]
#[path = "../tests/unit/shortcuts.rs"]
mod tests;
