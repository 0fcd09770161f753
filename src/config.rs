//! Settings file and the resolved, immutable split-view configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SETTINGS_DIR: &str = ".splitview";
const SETTINGS_FILE: &str = "settings.json";

pub const DEFAULT_SPLIT_RATIO: f64 = 0.5;
pub const DEFAULT_MIN_PANE_WIDTH: u16 = 20;
pub const DEFAULT_CHORD_TIMEOUT_MS: u64 = 1000;
pub const DEFAULT_FALLBACK_DELAY_MS: u64 = 2500;
pub const DEFAULT_RATIO_STEP: f64 = 0.05;
pub const DEFAULT_ASSISTANT: &str = "claude";
pub const DEFAULT_INSTALL_HINT: &str = "https://docs.anthropic.com/en/docs/claude-code/setup";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    #[default]
    Single,
    Rounded,
    Double,
    Heavy,
}

pub struct BorderGlyphs {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

impl BorderStyle {
    pub fn glyphs(self) -> BorderGlyphs {
        match self {
            BorderStyle::Single => BorderGlyphs {
                top_left: '┌',
                top_right: '┐',
                bottom_left: '└',
                bottom_right: '┘',
                horizontal: '─',
                vertical: '│',
            },
            BorderStyle::Rounded => BorderGlyphs {
                top_left: '╭',
                top_right: '╮',
                bottom_left: '╰',
                bottom_right: '╯',
                horizontal: '─',
                vertical: '│',
            },
            BorderStyle::Double => BorderGlyphs {
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
                horizontal: '═',
                vertical: '║',
            },
            BorderStyle::Heavy => BorderGlyphs {
                top_left: '┏',
                top_right: '┓',
                bottom_left: '┗',
                bottom_right: '┛',
                horizontal: '━',
                vertical: '┃',
            },
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" | "plain" => Some(BorderStyle::Single),
            "rounded" | "round" => Some(BorderStyle::Rounded),
            "double" => Some(BorderStyle::Double),
            "heavy" | "thick" => Some(BorderStyle::Heavy),
            _ => None,
        }
    }
}

/// A child program and how its pane is labelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneCommand {
    pub program: String,
    pub args: Vec<String>,
    pub title: String,
}

impl PaneCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, title: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args,
            title: title.into(),
        }
    }

    /// Split a shell-like command line on whitespace. Quoting is not supported.
    pub fn parse(command_line: &str, title: impl Into<String>) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), title))
    }
}

/// On-disk settings. Every field is optional so partial files are fine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_pane_width: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chord_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_delay_ms: Option<u64>,
}

impl Settings {
    fn defaults() -> Self {
        Self {
            split_ratio: Some(DEFAULT_SPLIT_RATIO),
            min_pane_width: Some(DEFAULT_MIN_PANE_WIDTH),
            border_style: Some(BorderStyle::default()),
            chord_timeout_ms: Some(DEFAULT_CHORD_TIMEOUT_MS),
            assistant: Some(DEFAULT_ASSISTANT.to_string()),
            dashboard: None,
            install_hint: Some(DEFAULT_INSTALL_HINT.to_string()),
            fallback_delay_ms: Some(DEFAULT_FALLBACK_DELAY_MS),
        }
    }

    /// Values set in `other` win.
    pub fn merge(mut self, other: Settings) -> Self {
        self.split_ratio = other.split_ratio.or(self.split_ratio);
        self.min_pane_width = other.min_pane_width.or(self.min_pane_width);
        self.border_style = other.border_style.or(self.border_style);
        self.chord_timeout_ms = other.chord_timeout_ms.or(self.chord_timeout_ms);
        self.assistant = other.assistant.or(self.assistant);
        self.dashboard = other.dashboard.or(self.dashboard);
        self.install_hint = other.install_hint.or(self.install_hint);
        self.fallback_delay_ms = other.fallback_delay_ms.or(self.fallback_delay_ms);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitViewConfig {
    pub split_ratio: f64,
    pub min_pane_width: u16,
    pub border_style: BorderStyle,
    pub chord_timeout: Duration,
    pub ratio_step: f64,
    /// Left pane: the assistant.
    pub left: PaneCommand,
    /// Right pane: the dashboard.
    pub right: PaneCommand,
    pub install_hint: String,
    pub fallback_delay: Duration,
    /// Run only the dashboard, full screen.
    pub single_pane: bool,
}

impl Default for SplitViewConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), false)
    }
}

impl SplitViewConfig {
    pub fn from_settings(settings: &Settings, single_pane: bool) -> Self {
        let split_ratio = settings
            .split_ratio
            .filter(|r| r.is_finite() && *r > 0.0 && *r < 1.0)
            .unwrap_or(DEFAULT_SPLIT_RATIO);
        let min_pane_width = settings
            .min_pane_width
            .unwrap_or(DEFAULT_MIN_PANE_WIDTH)
            .max(3);

        let left = settings
            .assistant
            .as_deref()
            .and_then(|cmd| PaneCommand::parse(cmd, "assistant"))
            .unwrap_or_else(|| PaneCommand::new(DEFAULT_ASSISTANT, Vec::new(), "assistant"));
        let right = settings
            .dashboard
            .as_deref()
            .and_then(|cmd| PaneCommand::parse(cmd, "dashboard"))
            .unwrap_or_else(|| PaneCommand::new(default_shell(), Vec::new(), "dashboard"));

        Self {
            split_ratio,
            min_pane_width,
            border_style: settings.border_style.unwrap_or_default(),
            chord_timeout: Duration::from_millis(
                settings
                    .chord_timeout_ms
                    .unwrap_or(DEFAULT_CHORD_TIMEOUT_MS)
                    .max(50),
            ),
            ratio_step: DEFAULT_RATIO_STEP,
            left,
            right,
            install_hint: settings
                .install_hint
                .clone()
                .unwrap_or_else(|| DEFAULT_INSTALL_HINT.to_string()),
            fallback_delay: Duration::from_millis(
                settings.fallback_delay_ms.unwrap_or(DEFAULT_FALLBACK_DELAY_MS),
            ),
            single_pane,
        }
    }
}

fn default_shell() -> String {
    std::env::var("SHELL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "/bin/sh".to_string())
}

pub fn get_settings_path() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

pub fn get_log_dir() -> Option<PathBuf> {
    get_cache_dir().map(|dir| dir.join(SETTINGS_DIR).join("logs"))
}

pub fn ensure_log_dir() -> std::io::Result<PathBuf> {
    let dir = get_log_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine log directory",
        )
    })?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn ensure_settings_file() -> std::io::Result<PathBuf> {
    let path = get_settings_path().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine settings directory",
        )
    })?;
    ensure_settings_file_at(&path)?;
    Ok(path)
}

pub fn ensure_settings_file_at(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if !path.exists() {
        let content = serde_json::to_string_pretty(&Settings::defaults())
            .unwrap_or_else(|_| "{}".to_string());
        std::fs::write(path, content)?;
    }
    Ok(())
}

pub fn load_settings() -> Option<Settings> {
    let path = get_settings_path()?;
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "invalid settings file ignored");
            None
        }
    }
}

fn get_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join("Library/Caches"));
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            if !xdg.is_empty() {
                return Some(PathBuf::from(xdg));
            }
        }
        return std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".cache"));
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        std::env::var("HOME").ok().map(|home| PathBuf::from(home).join(".cache"))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
