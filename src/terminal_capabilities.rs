//! Terminal capability detection
//!
//! Only the color depth matters here: palette swatches and the preview
//! background are drawn at whatever depth the terminal advertises.

use crossterm::terminal;
use std::env;

/// Level of color support in the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSupport {
    NoColor,
    Color16,
    Color256,
    #[default]
    TrueColor,
}

impl ColorSupport {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSupport::NoColor => "None",
            ColorSupport::Color16 => "16 Colors",
            ColorSupport::Color256 => "256 Colors",
            ColorSupport::TrueColor => "True Color",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TerminalCapabilities {
    pub color_support: ColorSupport,
    pub size: (u16, u16),
}

impl Default for TerminalCapabilities {
    fn default() -> Self {
        Self {
            color_support: ColorSupport::TrueColor,
            size: (80, 24),
        }
    }
}

pub fn detect_capabilities() -> TerminalCapabilities {
    TerminalCapabilities {
        color_support: color_support_from_env(|key| env::var(key).ok()),
        size: terminal::size().unwrap_or((80, 24)),
    }
}

/// Decide color depth from environment variables.
///
/// `lookup` abstracts `std::env::var` so the rules can be tested without
/// touching the process environment.
pub fn color_support_from_env<F>(lookup: F) -> ColorSupport
where
    F: Fn(&str) -> Option<String>,
{
    // https://no-color.org
    if lookup("NO_COLOR").is_some() {
        return ColorSupport::NoColor;
    }

    let colorterm = lookup("COLORTERM").map(|v| v.to_lowercase());
    if let Some(ref value) = colorterm {
        if value.contains("truecolor") || value.contains("24bit") {
            return ColorSupport::TrueColor;
        }
    }

    if let Some(term) = lookup("TERM").map(|v| v.to_lowercase()) {
        if term.contains("kitty")
            || term.contains("alacritty")
            || term.contains("iterm")
            || term.contains("vte")
            || term.contains("256color")
        {
            return if colorterm.is_some() {
                ColorSupport::TrueColor
            } else {
                ColorSupport::Color256
            };
        }
        if term.contains("xterm") {
            return ColorSupport::Color16;
        }
        if term.contains("screen") || term.contains("tmux") {
            return ColorSupport::Color256;
        }
        if term.contains("linux") || term.contains("console") || term == "dumb" {
            return ColorSupport::Color16;
        }
    }

    if lookup("WT_SESSION").is_some() {
        return ColorSupport::TrueColor;
    }

    ColorSupport::Color256
}
