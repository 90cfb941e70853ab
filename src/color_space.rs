//! Palette color parsing and terminal quantization
//!
//! The service returns palette entries as CSS strings (`#1a2b3c`, `#fff`,
//! `tomato`). They are parsed with the `palette` crate and mapped down to
//! whatever color depth the terminal supports.

use std::str::FromStr;

use palette::Srgb;

use crate::terminal_capabilities::ColorSupport;

/// Fallback preview background when the palette is empty or unreadable
pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(0xf0, 0xf0, 0xf0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceptual luminance in 0.0..=1.0 (BT.709 coefficients)
    pub fn luminance(&self) -> f32 {
        0.2126 * (self.r as f32 / 255.0)
            + 0.7152 * (self.g as f32 / 255.0)
            + 0.0722 * (self.b as f32 / 255.0)
    }

    /// Whether dark text reads better than light text on this color
    pub fn prefers_dark_text(&self) -> bool {
        self.luminance() > 0.55
    }
}

impl From<Srgb<u8>> for Rgb {
    fn from(color: Srgb<u8>) -> Self {
        Self::new(color.red, color.green, color.blue)
    }
}

/// Parse a CSS color string: 3 or 6 digit hex (with or without `#`) or a
/// CSS named color. Anything else yields `None`.
pub fn parse_color(input: &str) -> Option<Rgb> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with('#') || trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        if let Ok(color) = Srgb::<u8>::from_str(trimmed) {
            return Some(color.into());
        }
    }

    palette::named::from_str(&trimmed.to_ascii_lowercase()).map(Rgb::from)
}

/// Background for the preview: first palette entry, else the default gray
pub fn preview_background(palette: &[String]) -> Rgb {
    palette
        .first()
        .and_then(|c| parse_color(c))
        .unwrap_or(DEFAULT_BACKGROUND)
}

/// Quantize to the xterm 256-color palette
pub fn quantize_to_ansi256(rgb: Rgb) -> u8 {
    let avg = ((rgb.r as u16 + rgb.g as u16 + rgb.b as u16) / 3) as u8;
    let spread = [rgb.r, rgb.g, rgb.b]
        .iter()
        .map(|&c| (c as i16 - avg as i16).abs())
        .max()
        .unwrap_or(0);

    if spread < 10 {
        // grayscale ramp 232..=255
        let gray_index = (avg as f32 / 255.0 * 23.0).round() as u8;
        return 232 + gray_index;
    }

    let level = |c: u8| (c as f32 / 255.0 * 5.0).round() as u8;
    16 + 36 * level(rgb.r) + 6 * level(rgb.g) + level(rgb.b)
}

/// Quantize to the 16 basic ANSI colors
pub fn quantize_to_ansi16(rgb: Rgb) -> u8 {
    let luminance = rgb.luminance();
    let (r, g, b) = (rgb.r as f32 / 255.0, rgb.g as f32 / 255.0, rgb.b as f32 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };

    if saturation < 0.2 {
        return if luminance > 0.7 {
            15
        } else if luminance > 0.3 {
            7
        } else {
            0
        };
    }

    let base = if r >= g && r >= b {
        if g > b { 3 } else { 1 }
    } else if g >= r && g >= b {
        if b > r { 6 } else { 2 }
    } else if r > g {
        5
    } else {
        4
    };

    if luminance > 0.5 {
        base + 8
    } else {
        base
    }
}

/// Terminal representation of a color at a given support level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalColor {
    Rgb(Rgb),
    Indexed(u8),
    None,
}

pub fn to_terminal_color(rgb: Rgb, support: ColorSupport) -> TerminalColor {
    match support {
        ColorSupport::TrueColor => TerminalColor::Rgb(rgb),
        ColorSupport::Color256 => TerminalColor::Indexed(quantize_to_ansi256(rgb)),
        ColorSupport::Color16 => TerminalColor::Indexed(quantize_to_ansi16(rgb)),
        ColorSupport::NoColor => TerminalColor::None,
    }
}
