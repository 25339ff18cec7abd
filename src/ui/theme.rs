//! Color themes for the gallery
//!
//! Built-in presets, hex parsing for config overrides, and a 256-color
//! approximation for terminals without truecolor.

use ratatui::style::Color;
use thiserror::Error;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Main background color
    pub background: Color,
    /// Primary text color
    pub foreground: Color,
    /// Background for the selected card
    pub selection_bg: Color,
    /// Text color for the selected card
    pub selection_fg: Color,
    /// Accent color (borders, trigger, titles)
    pub accent: Color,
    /// Dimmed text (dates, hints)
    pub dimmed: Color,
    /// More dimmed text (idle borders, disabled controls)
    pub dimmed_alt: Color,
    /// Focused control
    pub focus: Color,
    /// Loading line and busy trigger
    pub busy: Color,
    /// Error placeholder
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::darkwall()
    }
}

impl Theme {
    /// Darkwall theme - default
    pub fn darkwall() -> Self {
        Self {
            background: Color::Rgb(13, 17, 22),       // #0d1116
            foreground: Color::Rgb(229, 234, 241),    // #e5eaf1
            selection_bg: Color::Rgb(20, 28, 42),     // #141c2a
            selection_fg: Color::Rgb(229, 234, 241),  // #e5eaf1
            accent: Color::Rgb(180, 83, 9),           // #b45309 (amber)
            dimmed: Color::Rgb(156, 163, 175),        // #9ca3af
            dimmed_alt: Color::Rgb(107, 114, 128),    // #6b7280
            focus: Color::Rgb(245, 158, 11),          // #f59e0b
            busy: Color::Rgb(34, 197, 94),            // #22c55e
            error: Color::Rgb(239, 68, 68),           // #ef4444
        }
    }

    /// Catppuccin Mocha theme
    pub fn catppuccin_mocha() -> Self {
        Self {
            background: Color::Rgb(30, 30, 46),       // #1e1e2e (base)
            foreground: Color::Rgb(205, 214, 244),    // #cdd6f4 (text)
            selection_bg: Color::Rgb(49, 50, 68),     // #313244 (surface0)
            selection_fg: Color::Rgb(205, 214, 244),  // #cdd6f4 (text)
            accent: Color::Rgb(137, 180, 250),        // #89b4fa (blue)
            dimmed: Color::Rgb(166, 173, 200),        // #a6adc8 (subtext0)
            dimmed_alt: Color::Rgb(147, 153, 178),    // #9399b2 (overlay2)
            focus: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
            busy: Color::Rgb(166, 227, 161),  // #a6e3a1 (green)
            error: Color::Rgb(243, 139, 168),  // #f38ba8 (red)
        }
    }

    /// Catppuccin Latte theme (light)
    pub fn catppuccin_latte() -> Self {
        Self {
            background: Color::Rgb(239, 241, 245),    // #eff1f5 (base)
            foreground: Color::Rgb(76, 79, 105),      // #4c4f69 (text)
            selection_bg: Color::Rgb(204, 208, 218),  // #ccd0da (surface0)
            selection_fg: Color::Rgb(76, 79, 105),    // #4c4f69 (text)
            accent: Color::Rgb(30, 102, 245),         // #1e66f5 (blue)
            dimmed: Color::Rgb(108, 111, 133),        // #6c6f85 (subtext0)
            dimmed_alt: Color::Rgb(140, 143, 161),    // #8c8fa1 (overlay2)
            focus: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
            busy: Color::Rgb(64, 160, 43),    // #40a02b (green)
            error: Color::Rgb(210, 15, 57),    // #d20f39 (red)
        }
    }

    /// Nord theme
    pub fn nord() -> Self {
        Self {
            background: Color::Rgb(46, 52, 64),       // #2e3440 (nord0)
            foreground: Color::Rgb(236, 239, 244),    // #eceff4 (nord6)
            selection_bg: Color::Rgb(67, 76, 94),     // #434c5e (nord2)
            selection_fg: Color::Rgb(236, 239, 244),  // #eceff4 (nord6)
            accent: Color::Rgb(136, 192, 208),        // #88c0d0 (nord8)
            dimmed: Color::Rgb(216, 222, 233),        // #d8dee9 (nord4)
            dimmed_alt: Color::Rgb(76, 86, 106),      // #4c566a (nord3)
            focus: Color::Rgb(235, 203, 139), // #ebcb8b (nord13)
            busy: Color::Rgb(163, 190, 140),  // #a3be8c (nord14)
            error: Color::Rgb(191, 97, 106),   // #bf616a (nord11)
        }
    }

    /// Gruvbox dark theme
    pub fn gruvbox() -> Self {
        Self {
            background: Color::Rgb(40, 40, 40),       // #282828 (bg)
            foreground: Color::Rgb(235, 219, 178),    // #ebdbb2 (fg)
            selection_bg: Color::Rgb(60, 56, 54),     // #3c3836 (bg1)
            selection_fg: Color::Rgb(235, 219, 178),  // #ebdbb2 (fg)
            accent: Color::Rgb(215, 153, 33),         // #d79921 (yellow)
            dimmed: Color::Rgb(168, 153, 132),        // #a89984 (gray)
            dimmed_alt: Color::Rgb(146, 131, 116),    // #928374 (gray)
            focus: Color::Rgb(250, 189, 47), // #fabd2f (bright yellow)
            busy: Color::Rgb(152, 151, 26),   // #98971a (green)
            error: Color::Rgb(204, 36, 29),    // #cc241d (red)
        }
    }

    /// Load theme from preset name
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "darkwall" | "default" => Some(Self::darkwall()),
            "catppuccin-mocha" | "catppuccin_mocha" | "catppuccin" => Some(Self::catppuccin_mocha()),
            "catppuccin-latte" | "catppuccin_latte" => Some(Self::catppuccin_latte()),
            "nord" => Some(Self::nord()),
            "gruvbox" | "gruvbox-dark" | "gruvbox_dark" => Some(Self::gruvbox()),
            _ => None,
        }
    }

    /// Convert to 256-color approximation for limited terminals
    pub fn to_256_color(&self) -> Self {
        Self {
            background: approximate_256(self.background),
            foreground: approximate_256(self.foreground),
            selection_bg: approximate_256(self.selection_bg),
            selection_fg: approximate_256(self.selection_fg),
            accent: approximate_256(self.accent),
            dimmed: approximate_256(self.dimmed),
            dimmed_alt: approximate_256(self.dimmed_alt),
            focus: approximate_256(self.focus),
            busy: approximate_256(self.busy),
            error: approximate_256(self.error),
        }
    }
}

/// Parse hex color string to Color
/// Supports: #rrggbb, #rgb, #rrggbbaa (alpha ignored), with or without `#`
pub fn parse_hex_color(s: &str) -> Result<Color, ColorError> {
    let s = s.trim().trim_start_matches('#');
    if !s.is_ascii() {
        return Err(ColorError::InvalidHex);
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ColorError::InvalidHex)
    };

    match s.len() {
        // Short form: each digit doubled (f -> ff)
        3 => Ok(Color::Rgb(channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17)),
        6 | 8 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        _ => Err(ColorError::InvalidLength),
    }
}

/// Color parsing error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColorError {
    #[error("invalid color length (expected 3, 6, or 8 hex chars)")]
    InvalidLength,
    #[error("invalid hex character")]
    InvalidHex,
}

/// Approximate RGB color to nearest 256-color palette entry
fn approximate_256(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => {
            // 6x6x6 color cube starts at index 16
            // Each axis: 0, 95, 135, 175, 215, 255 -> indices 0-5
            let r_idx = if r < 48 { 0 } else { (r - 35) / 40 };
            let g_idx = if g < 48 { 0 } else { (g - 35) / 40 };
            let b_idx = if b < 48 { 0 } else { (b - 35) / 40 };
            let idx = 16 + 36 * r_idx + 6 * g_idx + b_idx;
            Color::Indexed(idx)
        }
        c => c,
    }
}
