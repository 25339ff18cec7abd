//! Image card widget
//!
//! Renders one gallery card:
//! - Preview area (filled in with terminal graphics when available)
//! - Title (bold)
//! - Date (dimmed)
//!
//! The explanation is only shown in the overlay.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::theme::Theme;
use crate::feed::DisplayImage;

/// Rows under the preview: title and date
const TEXT_ROWS: u16 = 2;
/// Shown in the preview area when no picture is rendered
const PREVIEW_GLYPH: &str = "🔭";

pub struct ImageCard<'a> {
    image: &'a DisplayImage,
    selected: bool,
    theme: &'a Theme,
    /// Leave the preview area blank for a graphics protocol to draw into
    graphics: bool,
}

impl<'a> ImageCard<'a> {
    pub fn new(image: &'a DisplayImage, theme: &'a Theme) -> Self {
        Self {
            image,
            selected: false,
            theme,
            graphics: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn graphics(mut self, graphics: bool) -> Self {
        self.graphics = graphics;
        self
    }

    /// Part of a card's area reserved for the preview picture
    pub fn preview_area(area: Rect) -> Rect {
        Rect {
            x: area.x + 1,
            y: area.y,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(TEXT_ROWS),
        }
    }
}

impl Widget for ImageCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let bg = if self.selected { self.theme.selection_bg } else { self.theme.background };
        let fg = if self.selected { self.theme.selection_fg } else { self.theme.foreground };

        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_bg(bg);
                }
            }
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        if inner_width == 0 {
            return;
        }
        let text_x = area.x + 1;

        let preview = Self::preview_area(area);
        if !self.graphics && preview.height > 0 {
            let glyph_x = preview.x + (preview.width.saturating_sub(PREVIEW_GLYPH.width() as u16)) / 2;
            let glyph_y = preview.y + preview.height / 2;
            buf.set_string(glyph_x, glyph_y, PREVIEW_GLYPH, Style::default().fg(self.theme.dimmed_alt).bg(bg));
        }

        // Title and date take the bottom rows; on a very short card the title wins
        let title_y = area.y + area.height.saturating_sub(TEXT_ROWS).min(area.height - 1);
        let mut title_style = Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD);
        if self.selected {
            title_style = title_style.fg(self.theme.accent);
        }
        buf.set_string(text_x, title_y, truncate(&self.image.title, inner_width), title_style);

        let date_y = title_y + 1;
        if date_y < area.y + area.height {
            let style = Style::default().fg(self.theme.dimmed).bg(bg);
            buf.set_string(text_x, date_y, truncate(&self.image.date, inner_width), style);
        }
    }
}

/// Truncate string to fit within max_width, adding ellipsis if needed
pub fn truncate(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width + 1 > max_width {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
