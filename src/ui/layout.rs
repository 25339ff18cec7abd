//! Card grid layout
//!
//! Cards fill rows left to right, one page of `columns × visible_rows`
//! at a time:
//! ```text
//! Index:  0 1 2
//!         3 4 5
//! ```

use ratatui::layout::Rect;
use std::ops::Range;

/// Gap between card columns
pub const COLUMN_GAP: u16 = 1;

/// Grid layout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Cards per row
    pub columns: u16,
    /// Rows of cards per page
    pub visible_rows: u16,
}

impl GridLayout {
    pub fn new(columns: u16, visible_rows: u16) -> Self {
        Self {
            columns: columns.clamp(1, 8),
            visible_rows: visible_rows.clamp(1, 8),
        }
    }

    /// Cards per page
    pub fn page_size(&self) -> usize {
        (self.columns as usize) * (self.visible_rows as usize)
    }

    /// Indices of the page containing `selected`
    pub fn visible_range(&self, selected: usize, total: usize) -> Range<usize> {
        if total == 0 {
            return 0..0;
        }
        let page_size = self.page_size();
        let start = (selected / page_size) * page_size;
        start..(start + page_size).min(total)
    }

    /// (row, col) of a position within the page
    pub fn index_to_position(&self, local_index: usize) -> (u16, u16) {
        let columns = self.columns as usize;
        ((local_index / columns) as u16, (local_index % columns) as u16)
    }

    /// Screen area of each card slot on a page drawn into `area`
    pub fn card_areas(&self, area: Rect, count: usize) -> Vec<Rect> {
        let gaps = COLUMN_GAP * (self.columns - 1);
        let card_width = area.width.saturating_sub(gaps) / self.columns;
        let card_height = area.height / self.visible_rows;
        if card_width == 0 || card_height == 0 {
            return Vec::new();
        }

        (0..count.min(self.page_size()))
            .map(|i| {
                let (row, col) = self.index_to_position(i);
                Rect {
                    x: area.x + col * (card_width + COLUMN_GAP),
                    y: area.y + row * card_height,
                    width: card_width,
                    height: card_height,
                }
            })
            .collect()
    }

    pub fn move_left(&self, current: usize) -> usize {
        current.saturating_sub(1)
    }

    pub fn move_right(&self, current: usize, total: usize) -> usize {
        if current + 1 < total {
            current + 1
        } else {
            current
        }
    }

    /// One row up, staying put on the first row
    pub fn move_up(&self, current: usize) -> usize {
        let columns = self.columns as usize;
        if current >= columns {
            current - columns
        } else {
            current
        }
    }

    /// One row down, clamped to the last card
    pub fn move_down(&self, current: usize, total: usize) -> usize {
        let columns = self.columns as usize;
        if current + columns < total {
            current + columns
        } else if total > 0 && current / columns < (total - 1) / columns {
            // Partial last row: land on its last card
            total - 1
        } else {
            current
        }
    }

    pub fn page_up(&self, current: usize) -> usize {
        current.saturating_sub(self.page_size())
    }

    pub fn page_down(&self, current: usize, total: usize) -> usize {
        (current + self.page_size()).min(total.saturating_sub(1))
    }

    pub fn move_end(&self, total: usize) -> usize {
        total.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_dimensions() {
        let layout = GridLayout::new(0, 50);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.visible_rows, 8);
    }

    #[test]
    fn test_visible_range() {
        let layout = GridLayout::new(3, 2);

        assert_eq!(layout.visible_range(0, 14), 0..6);
        assert_eq!(layout.visible_range(5, 14), 0..6);
        assert_eq!(layout.visible_range(6, 14), 6..12);
        assert_eq!(layout.visible_range(13, 14), 12..14);
        assert_eq!(layout.visible_range(0, 0), 0..0);
    }

    #[test]
    fn test_index_to_position() {
        let layout = GridLayout::new(3, 2);
        assert_eq!(layout.index_to_position(0), (0, 0));
        assert_eq!(layout.index_to_position(2), (0, 2));
        assert_eq!(layout.index_to_position(3), (1, 0));
        assert_eq!(layout.index_to_position(5), (1, 2));
    }

    #[test]
    fn test_card_areas() {
        let layout = GridLayout::new(3, 2);
        let areas = layout.card_areas(Rect::new(1, 1, 32, 20), 4);
        assert_eq!(areas.len(), 4);
        assert_eq!(areas[0], Rect::new(1, 1, 10, 10));
        assert_eq!(areas[1], Rect::new(12, 1, 10, 10));
        assert_eq!(areas[3], Rect::new(1, 11, 10, 10));

        assert!(layout.card_areas(Rect::new(0, 0, 2, 1), 4).is_empty());
    }

    #[test]
    fn test_navigation() {
        let layout = GridLayout::new(3, 2);
        let total = 8;

        assert_eq!(layout.move_left(0), 0);
        assert_eq!(layout.move_right(7, total), 7);
        assert_eq!(layout.move_up(4), 1);
        assert_eq!(layout.move_up(1), 1);
        assert_eq!(layout.move_down(1, total), 4);
        // Row 2 is partial (6, 7): from 5 go to 7
        assert_eq!(layout.move_down(5, total), 7);
        assert_eq!(layout.move_down(7, total), 7);

        assert_eq!(layout.page_down(1, total), 7);
        assert_eq!(layout.page_up(7), 1);
        assert_eq!(layout.move_end(total), 7);
        assert_eq!(layout.move_end(0), 0);
    }
}
