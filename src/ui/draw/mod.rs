//! Drawing functions for the TUI
//!
//! - `gallery` - Main screen (date selectors, trigger, cards, status)
//! - `overlay` - Detail overlay drawn on top of the main screen

mod gallery;
mod overlay;

use ratatui::Frame;

use crate::app::{App, HitMap};

use gallery::draw_gallery_screen;
use overlay::draw_overlay;

/// Draw the whole screen and return the clickable regions
pub fn draw(f: &mut Frame, app: &App) -> HitMap {
    let mut hits = HitMap::default();
    draw_gallery_screen(f, app, &mut hits);
    if let Some(overlay) = app.overlay() {
        hits.overlay = Some(draw_overlay(f, app, overlay));
    }
    hits
}
