//! Detail overlay for a single image, and the scroll lock it holds.
//!
//! Opening an [`Overlay`] acquires a [`ScrollGuard`]; dropping the overlay
//! releases it. Every way of closing (key, close button, background click,
//! replacement by another overlay) goes through that drop.

use ratatui::layout::{Position, Rect};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::feed::DisplayImage;

pub const CLOSE_LABEL: &str = "[ Close ]";

/// Shared flag suppressing gallery scrolling while an overlay is up
#[derive(Debug, Clone, Default)]
pub struct ScrollLock(Arc<AtomicBool>);

impl ScrollLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Lock scrolling until the returned guard is dropped
    pub fn acquire(&self) -> ScrollGuard {
        self.0.store(true, Ordering::Release);
        ScrollGuard {
            flag: Arc::clone(&self.0),
        }
    }
}

/// Releases the scroll lock on drop
#[derive(Debug)]
pub struct ScrollGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The open detail view
#[derive(Debug)]
pub struct Overlay {
    image: DisplayImage,
    /// First visible line of the explanation
    scroll: u16,
    _guard: ScrollGuard,
}

impl Overlay {
    pub fn open(image: DisplayImage, lock: &ScrollLock) -> Self {
        tracing::debug!("Opening overlay for {:?}", image.title);
        Self {
            image,
            scroll: 0,
            _guard: lock.acquire(),
        }
    }

    pub fn image(&self) -> &DisplayImage {
        &self.image
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Scroll towards the end, stopping at `max`
    pub fn scroll_down(&mut self, lines: u16, max: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(max.max(self.scroll));
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Pull the offset back after the text area was measured
    pub fn clamp_scroll(&mut self, max: u16) {
        self.scroll = self.scroll.min(max);
    }
}

/// Where a click landed relative to the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayHit {
    Background,
    Content,
    CloseButton,
}

/// Screen geometry of the overlay, shared by drawing and mouse handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub content: Rect,
    pub close_button: Rect,
    /// Largest scroll offset that still shows text. Unbounded until the
    /// overlay has been drawn and its text measured.
    pub max_scroll: u16,
}

impl OverlayLayout {
    /// Centre the content box at 80% of the screen, close button on its
    /// last inner row
    pub fn compute(area: Rect) -> Self {
        let width = (area.width * 4 / 5).max(area.width.min(30));
        let height = (area.height * 4 / 5).max(area.height.min(10));
        let content = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        let button_width = (CLOSE_LABEL.len() as u16).min(content.width.saturating_sub(2));
        let close_button = Rect {
            x: content.x + (content.width - button_width) / 2,
            y: (content.y + content.height).saturating_sub(2).max(content.y),
            width: button_width,
            height: 1,
        };

        Self {
            content,
            close_button,
            max_scroll: u16::MAX,
        }
    }

    pub fn hit(&self, column: u16, row: u16) -> OverlayHit {
        let pos = Position::new(column, row);
        if self.close_button.contains(pos) {
            OverlayHit::CloseButton
        } else if self.content.contains(pos) {
            OverlayHit::Content
        } else {
            OverlayHit::Background
        }
    }
}
