//! Picture previews for cards and the overlay.
//!
//! Uses whatever graphics protocol the terminal answers to (Kitty, Sixel,
//! iTerm2). Terminals without one get text-only cards. Downloads happen in
//! background tasks; this manager only tracks what is cached, in flight, or
//! failed, so drawing never waits on the network.

use image::DynamicImage;
use parking_lot::Mutex;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Where a preview is drawn. Each target keeps its own protocol so that
/// neither is re-encoded when both are on screen at different sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTarget {
    Card,
    Overlay,
}

struct Preview {
    card: Arc<Mutex<StatefulProtocol>>,
    overlay: Arc<Mutex<StatefulProtocol>>,
}

/// Preview cache keyed by image URL
pub struct PreviewManager {
    /// The picker determines the graphics protocol and font size
    picker: Option<Picker>,
    cache: HashMap<String, Preview>,
    pending: HashSet<String>,
    failed: HashSet<String>,
}

impl PreviewManager {
    /// Query the terminal for a graphics protocol.
    /// MUST be called before entering raw mode / alternate screen
    pub fn detect() -> Self {
        let picker = match Picker::from_query_stdio() {
            Ok(p) => {
                tracing::info!("Graphics protocol detected: {:?}", p.protocol_type());
                Some(p)
            }
            Err(e) => {
                tracing::debug!("No graphics protocol available: {}", e);
                None
            }
        };
        Self::with_picker(picker)
    }

    /// Text-only previews
    pub fn disabled() -> Self {
        Self::with_picker(None)
    }

    pub(crate) fn with_picker(picker: Option<Picker>) -> Self {
        Self {
            picker,
            cache: HashMap::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    pub fn supports_graphics(&self) -> bool {
        self.picker.is_some()
    }

    pub fn get_cached(&self, url: &str, target: PreviewTarget) -> Option<Arc<Mutex<StatefulProtocol>>> {
        self.cache.get(url).map(|preview| match target {
            PreviewTarget::Card => Arc::clone(&preview.card),
            PreviewTarget::Overlay => Arc::clone(&preview.overlay),
        })
    }

    /// Claim `url` for loading. Returns `true` exactly once per URL until it
    /// is loaded, failed, or the cache is cleared.
    pub fn claim(&mut self, url: &str) -> bool {
        if !self.supports_graphics()
            || url.is_empty()
            || self.cache.contains_key(url)
            || self.pending.contains(url)
            || self.failed.contains(url)
        {
            return false;
        }
        self.pending.insert(url.to_string());
        true
    }

    /// Store a downloaded picture
    pub fn insert(&mut self, url: &str, image: DynamicImage) {
        self.pending.remove(url);
        if let Some(picker) = self.picker.as_mut() {
            let card = picker.new_resize_protocol(image.clone());
            let overlay = picker.new_resize_protocol(image);
            self.cache.insert(
                url.to_string(),
                Preview {
                    card: Arc::new(Mutex::new(card)),
                    overlay: Arc::new(Mutex::new(overlay)),
                },
            );
        }
    }

    /// Remember that `url` could not be loaded so it is not retried
    pub fn mark_failed(&mut self, url: &str) {
        self.pending.remove(url);
        self.failed.insert(url.to_string());
    }

    /// Forget everything; called when a new fetch cycle replaces the cards
    pub fn clear(&mut self) {
        self.cache.clear();
        self.pending.clear();
        self.failed.clear();
    }
}
