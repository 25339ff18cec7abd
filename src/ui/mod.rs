//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw/` - Screen drawing (gallery screen, overlay)
//! - `theme.rs` - Color themes and presets
//! - `layout.rs` - Card grid layout
//! - `image_card.rs` - Card widget

mod draw;
pub mod image_card;
pub mod layout;
pub mod theme;

// Re-export main draw function
pub use draw::draw;
