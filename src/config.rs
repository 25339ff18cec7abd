use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::feed::DEFAULT_FEED_URL;
use crate::ui::layout::GridLayout;
use crate::ui::theme::{parse_hex_color, Theme};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub picker: PickerConfig,
    pub appearance: AppearanceConfig,
    pub layout: LayoutConfig,
    pub images: ImagesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// JSON feed of APOD records
    pub url: String,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            user_agent: concat!("darkwall-apod/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Oldest year offered by the year selectors (APOD started in 1995)
    pub first_year: i32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self { first_year: 1995 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    /// Preset: "darkwall", "catppuccin-mocha", "catppuccin-latte", "nord", "gruvbox"
    pub theme: String,
    /// Optional hex override for the accent color
    pub accent: Option<String>,
    /// Approximate colors with the 256-color palette
    pub colors_256: bool,
    pub trigger_label: String,
    pub busy_label: String,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: "darkwall".to_string(),
            accent: None,
            colors_256: false,
            trigger_label: "Get Space Images".to_string(),
            busy_label: "Fetching...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Cards per row
    pub columns: u16,
    /// Rows of cards per page
    pub visible_rows: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            columns: 3,
            visible_rows: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Render previews with Kitty/Sixel/iTerm2 graphics when available
    pub enabled: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/darkwall-apod/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("darkwall-apod")
            .join("config.toml")
    }

    /// Load from `path` (tilde-expanded), or the default location.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).as_ref()),
            None => Self::default_path(),
        };
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            tracing::info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Theme preset with overrides applied. Unknown presets and bad colors
    /// fall back with a warning.
    pub fn resolve_theme(&self) -> Theme {
        let mut theme = Theme::from_preset(&self.appearance.theme).unwrap_or_else(|| {
            tracing::warn!("Unknown theme {:?}, using default", self.appearance.theme);
            Theme::default()
        });

        if let Some(ref accent) = self.appearance.accent {
            match parse_hex_color(accent) {
                Ok(color) => theme.accent = color,
                Err(e) => tracing::warn!("Ignoring accent {:?}: {}", accent, e),
            }
        }

        if self.appearance.colors_256 {
            theme = theme.to_256_color();
        }
        theme
    }

    pub fn grid_layout(&self) -> GridLayout {
        GridLayout::new(self.layout.columns, self.layout.visible_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.picker.first_year, 1995);
        assert_eq!(config.appearance.trigger_label, "Get Space Images");
        assert_eq!(config.appearance.busy_label, "Fetching...");
        assert!(config.images.enabled);
    }

    #[test]
    fn test_partial_file() {
        let config = Config::parse(
            r##"
            [feed]
            url = "http://localhost:8080/apod.json"

            [appearance]
            theme = "nord"
            accent = "#ff0000"

            [layout]
            columns = 4
            "##,
        )
        .unwrap();

        assert_eq!(config.feed.url, "http://localhost:8080/apod.json");
        assert!(config.feed.user_agent.starts_with("darkwall-apod/"));
        assert_eq!(config.layout.columns, 4);
        assert_eq!(config.layout.visible_rows, 2);

        let theme = config.resolve_theme();
        assert_eq!(theme.accent, Color::Rgb(255, 0, 0));
        assert_eq!(theme.background, Theme::nord().background);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = Config::parse(
            r#"
            [appearance]
            theme = "no-such-theme"
            accent = "not-a-color"
            "#,
        )
        .unwrap();
        let theme = config.resolve_theme();
        assert_eq!(theme.accent, Theme::darkwall().accent);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::parse("[feed\nurl = 1").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Some("/nonexistent/darkwall-apod/config.toml")).unwrap();
        assert_eq!(config.layout.columns, 3);
    }
}
