// ABOUTME: Configuration module for the deckhand library
// ABOUTME: Provides builder defaults and environment variable handling

use crate::errors::{DeckError, Result};
use crate::shapes::Font;
use crate::units::SlideSize;
use log::warn;
use std::env;

/// Defaults applied by [`crate::PresentationBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuilderConfig {
    pub font_name: String,
    pub font_size_pt: f64,
    pub aspect_ratio: String, // "4:3" or "16:9"
    pub creator: String,
    /// Frame of the single picture placed by `add_image`, in inches:
    /// left, top, and the margins subtracted from the slide width and height.
    pub image_left: f64,
    pub image_top: f64,
    pub image_width_margin: f64,
    pub image_height_margin: f64,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            font_name: "Calibri".to_string(),
            font_size_pt: 10.0,
            aspect_ratio: "4:3".to_string(),
            creator: "deckhand".to_string(),
            image_left: 0.5,
            image_top: 1.5,
            image_width_margin: 1.0,
            image_height_margin: 3.0,
        }
    }
}

impl BuilderConfig {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from `DECKHAND_*` values returned by `lookup`.
    /// Missing values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let font_name = lookup("DECKHAND_FONT_NAME").unwrap_or(defaults.font_name);
        let font_size_pt = match lookup("DECKHAND_FONT_SIZE_PT") {
            Some(value) => value.trim().parse::<f64>().map_err(|e| {
                DeckError::ConfigError(format!(
                    "DECKHAND_FONT_SIZE_PT must be a number, got {:?}: {}",
                    value, e
                ))
            })?,
            None => defaults.font_size_pt,
        };
        if !font_size_pt.is_finite() || font_size_pt <= 0.0 {
            return Err(DeckError::ConfigError(format!(
                "Font size must be positive, got {}",
                font_size_pt
            )));
        }
        let aspect_ratio = lookup("DECKHAND_ASPECT_RATIO").unwrap_or(defaults.aspect_ratio);
        let creator = lookup("DECKHAND_CREATOR").unwrap_or(defaults.creator);

        Ok(Self {
            font_name,
            font_size_pt,
            aspect_ratio,
            creator,
            ..Self::default()
        })
    }

    /// Font set on every run of a text box.
    pub fn default_font(&self) -> Font {
        Font::new(&self.font_name, self.font_size_pt)
    }

    /// Slide size for the configured aspect ratio, falling back to 4:3.
    pub fn slide_size(&self) -> SlideSize {
        SlideSize::from_aspect_ratio(&self.aspect_ratio).unwrap_or_else(|| {
            warn!(
                "Unsupported aspect ratio: {}. Using 4:3 instead.",
                self.aspect_ratio
            );
            SlideSize::STANDARD
        })
    }
}
