use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Highest JPEG quality accepted by the encoder.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Plugin configuration, read from `plugins."save-in-gallery"` in the
/// Tauri configuration. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Overrides the OS pictures directory as the gallery root (desktop only).
    pub gallery_root: Option<PathBuf>,
    /// JPEG encoding quality, 1-100. PNG and WebP are always lossless.
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gallery_root: None,
            jpeg_quality: MAX_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// The configured JPEG quality clamped into the encoder's range.
    pub fn effective_jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, MAX_JPEG_QUALITY)
    }
}
