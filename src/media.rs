// ABOUTME: Image media handling for pictures
// ABOUTME: Loads image files, detects their format and reads pixel dimensions

use crate::errors::{DeckError, Result};
use crate::utils::validate_file_exists;
use image::ImageFormat;
use log::debug;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Index of an image part in a presentation's media store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(pub(crate) usize);

/// Raw bytes of an image together with what was learned from decoding its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    bytes: Vec<u8>,
    format: ImageFormat,
    pixel_width: u32,
    pixel_height: u32,
}

impl ImageData {
    /// Read an image file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        validate_file_exists(path)?;
        let bytes = fs::read(path).map_err(DeckError::FileReadError)?;
        Self::from_bytes(bytes).map_err(|e| match e {
            DeckError::ImageError(msg) => DeckError::ImageError(format!("{:?}: {}", path, msg)),
            other => other,
        })
    }

    /// Wrap in-memory image bytes. The format must be one a presentation can embed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)?;
        if media_type(format).is_none() {
            return Err(DeckError::ImageError(format!(
                "Unsupported image format: {:?}",
                format
            )));
        }

        let (pixel_width, pixel_height) = image::io::Reader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()?;
        debug!(
            "Loaded {:?} image, {}x{} px, {} bytes",
            format,
            pixel_width,
            pixel_height,
            bytes.len()
        );

        Ok(Self {
            bytes,
            format,
            pixel_width,
            pixel_height,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    /// File extension used for the media part.
    pub fn extension(&self) -> &'static str {
        media_type(self.format).map(|(ext, _)| ext).unwrap_or("bin")
    }

    pub fn content_type(&self) -> &'static str {
        media_type(self.format)
            .map(|(_, ct)| ct)
            .unwrap_or("application/octet-stream")
    }
}

/// Extension and content type for the image formats a slide can embed.
pub(crate) fn media_type(format: ImageFormat) -> Option<(&'static str, &'static str)> {
    match format {
        ImageFormat::Png => Some(("png", "image/png")),
        ImageFormat::Jpeg => Some(("jpeg", "image/jpeg")),
        ImageFormat::Gif => Some(("gif", "image/gif")),
        ImageFormat::Bmp => Some(("bmp", "image/bmp")),
        ImageFormat::Tiff => Some(("tiff", "image/tiff")),
        _ => None,
    }
}

/// All extension/content-type pairs registered as defaults in `[Content_Types].xml`.
pub(crate) const MEDIA_DEFAULTS: [(&str, &str); 5] = [
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tiff", "image/tiff"),
];
