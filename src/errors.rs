// ABOUTME: Error types for the deckhand library
// ABOUTME: Provides structured error handling for building, saving and opening presentations

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Failed to read or write file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Invalid layout index {index}: presentation has {available} layouts")]
    InvalidLayoutIndex { index: usize, available: usize },

    #[error("Slide layout '{layout}' has no {placeholder} placeholder")]
    MissingPlaceholder {
        layout: String,
        placeholder: &'static str,
    },

    #[error("Argument lists differ in length: {paths} paths, {dims} dimensions, {positions} positions")]
    LengthMismatch {
        paths: usize,
        dims: usize,
        positions: usize,
    },

    #[error("Unknown slide: {0}")]
    UnknownSlide(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PPTX package error: {0}")]
    PptxError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Presentation has no output path; use save_as instead")]
    MissingOutputPath,
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for DeckError {
    fn from(err: zip::result::ZipError) -> Self {
        DeckError::PptxError(format!("ZIP operation failed: {}", err))
    }
}

impl From<quick_xml::Error> for DeckError {
    fn from(err: quick_xml::Error) -> Self {
        DeckError::PptxError(format!("XML parsing failed: {}", err))
    }
}

impl From<image::ImageError> for DeckError {
    fn from(err: image::ImageError) -> Self {
        DeckError::ImageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
