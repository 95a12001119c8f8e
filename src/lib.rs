// ABOUTME: Library module for the deckhand program.
// ABOUTME: Builds PowerPoint presentations slide by slide and reads/writes PPTX packages.

// Reexport modules
pub mod builder;
pub mod config;
pub mod errors;
pub mod layout;
pub mod media;
pub mod package;
pub mod presentation;
pub mod reader;
pub mod shapes;
pub mod slide;
mod template;
pub mod units;
pub mod utils;

// Reexport common types and functions
pub use builder::PresentationBuilder;
pub use config::BuilderConfig;
pub use errors::{DeckError, Result};
pub use layout::{default_layouts, PlaceholderKind, SlideLayout};
pub use media::{ImageData, MediaId};
pub use presentation::Presentation;
pub use shapes::{Font, Placeholder, Shape, ShapeId, ShapeKind, TextFrame};
pub use slide::{Slide, SlideId};
pub use units::{Emu, Frame, SlideSize};
