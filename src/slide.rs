// ABOUTME: Slide model
// ABOUTME: A slide's layout reference, placeholders, pictures and text boxes

use crate::errors::{DeckError, Result};
use crate::layout::SlideLayout;
use crate::media::{ImageData, MediaId};
use crate::shapes::{
    native_extent, Picture, Placeholder, Shape, ShapeId, ShapeKind, TextBox, TextFrame,
};
use crate::units::{Emu, Frame};
use std::fmt;

/// Stable handle to a slide. It survives reordering; the id written to the
/// package is derived from the slide's position at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlideId(pub(crate) u32);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    id: SlideId,
    layout_index: usize,
    layout_name: &'static str,
    shapes: Vec<Shape>,
}

impl Slide {
    /// Create a slide from a layout, cloning the layout's placeholders.
    pub(crate) fn from_layout(id: SlideId, layout_index: usize, layout: &SlideLayout) -> Self {
        let mut slide = Self::empty(id, layout_index, layout);
        for spec in layout.placeholders {
            let shape_id = slide.next_shape_id();
            slide.shapes.push(Shape {
                id: shape_id,
                name: format!("{} {}", spec.kind.shape_name(), shape_id - 1),
                kind: ShapeKind::Placeholder(Placeholder {
                    kind: spec.kind,
                    idx: spec.idx,
                    vertical: spec.vertical,
                    text: None,
                }),
            });
        }
        slide
    }

    pub(crate) fn empty(id: SlideId, layout_index: usize, layout: &SlideLayout) -> Self {
        Self {
            id,
            layout_index,
            layout_name: layout.name,
            shapes: Vec::new(),
        }
    }

    pub fn id(&self) -> SlideId {
        self.id
    }

    pub fn layout_index(&self) -> usize {
        self.layout_index
    }

    pub fn layout_name(&self) -> &'static str {
        self.layout_name
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id == id)
    }

    /// Id 1 belongs to the slide's shape tree itself.
    pub(crate) fn next_shape_id(&self) -> ShapeId {
        self.shapes.iter().map(|s| s.id).max().unwrap_or(1) + 1
    }

    pub(crate) fn push_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.shapes.iter().filter_map(Shape::as_placeholder)
    }

    /// Placeholder by its layout index (0 is the title, 1 the first body slot).
    pub fn placeholder(&self, idx: u32) -> Option<&Placeholder> {
        self.placeholders().find(|p| p.idx == idx)
    }

    fn placeholder_mut(&mut self, pred: impl Fn(&Placeholder) -> bool) -> Option<&mut Placeholder> {
        self.shapes.iter_mut().find_map(|s| match &mut s.kind {
            ShapeKind::Placeholder(p) if pred(&*p) => Some(p),
            _ => None,
        })
    }

    pub fn title_placeholder(&self) -> Option<&Placeholder> {
        self.placeholders().find(|p| p.kind.is_title())
    }

    /// Text of the title placeholder, if it has been set.
    pub fn title(&self) -> Option<String> {
        self.title_placeholder().and_then(Placeholder::text)
    }

    /// Text of the placeholder at index 1, if it has been set.
    pub fn subtitle(&self) -> Option<String> {
        self.placeholder(1).and_then(Placeholder::text)
    }

    /// Set the title and, when given, the subtitle. Both placeholders are
    /// checked before either is written.
    pub fn set_title(&mut self, title: &str, subtitle: Option<&str>) -> Result<()> {
        if self.title_placeholder().is_none() {
            return Err(self.missing("title"));
        }
        if subtitle.is_some() && self.placeholder(1).is_none() {
            return Err(self.missing("subtitle"));
        }

        if let Some(p) = self.placeholder_mut(|p| p.kind.is_title()) {
            p.set_text(title);
        }
        if let Some(text) = subtitle {
            if let Some(p) = self.placeholder_mut(|p| p.idx == 1) {
                p.set_text(text);
            }
        }
        Ok(())
    }

    fn missing(&self, placeholder: &'static str) -> DeckError {
        DeckError::MissingPlaceholder {
            layout: self.layout_name.to_string(),
            placeholder,
        }
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.shapes.iter().filter_map(Shape::as_picture)
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = &TextBox> {
        self.shapes.iter().filter_map(Shape::as_text_box)
    }

    /// Add a picture. A missing width or height is derived from the image's
    /// aspect ratio; with both missing the image keeps its native size.
    pub fn add_picture(
        &mut self,
        media: MediaId,
        image: &ImageData,
        left: Emu,
        top: Emu,
        width: Option<Emu>,
        height: Option<Emu>,
    ) -> ShapeId {
        let (px_w, px_h) = image.pixel_size();
        let (width, height) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, scale(w, px_h, px_w)),
            (None, Some(h)) => (scale(h, px_w, px_h), h),
            (None, None) => (native_extent(px_w), native_extent(px_h)),
        };

        let id = self.next_shape_id();
        self.shapes.push(Shape {
            id,
            name: format!("Picture {}", id - 1),
            kind: ShapeKind::Picture(Picture {
                media,
                frame: Frame::new(left, top, width, height),
                description: String::new(),
            }),
        });
        id
    }

    pub fn add_text_box(&mut self, frame: Frame, text: &str) -> ShapeId {
        let id = self.next_shape_id();
        self.shapes.push(Shape {
            id,
            name: format!("TextBox {}", id - 1),
            kind: ShapeKind::TextBox(TextBox {
                frame,
                text: TextFrame::new(text),
            }),
        });
        id
    }
}

/// `extent * num / den`, guarding against a zero denominator.
fn scale(extent: Emu, num: u32, den: u32) -> Emu {
    if den == 0 {
        return extent;
    }
    Emu((extent.value() as f64 * num as f64 / den as f64).round() as i64)
}
