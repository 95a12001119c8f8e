// ABOUTME: Shape model for slides
// ABOUTME: Placeholders, pictures and text boxes along with their text frames and fonts

use crate::layout::PlaceholderKind;
use crate::media::MediaId;
use crate::units::{Emu, Frame};

/// Identifier of a shape, unique within its slide.
pub type ShapeId = u32;

/// Font attributes of a text run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Font {
    pub name: Option<String>,
    /// Size in points.
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl Font {
    pub fn new(name: &str, size: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            size: Some(size),
            ..Default::default()
        }
    }

    /// Size in hundredths of a point, as stored in `a:rPr/@sz`.
    pub(crate) fn size_centipoints(&self) -> Option<u32> {
        self.size.map(|pt| (pt * 100.0).round() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub text: String,
    pub font: Font,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Text content of a shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    pub fn new(text: &str) -> Self {
        let mut frame = Self::default();
        frame.set_text(text);
        frame
    }

    /// Replace all content. Each line becomes a paragraph holding a single run;
    /// an empty line gives a paragraph with no runs.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                runs: if line.is_empty() {
                    Vec::new()
                } else {
                    vec![Run {
                        text: line.to_string(),
                        font: Font::default(),
                    }]
                },
            })
            .collect();
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Set the same font on every run of every paragraph, replacing whatever
    /// formatting the runs had.
    pub fn apply_font(&mut self, font: &Font) {
        for paragraph in &mut self.paragraphs {
            for run in &mut paragraph.runs {
                run.font = font.clone();
            }
        }
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(|p| p.runs.iter())
    }
}

/// A layout-declared slot copied onto a slide. Its geometry is inherited
/// from the layout, so it carries no frame of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub vertical: bool,
    pub text: Option<TextFrame>,
}

impl Placeholder {
    pub fn text(&self) -> Option<String> {
        self.text.as_ref().map(TextFrame::text)
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = Some(TextFrame::new(text));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub media: MediaId,
    pub frame: Frame,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub frame: Frame,
    pub text: TextFrame,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Placeholder(Placeholder),
    Picture(Picture),
    TextBox(TextBox),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    pub kind: ShapeKind,
}

impl Shape {
    /// Absolute position, if the shape has its own geometry.
    pub fn frame(&self) -> Option<Frame> {
        match &self.kind {
            ShapeKind::Placeholder(_) => None,
            ShapeKind::Picture(p) => Some(p.frame),
            ShapeKind::TextBox(t) => Some(t.frame),
        }
    }

    pub fn as_placeholder(&self) -> Option<&Placeholder> {
        match &self.kind {
            ShapeKind::Placeholder(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&Picture> {
        match &self.kind {
            ShapeKind::Picture(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_picture_mut(&mut self) -> Option<&mut Picture> {
        match &mut self.kind {
            ShapeKind::Picture(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_text_box(&self) -> Option<&TextBox> {
        match &self.kind {
            ShapeKind::TextBox(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_box_mut(&mut self) -> Option<&mut TextBox> {
        match &mut self.kind {
            ShapeKind::TextBox(t) => Some(t),
            _ => None,
        }
    }
}

/// Native size of an image at 72 dpi.
pub(crate) fn native_extent(pixels: u32) -> Emu {
    Emu(pixels as i64 * crate::units::EMU_PER_PT)
}
