// ABOUTME: Slide layout catalogue
// ABOUTME: Declares the built-in layouts and the placeholders each one gives a new slide

use crate::units::{Emu, Frame, SlideSize};

/// The role of a placeholder slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    Object,
    Picture,
}

impl PlaceholderKind {
    /// Value of the `type` attribute on `p:ph`. Object placeholders omit it.
    pub fn xml_type(self) -> Option<&'static str> {
        match self {
            PlaceholderKind::Title => Some("title"),
            PlaceholderKind::CenteredTitle => Some("ctrTitle"),
            PlaceholderKind::Subtitle => Some("subTitle"),
            PlaceholderKind::Body => Some("body"),
            PlaceholderKind::Object => None,
            PlaceholderKind::Picture => Some("pic"),
        }
    }

    pub fn from_xml_type(value: Option<&str>) -> Self {
        match value {
            Some("title") => PlaceholderKind::Title,
            Some("ctrTitle") => PlaceholderKind::CenteredTitle,
            Some("subTitle") => PlaceholderKind::Subtitle,
            Some("body") => PlaceholderKind::Body,
            Some("pic") => PlaceholderKind::Picture,
            _ => PlaceholderKind::Object,
        }
    }

    pub fn is_title(self) -> bool {
        matches!(self, PlaceholderKind::Title | PlaceholderKind::CenteredTitle)
    }

    /// Base name used for the shape, e.g. "Title 1".
    pub fn shape_name(self) -> &'static str {
        match self {
            PlaceholderKind::Title | PlaceholderKind::CenteredTitle => "Title",
            PlaceholderKind::Subtitle => "Subtitle",
            PlaceholderKind::Body => "Text Placeholder",
            PlaceholderKind::Object => "Content Placeholder",
            PlaceholderKind::Picture => "Picture Placeholder",
        }
    }
}

/// A placeholder declared by a layout. The frame is given in inches on a
/// 10in x 7.5in slide and scaled to the actual slide size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderSpec {
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub vertical: bool,
    rect: [f64; 4],
}

const fn ph(kind: PlaceholderKind, idx: u32, rect: [f64; 4]) -> PlaceholderSpec {
    PlaceholderSpec {
        kind,
        idx,
        vertical: false,
        rect,
    }
}

const fn vert(kind: PlaceholderKind, idx: u32, rect: [f64; 4]) -> PlaceholderSpec {
    PlaceholderSpec {
        kind,
        idx,
        vertical: true,
        rect,
    }
}

impl PlaceholderSpec {
    /// Position of the placeholder on a slide of the given size.
    pub fn frame(&self, size: SlideSize) -> Frame {
        let sx = size.width.value() as f64 / SlideSize::STANDARD.width.value() as f64;
        let sy = size.height.value() as f64 / SlideSize::STANDARD.height.value() as f64;
        Frame::new(
            Emu::from_inches(self.rect[0] * sx),
            Emu::from_inches(self.rect[1] * sy),
            Emu::from_inches(self.rect[2] * sx),
            Emu::from_inches(self.rect[3] * sy),
        )
    }
}

/// A slide layout template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideLayout {
    pub name: &'static str,
    /// Value of the `type` attribute on `p:sldLayout`.
    pub layout_type: &'static str,
    pub placeholders: &'static [PlaceholderSpec],
}

use PlaceholderKind::*;

pub(crate) const MASTER_TITLE: [f64; 4] = [0.5, 0.3, 9.0, 1.25];
pub(crate) const MASTER_BODY: [f64; 4] = [0.5, 1.75, 9.0, 4.95];

pub(crate) const MASTER_PLACEHOLDERS: [PlaceholderSpec; 2] =
    [ph(Title, 0, MASTER_TITLE), ph(Body, 1, MASTER_BODY)];

const LAYOUTS: [SlideLayout; 11] = [
    SlideLayout {
        name: "Title Slide",
        layout_type: "title",
        placeholders: &[
            ph(CenteredTitle, 0, [0.75, 2.33, 8.5, 1.61]),
            ph(Subtitle, 1, [1.5, 4.25, 7.0, 1.92]),
        ],
    },
    SlideLayout {
        name: "Title and Content",
        layout_type: "obj",
        placeholders: &[ph(Title, 0, MASTER_TITLE), ph(Object, 1, MASTER_BODY)],
    },
    SlideLayout {
        name: "Section Header",
        layout_type: "secHead",
        placeholders: &[
            ph(Title, 0, [0.79, 4.82, 8.5, 1.49]),
            ph(Body, 1, [0.79, 3.18, 8.5, 1.64]),
        ],
    },
    SlideLayout {
        name: "Two Content",
        layout_type: "twoObj",
        placeholders: &[
            ph(Title, 0, MASTER_TITLE),
            ph(Object, 1, [0.5, 1.75, 4.42, 4.95]),
            ph(Object, 2, [5.08, 1.75, 4.42, 4.95]),
        ],
    },
    SlideLayout {
        name: "Comparison",
        layout_type: "twoTxTwoObj",
        placeholders: &[
            ph(Title, 0, MASTER_TITLE),
            ph(Body, 1, [0.5, 1.68, 4.42, 0.7]),
            ph(Object, 2, [0.5, 2.38, 4.42, 4.32]),
            ph(Body, 3, [5.08, 1.68, 4.42, 0.7]),
            ph(Object, 4, [5.08, 2.38, 4.42, 4.32]),
        ],
    },
    SlideLayout {
        name: "Title Only",
        layout_type: "titleOnly",
        placeholders: &[ph(Title, 0, MASTER_TITLE)],
    },
    SlideLayout {
        name: "Blank",
        layout_type: "blank",
        placeholders: &[],
    },
    SlideLayout {
        name: "Content with Caption",
        layout_type: "objTx",
        placeholders: &[
            ph(Title, 0, [0.5, 0.3, 3.29, 1.27]),
            ph(Object, 1, [3.91, 0.3, 5.59, 6.4]),
            ph(Body, 2, [0.5, 1.57, 3.29, 5.13]),
        ],
    },
    SlideLayout {
        name: "Picture with Caption",
        layout_type: "picTx",
        placeholders: &[
            ph(Title, 0, [1.96, 5.25, 6.0, 0.62]),
            ph(Picture, 1, [1.96, 0.67, 6.0, 4.5]),
            ph(Body, 2, [1.96, 5.87, 6.0, 0.88]),
        ],
    },
    SlideLayout {
        name: "Title and Vertical Text",
        layout_type: "vertTx",
        placeholders: &[ph(Title, 0, MASTER_TITLE), vert(Body, 1, MASTER_BODY)],
    },
    SlideLayout {
        name: "Vertical Title and Text",
        layout_type: "vertTitleAndTx",
        placeholders: &[
            vert(Title, 0, [7.25, 0.3, 2.25, 6.4]),
            vert(Body, 1, [0.5, 0.3, 6.58, 6.4]),
        ],
    },
];

/// All built-in layouts in template order. Layout indices passed to the
/// builder index into this slice.
pub fn default_layouts() -> &'static [SlideLayout] {
    &LAYOUTS
}

impl SlideLayout {
    pub fn placeholder(&self, idx: u32) -> Option<&PlaceholderSpec> {
        self.placeholders.iter().find(|p| p.idx == idx)
    }

    pub fn has_title(&self) -> bool {
        self.placeholders.iter().any(|p| p.kind.is_title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_matches_default_template() {
        let layouts = default_layouts();
        assert_eq!(layouts.len(), 11);
        assert_eq!(layouts[0].name, "Title Slide");
        assert_eq!(layouts[6].name, "Blank");
        assert!(layouts[6].placeholders.is_empty());
        assert!(!layouts[6].has_title());
        assert!(layouts.iter().filter(|l| l.name != "Blank").all(|l| l.has_title()));
    }

    #[test]
    fn test_placeholder_frames_scale_with_slide_size() {
        let title = default_layouts()[5].placeholder(0).unwrap();
        let standard = title.frame(SlideSize::STANDARD);
        let wide = title.frame(SlideSize::WIDESCREEN);
        assert_eq!(standard.width, wide.width);
        assert!(wide.height < standard.height);
        assert_eq!(standard.left, Emu::from_inches(0.5));
    }
}
