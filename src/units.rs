// ABOUTME: Length units for shape geometry
// ABOUTME: Converts inches and points to EMU and resolves offsets measured from the far edge

use crate::errors::{DeckError, Result};
use std::fmt;
use std::ops::{Add, Sub};

pub const EMU_PER_INCH: i64 = 914_400;
pub const EMU_PER_PT: i64 = 12_700;

/// An absolute length in English Metric Units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Emu(pub i64);

impl Emu {
    pub fn from_inches(inches: f64) -> Self {
        Emu((inches * EMU_PER_INCH as f64).round() as i64)
    }

    pub fn from_pt(pt: f64) -> Self {
        Emu((pt * EMU_PER_PT as f64).round() as i64)
    }

    pub fn inches(self) -> f64 {
        self.0 as f64 / EMU_PER_INCH as f64
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl Add for Emu {
    type Output = Emu;

    fn add(self, rhs: Emu) -> Emu {
        Emu(self.0 + rhs.0)
    }
}

impl Sub for Emu {
    type Output = Emu;

    fn sub(self, rhs: Emu) -> Emu {
        Emu(self.0 - rhs.0)
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve a coordinate given in inches against the slide extent along the
/// same axis. Non-negative values are measured from the near edge, negative
/// values from the far edge: `extent - |value|`.
pub fn resolve_offset(inches: f64, extent: Emu) -> Emu {
    if inches >= 0.0 {
        Emu::from_inches(inches)
    } else {
        extent - Emu::from_inches(inches.abs())
    }
}

/// Left, top, width and height of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub left: Emu,
    pub top: Emu,
    pub width: Emu,
    pub height: Emu,
}

impl Frame {
    pub fn new(left: Emu, top: Emu, width: Emu, height: Emu) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a frame from `[x, y, w, h]` in inches, resolving negative `x`/`y`
    /// against the slide size. Every value must be finite and the extents
    /// must not be negative.
    pub fn from_inches(rect: [f64; 4], slide: SlideSize) -> Result<Self> {
        let [x, y, w, h] = rect;
        if let Some(bad) = rect.iter().find(|v| !v.is_finite()) {
            return Err(DeckError::ValidationError(format!(
                "Coordinates must be finite numbers, got {} in {:?}",
                bad, rect
            )));
        }
        if w < 0.0 || h < 0.0 {
            return Err(DeckError::ValidationError(format!(
                "Width and height must not be negative, got {} x {}",
                w, h
            )));
        }
        Ok(Self {
            left: resolve_offset(x, slide.width),
            top: resolve_offset(y, slide.height),
            width: Emu::from_inches(w),
            height: Emu::from_inches(h),
        })
    }
}

/// Dimensions of every slide in a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideSize {
    pub width: Emu,
    pub height: Emu,
}

impl SlideSize {
    /// 10in x 7.5in
    pub const STANDARD: SlideSize = SlideSize {
        width: Emu(9_144_000),
        height: Emu(6_858_000),
    };

    /// 10in x 5.625in
    pub const WIDESCREEN: SlideSize = SlideSize {
        width: Emu(9_144_000),
        height: Emu(5_143_500),
    };

    /// Look up a slide size by aspect ratio ("4:3" or "16:9").
    pub fn from_aspect_ratio(ratio: &str) -> Option<SlideSize> {
        match ratio.trim() {
            "4:3" => Some(Self::STANDARD),
            "16:9" => Some(Self::WIDESCREEN),
            _ => None,
        }
    }

    /// Value of the `type` attribute on `p:sldSz`.
    pub(crate) fn type_name(&self) -> &'static str {
        if *self == Self::WIDESCREEN {
            "screen16x9"
        } else if *self == Self::STANDARD {
            "screen4x3"
        } else {
            "custom"
        }
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inch_and_point_conversion() {
        assert_eq!(Emu::from_inches(1.0), Emu(914_400));
        assert_eq!(Emu::from_inches(0.5), Emu(457_200));
        assert_eq!(Emu::from_pt(10.0), Emu(127_000));
        assert_eq!(Emu(1_828_800).inches(), 2.0);
    }

    #[test]
    fn test_negative_offset_is_measured_from_far_edge() {
        let width = SlideSize::STANDARD.width;
        assert_eq!(resolve_offset(-1.0, width), Emu(9_144_000 - 914_400));
        assert_eq!(resolve_offset(2.5, width), Emu(2_286_000));
        assert_eq!(resolve_offset(0.0, width), Emu(0));
    }

    #[test]
    fn test_frame_from_inches() {
        let frame = Frame::from_inches([-1.0, -2.0, 2.0, 1.0], SlideSize::STANDARD).unwrap();
        assert_eq!(frame.left, Emu(9_144_000 - 914_400));
        assert_eq!(frame.top, Emu(6_858_000 - 1_828_800));
        assert_eq!(frame.width, Emu(1_828_800));
        assert_eq!(frame.height, Emu(914_400));
    }

    #[test]
    fn test_frame_rejects_non_finite_and_negative_extents() {
        let size = SlideSize::STANDARD;
        for rect in [
            [f64::NAN, 1.0, 1.0, 1.0],
            [0.0, f64::INFINITY, 1.0, 1.0],
            [0.0, 0.0, f64::NEG_INFINITY, 1.0],
            [0.0, 0.0, -2.0, 1.0],
            [0.0, 0.0, 1.0, -0.5],
        ] {
            let err = Frame::from_inches(rect, size).unwrap_err();
            assert!(matches!(err, DeckError::ValidationError(_)), "{:?}", rect);
        }
        assert!(Frame::from_inches([-0.5, -0.5, 0.0, 0.0], size).is_ok());
    }

    #[test]
    fn test_aspect_ratio_lookup() {
        assert_eq!(SlideSize::from_aspect_ratio("16:9"), Some(SlideSize::WIDESCREEN));
        assert_eq!(SlideSize::from_aspect_ratio(" 4:3 "), Some(SlideSize::STANDARD));
        assert_eq!(SlideSize::from_aspect_ratio("21:9"), None);
    }
}
