//! Aspect-ratio-preserving size fitting.

use std::fmt;

/// A pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum of two sizes.
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<Size> for iced::Size {
    fn from(size: Size) -> Self {
        iced::Size::new(size.width as f32, size.height as f32)
    }
}

/// Maximum display dimensions. Both sides are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    max_width: u32,
    max_height: u32,
}

impl Bounds {
    /// Returns `None` when either side is zero.
    pub fn new(max_width: u32, max_height: u32) -> Option<Self> {
        if max_width == 0 || max_height == 0 {
            return None;
        }
        Some(Self {
            max_width,
            max_height,
        })
    }

    /// Like [`Bounds::new`], raising zero sides to one pixel.
    pub fn saturating(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width: max_width.max(1),
            max_height: max_height.max(1),
        }
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }
}

/// Shrinks `intrinsic` by a single uniform factor so it fits inside `bounds`.
///
/// Sizes that already fit are returned unchanged; images are never enlarged.
/// The limiting axis lands exactly on its bound and the other axis is
/// truncated, i.e. `floor(other * bound / limiting)` computed in integers.
pub fn compute_fitted_size(intrinsic: Size, bounds: Bounds) -> Size {
    let (w, h) = (intrinsic.width as u64, intrinsic.height as u64);
    let (max_w, max_h) = (bounds.max_width as u64, bounds.max_height as u64);

    if w <= max_w && h <= max_h {
        return intrinsic;
    }

    // max_w / w <= max_h / h, cross-multiplied.
    // A zero axis never ends up as the divisor: it cannot be the limiting one.
    if max_w * h <= max_h * w {
        Size::new(max_w as u32, (h * max_w / w) as u32)
    } else {
        Size::new((w * max_h / h) as u32, max_h as u32)
    }
}
