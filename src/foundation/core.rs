use crate::foundation::math::{mul_div255_u8, u8_to_unit, unit_to_u8};

pub use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Vec2};

/// Identifier of an embedded platform view.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ViewId(pub i64);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Straight-alpha color packed as `0xAARRGGBB`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct Color(pub u32);

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0x0000_0000);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    /// Opaque red.
    pub const RED: Self = Self(0xFFFF_0000);
    /// Opaque green.
    pub const GREEN: Self = Self(0xFF00_FF00);
    /// Opaque blue.
    pub const BLUE: Self = Self(0xFF00_00FF);

    /// Pack individual channels.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    /// Build from unit floats `[a, r, g, b]`, clamping each channel.
    pub fn from_argb_f32(argb: [f32; 4]) -> Self {
        Self::from_argb(
            unit_to_u8(argb[0]),
            unit_to_u8(argb[1]),
            unit_to_u8(argb[2]),
            unit_to_u8(argb[3]),
        )
    }

    /// Alpha channel.
    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red channel.
    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel.
    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel.
    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Channels as unit floats `[a, r, g, b]`.
    pub fn to_argb_f32(self) -> [f32; 4] {
        [
            u8_to_unit(self.alpha()),
            u8_to_unit(self.red()),
            u8_to_unit(self.green()),
            u8_to_unit(self.blue()),
        ]
    }

    /// Same color with a replaced alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0x00FF_FFFF) | ((a as u32) << 24))
    }

    /// Scale the alpha channel by `opacity` in `[0, 1]`.
    pub fn modulate_opacity(self, opacity: f32) -> Self {
        if opacity >= 1.0 {
            return self;
        }
        let op = u16::from(unit_to_u8(opacity));
        self.with_alpha(mul_div255_u8(u16::from(self.alpha()), op))
    }

    /// Return `true` when alpha is 255.
    pub const fn is_opaque(self) -> bool {
        self.alpha() == 0xFF
    }

    /// Return `true` when alpha is 0.
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }

    /// Premultiplied RGBA8, the layout used by the CPU raster path.
    pub fn to_premul_rgba8(self) -> [u8; 4] {
        let a = u16::from(self.alpha());
        [
            mul_div255_u8(u16::from(self.red()), a),
            mul_div255_u8(u16::from(self.green()), a),
            mul_div255_u8(u16::from(self.blue()), a),
            self.alpha(),
        ]
    }
}

/// Integer pixel rectangle, half-open on the right and bottom edges.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct IRect {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl IRect {
    /// Build from edges.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The canonical empty rect.
    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Width, or 0 when inverted.
    pub fn width(self) -> i32 {
        (self.right - self.left).max(0)
    }

    /// Height, or 0 when inverted.
    pub fn height(self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    /// Return `true` when the rect covers no pixel.
    pub fn is_empty(self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// Return `true` when both rects share at least one pixel.
    pub fn intersects(self, other: IRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Smallest rect containing both. Empty inputs are ignored.
    pub fn join(self, other: IRect) -> IRect {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        IRect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Convert to a float rect.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.left),
            f64::from(self.top),
            f64::from(self.right),
            f64::from(self.bottom),
        )
    }
}

/// Grow `r` outward to integer boundaries.
pub fn round_out(r: Rect) -> IRect {
    IRect::new(
        r.x0.floor() as i32,
        r.y0.floor() as i32,
        r.x1.ceil() as i32,
        r.y1.ceil() as i32,
    )
}

/// Shrink `r` inward to integer boundaries.
pub fn round_in(r: Rect) -> IRect {
    IRect::new(
        r.x0.ceil() as i32,
        r.y0.ceil() as i32,
        r.x1.floor() as i32,
        r.y1.floor() as i32,
    )
}

/// Return `true` when `r` has no positive area (NaN edges count as empty).
pub fn rect_is_empty(r: Rect) -> bool {
    !(r.x0 < r.x1 && r.y0 < r.y1)
}

/// Return `true` when `a` and `b` overlap with positive area.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0.max(b.x0) < a.x1.min(b.x1) && a.y0.max(b.y0) < a.y1.min(b.y1)
}

/// Intersection of `a` and `b`, or `None` when they do not overlap.
pub fn intersect_rect(a: Rect, b: Rect) -> Option<Rect> {
    let r = Rect::new(a.x0.max(b.x0), a.y0.max(b.y0), a.x1.min(b.x1), a.y1.min(b.y1));
    (!rect_is_empty(r)).then_some(r)
}

/// Join `r` into an accumulator where `None` stands for the empty rect.
///
/// Unlike `Rect::union`, joining an empty rect leaves the accumulator untouched.
pub fn join_rect(acc: Option<Rect>, r: Rect) -> Option<Rect> {
    if rect_is_empty(r) {
        return acc;
    }
    Some(match acc {
        Some(a) => a.union(r),
        None => r,
    })
}

/// A rect large enough to stand in for "no clip".
pub fn unbounded_rect() -> Rect {
    const BIG: f64 = 1.0e9;
    Rect::new(-BIG, -BIG, BIG, BIG)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
