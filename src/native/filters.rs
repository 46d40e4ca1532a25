//! Backend-native filter objects.
//!
//! These play the role of the raster backend's own filter graph: opaque, reference-counted
//! objects that can only be inspected through a few pattern queries. The value filters in
//! [`crate::effects`] convert to and from them at dispatch/record time.

use std::sync::{Arc, LazyLock};

use crate::effects::blend::BlendMode;
use crate::effects::image_filter::TileMode;
use crate::effects::mask_filter::BlurStyle;
use crate::foundation::core::{Affine, Color, Vec2};
use crate::foundation::math::{linear_to_srgb, srgb_to_linear};

static SRGB_TO_LINEAR: LazyLock<Arc<NativeColorFilter>> =
    LazyLock::new(|| Arc::new(NativeColorFilter::SrgbToLinearGamma));
static LINEAR_TO_SRGB: LazyLock<Arc<NativeColorFilter>> =
    LazyLock::new(|| Arc::new(NativeColorFilter::LinearToSrgbGamma));

/// A backend color filter.
#[derive(Debug)]
pub enum NativeColorFilter {
    /// Blend a constant color onto the input.
    Mode {
        /// Constant source color.
        color: Color,
        /// Operator, with the constant as source and the input as destination.
        mode: BlendMode,
    },
    /// Row-major 4x5 matrix on unpremultiplied unit channels; last column is a unit offset.
    Matrix([f32; 20]),
    /// sRGB-encoded to linear.
    SrgbToLinearGamma,
    /// Linear to sRGB-encoded.
    LinearToSrgbGamma,
    /// `outer(inner(c))`.
    Compose {
        /// Applied second.
        outer: Arc<NativeColorFilter>,
        /// Applied first.
        inner: Arc<NativeColorFilter>,
    },
    /// Per-channel lookup tables, ordered `[a, r, g, b]`.
    Table(Box<[[u8; 256]; 4]>),
}

impl NativeColorFilter {
    /// Constant-color blend filter.
    pub fn mode(color: Color, mode: BlendMode) -> Arc<Self> {
        Arc::new(Self::Mode { color, mode })
    }

    /// Color matrix filter.
    pub fn matrix(m: &[f32; 20]) -> Arc<Self> {
        Arc::new(Self::Matrix(*m))
    }

    /// Shared sRGB-to-linear instance.
    pub fn srgb_to_linear_gamma() -> Arc<Self> {
        Arc::clone(&SRGB_TO_LINEAR)
    }

    /// Shared linear-to-sRGB instance.
    pub fn linear_to_srgb_gamma() -> Arc<Self> {
        Arc::clone(&LINEAR_TO_SRGB)
    }

    /// Compose two filters.
    pub fn compose(outer: Arc<Self>, inner: Arc<Self>) -> Arc<Self> {
        Arc::new(Self::Compose { outer, inner })
    }

    /// Lookup-table filter.
    pub fn table(tables: [[u8; 256]; 4]) -> Arc<Self> {
        Arc::new(Self::Table(Box::new(tables)))
    }

    /// The `(color, mode)` pair when this is a constant-color blend.
    pub fn as_color_mode(&self) -> Option<(Color, BlendMode)> {
        match self {
            Self::Mode { color, mode } => Some((*color, *mode)),
            _ => None,
        }
    }

    /// The 20 matrix coefficients when this is a matrix filter.
    pub fn as_color_matrix(&self) -> Option<[f32; 20]> {
        match self {
            Self::Matrix(m) => Some(*m),
            _ => None,
        }
    }

    /// Return `true` for the sRGB-to-linear gamma filter.
    pub fn is_srgb_to_linear(&self) -> bool {
        matches!(self, Self::SrgbToLinearGamma)
    }

    /// Return `true` for the linear-to-sRGB gamma filter.
    pub fn is_linear_to_srgb(&self) -> bool {
        matches!(self, Self::LinearToSrgbGamma)
    }

    /// Apply the filter to a single straight-alpha color.
    pub fn filter_color(&self, c: Color) -> Color {
        match self {
            Self::Mode { color, mode } => mode.blend_colors(*color, c),
            Self::Matrix(m) => apply_color_matrix(m, c),
            Self::SrgbToLinearGamma => map_rgb(c, srgb_to_linear),
            Self::LinearToSrgbGamma => map_rgb(c, linear_to_srgb),
            Self::Compose { outer, inner } => outer.filter_color(inner.filter_color(c)),
            Self::Table(t) => Color::from_argb(
                t[0][c.alpha() as usize],
                t[1][c.red() as usize],
                t[2][c.green() as usize],
                t[3][c.blue() as usize],
            ),
        }
    }
}

fn map_rgb(c: Color, f: fn(f32) -> f32) -> Color {
    let [a, r, g, b] = c.to_argb_f32();
    Color::from_argb_f32([a, f(r), f(g), f(b)])
}

pub(crate) fn apply_color_matrix(m: &[f32; 20], c: Color) -> Color {
    let [a, r, g, b] = c.to_argb_f32();
    let row = |i: usize| m[i] * r + m[i + 1] * g + m[i + 2] * b + m[i + 3] * a + m[i + 4];
    Color::from_argb_f32([row(15), row(0), row(5), row(10)])
}

/// A backend mask filter.
#[derive(Debug)]
pub enum NativeMaskFilter {
    /// Gaussian blur of the coverage mask.
    Blur {
        /// Which side(s) of the edge keep the blur.
        style: BlurStyle,
        /// Standard deviation in local units.
        sigma: f32,
    },
    /// Coverage remapping table.
    Table(Box<[u8; 256]>),
}

impl NativeMaskFilter {
    /// Blur mask filter.
    pub fn blur(style: BlurStyle, sigma: f32) -> Arc<Self> {
        Arc::new(Self::Blur { style, sigma })
    }

    /// The `(style, sigma)` pair when this is a blur.
    pub fn as_blur(&self) -> Option<(BlurStyle, f32)> {
        match self {
            Self::Blur { style, sigma } => Some((*style, *sigma)),
            Self::Table(_) => None,
        }
    }
}

/// A backend image filter.
#[derive(Debug)]
pub enum NativeImageFilter {
    /// Separable gaussian blur.
    Blur {
        /// Horizontal sigma.
        sigma_x: f32,
        /// Vertical sigma.
        sigma_y: f32,
        /// Edge sampling behavior.
        tile_mode: TileMode,
    },
    /// Morphological dilate.
    Dilate {
        /// Horizontal radius.
        radius_x: f32,
        /// Vertical radius.
        radius_y: f32,
    },
    /// Morphological erode.
    Erode {
        /// Horizontal radius.
        radius_x: f32,
        /// Vertical radius.
        radius_y: f32,
    },
    /// Resample through a transform.
    Matrix(Affine),
    /// Apply a color filter to every pixel.
    ColorFilter(Arc<NativeColorFilter>),
    /// `outer(inner(img))`.
    Compose {
        /// Applied second.
        outer: Arc<NativeImageFilter>,
        /// Applied first.
        inner: Arc<NativeImageFilter>,
    },
    /// Translate the input.
    Offset(Vec2),
}

#[cfg(test)]
#[path = "../../tests/unit/native/filters.rs"]
mod tests;
