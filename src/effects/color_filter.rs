use std::sync::{Arc, LazyLock};

use crate::effects::blend::BlendMode;
use crate::foundation::core::Color;
use crate::native::filters::{NativeColorFilter, apply_color_matrix};

static SRGB_TO_LINEAR: LazyLock<Arc<ColorFilter>> =
    LazyLock::new(|| Arc::new(ColorFilter::SrgbToLinearGamma));
static LINEAR_TO_SRGB: LazyLock<Arc<ColorFilter>> =
    LazyLock::new(|| Arc::new(ColorFilter::LinearToSrgbGamma));

/// Discriminant of a [`ColorFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFilterType {
    Blend,
    Matrix,
    SrgbToLinearGamma,
    LinearToSrgbGamma,
    Unknown,
}

/// Immutable per-pixel color transform.
///
/// Values are compared structurally. The `Unknown` variant wraps a backend filter that could
/// not be recognized and compares by identity of that object, since no content comparison
/// exists for it.
#[derive(Clone, Debug)]
pub enum ColorFilter {
    /// Blend a constant color (as source) onto every pixel (as destination).
    Blend {
        /// The constant color.
        color: Color,
        /// The blend operator.
        mode: BlendMode,
    },
    /// Row-major 4x5 color matrix over unit channels.
    Matrix(Box<[f32; 20]>),
    /// Convert sRGB-encoded channels to linear.
    SrgbToLinearGamma,
    /// Convert linear channels to sRGB encoding.
    LinearToSrgbGamma,
    /// Passthrough of a backend filter this crate cannot inspect.
    Unknown(Arc<NativeColorFilter>),
}

impl ColorFilter {
    /// Constant-color blend filter.
    pub fn blend(color: Color, mode: BlendMode) -> Self {
        Self::Blend { color, mode }
    }

    /// Matrix filter. The coefficients are copied.
    pub fn matrix(m: &[f32; 20]) -> Self {
        Self::Matrix(Box::new(*m))
    }

    /// The process-wide sRGB-to-linear filter.
    pub fn srgb_to_linear() -> Arc<Self> {
        Arc::clone(&SRGB_TO_LINEAR)
    }

    /// The process-wide linear-to-sRGB filter.
    pub fn linear_to_srgb() -> Arc<Self> {
        Arc::clone(&LINEAR_TO_SRGB)
    }

    pub fn kind(&self) -> ColorFilterType {
        match self {
            Self::Blend { .. } => ColorFilterType::Blend,
            Self::Matrix(_) => ColorFilterType::Matrix,
            Self::SrgbToLinearGamma => ColorFilterType::SrgbToLinearGamma,
            Self::LinearToSrgbGamma => ColorFilterType::LinearToSrgbGamma,
            Self::Unknown(_) => ColorFilterType::Unknown,
        }
    }

    pub fn as_blend(&self) -> Option<(Color, BlendMode)> {
        match self {
            Self::Blend { color, mode } => Some((*color, *mode)),
            _ => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&[f32; 20]> {
        match self {
            Self::Matrix(m) => Some(&**m),
            _ => None,
        }
    }

    /// A fresh shared handle holding an equal copy of this filter.
    ///
    /// The gamma filters are singletons, so their shared form is the singleton itself.
    pub fn shared(&self) -> Arc<Self> {
        match self {
            Self::SrgbToLinearGamma => Self::srgb_to_linear(),
            Self::LinearToSrgbGamma => Self::linear_to_srgb(),
            other => Arc::new(other.clone()),
        }
    }

    /// Recognize a backend filter. Only a missing filter maps to `None`.
    pub fn from_native(native: Option<&Arc<NativeColorFilter>>) -> Option<Arc<Self>> {
        let native = native?;
        if let Some((color, mode)) = native.as_color_mode() {
            return Some(Arc::new(Self::blend(color, mode)));
        }
        if let Some(m) = native.as_color_matrix() {
            return Some(Arc::new(Self::matrix(&m)));
        }
        if native.is_srgb_to_linear() {
            return Some(Self::srgb_to_linear());
        }
        if native.is_linear_to_srgb() {
            return Some(Self::linear_to_srgb());
        }
        Some(Arc::new(Self::Unknown(Arc::clone(native))))
    }

    /// The backend equivalent of this filter.
    pub fn to_native(&self) -> Arc<NativeColorFilter> {
        match self {
            Self::Blend { color, mode } => NativeColorFilter::mode(*color, *mode),
            Self::Matrix(m) => NativeColorFilter::matrix(m),
            Self::SrgbToLinearGamma => NativeColorFilter::srgb_to_linear_gamma(),
            Self::LinearToSrgbGamma => NativeColorFilter::linear_to_srgb_gamma(),
            Self::Unknown(native) => Arc::clone(native),
        }
    }

    /// Return `true` when the filter turns transparent black into something visible.
    ///
    /// Content drawn with such a filter is unbounded: it reaches the whole clip.
    pub fn modifies_transparent_black(&self) -> bool {
        match self {
            Self::Blend { color, mode } => {
                mode.blend_colors(*color, Color::TRANSPARENT) != Color::TRANSPARENT
            }
            Self::Matrix(m) => m[4] != 0.0 || m[9] != 0.0 || m[14] != 0.0 || m[19] != 0.0,
            Self::SrgbToLinearGamma | Self::LinearToSrgbGamma => false,
            Self::Unknown(native) => {
                native.filter_color(Color::TRANSPARENT) != Color::TRANSPARENT
            }
        }
    }

    /// Return `true` when applying group opacity before or after the filter is equivalent.
    pub fn can_commute_with_opacity(&self) -> bool {
        match self {
            Self::Blend { color, mode } => {
                *mode == BlendMode::Dst || (*mode == BlendMode::SrcOver && color.is_transparent())
            }
            Self::Matrix(m) => {
                m[3] == 0.0
                    && m[8] == 0.0
                    && m[13] == 0.0
                    && m[15] == 0.0
                    && m[16] == 0.0
                    && m[17] == 0.0
                    && (0.0..=1.0).contains(&m[18])
                    && m[19] == 0.0
            }
            Self::SrgbToLinearGamma | Self::LinearToSrgbGamma => true,
            Self::Unknown(_) => false,
        }
    }

    /// Apply the filter to one straight-alpha color.
    pub fn filter_color(&self, c: Color) -> Color {
        match self {
            Self::Blend { color, mode } => mode.blend_colors(*color, c),
            Self::Matrix(m) => apply_color_matrix(m, c),
            other => other.to_native().filter_color(c),
        }
    }
}

impl PartialEq for ColorFilter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Blend { color: c1, mode: m1 }, Self::Blend { color: c2, mode: m2 }) => {
                c1 == c2 && m1 == m2
            }
            (Self::Matrix(a), Self::Matrix(b)) => a.iter().zip(b.iter()).all(|(x, y)| x == y),
            (Self::SrgbToLinearGamma, Self::SrgbToLinearGamma)
            | (Self::LinearToSrgbGamma, Self::LinearToSrgbGamma) => true,
            (Self::Unknown(a), Self::Unknown(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/color_filter.rs"]
mod tests;
