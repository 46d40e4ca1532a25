use std::sync::Arc;

use crate::foundation::core::Rect;
use crate::native::filters::NativeMaskFilter;

/// Which side of a shape edge keeps the blurred coverage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlurStyle {
    /// Blur inside and outside.
    #[default]
    Normal,
    /// Solid inside, blurred outside.
    Solid,
    /// Nothing inside, blurred outside.
    Outer,
    /// Blurred inside, nothing outside.
    Inner,
}

/// Immutable coverage-mask transform.
#[derive(Clone, Debug)]
pub enum MaskFilter {
    /// Gaussian blur of the shape's coverage.
    Blur {
        /// Blur style.
        style: BlurStyle,
        /// Standard deviation in local units.
        sigma: f32,
    },
    /// Passthrough of a backend mask filter this crate cannot inspect.
    Unknown(Arc<NativeMaskFilter>),
}

impl MaskFilter {
    pub fn blur(style: BlurStyle, sigma: f32) -> Self {
        Self::Blur { style, sigma }
    }

    pub fn as_blur(&self) -> Option<(BlurStyle, f32)> {
        match self {
            Self::Blur { style, sigma } => Some((*style, *sigma)),
            Self::Unknown(_) => None,
        }
    }

    /// A fresh shared handle holding an equal copy of this filter.
    pub fn shared(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    pub fn from_native(native: Option<&Arc<NativeMaskFilter>>) -> Option<Arc<Self>> {
        let native = native?;
        Some(Arc::new(match native.as_blur() {
            Some((style, sigma)) => Self::blur(style, sigma),
            None => Self::Unknown(Arc::clone(native)),
        }))
    }

    pub fn to_native(&self) -> Arc<NativeMaskFilter> {
        match self {
            Self::Blur { style, sigma } => NativeMaskFilter::blur(*style, *sigma),
            Self::Unknown(native) => Arc::clone(native),
        }
    }

    /// Local-space bounds of a shape after the mask filter is applied.
    pub fn expand_bounds(&self, r: Rect) -> Rect {
        match self {
            Self::Blur { sigma, .. } => {
                let pad = f64::from(*sigma) * 3.0;
                r.inflate(pad, pad)
            }
            Self::Unknown(_) => r,
        }
    }
}

impl PartialEq for MaskFilter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Blur { style: s1, sigma: g1 }, Self::Blur { style: s2, sigma: g2 }) => {
                s1 == s2 && g1 == g2
            }
            (Self::Unknown(a), Self::Unknown(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mask_filter.rs"]
mod tests;
