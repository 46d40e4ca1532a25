use std::sync::Arc;

use crate::effects::color_filter::ColorFilter;
use crate::foundation::core::{Affine, Rect, rect_is_empty};
use crate::native::filters::NativeImageFilter;

/// Sampling behavior outside the filter input.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TileMode {
    #[default]
    Clamp,
    Repeat,
    Mirror,
    Decal,
}

/// Immutable whole-layer pixel transform.
#[derive(Clone, Debug)]
pub enum ImageFilter {
    Blur {
        sigma_x: f32,
        sigma_y: f32,
        tile_mode: TileMode,
    },
    Dilate {
        radius_x: f32,
        radius_y: f32,
    },
    Erode {
        radius_x: f32,
        radius_y: f32,
    },
    Matrix(Affine),
    ColorFilter(Arc<ColorFilter>),
    Compose {
        outer: Arc<ImageFilter>,
        inner: Arc<ImageFilter>,
    },
    /// Passthrough of a backend image filter this crate cannot inspect.
    Unknown(Arc<NativeImageFilter>),
}

impl ImageFilter {
    pub fn blur(sigma_x: f32, sigma_y: f32, tile_mode: TileMode) -> Self {
        Self::Blur {
            sigma_x,
            sigma_y,
            tile_mode,
        }
    }

    pub fn compose(outer: Arc<Self>, inner: Arc<Self>) -> Self {
        Self::Compose { outer, inner }
    }

    /// A fresh shared handle holding an equal copy of this filter.
    pub fn shared(&self) -> Arc<Self> {
        Arc::new(self.clone())
    }

    /// The color filter when this filter only recolors pixels.
    pub fn as_color_filter(&self) -> Option<&Arc<ColorFilter>> {
        match self {
            Self::ColorFilter(cf) => Some(cf),
            _ => None,
        }
    }

    /// Return `true` when transparent input pixels can become visible.
    pub fn modifies_transparent_black(&self) -> bool {
        match self {
            Self::ColorFilter(cf) => cf.modifies_transparent_black(),
            Self::Compose { outer, inner } => {
                outer.modifies_transparent_black() || inner.modifies_transparent_black()
            }
            Self::Unknown(_) => true,
            Self::Blur { .. } | Self::Dilate { .. } | Self::Erode { .. } | Self::Matrix(_) => {
                false
            }
        }
    }

    /// Output bounds for content with local bounds `input`. `None` means unbounded.
    pub fn map_local_bounds(&self, input: Rect) -> Option<Rect> {
        self.map_device_bounds(input, Affine::IDENTITY)
    }

    /// Output bounds for content with device bounds `input` drawn under `ctm`.
    /// `None` means unbounded.
    pub fn map_device_bounds(&self, input: Rect, ctm: Affine) -> Option<Rect> {
        let [a, b, c, d, _, _] = ctm.as_coeffs();
        let outset = |rx: f64, ry: f64| (rx * a.abs() + ry * c.abs(), rx * b.abs() + ry * d.abs());
        match self {
            Self::Blur {
                sigma_x, sigma_y, ..
            } => {
                let (dx, dy) = outset(f64::from(*sigma_x) * 3.0, f64::from(*sigma_y) * 3.0);
                Some(input.inflate(dx, dy))
            }
            Self::Dilate { radius_x, radius_y } => {
                let (dx, dy) = outset(f64::from(*radius_x), f64::from(*radius_y));
                Some(input.inflate(dx, dy))
            }
            Self::Erode { radius_x, radius_y } => {
                let (dx, dy) = outset(f64::from(*radius_x), f64::from(*radius_y));
                let r = input.inflate(-dx, -dy);
                Some(if rect_is_empty(r) { Rect::ZERO } else { r })
            }
            Self::Matrix(m) => {
                if ctm.determinant() == 0.0 {
                    return None;
                }
                Some((ctm * *m * ctm.inverse()).transform_rect_bbox(input))
            }
            Self::ColorFilter(cf) => (!cf.modifies_transparent_black()).then_some(input),
            Self::Compose { outer, inner } => {
                let mid = inner.map_device_bounds(input, ctm)?;
                outer.map_device_bounds(mid, ctm)
            }
            Self::Unknown(_) => None,
        }
    }

    pub fn from_native(native: Option<&Arc<NativeImageFilter>>) -> Option<Arc<Self>> {
        let native = native?;
        Some(Arc::new(match &**native {
            NativeImageFilter::Blur {
                sigma_x,
                sigma_y,
                tile_mode,
            } => Self::blur(*sigma_x, *sigma_y, *tile_mode),
            NativeImageFilter::Dilate { radius_x, radius_y } => Self::Dilate {
                radius_x: *radius_x,
                radius_y: *radius_y,
            },
            NativeImageFilter::Erode { radius_x, radius_y } => Self::Erode {
                radius_x: *radius_x,
                radius_y: *radius_y,
            },
            NativeImageFilter::Matrix(m) => Self::Matrix(*m),
            NativeImageFilter::ColorFilter(cf) => match ColorFilter::from_native(Some(cf)) {
                Some(cf) => Self::ColorFilter(cf),
                None => Self::Unknown(Arc::clone(native)),
            },
            NativeImageFilter::Compose { outer, inner } => {
                match (Self::from_native(Some(outer)), Self::from_native(Some(inner))) {
                    (Some(outer), Some(inner)) => Self::Compose { outer, inner },
                    _ => Self::Unknown(Arc::clone(native)),
                }
            }
            NativeImageFilter::Offset(_) => Self::Unknown(Arc::clone(native)),
        }))
    }

    pub fn to_native(&self) -> Arc<NativeImageFilter> {
        Arc::new(match self {
            Self::Blur {
                sigma_x,
                sigma_y,
                tile_mode,
            } => NativeImageFilter::Blur {
                sigma_x: *sigma_x,
                sigma_y: *sigma_y,
                tile_mode: *tile_mode,
            },
            Self::Dilate { radius_x, radius_y } => NativeImageFilter::Dilate {
                radius_x: *radius_x,
                radius_y: *radius_y,
            },
            Self::Erode { radius_x, radius_y } => NativeImageFilter::Erode {
                radius_x: *radius_x,
                radius_y: *radius_y,
            },
            Self::Matrix(m) => NativeImageFilter::Matrix(*m),
            Self::ColorFilter(cf) => NativeImageFilter::ColorFilter(cf.to_native()),
            Self::Compose { outer, inner } => NativeImageFilter::Compose {
                outer: outer.to_native(),
                inner: inner.to_native(),
            },
            Self::Unknown(native) => return Arc::clone(native),
        })
    }
}

impl PartialEq for ImageFilter {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Blur {
                    sigma_x: ax,
                    sigma_y: ay,
                    tile_mode: at,
                },
                Self::Blur {
                    sigma_x: bx,
                    sigma_y: by,
                    tile_mode: bt,
                },
            ) => ax == bx && ay == by && at == bt,
            (
                Self::Dilate {
                    radius_x: ax,
                    radius_y: ay,
                },
                Self::Dilate {
                    radius_x: bx,
                    radius_y: by,
                },
            )
            | (
                Self::Erode {
                    radius_x: ax,
                    radius_y: ay,
                },
                Self::Erode {
                    radius_x: bx,
                    radius_y: by,
                },
            ) => ax == bx && ay == by,
            (Self::Matrix(a), Self::Matrix(b)) => a == b,
            (Self::ColorFilter(a), Self::ColorFilter(b)) => a == b,
            (
                Self::Compose {
                    outer: ao,
                    inner: ai,
                },
                Self::Compose {
                    outer: bo,
                    inner: bi,
                },
            ) => ao == bo && ai == bi,
            (Self::Unknown(a), Self::Unknown(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/image_filter.rs"]
mod tests;
