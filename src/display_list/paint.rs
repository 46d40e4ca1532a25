use std::sync::Arc;

use crate::effects::blend::BlendMode;
use crate::effects::color_filter::ColorFilter;
use crate::effects::image_filter::ImageFilter;
use crate::effects::mask_filter::MaskFilter;
use crate::foundation::core::Color;
use crate::native::paint::NativePaint;

/// How geometry is turned into coverage.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
    StrokeAndFill,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StrokeJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// The complete set of paint attributes a draw is rendered with.
///
/// Filters are held through shared handles; cloning a paint never copies filter payloads.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub blend_mode: BlendMode,
    pub style: PaintStyle,
    pub stroke_width: f32,
    pub stroke_miter: f32,
    pub stroke_cap: StrokeCap,
    pub stroke_join: StrokeJoin,
    pub anti_alias: bool,
    pub dither: bool,
    pub invert_colors: bool,
    pub color_filter: Option<Arc<ColorFilter>>,
    pub image_filter: Option<Arc<ImageFilter>>,
    pub mask_filter: Option<Arc<MaskFilter>>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            blend_mode: BlendMode::SrcOver,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
            stroke_miter: 4.0,
            stroke_cap: StrokeCap::Butt,
            stroke_join: StrokeJoin::Miter,
            anti_alias: false,
            dither: false,
            invert_colors: false,
            color_filter: None,
            image_filter: None,
            mask_filter: None,
        }
    }
}

impl Paint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_alpha(mut self, alpha: u8) -> Self {
        self.color = self.color.with_alpha(alpha);
        self
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn with_style(mut self, style: PaintStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_stroke_cap(mut self, cap: StrokeCap) -> Self {
        self.stroke_cap = cap;
        self
    }

    pub fn with_stroke_join(mut self, join: StrokeJoin) -> Self {
        self.stroke_join = join;
        self
    }

    pub fn with_stroke_miter(mut self, miter: f32) -> Self {
        self.stroke_miter = miter;
        self
    }

    pub fn with_anti_alias(mut self, aa: bool) -> Self {
        self.anti_alias = aa;
        self
    }

    pub fn with_color_filter(mut self, filter: Option<Arc<ColorFilter>>) -> Self {
        self.color_filter = filter;
        self
    }

    pub fn with_image_filter(mut self, filter: Option<Arc<ImageFilter>>) -> Self {
        self.image_filter = filter;
        self
    }

    pub fn with_mask_filter(mut self, filter: Option<Arc<MaskFilter>>) -> Self {
        self.mask_filter = filter;
        self
    }

    /// Alpha as a unit float.
    pub fn opacity(&self) -> f32 {
        f32::from(self.color.alpha()) / 255.0
    }

    /// Return `true` when a stroke outline contributes to coverage.
    pub fn is_stroked(&self) -> bool {
        self.style != PaintStyle::Fill
    }

    /// Return `true` when, used as a layer paint, this paint only modulates alpha.
    pub fn is_alpha_only(&self) -> bool {
        self.blend_mode == BlendMode::SrcOver
            && !self.invert_colors
            && self.color_filter.is_none()
            && self.image_filter.is_none()
            && self.mask_filter.is_none()
    }

    /// Convert to the backend paint, resolving every filter to its native form.
    pub fn to_native(&self) -> NativePaint {
        NativePaint {
            color: self.color,
            blend_mode: self.blend_mode,
            style: self.style,
            stroke_width: self.stroke_width,
            stroke_miter: self.stroke_miter,
            stroke_cap: self.stroke_cap,
            stroke_join: self.stroke_join,
            anti_alias: self.anti_alias,
            dither: self.dither,
            invert_colors: self.invert_colors,
            color_filter: self.color_filter.as_ref().map(|f| f.to_native()),
            image_filter: self.image_filter.as_ref().map(|f| f.to_native()),
            mask_filter: self.mask_filter.as_ref().map(|f| f.to_native()),
        }
    }

    /// Recognize a backend paint.
    pub fn from_native(native: &NativePaint) -> Self {
        Self {
            color: native.color,
            blend_mode: native.blend_mode,
            style: native.style,
            stroke_width: native.stroke_width,
            stroke_miter: native.stroke_miter,
            stroke_cap: native.stroke_cap,
            stroke_join: native.stroke_join,
            anti_alias: native.anti_alias,
            dither: native.dither,
            invert_colors: native.invert_colors,
            color_filter: ColorFilter::from_native(native.color_filter.as_ref()),
            image_filter: ImageFilter::from_native(native.image_filter.as_ref()),
            mask_filter: MaskFilter::from_native(native.mask_filter.as_ref()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display_list/paint.rs"]
mod tests;
