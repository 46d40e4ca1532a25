use std::sync::Arc;

use crate::display_list::paint::{PaintStyle, StrokeCap, StrokeJoin};
use crate::effects::blend::BlendMode;
use crate::foundation::core::Color;
use crate::native::filters::{NativeColorFilter, NativeImageFilter, NativeMaskFilter};

/// Paint in the form a backend canvas consumes: plain attributes plus native filter handles.
#[derive(Clone, Debug)]
pub struct NativePaint {
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
    pub color_filter: Option<Arc<NativeColorFilter>>,
    pub image_filter: Option<Arc<NativeImageFilter>>,
    pub mask_filter: Option<Arc<NativeMaskFilter>>,
}

impl Default for NativePaint {
    fn default() -> Self {
        crate::display_list::paint::Paint::default().to_native()
    }
}

impl NativePaint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// The solid color the paint resolves to once its color filter and inversion are applied.
    pub fn effective_color(&self) -> Color {
        let mut c = self.color;
        if let Some(cf) = &self.color_filter {
            c = cf.filter_color(c);
        }
        if self.invert_colors {
            c = Color::from_argb(c.alpha(), 255 - c.red(), 255 - c.green(), 255 - c.blue());
        }
        c
    }
}
