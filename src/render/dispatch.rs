use smallvec::SmallVec;

use crate::display_list::list::DisplayList;
use crate::display_list::ops::{DlOp, SaveLayerOp};
use crate::display_list::types::ClipOp;
use crate::foundation::core::{Affine, Color};
use crate::foundation::math::unit_to_u8;
use crate::native::paint::NativePaint;
use crate::render::canvas::Canvas;

#[derive(Debug, Clone)]
struct Frame {
    paint: NativePaint,
    opacity: f32,
}

/// Replays recorded ops into a [`Canvas`], translating paint into its native form.
///
/// The dispatcher tracks the current paint with a save stack that mirrors the recording, and
/// folds any group opacity it can distribute into the paint of individual draws.
pub(crate) struct Dispatcher<'a> {
    canvas: &'a mut dyn Canvas,
    paint: NativePaint,
    opacity: f32,
    base: Affine,
    stack: SmallVec<[Frame; 8]>,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(canvas: &'a mut dyn Canvas) -> Self {
        let base = canvas.get_transform();
        Self {
            canvas,
            paint: NativePaint::default(),
            opacity: 1.0,
            base,
            stack: SmallVec::new(),
        }
    }

    pub(crate) fn replay(&mut self, list: &DisplayList, opacity: f32) {
        let start = self.canvas.save_count();
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        if opacity < 1.0 && !list.can_apply_group_opacity() {
            let layer = alpha_paint(opacity);
            self.canvas
                .save_layer(Some(list.bounds()), Some(&layer), None);
            self.opacity = 1.0;
        } else {
            self.opacity = opacity;
        }
        tracing::trace!(
            list = list.unique_id(),
            ops = list.op_count(false),
            opacity,
            "replay display list"
        );

        for op in list.ops() {
            self.dispatch(op);
        }

        debug_assert!(self.stack.is_empty(), "display list replay left saves open");
        self.canvas.restore_to_count(start);
    }

    fn push_frame(&mut self) {
        self.stack.push(Frame {
            paint: self.paint.clone(),
            opacity: self.opacity,
        });
    }

    // Paint for one draw with any inherited opacity folded in.
    fn draw_paint(&self) -> NativePaint {
        let mut p = self.paint.clone();
        if self.opacity < 1.0 {
            p.color = p.color.modulate_opacity(self.opacity);
        }
        p
    }

    fn image_paint(&self, with_attributes: bool) -> Option<NativePaint> {
        if with_attributes {
            Some(self.draw_paint())
        } else if self.opacity < 1.0 {
            Some(alpha_paint(self.opacity))
        } else {
            None
        }
    }

    fn save_layer(&mut self, op: &SaveLayerOp) {
        let layer_paint = if op.with_attributes {
            self.paint.clone()
        } else {
            NativePaint::default()
        };
        let alpha_only = is_alpha_only(&layer_paint);
        self.push_frame();

        if op.can_distribute_opacity && alpha_only && op.backdrop.is_none() {
            self.canvas.save();
            if !op.bounds_from_content {
                self.canvas.clip_rect(op.bounds, ClipOp::Intersect, false);
            }
            self.opacity *= layer_paint.color.alpha() as f32 / 255.0;
            return;
        }

        let mut layer_paint = layer_paint;
        if self.opacity < 1.0 {
            layer_paint.color = layer_paint.color.modulate_opacity(self.opacity);
        }
        let backdrop = op.backdrop.as_ref().map(|b| b.to_native());
        let paint = (op.with_attributes || self.opacity < 1.0).then_some(&layer_paint);
        self.canvas
            .save_layer(Some(op.bounds), paint, backdrop.as_ref());
        self.opacity = 1.0;
    }

    fn restore(&mut self) {
        if let Some(frame) = self.stack.pop() {
            self.paint = frame.paint;
            self.opacity = frame.opacity;
            self.canvas.restore();
        }
    }

    fn dispatch(&mut self, op: &DlOp) {
        match op {
            DlOp::SetAntiAlias(aa) => self.paint.anti_alias = *aa,
            DlOp::SetDither(d) => self.paint.dither = *d,
            DlOp::SetInvertColors(i) => self.paint.invert_colors = *i,
            DlOp::SetColor(c) => self.paint.color = *c,
            DlOp::SetBlendMode(m) => self.paint.blend_mode = *m,
            DlOp::SetStyle(s) => self.paint.style = *s,
            DlOp::SetStrokeWidth(w) => self.paint.stroke_width = *w,
            DlOp::SetStrokeMiter(m) => self.paint.stroke_miter = *m,
            DlOp::SetStrokeCap(c) => self.paint.stroke_cap = *c,
            DlOp::SetStrokeJoin(j) => self.paint.stroke_join = *j,
            DlOp::SetColorFilter(f) => {
                self.paint.color_filter = f.as_ref().map(|f| f.to_native());
            }
            DlOp::SetImageFilter(f) => {
                self.paint.image_filter = f.as_ref().map(|f| f.to_native());
            }
            DlOp::SetMaskFilter(f) => {
                self.paint.mask_filter = f.as_ref().map(|f| f.to_native());
            }

            DlOp::Save => {
                self.push_frame();
                self.canvas.save();
            }
            DlOp::SaveLayer(layer) => self.save_layer(layer),
            DlOp::Restore => self.restore(),

            DlOp::Translate { dx, dy } => self.canvas.translate(*dx, *dy),
            DlOp::Scale { sx, sy } => self.canvas.scale(*sx, *sy),
            DlOp::Rotate { degrees } => self.canvas.rotate(*degrees),
            DlOp::Skew { sx, sy } => self.canvas.skew(*sx, *sy),
            DlOp::Transform(m) => self.canvas.transform(*m),
            DlOp::TransformReset => self.canvas.set_transform(self.base),

            DlOp::ClipRect { rect, op, aa } => self.canvas.clip_rect(*rect, *op, *aa),
            DlOp::ClipRRect { rrect, op, aa } => self.canvas.clip_rrect(*rrect, *op, *aa),
            DlOp::ClipPath { path, op, aa } => self.canvas.clip_path(path, *op, *aa),

            DlOp::DrawPaint => {
                let p = self.draw_paint();
                self.canvas.draw_paint(&p);
            }
            DlOp::DrawColor { color, mode } => {
                self.canvas
                    .draw_color(color.modulate_opacity(self.opacity), *mode);
            }
            DlOp::DrawLine { p0, p1 } => {
                let p = self.draw_paint();
                self.canvas.draw_line(*p0, *p1, &p);
            }
            DlOp::DrawRect(r) => {
                let p = self.draw_paint();
                self.canvas.draw_rect(*r, &p);
            }
            DlOp::DrawOval(r) => {
                let p = self.draw_paint();
                self.canvas.draw_oval(*r, &p);
            }
            DlOp::DrawCircle { center, radius } => {
                let p = self.draw_paint();
                self.canvas.draw_circle(*center, *radius, &p);
            }
            DlOp::DrawRRect(rr) => {
                let p = self.draw_paint();
                self.canvas.draw_rrect(*rr, &p);
            }
            DlOp::DrawPath(path) => {
                let p = self.draw_paint();
                self.canvas.draw_path(path, &p);
            }
            DlOp::DrawArc {
                oval,
                start_degrees,
                sweep_degrees,
                use_center,
            } => {
                let p = self.draw_paint();
                self.canvas
                    .draw_arc(*oval, *start_degrees, *sweep_degrees, *use_center, &p);
            }
            DlOp::DrawPoints { mode, points } => {
                let p = self.draw_paint();
                self.canvas.draw_points(*mode, points, &p);
            }
            DlOp::DrawVertices { vertices, mode } => {
                let p = self.draw_paint();
                self.canvas.draw_vertices(vertices, *mode, &p);
            }
            DlOp::DrawImage {
                image,
                top_left,
                filter,
                with_attributes,
            } => {
                let p = self.image_paint(*with_attributes);
                self.canvas
                    .draw_image(image, *top_left, *filter, p.as_ref());
            }
            DlOp::DrawImageRect {
                image,
                src,
                dst,
                filter,
                with_attributes,
            } => {
                let p = self.image_paint(*with_attributes);
                self.canvas
                    .draw_image_rect(image, *src, *dst, *filter, p.as_ref());
            }
            DlOp::DrawTextBlob { blob, x, y } => {
                let p = self.draw_paint();
                self.canvas.draw_text_blob(blob, *x, *y, &p);
            }
            DlOp::DrawShadow {
                path,
                color,
                elevation,
                transparent_occluder,
                dpr,
            } => {
                self.canvas.draw_shadow(
                    path,
                    color.modulate_opacity(self.opacity),
                    *elevation,
                    *transparent_occluder,
                    *dpr,
                );
            }
            DlOp::DrawDisplayList { list, opacity } => {
                let opacity = self.opacity * *opacity;
                self.canvas.save();
                Dispatcher::new(&mut *self.canvas).replay(list, opacity);
                self.canvas.restore();
            }
        }
    }
}

fn alpha_paint(opacity: f32) -> NativePaint {
    NativePaint::new(Color::BLACK.with_alpha(unit_to_u8(opacity)))
}

fn is_alpha_only(p: &NativePaint) -> bool {
    p.blend_mode == crate::effects::blend::BlendMode::SrcOver
        && !p.invert_colors
        && p.color_filter.is_none()
        && p.image_filter.is_none()
        && p.mask_filter.is_none()
}

#[cfg(test)]
#[path = "../../tests/unit/render/dispatch.rs"]
mod tests;
