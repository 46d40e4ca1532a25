use std::sync::Arc;

use crate::display_list::types::{ClipOp, FilterMode, Image, PointMode, TextBlob, Vertices};
use crate::effects::blend::BlendMode;
use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, RoundedRect, Vec2};
use crate::native::filters::NativeImageFilter;
use crate::native::paint::NativePaint;

/// Immediate-mode drawing surface that display lists replay into.
///
/// Implemented by raster backends and by [`DisplayListBuilder`](crate::DisplayListBuilder),
/// which records whatever is drawn on it. Paint arrives in backend-native form.
pub trait Canvas {
    fn save(&mut self);

    /// Begin an offscreen layer composited at the matching restore.
    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&NativePaint>,
        backdrop: Option<&Arc<NativeImageFilter>>,
    );

    fn restore(&mut self);

    /// Depth of the save stack, 1 when nothing is saved.
    fn save_count(&self) -> usize;

    fn restore_to_count(&mut self, count: usize) {
        while self.save_count() > count.max(1) {
            self.restore();
        }
    }

    /// Pre-concatenate `m` onto the current transform.
    fn transform(&mut self, m: Affine);

    fn translate(&mut self, dx: f64, dy: f64) {
        self.transform(Affine::translate(Vec2::new(dx, dy)));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.transform(Affine::scale_non_uniform(sx, sy));
    }

    fn rotate(&mut self, degrees: f64) {
        self.transform(Affine::rotate(degrees.to_radians()));
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        self.transform(Affine::skew(sx, sy));
    }

    fn transform_reset(&mut self);

    fn set_transform(&mut self, m: Affine) {
        self.transform_reset();
        self.transform(m);
    }

    fn get_transform(&self) -> Affine;

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, aa: bool);

    fn clip_rrect(&mut self, rrect: RoundedRect, op: ClipOp, aa: bool);

    fn clip_path(&mut self, path: &BezPath, op: ClipOp, aa: bool);

    /// Fill the clip with `color`, replacing what was there.
    fn clear(&mut self, color: Color) {
        self.draw_color(color, BlendMode::Src);
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode);

    fn draw_paint(&mut self, paint: &NativePaint);

    fn draw_line(&mut self, p0: Point, p1: Point, paint: &NativePaint);

    fn draw_rect(&mut self, rect: Rect, paint: &NativePaint);

    fn draw_oval(&mut self, bounds: Rect, paint: &NativePaint);

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &NativePaint);

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &NativePaint);

    fn draw_path(&mut self, path: &BezPath, paint: &NativePaint);

    fn draw_arc(
        &mut self,
        oval: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
        paint: &NativePaint,
    );

    fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &NativePaint);

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode, paint: &NativePaint);

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        filter: FilterMode,
        paint: Option<&NativePaint>,
    );

    fn draw_image_rect(
        &mut self,
        image: &Arc<Image>,
        src: Rect,
        dst: Rect,
        filter: FilterMode,
        paint: Option<&NativePaint>,
    );

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f64, y: f64, paint: &NativePaint);

    fn draw_shadow(
        &mut self,
        path: &BezPath,
        color: Color,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    );
}
