use std::sync::Arc;

use kurbo::{Circle, Ellipse, Shape};

use crate::display_list::types::{ClipOp, FilterMode, Image, PointMode, TextBlob, Vertices};
use crate::effects::blend::BlendMode;
use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, RoundedRect, Vec2};
use crate::foundation::error::{DlError, DlResult};
use crate::native::filters::NativeImageFilter;
use crate::native::paint::NativePaint;
use crate::render::backend::FrameRGBA;
use crate::render::canvas::Canvas;
use crate::render::stroke::{fill_geometry, point_contours, stroke_outline};

const TOLERANCE: f64 = 0.1;

struct SaveRecord {
    transform: Affine,
    layers: usize,
    offscreen: Option<Box<OffscreenLayer>>,
}

// A save_layer drawn into its own context, filtered and composited into `parent` on restore.
struct OffscreenLayer {
    parent: vello_cpu::RenderContext,
    paint: NativePaint,
    device_bounds: Rect,
}

/// CPU raster canvas backed by `vello_cpu`.
///
/// Clips and layers map onto `vello_cpu` layers; each save level remembers how many it pushed so
/// `restore` can pop them. A layer whose paint carries a color filter, color inversion or a
/// blend mode other than `SrcOver` is drawn offscreen and filtered per pixel on `restore`.
/// Mask filters, image filters and backdrop filters are not rasterized.
pub struct CpuCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    transform: Affine,
    layers: usize,
    saves: Vec<SaveRecord>,
}

impl std::fmt::Debug for CpuCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("transform", &self.transform)
            .field("save_count", &self.save_count())
            .finish_non_exhaustive()
    }
}

impl CpuCanvas {
    pub fn new(width: u32, height: u32) -> DlResult<Self> {
        if width == 0 || height == 0 {
            return Err(DlError::validation("canvas dimensions must be > 0"));
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| DlError::render(format!("canvas width exceeds u16: {width}")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| DlError::render(format!("canvas height exceeds u16: {height}")))?;
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            transform: Affine::IDENTITY,
            layers: 0,
            saves: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Rasterize everything drawn so far and reset the canvas for reuse.
    pub fn finish(&mut self) -> FrameRGBA {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.render_to_pixmap(&mut pixmap);
        frame_from_pixmap(&pixmap)
    }

    /// Like [`finish`](Self::finish), rendering into an existing pixmap of the canvas size.
    pub(crate) fn render_to_pixmap(&mut self, pixmap: &mut vello_cpu::Pixmap) {
        self.restore_to_count(1);
        for _ in 0..self.layers {
            self.ctx.pop_layer();
        }
        self.layers = 0;
        self.ctx.flush();
        self.ctx.render_to_pixmap(pixmap);
        self.ctx.reset();
        self.transform = Affine::IDENTITY;
    }

    fn composite_offscreen(&mut self, layer: OffscreenLayer) {
        let mut content = std::mem::replace(&mut self.ctx, layer.parent);
        content.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        content.render_to_pixmap(&mut pixmap);

        let paint = &layer.paint;
        let pixels = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| {
                let out = filter_premul([px[0], px[1], px[2], px[3]], paint);
                vello_cpu::peniko::color::PremulRgba8::from_u8_array(out)
            })
            .collect::<Vec<_>>();
        let filtered =
            vello_cpu::Pixmap::from_parts_with_opacity(pixels, self.width, self.height, true);

        let b = layer.device_bounds;
        let alpha = paint.color.alpha();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(filtered)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        });
        self.ctx.set_blend_mode(blend_to_cpu(paint.blend_mode));
        if alpha < 255 {
            self.ctx.push_opacity_layer(f32::from(alpha) / 255.0);
        }
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(b.x0, b.y0, b.x1, b.y1));
        if alpha < 255 {
            self.ctx.pop_layer();
        }
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
    }

    fn fill(&mut self, path: &BezPath, paint: &NativePaint) {
        self.fill_color(path, paint.effective_color(), paint.blend_mode);
    }

    fn fill_color(&mut self, path: &BezPath, color: Color, mode: BlendMode) {
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.set_blend_mode(blend_to_cpu(mode));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn draw_shape(&mut self, path: BezPath, paint: &NativePaint) {
        for p in fill_geometry(path, paint) {
            self.fill(&p, paint);
        }
    }

    fn fill_device(&mut self, color: Color, mode: BlendMode) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(color_to_cpu(color));
        self.ctx.set_blend_mode(blend_to_cpu(mode));
        let b = self.bounds();
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(b.x0, b.y0, b.x1, b.y1));
    }

    fn push_clip(&mut self, path: &BezPath, op: ClipOp) {
        match op {
            ClipOp::Intersect => {
                self.ctx.set_transform(affine_to_cpu(self.transform));
                self.ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
                self.ctx.push_clip_layer(&bezpath_to_cpu(path));
            }
            ClipOp::Difference => {
                if self.transform.determinant() == 0.0 {
                    return;
                }
                let outer = self
                    .transform
                    .inverse()
                    .transform_rect_bbox(self.bounds().inflate(1.0, 1.0));
                let mut p = outer.to_path(TOLERANCE);
                p.extend(path.elements().iter().copied());
                self.ctx.set_transform(affine_to_cpu(self.transform));
                self.ctx.set_fill_rule(vello_cpu::peniko::Fill::EvenOdd);
                self.ctx.push_clip_layer(&bezpath_to_cpu(&p));
                self.ctx.set_fill_rule(vello_cpu::peniko::Fill::NonZero);
            }
        }
        self.layers += 1;
    }

    fn paint_image(&mut self, image: &Image, paint_transform: Affine, dst: Rect, alpha: u8) {
        let img = match image_to_cpu(image) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!(error = %e, "skipping image draw");
                return;
            }
        };
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx.set_paint_transform(affine_to_cpu(paint_transform));
        self.ctx.set_paint(img);
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        if alpha < 255 {
            self.ctx.push_opacity_layer(f32::from(alpha) / 255.0);
        }
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(dst.x0, dst.y0, dst.x1, dst.y1));
        if alpha < 255 {
            self.ctx.pop_layer();
        }
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

impl Canvas for CpuCanvas {
    fn save(&mut self) {
        self.saves.push(SaveRecord {
            transform: self.transform,
            layers: self.layers,
            offscreen: None,
        });
        self.layers = 0;
    }

    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&NativePaint>,
        backdrop: Option<&Arc<NativeImageFilter>>,
    ) {
        self.save();
        if backdrop.is_some() || paint.is_some_and(|p| p.image_filter.is_some()) {
            tracing::trace!("layer filters are not rasterized on the cpu canvas");
        }
        if let Some(p) = paint
            && needs_offscreen(p)
        {
            let device_bounds = match bounds {
                Some(b) => self.transform.transform_rect_bbox(b),
                None => self.bounds(),
            };
            let parent = std::mem::replace(
                &mut self.ctx,
                vello_cpu::RenderContext::new(self.width, self.height),
            );
            if let Some(rec) = self.saves.last_mut() {
                rec.offscreen = Some(Box::new(OffscreenLayer {
                    parent,
                    paint: p.clone(),
                    device_bounds,
                }));
            }
            return;
        }
        if let Some(b) = bounds {
            self.push_clip(&b.to_path(TOLERANCE), ClipOp::Intersect);
        }
        let alpha = paint.map_or(255, |p| p.color.alpha());
        self.ctx.push_opacity_layer(f32::from(alpha) / 255.0);
        self.layers += 1;
    }

    fn restore(&mut self) {
        let Some(rec) = self.saves.pop() else {
            return;
        };
        for _ in 0..self.layers {
            self.ctx.pop_layer();
        }
        self.layers = rec.layers;
        self.transform = rec.transform;
        if let Some(layer) = rec.offscreen {
            self.composite_offscreen(*layer);
        }
    }

    fn save_count(&self) -> usize {
        self.saves.len() + 1
    }

    fn transform(&mut self, m: Affine) {
        self.transform *= m;
    }

    fn transform_reset(&mut self) {
        self.transform = Affine::IDENTITY;
    }

    fn get_transform(&self) -> Affine {
        self.transform
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, _aa: bool) {
        self.push_clip(&rect.to_path(TOLERANCE), op);
    }

    fn clip_rrect(&mut self, rrect: RoundedRect, op: ClipOp, _aa: bool) {
        self.push_clip(&rrect.to_path(TOLERANCE), op);
    }

    fn clip_path(&mut self, path: &BezPath, op: ClipOp, _aa: bool) {
        self.push_clip(path, op);
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.fill_device(color, mode);
    }

    fn draw_paint(&mut self, paint: &NativePaint) {
        self.fill_device(paint.effective_color(), paint.blend_mode);
    }

    fn draw_line(&mut self, p0: Point, p1: Point, paint: &NativePaint) {
        let mut line = BezPath::new();
        line.move_to(p0);
        line.line_to(p1);
        let outline = stroke_outline(&line, paint);
        self.fill(&outline, paint);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &NativePaint) {
        self.draw_shape(rect.abs().to_path(TOLERANCE), paint);
    }

    fn draw_oval(&mut self, bounds: Rect, paint: &NativePaint) {
        self.draw_shape(Ellipse::from_rect(bounds.abs()).to_path(TOLERANCE), paint);
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &NativePaint) {
        self.draw_shape(Circle::new(center, radius.abs()).to_path(TOLERANCE), paint);
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &NativePaint) {
        self.draw_shape(rrect.to_path(TOLERANCE), paint);
    }

    fn draw_path(&mut self, path: &BezPath, paint: &NativePaint) {
        self.draw_shape(path.clone(), paint);
    }

    fn draw_arc(
        &mut self,
        oval: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
        paint: &NativePaint,
    ) {
        let oval = oval.abs();
        let arc = kurbo::Arc::new(
            oval.center(),
            Vec2::new(oval.width() * 0.5, oval.height() * 0.5),
            start_degrees.to_radians(),
            sweep_degrees.to_radians(),
            0.0,
        );
        let path = if use_center {
            let start = oval.center()
                + Vec2::new(
                    arc.radii.x * arc.start_angle.cos(),
                    arc.radii.y * arc.start_angle.sin(),
                );
            let mut p = BezPath::new();
            p.move_to(oval.center());
            p.line_to(start);
            p.extend(arc.append_iter(TOLERANCE));
            p.close_path();
            p
        } else {
            arc.to_path(TOLERANCE)
        };
        self.draw_shape(path, paint);
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &NativePaint) {
        for contour in point_contours(mode, points) {
            let outline = stroke_outline(&contour, paint);
            self.fill(&outline, paint);
        }
    }

    /// Each triangle is filled with the average of its vertex colors, or the paint color.
    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode, paint: &NativePaint) {
        let base = paint.effective_color();
        for [a, b, c] in vertices.triangles() {
            let pts = vertices.positions();
            let mut tri = BezPath::new();
            tri.move_to(pts[a]);
            tri.line_to(pts[b]);
            tri.line_to(pts[c]);
            tri.close_path();
            let color = match vertices.colors() {
                Some(colors) => {
                    let avg = average_color([colors[a], colors[b], colors[c]]);
                    mode.blend_colors(avg, base)
                }
                None => base,
            };
            self.fill_color(&tri, color, paint.blend_mode);
        }
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        _filter: FilterMode,
        paint: Option<&NativePaint>,
    ) {
        let dst = Rect::from_origin_size(
            top_left,
            (f64::from(image.width()), f64::from(image.height())),
        );
        let alpha = paint.map_or(255, |p| p.color.alpha());
        self.paint_image(image, Affine::translate(top_left.to_vec2()), dst, alpha);
    }

    fn draw_image_rect(
        &mut self,
        image: &Arc<Image>,
        src: Rect,
        dst: Rect,
        _filter: FilterMode,
        paint: Option<&NativePaint>,
    ) {
        if src.width() == 0.0 || src.height() == 0.0 {
            return;
        }
        let m = Affine::translate(dst.origin().to_vec2())
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate(-src.origin().to_vec2());
        let alpha = paint.map_or(255, |p| p.color.alpha());
        self.paint_image(image, m, dst, alpha);
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f64, y: f64, paint: &NativePaint) {
        let offset = Affine::translate(Vec2::new(x, y));
        for glyph in blob.glyphs() {
            self.draw_shape(offset * glyph.clone(), paint);
        }
    }

    /// Approximated as the occluder offset by half its elevation.
    fn draw_shadow(
        &mut self,
        path: &BezPath,
        color: Color,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        let offset = Affine::translate(Vec2::new(0.0, elevation * dpr * 0.5));
        self.save();
        if !transparent_occluder {
            self.push_clip(path, ClipOp::Difference);
        }
        self.fill_color(&(offset * path.clone()), color, BlendMode::SrcOver);
        self.restore();
    }
}

pub(crate) fn frame_from_pixmap(pixmap: &vello_cpu::Pixmap) -> FrameRGBA {
    FrameRGBA {
        width: u32::from(pixmap.width()),
        height: u32::from(pixmap.height()),
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    }
}

fn needs_offscreen(paint: &NativePaint) -> bool {
    paint.color_filter.is_some() || paint.invert_colors || paint.blend_mode != BlendMode::SrcOver
}

// Run one premultiplied RGBA8 pixel through the layer paint's color filter and inversion.
fn filter_premul(px: [u8; 4], paint: &NativePaint) -> [u8; 4] {
    if paint.color_filter.is_none() && !paint.invert_colors {
        return px;
    }
    let [r, g, b, a] = px;
    let unpremul = |v: u8| {
        if a == 0 {
            0
        } else {
            ((u32::from(v) * 255 + u32::from(a) / 2) / u32::from(a)).min(255) as u8
        }
    };
    let mut c = Color::from_argb(a, unpremul(r), unpremul(g), unpremul(b));
    if let Some(cf) = &paint.color_filter {
        c = cf.filter_color(c);
    }
    if paint.invert_colors {
        c = Color::from_argb(c.alpha(), 255 - c.red(), 255 - c.green(), 255 - c.blue());
    }
    let premul = |v: u8| ((u32::from(v) * u32::from(c.alpha()) + 127) / 255) as u8;
    [premul(c.red()), premul(c.green()), premul(c.blue()), c.alpha()]
}

fn average_color(colors: [Color; 3]) -> Color {
    let sum = colors.iter().fold([0u32; 4], |mut acc, c| {
        acc[0] += u32::from(c.alpha());
        acc[1] += u32::from(c.red());
        acc[2] += u32::from(c.green());
        acc[3] += u32::from(c.blue());
        acc
    });
    let ch = |v: u32| ((v + 1) / 3) as u8;
    Color::from_argb(ch(sum[0]), ch(sum[1]), ch(sum[2]), ch(sum[3]))
}

fn color_to_cpu(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.red(), c.green(), c.blue(), c.alpha())
}

fn blend_to_cpu(mode: BlendMode) -> vello_cpu::peniko::BlendMode {
    use vello_cpu::peniko::{BlendMode as CpuBlend, Compose, Mix};

    let compose = |c: Compose| CpuBlend::new(Mix::Normal, c);
    let mix = |m: Mix| CpuBlend::new(m, Compose::SrcOver);
    match mode {
        BlendMode::Clear => compose(Compose::Clear),
        BlendMode::Src => compose(Compose::Copy),
        BlendMode::Dst => compose(Compose::Dest),
        BlendMode::SrcOver => compose(Compose::SrcOver),
        BlendMode::DstOver => compose(Compose::DestOver),
        BlendMode::SrcIn => compose(Compose::SrcIn),
        BlendMode::DstIn => compose(Compose::DestIn),
        BlendMode::SrcOut => compose(Compose::SrcOut),
        BlendMode::DstOut => compose(Compose::DestOut),
        BlendMode::SrcATop => compose(Compose::SrcAtop),
        BlendMode::DstATop => compose(Compose::DestAtop),
        BlendMode::Xor => compose(Compose::Xor),
        BlendMode::Plus => compose(Compose::Plus),
        BlendMode::Modulate | BlendMode::Multiply => mix(Mix::Multiply),
        BlendMode::Screen => mix(Mix::Screen),
        BlendMode::Overlay => mix(Mix::Overlay),
        BlendMode::Darken => mix(Mix::Darken),
        BlendMode::Lighten => mix(Mix::Lighten),
        BlendMode::ColorDodge => mix(Mix::ColorDodge),
        BlendMode::ColorBurn => mix(Mix::ColorBurn),
        BlendMode::HardLight => mix(Mix::HardLight),
        BlendMode::SoftLight => mix(Mix::SoftLight),
        BlendMode::Difference => mix(Mix::Difference),
        BlendMode::Exclusion => mix(Mix::Exclusion),
        BlendMode::Hue => mix(Mix::Hue),
        BlendMode::Saturation => mix(Mix::Saturation),
        BlendMode::Color => mix(Mix::Color),
        BlendMode::Luminosity => mix(Mix::Luminosity),
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_to_cpu(image: &Image) -> DlResult<vello_cpu::Image> {
    let w: u16 = image
        .width()
        .try_into()
        .map_err(|_| DlError::render("image width exceeds u16"))?;
    let h: u16 = image
        .height()
        .try_into()
        .map_err(|_| DlError::render("image height exceeds u16"))?;
    let pixels = image
        .bytes()
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
