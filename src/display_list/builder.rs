use std::f64::consts::SQRT_2;
use std::sync::Arc;

use kurbo::Shape;

use crate::display_list::list::DisplayList;
use crate::display_list::ops::{DlOp, SaveLayerOp};
use crate::display_list::paint::{Paint, PaintStyle, StrokeCap, StrokeJoin};
use crate::display_list::types::{ClipOp, FilterMode, Image, PointMode, TextBlob, Vertices};
use crate::effects::blend::BlendMode;
use crate::effects::color_filter::ColorFilter;
use crate::effects::image_filter::ImageFilter;
use crate::effects::mask_filter::MaskFilter;
use crate::foundation::core::{
    Affine, BezPath, Color, Point, Rect, RoundedRect, Vec2, intersect_rect, join_rect,
    rect_is_empty, rects_intersect, unbounded_rect,
};
use crate::native::filters::NativeImageFilter;
use crate::native::paint::NativePaint;
use crate::render::canvas::Canvas;

/// Recording options.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BuilderOpts {
    /// Content outside this rect contributes no bounds. `None` records without culling.
    pub cull_rect: Option<Rect>,
    /// Build a [`DlRTree`](crate::DlRTree) of op bounds when sealing.
    pub prepare_rtree: bool,
}

impl BuilderOpts {
    pub fn with_cull_rect(mut self, cull: Rect) -> Self {
        self.cull_rect = Some(cull);
        self
    }

    pub fn with_rtree(mut self, prepare: bool) -> Self {
        self.prepare_rtree = prepare;
        self
    }
}

#[derive(Debug, Clone)]
struct LayerInfo {
    bounds: Option<Rect>,
    opacity_compatible: bool,
    drawn: Vec<Rect>,
}

impl LayerInfo {
    fn new() -> Self {
        Self {
            bounds: None,
            opacity_compatible: true,
            drawn: Vec::new(),
        }
    }

    fn add(&mut self, device: Rect, compatible: bool) {
        if !compatible {
            self.opacity_compatible = false;
        }
        if self.opacity_compatible {
            if self.drawn.iter().any(|d| rects_intersect(*d, device)) {
                self.opacity_compatible = false;
                self.drawn = Vec::new();
            } else {
                self.drawn.push(device);
            }
        }
        self.bounds = join_rect(self.bounds, device);
    }
}

#[derive(Debug)]
struct LayerEntry {
    op_index: usize,
    info: LayerInfo,
    paint: Paint,
    backdrop: Option<Arc<ImageFilter>>,
    bounds_given: bool,
}

#[derive(Debug)]
struct SaveEntry {
    ctm: Affine,
    clip: Rect,
    paint: Paint,
    layer: Option<LayerEntry>,
}

/// Append-only recorder producing an immutable [`DisplayList`].
///
/// Attribute setters record only when the value actually changes. Every `save`/`save_layer`
/// must be matched by a `restore` before [`DisplayListBuilder::build`]; an open save at that
/// point is a caller bug and panics.
#[derive(Debug)]
pub struct DisplayListBuilder {
    opts: BuilderOpts,
    ops: Vec<DlOp>,
    rtree_entries: Vec<(usize, Rect)>,
    current: Paint,
    ctm: Affine,
    clip: Rect,
    stack: Vec<SaveEntry>,
    root: LayerInfo,
    nested_op_count: usize,
}

impl Default for DisplayListBuilder {
    fn default() -> Self {
        Self::new(BuilderOpts::default())
    }
}

impl DisplayListBuilder {
    pub fn new(opts: BuilderOpts) -> Self {
        let clip = opts.cull_rect.unwrap_or_else(unbounded_rect);
        Self {
            opts,
            ops: Vec::new(),
            rtree_entries: Vec::new(),
            current: Paint::default(),
            ctm: Affine::IDENTITY,
            clip,
            stack: Vec::new(),
            root: LayerInfo::new(),
            nested_op_count: 0,
        }
    }

    /// Builder whose sealed list carries an rtree, culled to `cull`.
    pub fn with_rtree(cull: Rect) -> Self {
        Self::new(BuilderOpts::default().with_cull_rect(cull).with_rtree(true))
    }

    /// Number of ops recorded so far.
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// The attributes the next draw will use.
    pub fn current_paint(&self) -> &Paint {
        &self.current
    }

    pub fn color_filter(&self) -> Option<&Arc<ColorFilter>> {
        self.current.color_filter.as_ref()
    }

    pub fn image_filter(&self) -> Option<&Arc<ImageFilter>> {
        self.current.image_filter.as_ref()
    }

    pub fn mask_filter(&self) -> Option<&Arc<MaskFilter>> {
        self.current.mask_filter.as_ref()
    }

    /// Seal the recording.
    ///
    /// # Panics
    ///
    /// Panics when a `save` or `save_layer` is still open.
    pub fn build(self) -> Arc<DisplayList> {
        assert!(
            self.stack.is_empty(),
            "unbalanced save/restore: {} save(s) still open at build()",
            self.stack.len()
        );
        let rtree = self
            .opts
            .prepare_rtree
            .then(|| crate::display_list::rtree::DlRTree::new(self.rtree_entries));
        tracing::trace!(ops = self.ops.len(), "display list sealed");
        Arc::new(DisplayList::new(
            self.ops,
            self.root.bounds.unwrap_or(Rect::ZERO),
            rtree,
            self.nested_op_count,
            self.root.opacity_compatible,
        ))
    }

    fn push(&mut self, op: DlOp) {
        self.ops.push(op);
    }

    // ---------------------------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------------------------

    pub fn set_anti_alias(&mut self, aa: bool) {
        if self.current.anti_alias != aa {
            self.current.anti_alias = aa;
            self.push(DlOp::SetAntiAlias(aa));
        }
    }

    pub fn set_dither(&mut self, dither: bool) {
        if self.current.dither != dither {
            self.current.dither = dither;
            self.push(DlOp::SetDither(dither));
        }
    }

    pub fn set_invert_colors(&mut self, invert: bool) {
        if self.current.invert_colors != invert {
            self.current.invert_colors = invert;
            self.push(DlOp::SetInvertColors(invert));
        }
    }

    pub fn set_color(&mut self, color: Color) {
        if self.current.color != color {
            self.current.color = color;
            self.push(DlOp::SetColor(color));
        }
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        if self.current.blend_mode != mode {
            self.current.blend_mode = mode;
            self.push(DlOp::SetBlendMode(mode));
        }
    }

    pub fn set_style(&mut self, style: PaintStyle) {
        if self.current.style != style {
            self.current.style = style;
            self.push(DlOp::SetStyle(style));
        }
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        if self.current.stroke_width != width {
            self.current.stroke_width = width;
            self.push(DlOp::SetStrokeWidth(width));
        }
    }

    pub fn set_stroke_miter(&mut self, miter: f32) {
        if self.current.stroke_miter != miter {
            self.current.stroke_miter = miter;
            self.push(DlOp::SetStrokeMiter(miter));
        }
    }

    pub fn set_stroke_cap(&mut self, cap: StrokeCap) {
        if self.current.stroke_cap != cap {
            self.current.stroke_cap = cap;
            self.push(DlOp::SetStrokeCap(cap));
        }
    }

    pub fn set_stroke_join(&mut self, join: StrokeJoin) {
        if self.current.stroke_join != join {
            self.current.stroke_join = join;
            self.push(DlOp::SetStrokeJoin(join));
        }
    }

    /// Set or clear the color filter. The builder keeps its own shared copy.
    pub fn set_color_filter(&mut self, filter: Option<&ColorFilter>) {
        self.set_color_filter_shared(filter.map(ColorFilter::shared));
    }

    /// Set or clear the image filter. The builder keeps its own shared copy.
    pub fn set_image_filter(&mut self, filter: Option<&ImageFilter>) {
        self.set_image_filter_shared(filter.map(ImageFilter::shared));
    }

    /// Set or clear the mask filter. The builder keeps its own shared copy.
    pub fn set_mask_filter(&mut self, filter: Option<&MaskFilter>) {
        self.set_mask_filter_shared(filter.map(MaskFilter::shared));
    }

    fn set_color_filter_shared(&mut self, filter: Option<Arc<ColorFilter>>) {
        if self.current.color_filter != filter {
            self.current.color_filter = filter.clone();
            self.push(DlOp::SetColorFilter(filter));
        }
    }

    fn set_image_filter_shared(&mut self, filter: Option<Arc<ImageFilter>>) {
        if self.current.image_filter != filter {
            self.current.image_filter = filter.clone();
            self.push(DlOp::SetImageFilter(filter));
        }
    }

    fn set_mask_filter_shared(&mut self, filter: Option<Arc<MaskFilter>>) {
        if self.current.mask_filter != filter {
            self.current.mask_filter = filter.clone();
            self.push(DlOp::SetMaskFilter(filter));
        }
    }

    /// Record whatever attribute ops are needed to make `paint` current.
    pub fn set_paint(&mut self, paint: &Paint) {
        self.set_anti_alias(paint.anti_alias);
        self.set_dither(paint.dither);
        self.set_invert_colors(paint.invert_colors);
        self.set_color(paint.color);
        self.set_blend_mode(paint.blend_mode);
        self.set_style(paint.style);
        self.set_stroke_width(paint.stroke_width);
        self.set_stroke_miter(paint.stroke_miter);
        self.set_stroke_cap(paint.stroke_cap);
        self.set_stroke_join(paint.stroke_join);
        self.set_color_filter_shared(paint.color_filter.clone());
        self.set_image_filter_shared(paint.image_filter.clone());
        self.set_mask_filter_shared(paint.mask_filter.clone());
    }

    // ---------------------------------------------------------------------------------------
    // Save / restore
    // ---------------------------------------------------------------------------------------

    /// Depth of the save stack; 1 when nothing is saved.
    pub fn save_count(&self) -> usize {
        self.stack.len() + 1
    }

    pub fn save(&mut self) {
        self.stack.push(SaveEntry {
            ctm: self.ctm,
            clip: self.clip,
            paint: self.current.clone(),
            layer: None,
        });
        self.push(DlOp::Save);
    }

    /// Begin an offscreen layer composited through `paint` at the matching restore.
    ///
    /// Without `bounds`, the layer's bounds are computed from its content when it is restored.
    /// A `backdrop` filter is applied to whatever lies beneath the layer at this point.
    pub fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        backdrop: Option<&ImageFilter>,
    ) {
        self.save_layer_shared(bounds, paint, backdrop.map(ImageFilter::shared));
    }

    fn save_layer_shared(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&Paint>,
        backdrop: Option<Arc<ImageFilter>>,
    ) {
        if let Some(p) = paint {
            self.set_paint(p);
        }
        let with_attributes = paint.is_some();
        let layer_paint = if with_attributes {
            self.current.clone()
        } else {
            Paint::default()
        };

        let op_index = self.ops.len();
        self.push(DlOp::SaveLayer(SaveLayerOp {
            bounds: bounds.unwrap_or(Rect::ZERO),
            bounds_from_content: bounds.is_none(),
            with_attributes,
            can_distribute_opacity: false,
            backdrop: backdrop.clone(),
        }));
        self.stack.push(SaveEntry {
            ctm: self.ctm,
            clip: self.clip,
            paint: self.current.clone(),
            layer: Some(LayerEntry {
                op_index,
                info: LayerInfo::new(),
                paint: layer_paint,
                backdrop,
                bounds_given: bounds.is_some(),
            }),
        });

        if let Some(b) = bounds {
            let device = self.ctm.transform_rect_bbox(b);
            self.clip = intersect_rect(self.clip, device).unwrap_or(Rect::ZERO);
        }
    }

    /// Pop the most recent save. A restore with nothing saved is ignored.
    pub fn restore(&mut self) {
        let Some(entry) = self.stack.pop() else {
            return;
        };
        self.push(DlOp::Restore);
        self.ctm = entry.ctm;
        self.clip = entry.clip;
        self.current = entry.paint;

        if let Some(layer) = entry.layer {
            self.finish_layer(layer);
        }
    }

    pub fn restore_to_count(&mut self, count: usize) {
        while self.save_count() > count.max(1) {
            self.restore();
        }
    }

    fn finish_layer(&mut self, layer: LayerEntry) {
        let LayerEntry {
            op_index,
            info,
            paint,
            backdrop,
            bounds_given,
        } = layer;

        let can_distribute = info.opacity_compatible && backdrop.is_none();
        if let DlOp::SaveLayer(op) = &mut self.ops[op_index] {
            if op.bounds_from_content {
                op.bounds = info
                    .bounds
                    .map(|b| device_to_local(self.ctm, b))
                    .unwrap_or(Rect::ZERO);
            }
            op.can_distribute_opacity = can_distribute;
        }

        let mut out = info.bounds;
        if backdrop.is_some()
            || paint
                .color_filter
                .as_ref()
                .is_some_and(|cf| cf.modifies_transparent_black())
        {
            out = None;
        } else if let (Some(b), Some(f)) = (out, &paint.image_filter) {
            out = f.map_device_bounds(b, self.ctm);
        } else if out.is_none() {
            // Nothing drawn and nothing that could make transparent pixels visible.
            return;
        }

        let mut device = out.unwrap_or(self.clip);
        if bounds_given
            && let DlOp::SaveLayer(op) = &self.ops[op_index]
        {
            device = intersect_rect(device, self.ctm.transform_rect_bbox(op.bounds))
                .unwrap_or(Rect::ZERO);
        }
        let compatible = backdrop.is_none() && paint_commutes_with_opacity(&paint);
        self.accumulate_device(op_index, device, compatible);
    }

    // ---------------------------------------------------------------------------------------
    // Transforms
    // ---------------------------------------------------------------------------------------

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx != 0.0 || dy != 0.0 {
            self.ctm *= Affine::translate(Vec2::new(dx, dy));
            self.push(DlOp::Translate { dx, dy });
        }
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        if sx != 1.0 || sy != 1.0 {
            self.ctm *= Affine::scale_non_uniform(sx, sy);
            self.push(DlOp::Scale { sx, sy });
        }
    }

    pub fn rotate(&mut self, degrees: f64) {
        if degrees.rem_euclid(360.0) != 0.0 {
            self.ctm *= Affine::rotate(degrees.to_radians());
            self.push(DlOp::Rotate { degrees });
        }
    }

    pub fn skew(&mut self, sx: f64, sy: f64) {
        if sx != 0.0 || sy != 0.0 {
            self.ctm *= Affine::skew(sx, sy);
            self.push(DlOp::Skew { sx, sy });
        }
    }

    pub fn transform(&mut self, m: Affine) {
        if m != Affine::IDENTITY {
            self.ctm *= m;
            self.push(DlOp::Transform(m));
        }
    }

    pub fn transform_reset(&mut self) {
        self.ctm = Affine::IDENTITY;
        self.push(DlOp::TransformReset);
    }

    pub fn get_transform(&self) -> Affine {
        self.ctm
    }

    // ---------------------------------------------------------------------------------------
    // Clips
    // ---------------------------------------------------------------------------------------

    pub fn clip_rect(&mut self, rect: Rect, op: ClipOp, aa: bool) {
        self.push(DlOp::ClipRect { rect, op, aa });
        match op {
            ClipOp::Intersect => self.intersect_clip(rect),
            ClipOp::Difference => self.subtract_clip(rect),
        }
    }

    pub fn clip_rrect(&mut self, rrect: RoundedRect, op: ClipOp, aa: bool) {
        self.push(DlOp::ClipRRect { rrect, op, aa });
        match op {
            ClipOp::Intersect => self.intersect_clip(rrect.rect()),
            ClipOp::Difference => {
                if rrect.radii().as_single_radius() == Some(0.0) {
                    self.subtract_clip(rrect.rect());
                }
            }
        }
    }

    pub fn clip_path(&mut self, path: &BezPath, op: ClipOp, aa: bool) {
        let bounds = path.bounding_box();
        self.push(DlOp::ClipPath {
            path: Arc::new(path.clone()),
            op,
            aa,
        });
        if op == ClipOp::Intersect {
            self.intersect_clip(bounds);
        }
    }

    fn intersect_clip(&mut self, local: Rect) {
        let device = self.ctm.transform_rect_bbox(local);
        self.clip = intersect_rect(self.clip, device).unwrap_or(Rect::ZERO);
    }

    // A difference clip only shrinks the tracked bounds when it swallows them entirely.
    fn subtract_clip(&mut self, local: Rect) {
        let [_, b, c, _, _, _] = self.ctm.as_coeffs();
        if b != 0.0 || c != 0.0 {
            return;
        }
        let device = self.ctm.transform_rect_bbox(local);
        if device.x0 <= self.clip.x0
            && device.y0 <= self.clip.y0
            && device.x1 >= self.clip.x1
            && device.y1 >= self.clip.y1
        {
            self.clip = Rect::ZERO;
        }
    }

    /// Current clip bounds in device space.
    pub fn device_clip_bounds(&self) -> Rect {
        self.clip
    }

    /// Current clip bounds mapped back into local space.
    pub fn local_clip_bounds(&self) -> Rect {
        device_to_local(self.ctm, self.clip)
    }

    // ---------------------------------------------------------------------------------------
    // Draws
    // ---------------------------------------------------------------------------------------

    pub fn draw_paint(&mut self) {
        self.push(DlOp::DrawPaint);
        let compatible = self.paint_is_opacity_compatible();
        self.accumulate(None, true, compatible);
    }

    pub fn draw_color(&mut self, color: Color, mode: BlendMode) {
        self.push(DlOp::DrawColor { color, mode });
        self.accumulate(None, false, mode == BlendMode::SrcOver);
    }

    /// Lines are always stroked, whatever the current style.
    pub fn draw_line(&mut self, p0: Point, p1: Point) {
        self.push(DlOp::DrawLine { p0, p1 });
        let pad = self.stroke_pad();
        let local = self.mask_expand(Rect::from_points(p0, p1).inflate(pad, pad));
        let compatible = self.paint_is_opacity_compatible();
        self.accumulate(Some(local), true, compatible);
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        self.push(DlOp::DrawRect(rect));
        self.accumulate_shape(rect.abs());
    }

    pub fn draw_oval(&mut self, bounds: Rect) {
        self.push(DlOp::DrawOval(bounds));
        self.accumulate_shape(bounds.abs());
    }

    pub fn draw_circle(&mut self, center: Point, radius: f64) {
        self.push(DlOp::DrawCircle { center, radius });
        let r = radius.abs();
        self.accumulate_shape(Rect::new(center.x - r, center.y - r, center.x + r, center.y + r));
    }

    pub fn draw_rrect(&mut self, rrect: RoundedRect) {
        self.push(DlOp::DrawRRect(rrect));
        self.accumulate_shape(rrect.rect());
    }

    pub fn draw_path(&mut self, path: &BezPath) {
        let bounds = path.bounding_box();
        self.push(DlOp::DrawPath(Arc::new(path.clone())));
        self.accumulate_shape(bounds);
    }

    pub fn draw_arc(&mut self, oval: Rect, start_degrees: f64, sweep_degrees: f64, use_center: bool) {
        self.push(DlOp::DrawArc {
            oval,
            start_degrees,
            sweep_degrees,
            use_center,
        });
        self.accumulate_shape(oval.abs());
    }

    /// Points are always stroked; in [`PointMode::Points`] each point renders as its cap.
    pub fn draw_points(&mut self, mode: PointMode, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let bounds = rest
            .iter()
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
        self.push(DlOp::DrawPoints {
            mode,
            points: Arc::from(points),
        });
        let pad = self.stroke_pad();
        let local = self.mask_expand(bounds.inflate(pad, pad));
        let compatible = self.paint_is_opacity_compatible() && points.len() == 1;
        self.accumulate(Some(local), true, compatible);
    }

    pub fn draw_vertices(&mut self, vertices: Arc<Vertices>, mode: BlendMode) {
        let bounds = vertices.bounds();
        self.push(DlOp::DrawVertices { vertices, mode });
        let local = self.mask_expand(bounds);
        self.accumulate(Some(local), true, false);
    }

    pub fn draw_image(
        &mut self,
        image: Arc<Image>,
        top_left: Point,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        let bounds = Rect::from_origin_size(
            top_left,
            (f64::from(image.width()), f64::from(image.height())),
        );
        self.push(DlOp::DrawImage {
            image,
            top_left,
            filter,
            with_attributes,
        });
        self.accumulate_image(bounds, with_attributes);
    }

    pub fn draw_image_rect(
        &mut self,
        image: Arc<Image>,
        src: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    ) {
        self.push(DlOp::DrawImageRect {
            image,
            src,
            dst,
            filter,
            with_attributes,
        });
        self.accumulate_image(dst.abs(), with_attributes);
    }

    pub fn draw_text_blob(&mut self, blob: Arc<TextBlob>, x: f64, y: f64) {
        let bounds = blob.bounds() + Vec2::new(x, y);
        self.push(DlOp::DrawTextBlob { blob, x, y });
        let local = self.mask_expand(bounds);
        let compatible = self.paint_is_opacity_compatible();
        self.accumulate(Some(local), true, compatible);
    }

    pub fn draw_shadow(
        &mut self,
        path: &BezPath,
        color: Color,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        let bounds = shadow_bounds(path.bounding_box(), elevation, dpr);
        self.push(DlOp::DrawShadow {
            path: Arc::new(path.clone()),
            color,
            elevation,
            transparent_occluder,
            dpr,
        });
        self.accumulate(Some(bounds), false, false);
    }

    /// Embed a sealed list, drawn with an extra group opacity.
    pub fn draw_display_list(&mut self, list: Arc<DisplayList>, opacity: f32) {
        let bounds = list.bounds();
        let compatible = list.can_apply_group_opacity();
        self.nested_op_count += list.op_count(true);
        self.push(DlOp::DrawDisplayList { list, opacity });
        if !rect_is_empty(bounds) {
            self.accumulate(Some(bounds), false, compatible);
        }
    }

    // ---------------------------------------------------------------------------------------
    // Bounds and opacity bookkeeping
    // ---------------------------------------------------------------------------------------

    fn accumulate_shape(&mut self, geometry: Rect) {
        let mut local = geometry;
        if self.current.is_stroked() {
            let pad = self.stroke_pad();
            local = local.inflate(pad, pad);
        }
        let local = self.mask_expand(local);
        let compatible = self.paint_is_opacity_compatible();
        self.accumulate(Some(local), true, compatible);
    }

    fn accumulate_image(&mut self, bounds: Rect, with_attributes: bool) {
        let local = if with_attributes {
            self.mask_expand(bounds)
        } else {
            bounds
        };
        let compatible = !with_attributes || self.paint_is_opacity_compatible();
        self.accumulate(Some(local), with_attributes, compatible);
    }

    fn mask_expand(&self, local: Rect) -> Rect {
        match &self.current.mask_filter {
            Some(mf) => mf.expand_bounds(local),
            None => local,
        }
    }

    fn stroke_pad(&self) -> f64 {
        let p = &self.current;
        let half = if p.stroke_width > 0.0 {
            f64::from(p.stroke_width) * 0.5
        } else {
            0.5
        };
        let join_pad = if p.stroke_join == StrokeJoin::Miter {
            half * f64::from(p.stroke_miter.max(1.0))
        } else {
            half
        };
        let cap_pad = if p.stroke_cap == StrokeCap::Square {
            half * SQRT_2
        } else {
            half
        };
        join_pad.max(cap_pad)
    }

    fn paint_is_opacity_compatible(&self) -> bool {
        paint_commutes_with_opacity(&self.current)
    }

    // `local == None` means the op covers the whole clip.
    fn accumulate(&mut self, local: Option<Rect>, uses_paint: bool, compatible: bool) {
        let op_index = self.ops.len() - 1;
        let mut device = local.map(|r| self.ctm.transform_rect_bbox(r));
        if uses_paint {
            let p = &self.current;
            if p
                .color_filter
                .as_ref()
                .is_some_and(|cf| cf.modifies_transparent_black())
            {
                device = None;
            } else if let (Some(d), Some(f)) = (device, &p.image_filter) {
                device = f.map_device_bounds(d, self.ctm);
            }
        }
        let device = device.unwrap_or(self.clip);
        self.accumulate_device(op_index, device, compatible);
    }

    fn accumulate_device(&mut self, op_index: usize, device: Rect, compatible: bool) {
        let Some(clipped) = intersect_rect(device, self.clip) else {
            return;
        };
        self.current_layer().add(clipped, compatible);
        if self.opts.prepare_rtree {
            self.rtree_entries.push((op_index, clipped));
        }
    }

    fn current_layer(&mut self) -> &mut LayerInfo {
        for entry in self.stack.iter_mut().rev() {
            if let Some(layer) = entry.layer.as_mut() {
                return &mut layer.info;
            }
        }
        &mut self.root
    }
}

fn paint_commutes_with_opacity(p: &Paint) -> bool {
    p.blend_mode == BlendMode::SrcOver
        && p.image_filter.is_none()
        && p
            .color_filter
            .as_ref()
            .is_none_or(|cf| cf.can_commute_with_opacity())
}

fn device_to_local(ctm: Affine, device: Rect) -> Rect {
    if ctm.determinant() == 0.0 {
        return device;
    }
    ctm.inverse().transform_rect_bbox(device)
}

/// Conservative bounds of an elevation shadow cast by an occluder with `bounds`.
pub(crate) fn shadow_bounds(bounds: Rect, elevation: f64, dpr: f64) -> Rect {
    let spread = (elevation * dpr).abs();
    bounds
        .inflate(spread, spread)
        .union(bounds + Vec2::new(0.0, spread))
}

impl Canvas for DisplayListBuilder {
    fn save(&mut self) {
        DisplayListBuilder::save(self);
    }

    fn save_layer(
        &mut self,
        bounds: Option<Rect>,
        paint: Option<&NativePaint>,
        backdrop: Option<&Arc<NativeImageFilter>>,
    ) {
        let paint = paint.map(Paint::from_native);
        let backdrop = ImageFilter::from_native(backdrop);
        self.save_layer_shared(bounds, paint.as_ref(), backdrop);
    }

    fn restore(&mut self) {
        DisplayListBuilder::restore(self);
    }

    fn save_count(&self) -> usize {
        DisplayListBuilder::save_count(self)
    }

    fn transform(&mut self, m: Affine) {
        DisplayListBuilder::transform(self, m);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        DisplayListBuilder::translate(self, dx, dy);
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        DisplayListBuilder::scale(self, sx, sy);
    }

    fn rotate(&mut self, degrees: f64) {
        DisplayListBuilder::rotate(self, degrees);
    }

    fn skew(&mut self, sx: f64, sy: f64) {
        DisplayListBuilder::skew(self, sx, sy);
    }

    fn transform_reset(&mut self) {
        DisplayListBuilder::transform_reset(self);
    }

    fn get_transform(&self) -> Affine {
        self.ctm
    }

    fn clip_rect(&mut self, rect: Rect, op: ClipOp, aa: bool) {
        DisplayListBuilder::clip_rect(self, rect, op, aa);
    }

    fn clip_rrect(&mut self, rrect: RoundedRect, op: ClipOp, aa: bool) {
        DisplayListBuilder::clip_rrect(self, rrect, op, aa);
    }

    fn clip_path(&mut self, path: &BezPath, op: ClipOp, aa: bool) {
        DisplayListBuilder::clip_path(self, path, op, aa);
    }

    fn draw_color(&mut self, color: Color, mode: BlendMode) {
        DisplayListBuilder::draw_color(self, color, mode);
    }

    fn draw_paint(&mut self, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_paint(self);
    }

    fn draw_line(&mut self, p0: Point, p1: Point, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_line(self, p0, p1);
    }

    fn draw_rect(&mut self, rect: Rect, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_rect(self, rect);
    }

    fn draw_oval(&mut self, bounds: Rect, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_oval(self, bounds);
    }

    fn draw_circle(&mut self, center: Point, radius: f64, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_circle(self, center, radius);
    }

    fn draw_rrect(&mut self, rrect: RoundedRect, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_rrect(self, rrect);
    }

    fn draw_path(&mut self, path: &BezPath, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_path(self, path);
    }

    fn draw_arc(
        &mut self,
        oval: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
        paint: &NativePaint,
    ) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_arc(self, oval, start_degrees, sweep_degrees, use_center);
    }

    fn draw_points(&mut self, mode: PointMode, points: &[Point], paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_points(self, mode, points);
    }

    fn draw_vertices(&mut self, vertices: &Arc<Vertices>, mode: BlendMode, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_vertices(self, Arc::clone(vertices), mode);
    }

    fn draw_image(
        &mut self,
        image: &Arc<Image>,
        top_left: Point,
        filter: FilterMode,
        paint: Option<&NativePaint>,
    ) {
        if let Some(p) = paint {
            self.set_paint(&Paint::from_native(p));
        }
        DisplayListBuilder::draw_image(self, Arc::clone(image), top_left, filter, paint.is_some());
    }

    fn draw_image_rect(
        &mut self,
        image: &Arc<Image>,
        src: Rect,
        dst: Rect,
        filter: FilterMode,
        paint: Option<&NativePaint>,
    ) {
        if let Some(p) = paint {
            self.set_paint(&Paint::from_native(p));
        }
        DisplayListBuilder::draw_image_rect(
            self,
            Arc::clone(image),
            src,
            dst,
            filter,
            paint.is_some(),
        );
    }

    fn draw_text_blob(&mut self, blob: &Arc<TextBlob>, x: f64, y: f64, paint: &NativePaint) {
        self.set_paint(&Paint::from_native(paint));
        DisplayListBuilder::draw_text_blob(self, Arc::clone(blob), x, y);
    }

    fn draw_shadow(
        &mut self,
        path: &BezPath,
        color: Color,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    ) {
        DisplayListBuilder::draw_shadow(self, path, color, elevation, transparent_occluder, dpr);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display_list/builder.rs"]
mod tests;
