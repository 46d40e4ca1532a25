use std::collections::HashMap;
use std::path::Path;

use crate::display_list::types::ClipOp;
use crate::embed::params::EmbeddedViewParams;
use crate::embed::platform::{PlatformThread, PlatformViewsController};
use crate::embed::slice::{DisplayListEmbedderViewSlice, EmbedderViewSlice};
use crate::embed::slicer::slice_views;
use crate::embed::surface_pool::{OverlayLayerPool, OverlayPoolOpts, OverlayPoolStats};
use crate::foundation::core::{Color, Point, Rect, ViewId};
use crate::foundation::error::{DlError, DlResult};
use crate::render::backend::FrameRGBA;
use crate::render::canvas::Canvas;
use crate::render::cpu::{CpuCanvas, frame_from_pixmap};

/// Embedder configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EmbedderOpts {
    /// Overlay pool limits.
    pub pool: OverlayPoolOpts,
    /// RGBA8 each overlay is cleared to before its slice is drawn.
    pub overlay_clear_rgba: [u8; 4],
    /// If set, the background canvas is cleared to this RGBA8 color at submit.
    pub background_clear_rgba: Option<[u8; 4]>,
    /// Name of the platform thread.
    pub platform_thread_name: String,
}

impl Default for EmbedderOpts {
    fn default() -> Self {
        Self {
            pool: OverlayPoolOpts::default(),
            overlay_clear_rgba: [0, 0, 0, 0],
            background_clear_rgba: None,
            platform_thread_name: String::from("platform"),
        }
    }
}

impl EmbedderOpts {
    pub fn from_json_str(s: &str) -> DlResult<Self> {
        serde_json::from_str(s).map_err(|e| DlError::serde(format!("invalid embedder opts: {e}")))
    }

    pub fn from_json_path(path: &Path) -> DlResult<Self> {
        use anyhow::Context as _;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read embedder opts '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

/// One overlay composited this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayInfo {
    pub view: ViewId,
    pub surface_id: i64,
    pub rect: Rect,
}

/// What a frame submission produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitInfo {
    /// Overlays in composition order.
    pub overlays: Vec<OverlayInfo>,
    /// Views whose overlay was skipped because no layer was available.
    pub dropped_overlays: Vec<ViewId>,
}

struct OverlayFrame {
    info: OverlayInfo,
    frame: FrameRGBA,
}

/// Frame orchestration for content composited around native platform views.
///
/// Per frame: [`begin_frame`](Self::begin_frame), then for each platform view
/// [`preroll_composite_embedded_view`](Self::preroll_composite_embedded_view) and
/// [`composite_embedded_view`](Self::composite_embedded_view) to record what lies above it,
/// then [`submit_frame`](Self::submit_frame) (or [`cancel_frame`](Self::cancel_frame)) and
/// [`end_frame`](Self::end_frame). Positioning of the native views happens on the platform
/// thread from a snapshot moved out of the embedder at submit.
pub struct ExternalViewEmbedder {
    opts: EmbedderOpts,
    platform: PlatformThread,
    pool: OverlayLayerPool,
    overlay_canvas: Option<CpuCanvas>,
    frame_size: (u32, u32),
    device_pixel_ratio: f64,
    composition_order: Vec<ViewId>,
    view_params: HashMap<ViewId, EmbeddedViewParams>,
    slices: HashMap<ViewId, Box<dyn EmbedderViewSlice>>,
    in_frame: bool,
}

impl std::fmt::Debug for ExternalViewEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalViewEmbedder")
            .field("frame_size", &self.frame_size)
            .field("composition_order", &self.composition_order)
            .field("in_frame", &self.in_frame)
            .finish_non_exhaustive()
    }
}

impl ExternalViewEmbedder {
    pub fn new(opts: EmbedderOpts, controller: Box<dyn PlatformViewsController>) -> DlResult<Self> {
        let platform = PlatformThread::spawn(&opts.platform_thread_name, controller)?;
        let pool = OverlayLayerPool::new(opts.pool);
        Ok(Self {
            opts,
            platform,
            pool,
            overlay_canvas: None,
            frame_size: (0, 0),
            device_pixel_ratio: 1.0,
            composition_order: Vec::new(),
            view_params: HashMap::new(),
            slices: HashMap::new(),
            in_frame: false,
        })
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.frame_size
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Platform views registered this frame, bottom to top.
    pub fn current_composition_order(&self) -> &[ViewId] {
        &self.composition_order
    }

    pub fn pool_stats(&self) -> OverlayPoolStats {
        self.pool.stats()
    }

    pub fn begin_frame(&mut self, frame_size: (u32, u32), device_pixel_ratio: f64) -> DlResult<()> {
        self.reset();
        let dropped = self.pool.check_layer_size_change(frame_size);
        if !dropped.is_empty() {
            self.platform
                .post(move |c| c.destroy_overlay_surfaces(&dropped))?;
        }
        if self.frame_size != frame_size {
            self.overlay_canvas = None;
        }
        self.frame_size = frame_size;
        self.device_pixel_ratio = device_pixel_ratio;
        self.in_frame = true;
        self.platform.post(move |c| c.on_begin_frame(frame_size))?;
        tracing::debug!(?frame_size, device_pixel_ratio, "begin frame");
        Ok(())
    }

    /// Register platform view `id` for this frame and open its slice.
    pub fn preroll_composite_embedded_view(&mut self, id: ViewId, params: EmbeddedViewParams) {
        let (w, h) = self.frame_size;
        let bounds = Rect::from_origin_size(Point::ORIGIN, (f64::from(w), f64::from(h)));
        self.slices
            .insert(id, Box::new(DisplayListEmbedderViewSlice::new(bounds)));
        if self.view_params.insert(id, params).is_none() {
            self.composition_order.push(id);
        }
    }

    /// The canvas for content drawn above platform view `id`.
    ///
    /// # Panics
    ///
    /// Panics when `id` was not prerolled this frame.
    pub fn composite_embedded_view(&mut self, id: ViewId) -> &mut dyn Canvas {
        let Some(slice) = self.slices.get_mut(&id) else {
            panic!("{id} composited without preroll");
        };
        match slice.canvas() {
            Some(canvas) => canvas,
            None => panic!("{id} composited after its slice was sealed"),
        }
    }

    /// Slice the frame, render overlays, and hand the frame to the platform thread.
    ///
    /// Content that does not need an overlay is drawn into `background`.
    #[tracing::instrument(skip_all, fields(views = self.composition_order.len()))]
    pub fn submit_frame(&mut self, background: &mut CpuCanvas) -> DlResult<SubmitInfo> {
        if let Some([r, g, b, a]) = self.opts.background_clear_rgba {
            background.clear(Color::from_argb(a, r, g, b));
        }

        let view_rects: HashMap<ViewId, Rect> = self
            .view_params
            .iter()
            .map(|(id, p)| (*id, p.final_bounding_rect()))
            .collect();
        let overlay_rects = slice_views(
            background,
            &self.composition_order,
            &mut self.slices,
            &view_rects,
        );

        self.pool.recycle_layers();
        let mut info = SubmitInfo::default();
        let mut overlays = Vec::new();
        for id in &self.composition_order {
            let Some(&rect) = overlay_rects.get(id) else {
                continue;
            };
            let Some(slice) = self.slices.get(id) else {
                continue;
            };
            let Some(layer) = self.pool.get_layer(self.frame_size)? else {
                tracing::warn!(view = %id, "no overlay layer available; dropping overlay");
                info.dropped_overlays.push(*id);
                continue;
            };

            if self.overlay_canvas.is_none() {
                self.overlay_canvas = Some(CpuCanvas::new(self.frame_size.0, self.frame_size.1)?);
            }
            let Some(canvas) = self.overlay_canvas.as_mut() else {
                continue;
            };
            let [r, g, b, a] = self.opts.overlay_clear_rgba;
            if a != 0 {
                canvas.clear(Color::from_argb(a, r, g, b));
            }
            canvas.save();
            canvas.clip_rect(rect, ClipOp::Intersect, false);
            slice.render_into(canvas);
            canvas.restore();
            canvas.render_to_pixmap(&mut layer.pixmap);

            let overlay = OverlayInfo {
                view: *id,
                surface_id: layer.id,
                rect,
            };
            info.overlays.push(overlay.clone());
            overlays.push(OverlayFrame {
                info: overlay,
                frame: frame_from_pixmap(&layer.pixmap),
            });
        }

        let order = std::mem::take(&mut self.composition_order);
        let params = std::mem::take(&mut self.view_params);
        let slices = std::mem::take(&mut self.slices);
        self.platform.post(move |c| {
            for id in &order {
                if let Some(p) = params.get(id) {
                    c.on_display_platform_view(*id, p);
                }
                for o in overlays.iter().filter(|o| o.info.view == *id) {
                    c.on_display_overlay_surface(o.info.surface_id, o.info.rect, &o.frame);
                }
            }
            c.on_end_frame();
            drop(slices);
        })?;

        tracing::debug!(
            overlays = info.overlays.len(),
            dropped = info.dropped_overlays.len(),
            "frame submitted"
        );
        Ok(info)
    }

    /// Drop everything recorded this frame without submitting it.
    pub fn cancel_frame(&mut self) {
        tracing::debug!(views = self.composition_order.len(), "frame cancelled");
        self.reset();
    }

    /// Close the frame and release overlay layers the frame did not use.
    pub fn end_frame(&mut self) -> DlResult<()> {
        self.in_frame = false;
        let unused = self.pool.trim_unused();
        if !unused.is_empty() {
            tracing::debug!(count = unused.len(), "trimming unused overlay layers");
            self.platform
                .post(move |c| c.destroy_overlay_surfaces(&unused))?;
        }
        Ok(())
    }

    /// Release every overlay surface, blocking until the platform thread has done so.
    pub fn destroy_surfaces(&mut self) -> DlResult<()> {
        let ids = self.pool.destroy_layers();
        self.overlay_canvas = None;
        tracing::debug!(count = ids.len(), "destroying overlay surfaces");
        self.platform
            .post_and_wait(move |c| c.destroy_overlay_surfaces(&ids))
    }

    /// Drop frame state and synchronously release all overlay surfaces.
    pub fn teardown(&mut self) -> DlResult<()> {
        self.reset();
        self.in_frame = false;
        self.destroy_surfaces()
    }

    fn reset(&mut self) {
        self.composition_order.clear();
        self.view_params.clear();
        self.slices.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/embed/embedder.rs"]
mod tests;
