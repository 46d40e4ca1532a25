//! Immutable display lists and platform-view slicing for embedded compositors.
//!
//! The crate records 2D drawing into a [`DisplayList`] through a [`DisplayListBuilder`],
//! replays it onto any [`Canvas`] (a CPU rasterizer, [`CpuCanvas`], is bundled), and splits a
//! frame around native platform views:
//!
//! - [`ColorFilter`], [`MaskFilter`] and [`ImageFilter`] are immutable filter descriptions,
//!   convertible to their backend counterparts.
//! - [`slice_views`] decides which recorded content must be drawn into overlays above platform
//!   views and draws the rest into the background.
//! - [`ExternalViewEmbedder`] runs that per frame, manages overlay layers, and hands the frame to
//!   a [`PlatformViewsController`] on its own thread.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod display_list;
pub(crate) mod effects;
pub(crate) mod embed;
pub(crate) mod native;
pub(crate) mod render;

pub use crate::foundation::core::{
    Affine, BezPath, Color, IRect, Point, Rect, RoundedRect, Vec2, ViewId, round_in, round_out,
};
pub use crate::foundation::error::{DlError, DlResult};

pub use crate::display_list::builder::{BuilderOpts, DisplayListBuilder};
pub use crate::display_list::list::DisplayList;
pub use crate::display_list::ops::{DlOp, SaveLayerOp};
pub use crate::display_list::paint::{Paint, PaintStyle, StrokeCap, StrokeJoin};
pub use crate::display_list::rtree::DlRTree;
pub use crate::display_list::types::{
    ClipOp, FilterMode, Image, PointMode, TextBlob, VertexMode, Vertices,
};

pub use crate::effects::blend::BlendMode;
pub use crate::effects::color_filter::{ColorFilter, ColorFilterType};
pub use crate::effects::image_filter::{ImageFilter, TileMode};
pub use crate::effects::mask_filter::{BlurStyle, MaskFilter};

pub use crate::native::filters::{NativeColorFilter, NativeImageFilter, NativeMaskFilter};
pub use crate::native::paint::NativePaint;

pub use crate::render::backend::FrameRGBA;
pub use crate::render::canvas::Canvas;
pub use crate::render::cpu::CpuCanvas;

pub use crate::embed::embedder::{EmbedderOpts, ExternalViewEmbedder, OverlayInfo, SubmitInfo};
pub use crate::embed::params::{EmbeddedViewParams, Mutator};
pub use crate::embed::platform::{PlatformThread, PlatformViewsController};
pub use crate::embed::slice::{DisplayListEmbedderViewSlice, EmbedderViewSlice};
pub use crate::embed::slicer::slice_views;
pub use crate::embed::surface_pool::{
    OverlayLayer, OverlayLayerPool, OverlayPoolOpts, OverlayPoolStats,
};
