use std::sync::Arc;

use crate::display_list::list::DisplayList;
use crate::display_list::paint::{PaintStyle, StrokeCap, StrokeJoin};
use crate::display_list::types::{ClipOp, FilterMode, Image, PointMode, TextBlob, Vertices};
use crate::effects::blend::BlendMode;
use crate::effects::color_filter::ColorFilter;
use crate::effects::image_filter::ImageFilter;
use crate::effects::mask_filter::MaskFilter;
use crate::foundation::core::{Affine, BezPath, Color, Point, Rect, RoundedRect};

/// One recorded display list operation.
///
/// Attribute ops change the paint used by every later draw until overridden or until a
/// `Restore` pops back past the `Save` that preceded them.
#[derive(Clone, Debug, PartialEq)]
pub enum DlOp {
    SetAntiAlias(bool),
    SetDither(bool),
    SetInvertColors(bool),
    SetColor(Color),
    SetBlendMode(BlendMode),
    SetStyle(PaintStyle),
    SetStrokeWidth(f32),
    SetStrokeMiter(f32),
    SetStrokeCap(StrokeCap),
    SetStrokeJoin(StrokeJoin),
    SetColorFilter(Option<Arc<ColorFilter>>),
    SetImageFilter(Option<Arc<ImageFilter>>),
    SetMaskFilter(Option<Arc<MaskFilter>>),

    Save,
    SaveLayer(SaveLayerOp),
    Restore,

    Translate { dx: f64, dy: f64 },
    Scale { sx: f64, sy: f64 },
    Rotate { degrees: f64 },
    Skew { sx: f64, sy: f64 },
    Transform(Affine),
    TransformReset,

    ClipRect { rect: Rect, op: ClipOp, aa: bool },
    ClipRRect { rrect: RoundedRect, op: ClipOp, aa: bool },
    ClipPath { path: Arc<BezPath>, op: ClipOp, aa: bool },

    DrawPaint,
    DrawColor { color: Color, mode: BlendMode },
    DrawLine { p0: Point, p1: Point },
    DrawRect(Rect),
    DrawOval(Rect),
    DrawCircle { center: Point, radius: f64 },
    DrawRRect(RoundedRect),
    DrawPath(Arc<BezPath>),
    DrawArc {
        oval: Rect,
        start_degrees: f64,
        sweep_degrees: f64,
        use_center: bool,
    },
    DrawPoints { mode: PointMode, points: Arc<[Point]> },
    DrawVertices { vertices: Arc<Vertices>, mode: BlendMode },
    DrawImage {
        image: Arc<Image>,
        top_left: Point,
        filter: FilterMode,
        with_attributes: bool,
    },
    DrawImageRect {
        image: Arc<Image>,
        src: Rect,
        dst: Rect,
        filter: FilterMode,
        with_attributes: bool,
    },
    DrawTextBlob { blob: Arc<TextBlob>, x: f64, y: f64 },
    DrawShadow {
        path: Arc<BezPath>,
        color: Color,
        elevation: f64,
        transparent_occluder: bool,
        dpr: f64,
    },
    DrawDisplayList { list: Arc<DisplayList>, opacity: f32 },
}

/// Payload of a recorded `save_layer`.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveLayerOp {
    /// Layer bounds in the local space of the save. When the caller gave none, the builder
    /// fills in the bounds of the layer's content at the matching restore.
    pub bounds: Rect,
    /// `true` when `bounds` was computed from content rather than supplied.
    pub bounds_from_content: bool,
    /// `true` when the current paint attributes apply to the layer as a whole.
    pub with_attributes: bool,
    /// `true` when the layer's alpha can be pushed down into its children instead.
    pub can_distribute_opacity: bool,
    /// Filter applied to the content beneath the layer before the layer is drawn.
    pub backdrop: Option<Arc<ImageFilter>>,
}

impl DlOp {
    /// Return `true` for operations that produce pixels.
    pub fn is_rendering(&self) -> bool {
        matches!(
            self,
            Self::DrawPaint
                | Self::DrawColor { .. }
                | Self::DrawLine { .. }
                | Self::DrawRect(_)
                | Self::DrawOval(_)
                | Self::DrawCircle { .. }
                | Self::DrawRRect(_)
                | Self::DrawPath(_)
                | Self::DrawArc { .. }
                | Self::DrawPoints { .. }
                | Self::DrawVertices { .. }
                | Self::DrawImage { .. }
                | Self::DrawImageRect { .. }
                | Self::DrawTextBlob { .. }
                | Self::DrawShadow { .. }
                | Self::DrawDisplayList { .. }
        )
    }
}
