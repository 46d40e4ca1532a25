use std::sync::Arc;

use kurbo::Shape;

use crate::foundation::core::{BezPath, Color, Point, Rect};
use crate::foundation::error::{DlError, DlResult};

/// Boolean operation of a clip against the current clip.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClipOp {
    #[default]
    Intersect,
    Difference,
}

/// How `draw_points` interprets its point list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointMode {
    /// Each point is a zero-length segment rendered with the stroke cap.
    Points,
    /// Consecutive pairs are independent segments.
    Lines,
    /// One open polyline through all points.
    Polygon,
}

/// Image sampling quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// An immutable premultiplied RGBA8 image.
///
/// Images compare by identity: two separately created images are never equal.
#[derive(Debug)]
pub struct Image {
    width: u32,
    height: u32,
    rgba8_premul: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> DlResult<Arc<Self>> {
        if width == 0 || height == 0 {
            return Err(DlError::validation("image dimensions must be > 0"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| DlError::validation("image byte size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(DlError::validation(format!(
                "image byte len {} does not match {width}x{height}x4",
                rgba8_premul.len()
            )));
        }
        Ok(Arc::new(Self {
            width,
            height,
            rgba8_premul,
        }))
    }

    /// A solid-color image.
    pub fn solid(width: u32, height: u32, color: Color) -> DlResult<Arc<Self>> {
        let px = color.to_premul_rgba8();
        let len = (width as usize).saturating_mul(height as usize);
        Self::new(width, height, px.repeat(len))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes(&self) -> &[u8] {
        &self.rgba8_premul
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// Pre-shaped text: glyph outlines positioned relative to the blob origin.
///
/// Blobs compare by identity.
#[derive(Debug)]
pub struct TextBlob {
    glyphs: Vec<BezPath>,
    bounds: Rect,
}

impl TextBlob {
    pub fn new(glyphs: Vec<BezPath>) -> Arc<Self> {
        let bounds = glyphs
            .iter()
            .map(|g| g.bounding_box())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);
        Arc::new(Self { glyphs, bounds })
    }

    pub fn glyphs(&self) -> &[BezPath] {
        &self.glyphs
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

impl PartialEq for TextBlob {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexMode {
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// A triangle mesh with optional per-vertex colors.
///
/// Built only through [`Vertices::new`] or [`Vertices::with_attributes`], so every index and
/// color lines up with a position.
#[derive(Clone, Debug, PartialEq)]
pub struct Vertices {
    mode: VertexMode,
    positions: Vec<Point>,
    colors: Option<Vec<Color>>,
    indices: Option<Vec<u16>>,
}

impl Vertices {
    pub fn new(mode: VertexMode, positions: Vec<Point>) -> DlResult<Arc<Self>> {
        Self::with_attributes(mode, positions, None, None)
    }

    pub fn with_attributes(
        mode: VertexMode,
        positions: Vec<Point>,
        colors: Option<Vec<Color>>,
        indices: Option<Vec<u16>>,
    ) -> DlResult<Arc<Self>> {
        if let Some(c) = &colors
            && c.len() != positions.len()
        {
            return Err(DlError::validation("vertex color count must match positions"));
        }
        if let Some(idx) = &indices
            && idx.iter().any(|&i| usize::from(i) >= positions.len())
        {
            return Err(DlError::validation("vertex index out of range"));
        }
        Ok(Arc::new(Self {
            mode,
            positions,
            colors,
            indices,
        }))
    }

    pub fn mode(&self) -> VertexMode {
        self.mode
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Per-vertex colors, one per position.
    pub fn colors(&self) -> Option<&[Color]> {
        self.colors.as_deref()
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn bounds(&self) -> Rect {
        let mut it = self.positions.iter();
        let Some(first) = it.next() else {
            return Rect::ZERO;
        };
        it.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
    }

    /// Vertex indices of every triangle, resolved through the mode and index buffer.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let order: Vec<usize> = match &self.indices {
            Some(idx) => idx.iter().map(|&i| usize::from(i)).collect(),
            None => (0..self.positions.len()).collect(),
        };
        match self.mode {
            VertexMode::Triangles => order
                .chunks_exact(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            VertexMode::TriangleStrip => order
                .windows(3)
                .map(|t| [t[0], t[1], t[2]])
                .collect(),
            VertexMode::TriangleFan => match order.split_first() {
                Some((&hub, rest)) => rest.windows(2).map(|t| [hub, t[0], t[1]]).collect(),
                None => Vec::new(),
            },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display_list/types.rs"]
mod tests;
