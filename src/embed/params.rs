use std::sync::Arc;

use crate::foundation::core::{Affine, BezPath, Point, Rect, RoundedRect, Vec2, intersect_rect};

/// One step of the clip/transform/opacity chain a platform view is composited through,
/// listed from the root of the layer tree down to the view.
#[derive(Clone, Debug, PartialEq)]
pub enum Mutator {
    Transform(Affine),
    ClipRect(Rect),
    ClipRRect(RoundedRect),
    ClipPath(Arc<BezPath>),
    Opacity(f32),
}

/// Placement of one platform view for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddedViewParams {
    transform: Affine,
    size_points: Vec2,
    mutators: Vec<Mutator>,
    final_bounding_rect: Rect,
}

impl EmbeddedViewParams {
    /// `transform` maps the view's local space (in points) to device pixels.
    pub fn new(transform: Affine, size_points: Vec2, mutators: Vec<Mutator>) -> Self {
        let final_bounding_rect = compute_bounding_rect(transform, size_points, &mutators);
        Self {
            transform,
            size_points,
            mutators,
            final_bounding_rect,
        }
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn size_points(&self) -> Vec2 {
        self.size_points
    }

    pub fn mutators(&self) -> &[Mutator] {
        &self.mutators
    }

    /// Device-space bounds of the view after its transform and rect clips.
    pub fn final_bounding_rect(&self) -> Rect {
        self.final_bounding_rect
    }

    /// Product of every opacity mutator.
    pub fn opacity(&self) -> f32 {
        self.mutators
            .iter()
            .filter_map(|m| match m {
                Mutator::Opacity(o) => Some(*o),
                _ => None,
            })
            .product()
    }
}

fn compute_bounding_rect(transform: Affine, size: Vec2, mutators: &[Mutator]) -> Rect {
    let local = Rect::from_origin_size(Point::ORIGIN, size.to_size());
    let view = transform.transform_rect_bbox(local);

    let mut ctm = Affine::IDENTITY;
    let mut clip: Option<Rect> = None;
    for m in mutators {
        let local = match m {
            Mutator::Transform(t) => {
                ctm *= *t;
                continue;
            }
            Mutator::ClipRect(r) => *r,
            Mutator::ClipRRect(rr) => rr.rect(),
            Mutator::ClipPath(p) => kurbo::Shape::bounding_box(&**p),
            Mutator::Opacity(_) => continue,
        };
        let device = ctm.transform_rect_bbox(local);
        clip = Some(match clip {
            Some(c) => intersect_rect(c, device).unwrap_or(Rect::ZERO),
            None => device,
        });
    }

    match clip {
        Some(c) => intersect_rect(view, c).unwrap_or(Rect::ZERO),
        None => view,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/embed/params.rs"]
mod tests;
