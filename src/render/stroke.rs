use kurbo::{Cap, Circle, Join, PathEl, Shape, Stroke, StrokeOpts};

use crate::display_list::paint::{PaintStyle, StrokeCap, StrokeJoin};
use crate::display_list::types::PointMode;
use crate::foundation::core::{BezPath, Point, Rect};
use crate::native::paint::NativePaint;

const TOLERANCE: f64 = 0.1;

/// Stroke parameters for `paint`; a zero width strokes as a one-unit hairline.
pub(crate) fn stroke_style(paint: &NativePaint) -> Stroke {
    let width = if paint.stroke_width > 0.0 {
        f64::from(paint.stroke_width)
    } else {
        1.0
    };
    Stroke::new(width)
        .with_caps(match paint.stroke_cap {
            StrokeCap::Butt => Cap::Butt,
            StrokeCap::Round => Cap::Round,
            StrokeCap::Square => Cap::Square,
        })
        .with_join(match paint.stroke_join {
            StrokeJoin::Miter => Join::Miter,
            StrokeJoin::Round => Join::Round,
            StrokeJoin::Bevel => Join::Bevel,
        })
        .with_miter_limit(f64::from(paint.stroke_miter))
}

/// Fillable outline of `path` stroked with `paint`.
///
/// A zero-length contour still renders its cap: a dot for round caps, a square for square caps,
/// nothing for butt caps. Each contour is judged on its own.
pub(crate) fn stroke_outline(path: &BezPath, paint: &NativePaint) -> BezPath {
    let style = stroke_style(paint);
    let r = style.width * 0.5;
    let mut caps = BezPath::new();
    let mut rest = BezPath::new();
    for contour in contours(path) {
        match degenerate_point(&contour) {
            Some(at) => match paint.stroke_cap {
                StrokeCap::Butt => {}
                StrokeCap::Round => caps.extend(Circle::new(at, r).path_elements(TOLERANCE)),
                StrokeCap::Square => caps.extend(
                    Rect::new(at.x - r, at.y - r, at.x + r, at.y + r).path_elements(TOLERANCE),
                ),
            },
            None => rest.extend(contour.elements().iter().copied()),
        }
    }
    let mut outline = if rest.elements().is_empty() {
        BezPath::new()
    } else {
        kurbo::stroke(rest.iter(), &style, &StrokeOpts::default(), TOLERANCE)
    };
    outline.extend(caps.elements().iter().copied());
    outline
}

// Split `path` at every move-to.
fn contours(path: &BezPath) -> Vec<BezPath> {
    let mut out: Vec<BezPath> = Vec::new();
    for &el in path.elements() {
        match (el, out.last_mut()) {
            (PathEl::MoveTo(_), _) | (_, None) => {
                let mut c = BezPath::new();
                c.push(el);
                out.push(c);
            }
            (_, Some(c)) => c.push(el),
        }
    }
    out
}

/// The filled paths a shape draw produces under `paint`'s style.
pub(crate) fn fill_geometry(path: BezPath, paint: &NativePaint) -> Vec<BezPath> {
    match paint.style {
        PaintStyle::Fill => vec![path],
        PaintStyle::Stroke => vec![stroke_outline(&path, paint)],
        PaintStyle::StrokeAndFill => {
            let outline = stroke_outline(&path, paint);
            vec![path, outline]
        }
    }
}

/// Open contours traced by a point draw in `mode`.
pub(crate) fn point_contours(mode: PointMode, points: &[Point]) -> Vec<BezPath> {
    let segment = |a: Point, b: Point| {
        let mut p = BezPath::new();
        p.move_to(a);
        p.line_to(b);
        p
    };
    match mode {
        PointMode::Points => points.iter().map(|p| segment(*p, *p)).collect(),
        PointMode::Lines => points
            .chunks_exact(2)
            .map(|pair| segment(pair[0], pair[1]))
            .collect(),
        PointMode::Polygon => {
            let Some((first, rest)) = points.split_first() else {
                return Vec::new();
            };
            let mut p = BezPath::new();
            p.move_to(*first);
            if rest.is_empty() {
                p.line_to(*first);
            }
            for pt in rest {
                p.line_to(*pt);
            }
            vec![p]
        }
    }
}

// The single location of a contour whose every point coincides, if it has any segment.
fn degenerate_point(path: &BezPath) -> Option<Point> {
    let mut at: Option<Point> = None;
    let mut has_segment = false;
    for el in path.elements() {
        let (pts, n) = match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => ([p, p, p], 1),
            PathEl::QuadTo(a, b) => ([a, b, b], 2),
            PathEl::CurveTo(a, b, c) => ([a, b, c], 3),
            PathEl::ClosePath => ([Point::ORIGIN; 3], 0),
        };
        if !matches!(el, PathEl::MoveTo(_)) {
            has_segment = true;
        }
        for p in &pts[..n] {
            match at {
                None => at = Some(*p),
                Some(q) if q == *p => {}
                Some(_) => return None,
            }
        }
    }
    if has_segment { at } else { None }
}

#[cfg(test)]
#[path = "../../tests/unit/render/stroke.rs"]
mod tests;
