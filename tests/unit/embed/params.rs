use super::*;

fn params(transform: Affine, mutators: Vec<Mutator>) -> EmbeddedViewParams {
    EmbeddedViewParams::new(transform, Vec2::new(30.0, 40.0), mutators)
}

#[test]
fn bounding_rect_follows_the_view_transform() {
    let p = params(Affine::translate((10.0, 20.0)), vec![]);
    assert_eq!(p.final_bounding_rect(), Rect::new(10.0, 20.0, 40.0, 60.0));

    let p = params(Affine::scale(2.0), vec![]);
    assert_eq!(p.final_bounding_rect(), Rect::new(0.0, 0.0, 60.0, 80.0));
}

#[test]
fn rect_clips_narrow_the_bounds() {
    let p = params(
        Affine::translate((10.0, 20.0)),
        vec![Mutator::ClipRect(Rect::new(0.0, 0.0, 25.0, 100.0))],
    );
    assert_eq!(p.final_bounding_rect(), Rect::new(10.0, 20.0, 25.0, 60.0));
}

#[test]
fn clips_are_mapped_through_preceding_transforms() {
    let p = params(
        Affine::translate((10.0, 20.0)),
        vec![
            Mutator::Transform(Affine::scale(2.0)),
            Mutator::ClipRect(Rect::new(0.0, 0.0, 15.0, 15.0)),
        ],
    );
    assert_eq!(p.final_bounding_rect(), Rect::new(10.0, 20.0, 30.0, 30.0));
}

#[test]
fn rrect_and_path_clips_use_their_bounds() {
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((20.0, 0.0));
    path.line_to((20.0, 50.0));
    path.close_path();
    let p = params(
        Affine::IDENTITY,
        vec![
            Mutator::ClipRRect(RoundedRect::new(5.0, 5.0, 100.0, 100.0, 2.0)),
            Mutator::ClipPath(Arc::new(path)),
        ],
    );
    assert_eq!(p.final_bounding_rect(), Rect::new(5.0, 5.0, 20.0, 40.0));
}

#[test]
fn disjoint_clip_leaves_nothing() {
    let p = params(
        Affine::IDENTITY,
        vec![Mutator::ClipRect(Rect::new(100.0, 100.0, 120.0, 120.0))],
    );
    assert_eq!(p.final_bounding_rect(), Rect::ZERO);
}

#[test]
fn opacity_is_the_product_of_opacity_mutators() {
    let p = params(
        Affine::IDENTITY,
        vec![
            Mutator::Opacity(0.5),
            Mutator::Transform(Affine::scale(3.0)),
            Mutator::Opacity(0.5),
        ],
    );
    assert_eq!(p.opacity(), 0.25);
    assert_eq!(params(Affine::IDENTITY, vec![]).opacity(), 1.0);
    assert_eq!(p.mutators().len(), 3);
    assert_eq!(p.size_points(), Vec2::new(30.0, 40.0));
}
