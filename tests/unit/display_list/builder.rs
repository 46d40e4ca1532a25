use super::*;
use crate::effects::color_filter::ColorFilterType;
use crate::effects::mask_filter::BlurStyle;
use crate::foundation::core::unbounded_rect;
use crate::native::filters::NativeColorFilter;

fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

#[test]
#[should_panic(expected = "unbalanced save/restore")]
fn build_with_open_save_panics() {
    let mut b = DisplayListBuilder::default();
    b.save();
    b.draw_rect(r(0.0, 0.0, 1.0, 1.0));
    let _ = b.build();
}

#[test]
#[should_panic(expected = "1 save(s) still open")]
fn build_with_open_save_layer_panics() {
    let mut b = DisplayListBuilder::default();
    b.save();
    b.save_layer(None, None, None);
    b.restore();
    let _ = b.build();
}

#[test]
fn restore_without_save_is_ignored() {
    let mut b = DisplayListBuilder::default();
    b.restore();
    assert_eq!(b.save_count(), 1);
    assert_eq!(b.op_count(), 0);
    assert!(b.build().is_empty());
}

#[test]
fn attribute_setters_record_only_changes() {
    let mut b = DisplayListBuilder::default();
    b.set_color(Color::BLACK);
    b.set_blend_mode(BlendMode::SrcOver);
    b.set_stroke_miter(4.0);
    assert_eq!(b.op_count(), 0);

    b.set_color(Color::RED);
    b.set_color(Color::RED);
    b.set_style(PaintStyle::Stroke);
    let list = b.build();
    assert_eq!(
        list.ops(),
        &[DlOp::SetColor(Color::RED), DlOp::SetStyle(PaintStyle::Stroke)]
    );
}

#[test]
fn filters_start_null_and_can_be_cleared() {
    let mut b = DisplayListBuilder::default();
    assert!(b.color_filter().is_none());
    assert!(b.mask_filter().is_none());
    assert!(b.image_filter().is_none());

    let cf = ColorFilter::blend(Color::RED, BlendMode::SrcIn);
    b.set_color_filter(Some(&cf));
    let held = b.color_filter().unwrap();
    assert_eq!(**held, cf);
    assert!(!std::ptr::eq(Arc::as_ptr(held), &cf));

    b.set_color_filter(Some(&cf.clone()));
    assert_eq!(b.op_count(), 1);

    b.set_color_filter(None);
    assert!(b.color_filter().is_none());
    assert_eq!(b.op_count(), 2);
}

#[test]
fn restore_pops_paint_transform_and_clip() {
    let mut b = DisplayListBuilder::default();
    b.save();
    b.set_color(Color::RED);
    b.translate(10.0, 0.0);
    b.clip_rect(r(0.0, 0.0, 5.0, 5.0), ClipOp::Intersect, false);
    assert_eq!(b.device_clip_bounds(), r(10.0, 0.0, 15.0, 5.0));
    b.restore();

    assert_eq!(b.current_paint().color, Color::BLACK);
    assert_eq!(b.get_transform(), Affine::IDENTITY);
    assert_eq!(b.device_clip_bounds(), unbounded_rect());
}

#[test]
fn restore_to_count_unwinds_nested_saves() {
    let mut b = DisplayListBuilder::default();
    b.save();
    let count = b.save_count();
    b.save();
    b.save_layer(None, None, None);
    assert_eq!(b.save_count(), 4);
    b.restore_to_count(count);
    assert_eq!(b.save_count(), 2);
    b.restore_to_count(0);
    assert_eq!(b.save_count(), 1);
    let _ = b.build();
}

#[test]
fn identity_transforms_are_elided() {
    let mut b = DisplayListBuilder::default();
    b.translate(0.0, 0.0);
    b.scale(1.0, 1.0);
    b.rotate(360.0);
    b.skew(0.0, 0.0);
    b.transform(Affine::IDENTITY);
    assert_eq!(b.op_count(), 0);

    b.scale(2.0, 2.0);
    b.transform_reset();
    assert_eq!(b.get_transform(), Affine::IDENTITY);
    assert_eq!(b.op_count(), 2);
}

#[test]
fn bounds_follow_transform_and_stroke() {
    let mut b = DisplayListBuilder::default();
    b.translate(5.0, 5.0);
    b.draw_rect(r(10.0, 10.0, 20.0, 20.0));
    b.transform_reset();
    b.set_style(PaintStyle::Stroke);
    b.set_stroke_width(2.0);
    b.set_stroke_join(StrokeJoin::Round);
    b.draw_rect(r(100.0, 100.0, 110.0, 110.0));
    let list = b.build();
    assert_eq!(list.bounds(), r(15.0, 15.0, 111.0, 111.0));
}

#[test]
fn empty_list_has_zero_bounds() {
    let list = DisplayListBuilder::default().build();
    assert!(list.is_empty());
    assert_eq!(list.bounds(), Rect::ZERO);
    assert!(list.can_apply_group_opacity());
}

#[test]
fn culled_ops_are_recorded_without_bounds() {
    let mut b = DisplayListBuilder::new(BuilderOpts::default().with_cull_rect(r(0.0, 0.0, 50.0, 50.0)));
    b.draw_rect(r(100.0, 100.0, 110.0, 110.0));
    let list = b.build();
    assert_eq!(list.op_count(false), 1);
    assert_eq!(list.bounds(), Rect::ZERO);
}

#[test]
fn unbounded_draws_cover_the_clip() {
    let mut b = DisplayListBuilder::default();
    b.clip_rect(r(0.0, 0.0, 40.0, 30.0), ClipOp::Intersect, false);
    b.draw_paint();
    assert_eq!(b.build().bounds(), r(0.0, 0.0, 40.0, 30.0));

    let mut b = DisplayListBuilder::default();
    b.clip_rect(r(0.0, 0.0, 40.0, 30.0), ClipOp::Intersect, false);
    b.set_color_filter(Some(&ColorFilter::blend(Color::RED, BlendMode::SrcOver)));
    b.draw_rect(r(1.0, 1.0, 2.0, 2.0));
    assert_eq!(b.build().bounds(), r(0.0, 0.0, 40.0, 30.0));
}

#[test]
fn mask_and_image_filters_grow_bounds() {
    let mut b = DisplayListBuilder::default();
    b.set_mask_filter(Some(&MaskFilter::blur(BlurStyle::Normal, 1.0)));
    b.draw_rect(r(10.0, 10.0, 20.0, 20.0));
    assert_eq!(b.build().bounds(), r(7.0, 7.0, 23.0, 23.0));

    let mut b = DisplayListBuilder::default();
    b.set_image_filter(Some(&ImageFilter::Dilate {
        radius_x: 2.0,
        radius_y: 1.0,
    }));
    b.draw_rect(r(10.0, 10.0, 20.0, 20.0));
    let list = b.build();
    assert_eq!(list.bounds(), r(8.0, 9.0, 22.0, 21.0));
    assert!(!list.can_apply_group_opacity());
}

#[test]
fn difference_clip_covering_everything_empties_the_clip() {
    let mut b = DisplayListBuilder::new(BuilderOpts::default().with_cull_rect(r(0.0, 0.0, 10.0, 10.0)));
    b.clip_rect(r(2.0, 2.0, 4.0, 4.0), ClipOp::Difference, false);
    assert_eq!(b.device_clip_bounds(), r(0.0, 0.0, 10.0, 10.0));
    b.clip_rect(r(-1.0, -1.0, 11.0, 11.0), ClipOp::Difference, false);
    assert_eq!(b.device_clip_bounds(), Rect::ZERO);
    b.draw_rect(r(0.0, 0.0, 5.0, 5.0));
    assert_eq!(b.build().bounds(), Rect::ZERO);
}

#[test]
fn local_clip_bounds_map_through_the_ctm() {
    let mut b = DisplayListBuilder::default();
    b.clip_rect(r(0.0, 0.0, 100.0, 50.0), ClipOp::Intersect, false);
    b.scale(2.0, 2.0);
    assert_eq!(b.local_clip_bounds(), r(0.0, 0.0, 50.0, 25.0));
    assert_eq!(b.device_clip_bounds(), r(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn group_opacity_tracks_overlap_and_blend_mode() {
    let mut b = DisplayListBuilder::default();
    b.draw_rect(r(0.0, 0.0, 10.0, 10.0));
    b.draw_rect(r(20.0, 0.0, 30.0, 10.0));
    assert!(b.build().can_apply_group_opacity());

    let mut b = DisplayListBuilder::default();
    b.draw_rect(r(0.0, 0.0, 10.0, 10.0));
    b.draw_rect(r(5.0, 0.0, 15.0, 10.0));
    assert!(!b.build().can_apply_group_opacity());

    let mut b = DisplayListBuilder::default();
    b.set_blend_mode(BlendMode::Plus);
    b.draw_rect(r(0.0, 0.0, 10.0, 10.0));
    assert!(!b.build().can_apply_group_opacity());
}

#[test]
fn save_layer_backfills_content_bounds_and_distribution() {
    let mut b = DisplayListBuilder::default();
    b.save_layer(None, None, None);
    b.draw_rect(r(0.0, 0.0, 10.0, 10.0));
    b.draw_rect(r(20.0, 0.0, 30.0, 10.0));
    b.restore();
    b.save_layer(None, None, None);
    b.draw_rect(r(0.0, 40.0, 10.0, 50.0));
    b.draw_rect(r(5.0, 40.0, 15.0, 50.0));
    b.restore();
    let list = b.build();

    let layers: Vec<&SaveLayerOp> = list
        .ops()
        .iter()
        .filter_map(|op| match op {
            DlOp::SaveLayer(l) => Some(l),
            _ => None,
        })
        .collect();
    assert_eq!(layers.len(), 2);
    assert_eq!(layers[0].bounds, r(0.0, 0.0, 30.0, 10.0));
    assert!(layers[0].bounds_from_content);
    assert!(layers[0].can_distribute_opacity);
    assert_eq!(layers[1].bounds, r(0.0, 40.0, 15.0, 50.0));
    assert!(!layers[1].can_distribute_opacity);

    assert_eq!(list.bounds(), r(0.0, 0.0, 30.0, 50.0));
    assert!(list.can_apply_group_opacity());
}

#[test]
fn save_layer_with_given_bounds_clips_content() {
    let mut b = DisplayListBuilder::default();
    b.save_layer(Some(r(0.0, 0.0, 10.0, 10.0)), None, None);
    b.draw_rect(r(5.0, 5.0, 50.0, 50.0));
    b.restore();
    let list = b.build();
    assert_eq!(list.bounds(), r(5.0, 5.0, 10.0, 10.0));
    let DlOp::SaveLayer(layer) = &list.ops()[0] else {
        panic!("expected a save layer, got {:?}", list.ops()[0]);
    };
    assert_eq!(layer.bounds, r(0.0, 0.0, 10.0, 10.0));
    assert!(!layer.bounds_from_content);
}

#[test]
fn backdrop_layers_are_unbounded_and_not_distributable() {
    let mut b = DisplayListBuilder::new(BuilderOpts::default().with_cull_rect(r(0.0, 0.0, 64.0, 64.0)));
    b.save_layer(None, None, Some(&ImageFilter::blur(2.0, 2.0, crate::effects::image_filter::TileMode::Clamp)));
    b.draw_rect(r(0.0, 0.0, 1.0, 1.0));
    b.restore();
    let list = b.build();
    assert_eq!(list.bounds(), r(0.0, 0.0, 64.0, 64.0));
    let DlOp::SaveLayer(layer) = &list.ops()[0] else {
        panic!("expected a save layer");
    };
    assert!(layer.backdrop.is_some());
    assert!(!layer.can_distribute_opacity);
}

#[test]
fn empty_point_list_records_nothing() {
    let mut b = DisplayListBuilder::default();
    b.draw_points(PointMode::Points, &[]);
    assert_eq!(b.op_count(), 0);
}

#[test]
fn zero_length_line_still_has_bounds() {
    let mut b = DisplayListBuilder::default();
    b.set_stroke_width(4.0);
    b.set_stroke_cap(StrokeCap::Round);
    b.set_stroke_join(StrokeJoin::Round);
    b.draw_line(Point::new(10.0, 10.0), Point::new(10.0, 10.0));
    assert_eq!(b.build().bounds(), r(8.0, 8.0, 12.0, 12.0));
}

#[test]
fn rtree_indexes_rendering_ops() {
    let mut b = DisplayListBuilder::with_rtree(r(0.0, 0.0, 100.0, 100.0));
    b.set_color(Color::RED);
    b.draw_rect(r(0.0, 0.0, 10.0, 10.0));
    b.draw_rect(r(50.0, 50.0, 60.0, 60.0));
    b.draw_rect(r(200.0, 200.0, 210.0, 210.0));
    let list = b.build();
    let tree = list.rtree().unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.search(r(0.0, 0.0, 100.0, 100.0)), vec![1, 2]);
    assert_eq!(tree.search(r(40.0, 40.0, 55.0, 55.0)), vec![2]);

    assert!(DisplayListBuilder::default().build().rtree().is_none());
}

#[test]
fn nested_display_lists_add_op_counts() {
    let mut inner = DisplayListBuilder::default();
    inner.set_color(Color::BLUE);
    inner.draw_rect(r(0.0, 0.0, 10.0, 10.0));
    let inner = inner.build();

    let mut outer = DisplayListBuilder::default();
    outer.draw_display_list(Arc::clone(&inner), 0.5);
    outer.draw_display_list(inner, 1.0);
    let outer = outer.build();
    assert_eq!(outer.op_count(false), 2);
    assert_eq!(outer.op_count(true), 6);
    assert_eq!(outer.render_op_count(), 2);
    assert_eq!(outer.bounds(), r(0.0, 0.0, 10.0, 10.0));
    assert!(!outer.can_apply_group_opacity());
}

#[test]
fn recording_through_canvas_converts_native_paint() {
    let mut b = DisplayListBuilder::default();
    {
        let canvas: &mut dyn Canvas = &mut b;
        let mut paint = NativePaint::new(Color::RED);
        paint.color_filter = Some(NativeColorFilter::mode(Color::BLUE, BlendMode::SrcIn));
        canvas.save();
        canvas.translate(2.0, 3.0);
        canvas.draw_rect(r(0.0, 0.0, 5.0, 5.0), &paint);
        canvas.restore();
        assert_eq!(canvas.save_count(), 1);
    }
    let list = b.build();
    assert_eq!(list.bounds(), r(2.0, 3.0, 7.0, 8.0));
    let recorded_filter = list.ops().iter().find_map(|op| match op {
        DlOp::SetColorFilter(Some(cf)) => Some(cf.kind()),
        _ => None,
    });
    assert_eq!(recorded_filter, Some(ColorFilterType::Blend));
    assert!(list.ops().contains(&DlOp::SetColor(Color::RED)));
}
