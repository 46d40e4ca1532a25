use super::*;

use crate::display_list::paint::StrokeCap;

const RED: [u8; 4] = [255, 0, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn solid(color: Color) -> NativePaint {
    NativePaint::new(color)
}

#[test]
fn zero_sized_canvas_is_rejected() {
    assert!(matches!(
        CpuCanvas::new(0, 10),
        Err(DlError::Validation(_))
    ));
    assert!(CpuCanvas::new(10, 0).is_err());
}

#[test]
fn oversized_canvas_is_rejected() {
    let err = CpuCanvas::new(70_000, 4).unwrap_err();
    assert!(err.to_string().contains("exceeds u16"), "{err}");
}

#[test]
fn fresh_canvas_renders_transparent() {
    let mut c = CpuCanvas::new(8, 6).unwrap();
    let frame = c.finish();
    assert_eq!((frame.width, frame.height), (8, 6));
    assert_eq!(frame.data.len(), 8 * 6 * 4);
    assert!(frame.premultiplied);
    assert!(frame.is_transparent());
}

#[test]
fn draw_rect_fills_its_pixels() {
    let mut c = CpuCanvas::new(16, 16).unwrap();
    c.draw_rect(Rect::new(2.0, 2.0, 8.0, 8.0), &solid(Color::RED));
    let frame = c.finish();
    assert_eq!(frame.pixel(4, 4), Some(RED));
    assert_eq!(frame.pixel(12, 12), Some(CLEAR));
    assert_eq!(frame.pixel(16, 0), None);
}

#[test]
fn clear_covers_the_whole_canvas() {
    let mut c = CpuCanvas::new(4, 4).unwrap();
    c.draw_rect(Rect::new(0.0, 0.0, 2.0, 2.0), &solid(Color::RED));
    c.clear(Color::BLUE);
    let frame = c.finish();
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(3, 3), Some([0, 0, 255, 255]));
}

#[test]
fn difference_clip_excludes_the_rect() {
    let mut c = CpuCanvas::new(10, 10).unwrap();
    c.save();
    c.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0), ClipOp::Difference, false);
    c.draw_color(Color::RED, BlendMode::SrcOver);
    c.restore();
    let frame = c.finish();
    assert_eq!(frame.pixel(2, 2), Some(CLEAR));
    assert_eq!(frame.pixel(7, 7), Some(RED));
    assert_eq!(frame.pixel(7, 2), Some(RED));
}

#[test]
fn intersect_clip_ends_at_restore() {
    let mut c = CpuCanvas::new(10, 10).unwrap();
    c.save();
    c.clip_rect(Rect::new(0.0, 0.0, 5.0, 5.0), ClipOp::Intersect, false);
    c.draw_color(Color::RED, BlendMode::SrcOver);
    c.restore();
    c.draw_rect(Rect::new(6.0, 6.0, 10.0, 10.0), &solid(Color::GREEN));
    let frame = c.finish();
    assert_eq!(frame.pixel(2, 2), Some(RED));
    assert_eq!(frame.pixel(7, 2), Some(CLEAR));
    assert_eq!(frame.pixel(8, 8), Some([0, 255, 0, 255]));
}

#[test]
fn transform_is_saved_and_restored() {
    let mut c = CpuCanvas::new(20, 20).unwrap();
    assert_eq!(c.save_count(), 1);
    c.save();
    c.translate(10.0, 10.0);
    assert_eq!(c.save_count(), 2);
    c.draw_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &solid(Color::RED));
    c.restore();
    assert_eq!(c.get_transform(), Affine::IDENTITY);
    assert_eq!(c.save_count(), 1);

    let frame = c.finish();
    assert_eq!(frame.pixel(12, 12), Some(RED));
    assert_eq!(frame.pixel(2, 2), Some(CLEAR));
}

#[test]
fn restore_without_save_is_ignored() {
    let mut c = CpuCanvas::new(4, 4).unwrap();
    c.restore();
    assert_eq!(c.save_count(), 1);
}

#[test]
fn finish_resets_for_reuse() {
    let mut c = CpuCanvas::new(4, 4).unwrap();
    c.save();
    c.translate(1.0, 1.0);
    c.draw_color(Color::RED, BlendMode::SrcOver);
    assert!(!c.finish().is_transparent());

    assert_eq!(c.save_count(), 1);
    assert_eq!(c.get_transform(), Affine::IDENTITY);
    assert!(c.finish().is_transparent());
}

#[test]
fn zero_length_round_line_leaves_a_dot() {
    let mut c = CpuCanvas::new(10, 10).unwrap();
    let mut p = solid(Color::RED);
    p.stroke_width = 4.0;
    p.stroke_cap = StrokeCap::Round;
    c.draw_line(Point::new(5.0, 5.0), Point::new(5.0, 5.0), &p);
    let frame = c.finish();
    let [_, _, _, a] = frame.pixel(5, 5).unwrap();
    assert!(a > 0);
    assert_eq!(frame.pixel(0, 0), Some(CLEAR));
}

#[test]
fn layer_alpha_scales_its_content() {
    let mut c = CpuCanvas::new(4, 4).unwrap();
    let layer = solid(Color::from_argb(0x80, 0, 0, 0));
    c.save_layer(None, Some(&layer), None);
    c.draw_color(Color::RED, BlendMode::SrcOver);
    c.restore();
    let [r, _, _, a] = c.finish().pixel(1, 1).unwrap();
    assert!((120..=136).contains(&a), "alpha {a}");
    assert!(r.abs_diff(a) <= 1, "r {r} a {a}");
}

#[test]
fn vertex_colors_are_averaged_per_triangle() {
    assert_eq!(
        average_color([Color::RED, Color::RED, Color::RED]),
        Color::RED
    );
    let c = average_color([Color::RED, Color::GREEN, Color::BLUE]);
    assert_eq!((c.alpha(), c.red(), c.green(), c.blue()), (255, 85, 85, 85));
}

#[test]
fn zero_length_contour_in_a_longer_path_is_drawn() {
    let mut path = BezPath::new();
    path.move_to((10.0, 10.0));
    path.line_to((10.0, 10.0));
    path.move_to((30.0, 40.0));
    path.line_to((50.0, 40.0));
    let mut p = solid(Color::RED);
    p.style = crate::display_list::paint::PaintStyle::Stroke;
    p.stroke_width = 8.0;
    p.stroke_cap = StrokeCap::Round;

    let mut c = CpuCanvas::new(64, 64).unwrap();
    c.draw_path(&path, &p);
    let frame = c.finish();
    assert_eq!(frame.pixel(10, 10), Some(RED));
    assert_eq!(frame.pixel(40, 40), Some(RED));
    assert_eq!(frame.pixel(20, 20), Some(CLEAR));
}

#[test]
fn layer_color_filter_recolors_its_content() {
    #[rustfmt::skip]
    let red_to_green = [
        0.0, 0.0, 0.0, 0.0, 0.0,
        1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ];
    let mut layer = solid(Color::BLACK);
    layer.color_filter = Some(crate::native::filters::NativeColorFilter::matrix(&red_to_green));

    let mut c = CpuCanvas::new(16, 16).unwrap();
    c.save_layer(Some(Rect::new(0.0, 0.0, 8.0, 8.0)), Some(&layer), None);
    c.draw_rect(Rect::new(2.0, 2.0, 12.0, 12.0), &solid(Color::RED));
    c.restore();
    c.draw_rect(Rect::new(12.0, 0.0, 16.0, 4.0), &solid(Color::RED));
    let frame = c.finish();

    assert_eq!(frame.pixel(4, 4), Some([0, 255, 0, 255]));
    assert_eq!(frame.pixel(10, 10), Some(CLEAR));
    assert_eq!(frame.pixel(1, 1), Some(CLEAR));
    assert_eq!(frame.pixel(14, 2), Some(RED));
}

#[test]
fn layer_invert_flips_content_colors() {
    let mut layer = solid(Color::BLACK);
    layer.invert_colors = true;

    let mut c = CpuCanvas::new(8, 8).unwrap();
    c.save_layer(None, Some(&layer), None);
    c.draw_color(Color::RED, BlendMode::SrcOver);
    c.restore();
    assert_eq!(c.finish().pixel(3, 3), Some([0, 255, 255, 255]));
}

#[test]
fn unfiltered_pixels_pass_through_unchanged() {
    let layer = solid(Color::BLACK);
    assert_eq!(filter_premul([10, 20, 30, 40], &layer), [10, 20, 30, 40]);

    let mut inverted = solid(Color::BLACK);
    inverted.invert_colors = true;
    assert_eq!(filter_premul([0, 0, 0, 0], &inverted), [0, 0, 0, 0]);
    assert!(needs_offscreen(&inverted));
    assert!(!needs_offscreen(&layer));
}
