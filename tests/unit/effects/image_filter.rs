use super::*;
use crate::effects::blend::BlendMode;
use crate::foundation::core::{Color, Vec2};

fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

#[test]
fn blur_and_dilate_outset_bounds() {
    let blur = ImageFilter::blur(2.0, 1.0, TileMode::Decal);
    assert_eq!(blur.map_local_bounds(r(10.0, 10.0, 20.0, 20.0)), Some(r(4.0, 7.0, 26.0, 23.0)));

    let dilate = ImageFilter::Dilate {
        radius_x: 1.0,
        radius_y: 2.0,
    };
    assert_eq!(dilate.map_local_bounds(r(10.0, 10.0, 20.0, 20.0)), Some(r(9.0, 8.0, 21.0, 22.0)));
}

#[test]
fn device_bounds_follow_the_ctm_scale() {
    let blur = ImageFilter::blur(1.0, 1.0, TileMode::Clamp);
    let out = blur.map_device_bounds(r(0.0, 0.0, 10.0, 10.0), Affine::scale(2.0));
    assert_eq!(out, Some(r(-6.0, -6.0, 16.0, 16.0)));
}

#[test]
fn erode_can_collapse_to_empty() {
    let erode = ImageFilter::Erode {
        radius_x: 10.0,
        radius_y: 10.0,
    };
    assert_eq!(erode.map_local_bounds(r(0.0, 0.0, 5.0, 5.0)), Some(Rect::ZERO));
    assert_eq!(
        erode.map_local_bounds(r(0.0, 0.0, 40.0, 40.0)),
        Some(r(10.0, 10.0, 30.0, 30.0))
    );
}

#[test]
fn matrix_filter_moves_bounds() {
    let m = ImageFilter::Matrix(Affine::translate((10.0, 0.0)));
    assert_eq!(m.map_local_bounds(r(0.0, 0.0, 5.0, 5.0)), Some(r(10.0, 0.0, 15.0, 5.0)));
    assert_eq!(
        m.map_device_bounds(r(0.0, 0.0, 5.0, 5.0), Affine::scale(0.0)),
        None
    );
}

#[test]
fn color_filter_bounds_depend_on_transparent_black() {
    let tint = ImageFilter::ColorFilter(Arc::new(ColorFilter::blend(Color::RED, BlendMode::SrcOver)));
    assert!(tint.modifies_transparent_black());
    assert_eq!(tint.map_local_bounds(r(0.0, 0.0, 1.0, 1.0)), None);

    let masked = ImageFilter::ColorFilter(Arc::new(ColorFilter::blend(Color::RED, BlendMode::SrcIn)));
    assert!(!masked.modifies_transparent_black());
    assert_eq!(masked.map_local_bounds(r(0.0, 0.0, 1.0, 1.0)), Some(r(0.0, 0.0, 1.0, 1.0)));
    assert!(masked.as_color_filter().is_some());
}

#[test]
fn compose_applies_inner_then_outer() {
    let inner = Arc::new(ImageFilter::Dilate {
        radius_x: 1.0,
        radius_y: 1.0,
    });
    let outer = Arc::new(ImageFilter::Matrix(Affine::translate((5.0, 5.0))));
    let f = ImageFilter::compose(outer, inner);
    assert_eq!(f.map_local_bounds(r(0.0, 0.0, 2.0, 2.0)), Some(r(4.0, 4.0, 8.0, 8.0)));
}

#[test]
fn native_round_trip_is_structural() {
    let filters = [
        ImageFilter::blur(3.0, 4.0, TileMode::Mirror),
        ImageFilter::Erode {
            radius_x: 1.0,
            radius_y: 0.5,
        },
        ImageFilter::Matrix(Affine::rotate(0.5)),
        ImageFilter::ColorFilter(ColorFilter::srgb_to_linear()),
        ImageFilter::compose(
            Arc::new(ImageFilter::blur(1.0, 1.0, TileMode::Clamp)),
            Arc::new(ImageFilter::Matrix(Affine::scale(2.0))),
        ),
    ];
    for f in filters {
        let native = f.to_native();
        let back = ImageFilter::from_native(Some(&native)).unwrap();
        assert_eq!(*back, f);
        assert_eq!(*f.shared(), f);
    }
}

#[test]
fn unrecognized_native_is_unknown_and_unbounded() {
    let offset = Arc::new(NativeImageFilter::Offset(Vec2::new(3.0, 3.0)));
    let f = ImageFilter::from_native(Some(&offset)).unwrap();
    assert!(matches!(*f, ImageFilter::Unknown(_)));
    assert!(Arc::ptr_eq(&f.to_native(), &offset));
    assert_eq!(f.map_local_bounds(r(0.0, 0.0, 1.0, 1.0)), None);
    assert!(ImageFilter::from_native(None).is_none());
}
