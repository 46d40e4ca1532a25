use super::*;

#[test]
fn pattern_queries_match_only_their_variant() {
    let mode = NativeColorFilter::mode(Color::RED, BlendMode::Plus);
    assert_eq!(mode.as_color_mode(), Some((Color::RED, BlendMode::Plus)));
    assert!(mode.as_color_matrix().is_none());
    assert!(!mode.is_srgb_to_linear());

    let gamma = NativeColorFilter::linear_to_srgb_gamma();
    assert!(gamma.is_linear_to_srgb());
    assert!(!gamma.is_srgb_to_linear());
    assert!(gamma.as_color_mode().is_none());
}

#[test]
fn gamma_instances_are_shared() {
    assert!(Arc::ptr_eq(
        &NativeColorFilter::srgb_to_linear_gamma(),
        &NativeColorFilter::srgb_to_linear_gamma()
    ));
}

#[test]
fn gamma_filters_are_near_inverses() {
    let c = Color::from_argb(255, 40, 128, 220);
    let there = NativeColorFilter::srgb_to_linear_gamma().filter_color(c);
    let back = NativeColorFilter::linear_to_srgb_gamma().filter_color(there);
    let diff = |a: u8, b: u8| a.abs_diff(b);
    assert!(diff(back.red(), c.red()) <= 2);
    assert!(diff(back.green(), c.green()) <= 1);
    assert!(diff(back.blue(), c.blue()) <= 1);
    assert_eq!(there.alpha(), 255);
    assert!(there.green() < c.green());
}

#[test]
fn compose_applies_inner_first() {
    let to_red = NativeColorFilter::mode(Color::RED, BlendMode::Src);
    let clear = NativeColorFilter::mode(Color::TRANSPARENT, BlendMode::Clear);
    let f = NativeColorFilter::compose(to_red.clone(), clear.clone());
    assert_eq!(f.filter_color(Color::BLUE), Color::RED);
    let g = NativeColorFilter::compose(clear, to_red);
    assert_eq!(g.filter_color(Color::BLUE), Color::TRANSPARENT);
}

#[test]
fn table_maps_each_channel() {
    let mut tables = [[0u8; 256]; 4];
    for (i, v) in tables[1].iter_mut().enumerate() {
        *v = 255 - i as u8;
    }
    tables[0] = std::array::from_fn(|i| i as u8);
    let f = NativeColorFilter::table(tables);
    assert_eq!(f.filter_color(Color::BLACK), Color::RED);
}

#[test]
fn color_matrix_clamps_output() {
    let mut m = [0.0f32; 20];
    m[0] = 2.0;
    m[18] = 1.0;
    let out = apply_color_matrix(&m, Color::from_argb(255, 200, 0, 0));
    assert_eq!(out, Color::RED);
}

#[test]
fn mask_blur_query() {
    let blur = NativeMaskFilter::blur(BlurStyle::Inner, 1.5);
    assert_eq!(blur.as_blur(), Some((BlurStyle::Inner, 1.5)));
    assert!(NativeMaskFilter::Table(Box::new([0; 256])).as_blur().is_none());
}
