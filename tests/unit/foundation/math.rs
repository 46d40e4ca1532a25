use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(255, 128), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
}

#[test]
fn unit_to_u8_clamps_and_handles_nan() {
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(2.0), 255);
    assert_eq!(unit_to_u8(f32::NAN), 0);
}

#[test]
fn srgb_transfer_functions_are_inverse() {
    for i in 0..=10 {
        let v = i as f32 / 10.0;
        let back = linear_to_srgb(srgb_to_linear(v));
        assert!((back - v).abs() < 1e-4, "{v} -> {back}");
    }
}
