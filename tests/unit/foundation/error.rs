use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(DlError::validation("x").to_string().contains("validation error:"));
    assert!(DlError::render("x").to_string().contains("render error:"));
    assert!(DlError::platform("x").to_string().contains("platform error:"));
    assert!(DlError::serde("x").to_string().contains("serialization error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DlError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
