use super::*;

#[test]
fn pool_reuses_layers_after_recycle() {
    let mut p = OverlayLayerPool::new(OverlayPoolOpts::default());
    let a = p.get_layer((8, 8)).unwrap().unwrap().id;
    let b = p.get_layer((8, 8)).unwrap().unwrap().id;
    assert_ne!(a, b);

    p.recycle_layers();
    let again = p.get_layer((8, 8)).unwrap().unwrap().id;
    assert_eq!(again, a);
    assert_eq!(p.unused_layers().len(), 1);
    assert_eq!(p.unused_layers()[0].id, b);

    let st = p.stats();
    assert_eq!(st.alloc_layers, 2);
    assert_eq!(st.live_layers, 2);
    assert_eq!(st.layers_in_use, 1);
}

#[test]
fn pool_honors_layer_cap() {
    let mut p = OverlayLayerPool::new(OverlayPoolOpts {
        max_overlay_layers: 1,
    });
    assert!(p.get_layer((4, 4)).unwrap().is_some());
    assert!(p.get_layer((4, 4)).unwrap().is_none());
    assert_eq!(p.stats().denied_requests, 1);
}

#[test]
fn size_change_drops_layers() {
    let mut p = OverlayLayerPool::new(OverlayPoolOpts::default());
    assert!(p.check_layer_size_change((8, 8)).is_empty());
    let id = p.get_layer((8, 8)).unwrap().unwrap().id;

    assert!(p.check_layer_size_change((8, 8)).is_empty());
    assert!(p.has_layers());

    assert_eq!(p.check_layer_size_change((16, 8)), vec![id]);
    assert!(!p.has_layers());
    assert_eq!(p.stats().destroyed_layers, 1);
}

#[test]
fn oversized_layer_is_an_error() {
    let mut p = OverlayLayerPool::new(OverlayPoolOpts::default());
    assert!(p.get_layer((70_000, 1)).is_err());
}

#[test]
fn trim_releases_only_unused_layers() {
    let mut p = OverlayLayerPool::new(OverlayPoolOpts::default());
    let ids: Vec<i64> = (0..3)
        .map(|_| p.get_layer((4, 4)).unwrap().unwrap().id)
        .collect();
    p.recycle_layers();
    p.get_layer((4, 4)).unwrap();

    assert_eq!(p.trim_unused(), ids[1..].to_vec());
    assert_eq!(p.stats().live_layers, 1);
    assert!(p.unused_layers().is_empty());

    assert_eq!(p.destroy_layers(), vec![ids[0]]);
    let st = p.stats();
    assert_eq!(st.live_layers, 0);
    assert_eq!(st.destroyed_layers, 3);
    assert_eq!(st.alloc_bytes, 3 * 4 * 4 * 4);
}
