use super::*;

fn r(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
    Rect::new(x0, y0, x1, y1)
}

#[test]
fn empty_tree_finds_nothing() {
    let t = DlRTree::new(Vec::new());
    assert!(t.is_empty());
    assert_eq!(t.bounds(), None);
    assert!(t.search(r(0.0, 0.0, 100.0, 100.0)).is_empty());
}

#[test]
fn empty_rects_are_not_indexed() {
    let t = DlRTree::new([(0, r(5.0, 5.0, 5.0, 10.0)), (1, r(0.0, 0.0, 1.0, 1.0))]);
    assert_eq!(t.len(), 1);
    assert_eq!(t.search(r(0.0, 0.0, 10.0, 10.0)), vec![1]);
}

#[test]
fn search_spans_many_levels() {
    let entries: Vec<(usize, Rect)> = (0..200)
        .map(|i| {
            let x = f64::from((i % 20) as u32) * 10.0;
            let y = f64::from((i / 20) as u32) * 10.0;
            (i, r(x, y, x + 5.0, y + 5.0))
        })
        .collect();
    let t = DlRTree::new(entries);
    assert_eq!(t.len(), 200);
    assert_eq!(t.bounds(), Some(r(0.0, 0.0, 195.0, 95.0)));

    assert_eq!(t.search(r(12.0, 12.0, 28.0, 18.0)), vec![21, 22]);
    assert_eq!(t.search(r(6.0, 6.0, 9.0, 9.0)), Vec::<usize>::new());
    assert_eq!(t.search(r(-1.0, -1.0, 1000.0, 1000.0)).len(), 200);
}

#[test]
fn touching_edges_do_not_match() {
    let t = DlRTree::new([(0, r(0.0, 0.0, 10.0, 10.0))]);
    assert!(t.search(r(10.0, 0.0, 20.0, 10.0)).is_empty());
}

#[test]
fn consolidation_merges_overlapping_pixels() {
    let t = DlRTree::new([
        (0, r(0.0, 0.0, 10.0, 10.0)),
        (1, r(5.0, 5.0, 15.0, 15.0)),
        (2, r(40.0, 40.0, 50.0, 50.0)),
    ]);
    let mut out = t.search_and_consolidate_rects(r(0.0, 0.0, 100.0, 100.0));
    out.sort_by_key(|ir| (ir.left, ir.top));
    assert_eq!(out, vec![IRect::new(0, 0, 15, 15), IRect::new(40, 40, 50, 50)]);
}

#[test]
fn consolidation_rounds_out_fractional_content() {
    let t = DlRTree::new([(0, r(0.5, 0.5, 10.2, 10.2)), (1, r(10.6, 0.0, 20.0, 1.0))]);
    let out = t.search_and_consolidate_rects(r(0.0, 0.0, 100.0, 100.0));
    assert_eq!(out, vec![IRect::new(0, 0, 20, 11)]);
}
