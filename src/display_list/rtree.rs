use std::ops::Range;

use crate::foundation::core::{IRect, Rect, rect_is_empty, rects_intersect, round_out};

const FANOUT: usize = 8;

#[derive(Debug, Clone)]
enum Children {
    Leaves(Range<usize>),
    Nodes(Range<usize>),
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Rect,
    children: Children,
}

/// Bulk-loaded R-tree over the device bounds of a display list's rendering ops.
///
/// Leaves are packed in row-major order of their centers, `FANOUT` per node, and the tree is
/// immutable once built.
#[derive(Debug, Clone)]
pub struct DlRTree {
    leaf_rects: Vec<Rect>,
    leaf_ids: Vec<usize>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl DlRTree {
    /// Build from `(id, rect)` pairs. Empty rects are dropped.
    pub fn new(entries: impl IntoIterator<Item = (usize, Rect)>) -> Self {
        let mut leaves: Vec<(usize, Rect)> = entries
            .into_iter()
            .filter(|(_, r)| !rect_is_empty(*r))
            .collect();
        leaves.sort_by(|(ia, a), (ib, b)| {
            let ca = a.center();
            let cb = b.center();
            ca.y.total_cmp(&cb.y)
                .then(ca.x.total_cmp(&cb.x))
                .then(ia.cmp(ib))
        });
        let leaf_ids: Vec<usize> = leaves.iter().map(|(id, _)| *id).collect();
        let leaf_rects: Vec<Rect> = leaves.iter().map(|(_, r)| *r).collect();

        let mut nodes = Vec::new();
        let mut start = 0;
        while start < leaf_rects.len() {
            let end = (start + FANOUT).min(leaf_rects.len());
            nodes.push(Node {
                bounds: union_all(&leaf_rects[start..end]),
                children: Children::Leaves(start..end),
            });
            start = end;
        }

        let mut level = 0..nodes.len();
        while level.len() > 1 {
            let next_start = nodes.len();
            let mut i = level.start;
            while i < level.end {
                let j = (i + FANOUT).min(level.end);
                let bounds = nodes[i..j]
                    .iter()
                    .map(|n| n.bounds)
                    .reduce(|a, b| a.union(b))
                    .unwrap_or(Rect::ZERO);
                nodes.push(Node {
                    bounds,
                    children: Children::Nodes(i..j),
                });
                i = j;
            }
            level = next_start..nodes.len();
        }

        let root = (!level.is_empty()).then_some(level.start);
        Self {
            leaf_rects,
            leaf_ids,
            nodes,
            root,
        }
    }

    /// Number of indexed rects.
    pub fn len(&self) -> usize {
        self.leaf_rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_rects.is_empty()
    }

    /// Union of every indexed rect, or `None` for an empty tree.
    pub fn bounds(&self) -> Option<Rect> {
        self.root.map(|r| self.nodes[r].bounds)
    }

    /// Ids of all rects overlapping `query` with positive area, ascending.
    pub fn search(&self, query: Rect) -> Vec<usize> {
        let mut hits = Vec::new();
        self.visit(query, |i| hits.push(self.leaf_ids[i]));
        hits.sort_unstable();
        hits
    }

    /// Rects overlapping `query`, rounded out to pixels and merged until no two overlap.
    pub fn search_and_consolidate_rects(&self, query: Rect) -> Vec<IRect> {
        let mut found = Vec::new();
        self.visit(query, |i| found.push(i));
        found.sort_unstable();

        let mut out: Vec<IRect> = Vec::new();
        for i in found {
            let mut r = round_out(self.leaf_rects[i]);
            while let Some(pos) = out.iter().position(|o| o.intersects(r)) {
                r = r.join(out.swap_remove(pos));
            }
            out.push(r);
        }
        out
    }

    fn visit(&self, query: Rect, mut f: impl FnMut(usize)) {
        let Some(root) = self.root else {
            return;
        };
        if rect_is_empty(query) {
            return;
        }
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            let node = &self.nodes[n];
            if !rects_intersect(node.bounds, query) {
                continue;
            }
            match &node.children {
                Children::Leaves(range) => {
                    for i in range.clone() {
                        if rects_intersect(self.leaf_rects[i], query) {
                            f(i);
                        }
                    }
                }
                Children::Nodes(range) => stack.extend(range.clone()),
            }
        }
    }
}

fn union_all(rects: &[Rect]) -> Rect {
    rects
        .iter()
        .copied()
        .reduce(|a, b| a.union(b))
        .unwrap_or(Rect::ZERO)
}

#[cfg(test)]
#[path = "../../tests/unit/display_list/rtree.rs"]
mod tests;
