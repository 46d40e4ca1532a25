use std::sync::atomic::{AtomicU32, Ordering};

use crate::display_list::ops::DlOp;
use crate::display_list::rtree::DlRTree;
use crate::foundation::core::Rect;
use crate::render::canvas::Canvas;
use crate::render::dispatch::Dispatcher;

static NEXT_UNIQUE_ID: AtomicU32 = AtomicU32::new(1);

/// An immutable, replayable recording of canvas operations.
///
/// Sealed lists are shared through `Arc` and may be rendered from any thread.
#[derive(Debug)]
pub struct DisplayList {
    ops: Vec<DlOp>,
    bounds: Rect,
    rtree: Option<DlRTree>,
    render_op_count: usize,
    nested_op_count: usize,
    can_apply_group_opacity: bool,
    unique_id: u32,
}

impl DisplayList {
    pub(crate) fn new(
        ops: Vec<DlOp>,
        bounds: Rect,
        rtree: Option<DlRTree>,
        nested_op_count: usize,
        can_apply_group_opacity: bool,
    ) -> Self {
        let render_op_count = ops.iter().filter(|op| op.is_rendering()).count();
        Self {
            ops,
            bounds,
            rtree,
            render_op_count,
            nested_op_count,
            can_apply_group_opacity,
            unique_id: NEXT_UNIQUE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn ops(&self) -> &[DlOp] {
        &self.ops
    }

    /// Device-space bounds of everything the list draws, clipped to its cull rect.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Spatial index of rendering op bounds, present when the builder was asked for one.
    pub fn rtree(&self) -> Option<&DlRTree> {
        self.rtree.as_ref()
    }

    /// Count of recorded ops; with `nested`, ops of embedded display lists are added in.
    pub fn op_count(&self, nested: bool) -> usize {
        if nested {
            self.ops.len() + self.nested_op_count
        } else {
            self.ops.len()
        }
    }

    /// Count of ops that produce pixels.
    pub fn render_op_count(&self) -> usize {
        self.render_op_count
    }

    /// Process-unique identity, distinct for every sealed list.
    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    /// Return `true` when the list records no operations.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Return `true` when drawing the list with an alpha equals drawing each op with that alpha.
    pub fn can_apply_group_opacity(&self) -> bool {
        self.can_apply_group_opacity
    }

    /// Structural equality of the recorded ops.
    pub fn equals(&self, other: &DisplayList) -> bool {
        std::ptr::eq(self, other) || self.ops == other.ops
    }

    /// Replay every op into `canvas`.
    #[tracing::instrument(skip_all, fields(list = self.unique_id, ops = self.ops.len()))]
    pub fn render_to(&self, canvas: &mut dyn Canvas) {
        self.render_to_with_opacity(canvas, 1.0);
    }

    /// Replay every op into `canvas` under an extra group opacity.
    ///
    /// When the list cannot absorb the opacity per op, the replay is wrapped in a layer.
    pub fn render_to_with_opacity(&self, canvas: &mut dyn Canvas, opacity: f32) {
        let mut dispatcher = Dispatcher::new(canvas);
        dispatcher.replay(self, opacity);
    }
}

impl PartialEq for DisplayList {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/display_list/list.rs"]
mod tests;
