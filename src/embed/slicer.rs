use std::collections::HashMap;

use crate::display_list::types::ClipOp;
use crate::embed::slice::EmbedderViewSlice;
use crate::foundation::core::{
    IRect, Rect, ViewId, intersect_rect, join_rect, rect_is_empty, round_in, round_out,
};
use crate::render::canvas::Canvas;

/// Split one frame into background content and per-view overlays.
///
/// Walks `composition_order` bottom to top. For each view with a live slice, the slice's
/// content that lands on any platform view at or below it becomes that view's overlay rect,
/// the background is clipped to exclude it, and the rest of the slice is drawn into
/// `background`. Views missing from `view_rects` are skipped. The background canvas's
/// save/clip state is restored before returning.
#[tracing::instrument(skip_all, fields(views = composition_order.len()))]
pub fn slice_views(
    background: &mut dyn Canvas,
    composition_order: &[ViewId],
    slices: &mut HashMap<ViewId, Box<dyn EmbedderViewSlice>>,
    view_rects: &HashMap<ViewId, Rect>,
) -> HashMap<ViewId, Rect> {
    let mut overlay_layers = HashMap::new();
    let restore_count = background.save_count();
    background.save();

    for (i, &current) in composition_order.iter().enumerate() {
        let Some(slice) = slices.get_mut(&current) else {
            tracing::trace!(view = %current, "no slice for view");
            continue;
        };
        if slice.canvas().is_none() {
            continue;
        }
        slice.end_recording();

        let mut full_joined: Option<Rect> = None;
        for below in &composition_order[..=i] {
            let Some(&view_rect) = view_rects.get(below) else {
                tracing::trace!(view = %below, "view rect missing; skipping");
                continue;
            };

            // Overlaps that only appear after rounding both rects out are 1px seams, not content.
            let rounded_in = round_in(view_rect);
            let partial = slice
                .region(view_rect)
                .into_iter()
                .filter(|r| r.intersects(rounded_in))
                .fold(None::<IRect>, |acc, r| Some(acc.map_or(r, |a| a.join(r))));

            if let Some(partial) = partial
                && let Some(clipped) =
                    intersect_rect(partial.to_rect(), round_out(view_rect).to_rect())
            {
                full_joined = join_rect(full_joined, clipped);
            }
        }

        if let Some(overlay) = full_joined
            && !rect_is_empty(overlay)
        {
            tracing::debug!(view = %current, ?overlay, "overlay required");
            overlay_layers.insert(current, overlay);
            background.clip_rect(overlay, ClipOp::Difference, false);
        }
        slice.render_into(background);
    }

    background.restore_to_count(restore_count);
    overlay_layers
}
