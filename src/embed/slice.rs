use std::sync::Arc;

use crate::display_list::builder::DisplayListBuilder;
use crate::display_list::list::DisplayList;
use crate::foundation::core::{IRect, Rect};
use crate::render::canvas::Canvas;

/// Per-view recording surface for content layered above one platform view.
pub trait EmbedderViewSlice: Send {
    /// The recording canvas, or `None` when nothing is being recorded this frame.
    fn canvas(&mut self) -> Option<&mut dyn Canvas>;

    /// Seal the recording. Must be called before [`region`](Self::region) or
    /// [`render_into`](Self::render_into).
    fn end_recording(&mut self);

    /// Pixel-rounded rects of recorded content overlapping `query`.
    fn region(&self, query: Rect) -> Vec<IRect>;

    /// Replay the recorded content into `canvas`.
    fn render_into(&self, canvas: &mut dyn Canvas);
}

/// A slice recording into a [`DisplayListBuilder`] with an rtree.
#[derive(Debug)]
pub struct DisplayListEmbedderViewSlice {
    builder: Option<DisplayListBuilder>,
    list: Option<Arc<DisplayList>>,
}

impl DisplayListEmbedderViewSlice {
    /// A slice culled to `view_bounds`.
    pub fn new(view_bounds: Rect) -> Self {
        Self {
            builder: Some(DisplayListBuilder::with_rtree(view_bounds)),
            list: None,
        }
    }

    /// Direct access to the builder while recording.
    pub fn builder(&mut self) -> Option<&mut DisplayListBuilder> {
        self.builder.as_mut()
    }

    /// Return `true` when no rendering op has been recorded.
    pub fn is_empty(&self) -> bool {
        match (&self.builder, &self.list) {
            (Some(b), _) => b.op_count() == 0,
            (None, Some(list)) => list.render_op_count() == 0,
            (None, None) => true,
        }
    }

    /// The sealed recording, once [`EmbedderViewSlice::end_recording`] has run.
    pub fn recorded_list(&self) -> Option<&Arc<DisplayList>> {
        self.list.as_ref()
    }

    fn sealed(&self) -> &Arc<DisplayList> {
        match &self.list {
            Some(list) => list,
            None => panic!("view slice used before end_recording()"),
        }
    }
}

impl EmbedderViewSlice for DisplayListEmbedderViewSlice {
    fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        self.builder.as_mut().map(|b| b as &mut dyn Canvas)
    }

    fn end_recording(&mut self) {
        if let Some(builder) = self.builder.take() {
            self.list = Some(builder.build());
        }
    }

    fn region(&self, query: Rect) -> Vec<IRect> {
        self.sealed()
            .rtree()
            .map(|tree| tree.search_and_consolidate_rects(query))
            .unwrap_or_default()
    }

    fn render_into(&self, canvas: &mut dyn Canvas) {
        self.sealed().render_to(canvas);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/embed/slice.rs"]
mod tests;
