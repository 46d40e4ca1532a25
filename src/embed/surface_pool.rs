use crate::foundation::error::{DlError, DlResult};

/// Pool configuration for overlay layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayPoolOpts {
    /// Maximum number of live overlay layers. 0 means unlimited.
    pub max_overlay_layers: usize,
}

/// An overlay surface: a full-frame pixmap the platform composites above its platform view.
pub struct OverlayLayer {
    /// Stable id the platform side knows this surface by.
    pub id: i64,
    /// Backing pixels.
    pub pixmap: vello_cpu::Pixmap,
    /// Frame size the layer was allocated for.
    pub frame_size: (u32, u32),
}

impl std::fmt::Debug for OverlayLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayLayer")
            .field("id", &self.id)
            .field("frame_size", &self.frame_size)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OverlayPoolStats {
    pub live_layers: usize,
    pub layers_in_use: usize,
    pub alloc_layers: u64,
    pub alloc_bytes: u64,
    pub destroyed_layers: u64,
    pub denied_requests: u64,
}

/// Frame-scoped pool of overlay layers.
///
/// Layers are handed out in allocation order with [`get_layer`](Self::get_layer) and all become
/// available again at [`recycle_layers`](Self::recycle_layers); a frame that needs more layers
/// than the previous one allocates, a frame that needs fewer leaves the rest in
/// [`unused_layers`](Self::unused_layers).
#[derive(Debug)]
pub struct OverlayLayerPool {
    opts: OverlayPoolOpts,
    stats: OverlayPoolStats,
    layers: Vec<OverlayLayer>,
    available_index: usize,
    next_id: i64,
    frame_size: Option<(u32, u32)>,
}

impl OverlayLayerPool {
    pub fn new(opts: OverlayPoolOpts) -> Self {
        Self {
            opts,
            stats: OverlayPoolStats::default(),
            layers: Vec::new(),
            available_index: 0,
            next_id: 1,
            frame_size: None,
        }
    }

    pub fn stats(&self) -> OverlayPoolStats {
        let mut s = self.stats.clone();
        s.live_layers = self.layers.len();
        s.layers_in_use = self.available_index;
        s
    }

    pub fn has_layers(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Next free layer for a frame of `frame_size`, allocating when none is free.
    ///
    /// Returns `Ok(None)` when the configured layer cap is reached.
    pub fn get_layer(&mut self, frame_size: (u32, u32)) -> DlResult<Option<&mut OverlayLayer>> {
        if self.available_index >= self.layers.len() {
            if self.opts.max_overlay_layers != 0
                && self.layers.len() >= self.opts.max_overlay_layers
            {
                self.stats.denied_requests = self.stats.denied_requests.saturating_add(1);
                tracing::warn!(
                    cap = self.opts.max_overlay_layers,
                    "overlay layer cap reached"
                );
                return Ok(None);
            }
            let layer = self.allocate(frame_size)?;
            self.layers.push(layer);
        }
        let i = self.available_index;
        self.available_index += 1;
        Ok(Some(&mut self.layers[i]))
    }

    fn allocate(&mut self, frame_size: (u32, u32)) -> DlResult<OverlayLayer> {
        let (w, h) = frame_size;
        let pw: u16 = w
            .try_into()
            .map_err(|_| DlError::render(format!("overlay width exceeds u16: {w}")))?;
        let ph: u16 = h
            .try_into()
            .map_err(|_| DlError::render(format!("overlay height exceeds u16: {h}")))?;
        let bytes = (w as u64).saturating_mul(h as u64).saturating_mul(4);
        self.stats.alloc_layers = self.stats.alloc_layers.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(bytes);

        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!(id, w, h, "allocated overlay layer");
        Ok(OverlayLayer {
            id,
            pixmap: vello_cpu::Pixmap::new(pw, ph),
            frame_size,
        })
    }

    /// Drop the layers not handed out since the last recycle, returning their ids.
    pub fn trim_unused(&mut self) -> Vec<i64> {
        let ids: Vec<i64> = self
            .layers
            .drain(self.available_index..)
            .map(|l| l.id)
            .collect();
        self.stats.destroyed_layers = self
            .stats
            .destroyed_layers
            .saturating_add(ids.len() as u64);
        ids
    }

    /// Make every layer available again for the next frame.
    pub fn recycle_layers(&mut self) {
        self.available_index = 0;
    }

    /// Layers not handed out since the last recycle.
    pub fn unused_layers(&self) -> &[OverlayLayer] {
        &self.layers[self.available_index..]
    }

    /// Drop every layer when the frame size differs from the one the pool was used with.
    ///
    /// Returns the ids of the dropped layers.
    pub fn check_layer_size_change(&mut self, frame_size: (u32, u32)) -> Vec<i64> {
        let changed = self.frame_size.is_some_and(|s| s != frame_size);
        self.frame_size = Some(frame_size);
        if changed {
            tracing::debug!(?frame_size, "frame size changed; dropping overlay layers");
            self.destroy_layers()
        } else {
            Vec::new()
        }
    }

    /// Drop every layer, returning their ids.
    pub fn destroy_layers(&mut self) -> Vec<i64> {
        let ids: Vec<i64> = self.layers.drain(..).map(|l| l.id).collect();
        self.available_index = 0;
        self.stats.destroyed_layers = self
            .stats
            .destroyed_layers
            .saturating_add(ids.len() as u64);
        ids
    }
}

#[cfg(test)]
#[path = "../../tests/unit/embed/surface_pool.rs"]
mod tests;
