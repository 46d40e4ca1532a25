use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;

use crate::embed::params::EmbeddedViewParams;
use crate::foundation::core::{Rect, ViewId};
use crate::foundation::error::{DlError, DlResult};
use crate::render::backend::FrameRGBA;

/// The platform side of view embedding: positions native views and shows overlay surfaces.
///
/// Runs only on the [`PlatformThread`].
pub trait PlatformViewsController: Send {
    /// A frame's platform-view work is starting.
    fn on_begin_frame(&mut self, _frame_size: (u32, u32)) {}

    /// Position and show platform view `id` for the frame.
    fn on_display_platform_view(&mut self, id: ViewId, params: &EmbeddedViewParams);

    /// Show overlay surface `surface_id` with its content, covering `rect` of the frame.
    fn on_display_overlay_surface(&mut self, surface_id: i64, rect: Rect, frame: &FrameRGBA);

    /// All views of the frame are in place.
    fn on_end_frame(&mut self);

    /// Release platform resources behind the given overlay surfaces.
    fn destroy_overlay_surfaces(&mut self, surface_ids: &[i64]);
}

type PlatformTask = Box<dyn FnOnce(&mut dyn PlatformViewsController) + Send>;

enum PlatformMessage {
    Run(PlatformTask),
    Quit,
}

/// A named thread owning the [`PlatformViewsController`] and running posted tasks in order.
pub struct PlatformThread {
    sender: Sender<PlatformMessage>,
    join_handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PlatformThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformThread")
            .field("running", &self.join_handle.is_some())
            .finish()
    }
}

impl PlatformThread {
    pub fn spawn(name: &str, controller: Box<dyn PlatformViewsController>) -> DlResult<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded::<PlatformMessage>();
        let join_handle = thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                let mut controller = controller;
                while let Ok(message) = receiver.recv() {
                    match message {
                        PlatformMessage::Run(task) => task(controller.as_mut()),
                        PlatformMessage::Quit => return,
                    }
                }
            })
            .map_err(|e| DlError::platform(format!("failed to spawn platform thread: {e}")))?;
        Ok(Self {
            sender,
            join_handle: Some(join_handle),
        })
    }

    /// Queue `task` behind everything already posted.
    pub fn post(
        &self,
        task: impl FnOnce(&mut dyn PlatformViewsController) + Send + 'static,
    ) -> DlResult<()> {
        self.sender
            .send(PlatformMessage::Run(Box::new(task)))
            .map_err(|_| DlError::platform("platform thread is gone"))
    }

    /// Run `task` on the platform thread and block until it returns.
    pub fn post_and_wait<R: Send + 'static>(
        &self,
        task: impl FnOnce(&mut dyn PlatformViewsController) -> R + Send + 'static,
    ) -> DlResult<R> {
        let (reply, done) = crossbeam_channel::bounded::<R>(1);
        self.post(move |controller| {
            let _ = reply.send(task(controller));
        })?;
        done.recv()
            .map_err(|_| DlError::platform("platform task dropped without completing"))
    }
}

impl Drop for PlatformThread {
    fn drop(&mut self) {
        let _ = self.sender.send(PlatformMessage::Quit);
        if let Some(join_handle) = self.join_handle.take() {
            let _ = join_handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/embed/platform.rs"]
mod tests;
