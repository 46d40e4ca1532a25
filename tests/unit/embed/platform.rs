use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::foundation::core::{Affine, Vec2};

#[derive(Default)]
struct Recorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl PlatformViewsController for Recorder {
    fn on_begin_frame(&mut self, frame_size: (u32, u32)) {
        self.log.lock().unwrap().push(format!("begin {frame_size:?}"));
    }

    fn on_display_platform_view(&mut self, id: ViewId, _params: &EmbeddedViewParams) {
        self.log.lock().unwrap().push(format!("view {id}"));
    }

    fn on_display_overlay_surface(&mut self, surface_id: i64, _rect: Rect, _frame: &FrameRGBA) {
        self.log.lock().unwrap().push(format!("overlay {surface_id}"));
    }

    fn on_end_frame(&mut self) {
        self.log.lock().unwrap().push("end".to_owned());
    }

    fn destroy_overlay_surfaces(&mut self, surface_ids: &[i64]) {
        self.log
            .lock()
            .unwrap()
            .push(format!("destroy {surface_ids:?}"));
    }
}

fn spawn(name: &str) -> (PlatformThread, Arc<Mutex<Vec<String>>>) {
    let recorder = Recorder::default();
    let log = Arc::clone(&recorder.log);
    (PlatformThread::spawn(name, Box::new(recorder)).unwrap(), log)
}

#[test]
fn tasks_run_in_post_order() {
    let (thread, log) = spawn("platform-order");
    thread.post(|c| c.on_begin_frame((4, 4))).unwrap();
    let params = EmbeddedViewParams::new(Affine::IDENTITY, Vec2::new(2.0, 2.0), vec![]);
    thread
        .post(move |c| c.on_display_platform_view(ViewId(7), &params))
        .unwrap();
    thread.post(|c| c.on_end_frame()).unwrap();
    thread.post_and_wait(|_| ()).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["begin (4, 4)", "view view#7", "end"]
    );
}

#[test]
fn post_and_wait_returns_the_task_result() {
    let (thread, log) = spawn("platform-wait");
    let n = thread
        .post_and_wait(|c| {
            c.destroy_overlay_surfaces(&[1, 2]);
            40 + 2
        })
        .unwrap();
    assert_eq!(n, 42);
    assert_eq!(*log.lock().unwrap(), vec!["destroy [1, 2]"]);
}

#[test]
fn tasks_run_on_the_named_thread() {
    let (thread, _log) = spawn("platform-named");
    let name = thread
        .post_and_wait(|_| std::thread::current().name().map(str::to_owned))
        .unwrap();
    assert_eq!(name.as_deref(), Some("platform-named"));
}

#[test]
fn drop_drains_queued_tasks_and_joins() {
    let (thread, _log) = spawn("platform-drop");
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    thread
        .post(move |_| {
            std::thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();
    drop(thread);
    assert!(done.load(Ordering::SeqCst));
}
