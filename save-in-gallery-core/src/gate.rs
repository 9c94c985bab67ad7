//! Permission-gated dispatch of save requests.
//!
//! No image is written until the shared media permission is granted. Requests
//! that arrive without the grant are parked in a FIFO queue while a single
//! permission prompt is outstanding. When the user answers, the queue is
//! drained in arrival order: granted requests are dispatched after a fresh
//! permission check, denied ones are answered with
//! [`Error::PermissionDenied`]. Requests arriving during a drain line up
//! behind the ones still queued.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::Error;
use crate::models::MethodCall;
use crate::permission::PermissionProvider;
use crate::request::{Responder, SaveRequest};
use crate::writer::BatchWriter;

/// Whether a permission decision is outstanding.
#[derive(Debug)]
enum GateState {
    /// No prompt outstanding; requests are checked and dispatched directly.
    Resolved,
    /// A prompt is showing. Every request arriving now is queued behind it.
    AwaitingDecision(VecDeque<SaveRequest>),
    /// The grant arrived and the queue is being worked off front to back.
    /// Requests arriving now join the back of the same queue.
    Draining(VecDeque<SaveRequest>),
}

/// Owns the pending queue and routes requests to the batch writer.
pub struct PermissionGate {
    permission: Arc<dyn PermissionProvider>,
    writer: BatchWriter,
    state: Mutex<GateState>,
}

impl PermissionGate {
    pub fn new(permission: Arc<dyn PermissionProvider>, writer: BatchWriter) -> Arc<Self> {
        Arc::new(Self {
            permission,
            writer,
            state: Mutex::new(GateState::Resolved),
        })
    }

    /// Entry point for a raw channel call.
    ///
    /// Unknown methods and malformed arguments are answered immediately and
    /// never touch the permission gate.
    pub fn handle(self: &Arc<Self>, call: MethodCall, responder: Responder) {
        match call.route() {
            Ok((method, batch)) => self.submit(SaveRequest::new(method, batch, responder)),
            Err(e) => {
                warn!("Rejected gallery call: {}", e);
                responder.resolve(Err(e));
            }
        }
    }

    /// Dispatch the request now if the permission is granted, otherwise queue
    /// it behind a permission prompt.
    pub fn submit(self: &Arc<Self>, request: SaveRequest) {
        let Some(request) = self.queue_if_pending(request) else {
            return;
        };

        match self.permission.check_granted() {
            Ok(true) => self.dispatch(request),
            Ok(false) => self.enqueue(request),
            Err(e) => {
                warn!("Could not check gallery permission: {}", e);
                request.responder.resolve(Err(e));
            }
        }
    }

    /// Deliver the user's decision and drain the pending queue in FIFO order.
    pub fn on_permission_result(self: &Arc<Self>, granted: bool) {
        let denied = {
            let mut state = self.lock_state();
            match std::mem::replace(&mut *state, GateState::Resolved) {
                GateState::AwaitingDecision(queue) => {
                    info!(
                        "Gallery permission {}, draining {} pending request(s)",
                        if granted { "granted" } else { "denied" },
                        queue.len()
                    );
                    if granted {
                        *state = GateState::Draining(queue);
                        None
                    } else {
                        Some(queue)
                    }
                }
                other => {
                    *state = other;
                    warn!("Permission result received with no prompt outstanding");
                    return;
                }
            }
        };

        match denied {
            Some(queue) => {
                for request in queue {
                    request.responder.resolve(Err(Error::PermissionDenied));
                }
            }
            None => self.drain(),
        }
    }

    /// Number of requests waiting for a permission decision.
    pub fn pending_len(&self) -> usize {
        match &*self.lock_state() {
            GateState::AwaitingDecision(queue) | GateState::Draining(queue) => queue.len(),
            GateState::Resolved => 0,
        }
    }

    pub fn is_awaiting_decision(&self) -> bool {
        matches!(&*self.lock_state(), GateState::AwaitingDecision(_))
    }

    /// Queue the request if a prompt or drain is in progress, otherwise hand
    /// it back.
    fn queue_if_pending(&self, request: SaveRequest) -> Option<SaveRequest> {
        match &mut *self.lock_state() {
            GateState::AwaitingDecision(queue) | GateState::Draining(queue) => {
                queue.push_back(request);
                debug!(
                    "Permission decision pending, queued {} (queue length {})",
                    request_label(queue.back()),
                    queue.len()
                );
                None
            }
            GateState::Resolved => Some(request),
        }
    }

    /// Work off the queue one request at a time. The state stays `Draining`
    /// until the queue is empty, so later arrivals line up behind it.
    fn drain(self: &Arc<Self>) {
        loop {
            let request = {
                let mut state = self.lock_state();
                let GateState::Draining(queue) = &mut *state else {
                    return;
                };
                match queue.pop_front() {
                    Some(request) => request,
                    None => {
                        *state = GateState::Resolved;
                        return;
                    }
                }
            };

            match self.permission.check_granted() {
                Ok(true) => self.dispatch(request),
                Ok(false) => {
                    // The grant did not stick; the rest waits for a new prompt
                    self.regate(request);
                    return;
                }
                Err(e) => {
                    warn!("Could not check gallery permission: {}", e);
                    request.responder.resolve(Err(e));
                }
            }
        }
    }

    /// Put `head` back in front of the remaining queue and prompt again.
    fn regate(self: &Arc<Self>, head: SaveRequest) {
        {
            let mut state = self.lock_state();
            let mut queue = VecDeque::from([head]);
            if let GateState::Draining(rest) = std::mem::replace(&mut *state, GateState::Resolved) {
                queue.extend(rest);
            }
            *state = GateState::AwaitingDecision(queue);
        }
        self.prompt();
    }

    fn enqueue(self: &Arc<Self>, request: SaveRequest) {
        let prompt = {
            let mut state = self.lock_state();
            match &mut *state {
                GateState::AwaitingDecision(queue) | GateState::Draining(queue) => {
                    queue.push_back(request);
                    false
                }
                GateState::Resolved => {
                    *state = GateState::AwaitingDecision(VecDeque::from([request]));
                    true
                }
            }
        };

        if prompt {
            self.prompt();
        }
    }

    /// Must be called without the state lock held; providers may answer inline.
    fn prompt(self: &Arc<Self>) {
        info!("Requesting gallery write permission");
        let gate = Arc::clone(self);
        self.permission
            .request_grant(Box::new(move |granted| gate.on_permission_result(granted)));
    }

    fn dispatch(&self, request: SaveRequest) {
        debug!(
            "Dispatching {} with {} image(s)",
            request.method.key(),
            request.batch.len()
        );
        let outcome = self.writer.write(&request.batch);
        request.responder.resolve(outcome);
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn request_label(request: Option<&SaveRequest>) -> &'static str {
    request.map_or("request", |r| r.method.key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::sample_png;
    use crate::codec::ImageCodec;
    use crate::error::Result;
    use crate::models::{NamedImage, SaveBatch, SaveMethod};
    use crate::naming::ResolvedFileName;
    use crate::permission::GrantCallback;
    use crate::store::{FsGallery, GalleryStore};
    use serde_json::json;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::oneshot::error::TryRecvError;

    /// Permission provider whose prompt is answered by the test.
    #[derive(Default)]
    struct ManualPermission {
        granted: AtomicBool,
        fail_check: AtomicBool,
        checks: AtomicUsize,
        prompts: AtomicUsize,
        pending: Mutex<Vec<GrantCallback>>,
    }

    impl ManualPermission {
        fn granted() -> Arc<Self> {
            let permission = Self::default();
            permission.granted.store(true, Ordering::SeqCst);
            Arc::new(permission)
        }

        fn answer(&self, granted: bool) {
            self.granted.store(granted, Ordering::SeqCst);
            let callbacks = std::mem::take(&mut *self.pending.lock().unwrap());
            for callback in callbacks {
                callback(granted);
            }
        }

        fn checks(&self) -> usize {
            self.checks.load(Ordering::SeqCst)
        }

        fn prompts(&self) -> usize {
            self.prompts.load(Ordering::SeqCst)
        }
    }

    impl PermissionProvider for ManualPermission {
        fn check_granted(&self) -> Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if self.fail_check.load(Ordering::SeqCst) {
                return Err(Error::Platform("permission service unavailable".into()));
            }
            Ok(self.granted.load(Ordering::SeqCst))
        }

        fn request_grant(&self, on_result: GrantCallback) {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            self.pending.lock().unwrap().push(on_result);
        }
    }

    /// Store that only records the order files are written in.
    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<String>>,
        after_first_write: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    }

    impl GalleryStore for RecordingStore {
        fn prepare_album(&self, _album: Option<&str>) -> Result<()> {
            Ok(())
        }

        fn replace(&self, _album: Option<&str>, file: &ResolvedFileName, _bytes: &[u8]) -> Result<()> {
            self.writes.lock().unwrap().push(file.file_name());
            let hook = self.after_first_write.lock().unwrap().take();
            if let Some(hook) = hook {
                hook();
            }
            Ok(())
        }
    }

    fn fs_gate(permission: Arc<ManualPermission>, root: &Path) -> Arc<PermissionGate> {
        let writer = BatchWriter::new(Arc::new(FsGallery::new(root)), ImageCodec::default());
        PermissionGate::new(permission, writer)
    }

    fn named_request(name: &str) -> (SaveRequest, tokio::sync::oneshot::Receiver<Result<bool>>) {
        let (responder, rx) = Responder::channel();
        let batch = SaveBatch::new(vec![NamedImage::new(Some(name.into()), sample_png(5))], None);
        (SaveRequest::new(SaveMethod::SaveImage, batch, responder), rx)
    }

    #[test]
    fn test_save_single_image_with_permission_granted() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = ManualPermission::granted();
        let gate = fs_gate(permission.clone(), tmp.path());

        let (responder, mut rx) = Responder::channel();
        gate.handle(
            MethodCall::new("saveImageKey", json!({ "imageBytes": sample_png(7), "imageName": "cat" })),
            responder,
        );

        assert_eq!(rx.try_recv().unwrap(), Ok(true));
        assert!(tmp.path().join("cat.png").is_file());
        assert_eq!(permission.prompts(), 0);
    }

    #[test]
    fn test_save_named_images_with_permission_granted() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = fs_gate(ManualPermission::granted(), tmp.path());

        let (responder, mut rx) = Responder::channel();
        gate.handle(
            MethodCall::new(
                "saveNamedImagesKey",
                json!({ "images": { "a.webp": sample_png(1), "b": sample_png(2) } }),
            ),
            responder,
        );

        assert_eq!(rx.try_recv().unwrap(), Ok(true));
        assert!(tmp.path().join("a.webp").is_file());
        assert!(tmp.path().join("b.png").is_file());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
    }

    #[test]
    fn test_denied_permission_rejects_queued_request_once() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        let gate = fs_gate(permission.clone(), tmp.path());

        let (responder, mut rx) = Responder::channel();
        gate.handle(
            MethodCall::new("saveImagesKey", json!({ "images": [sample_png(3)] })),
            responder,
        );

        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(gate.pending_len(), 1);
        assert!(gate.is_awaiting_decision());
        assert_eq!(permission.prompts(), 1);

        permission.answer(false);

        assert_eq!(rx.try_recv().unwrap(), Err(Error::PermissionDenied));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
        assert_eq!(gate.pending_len(), 0);
        assert!(!gate.is_awaiting_decision());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unknown_method_skips_permission_and_queue() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        let gate = fs_gate(permission.clone(), tmp.path());

        let (responder, mut rx) = Responder::channel();
        gate.handle(MethodCall::new("shareImageKey", json!({})), responder);

        assert_eq!(
            rx.try_recv().unwrap(),
            Err(Error::NotImplemented("shareImageKey".into()))
        );
        assert_eq!(permission.checks(), 0);
        assert_eq!(permission.prompts(), 0);
        assert_eq!(gate.pending_len(), 0);
    }

    #[test]
    fn test_invalid_arguments_skip_permission() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        let gate = fs_gate(permission.clone(), tmp.path());

        let (responder, mut rx) = Responder::channel();
        gate.handle(
            MethodCall::new("saveImagesKey", json!({ "images": "nope" })),
            responder,
        );

        assert!(matches!(rx.try_recv().unwrap(), Err(Error::InvalidArguments(_))));
        assert_eq!(permission.checks(), 0);
    }

    #[test]
    fn test_granted_permission_drains_queue_in_fifo_order() {
        let permission = Arc::new(ManualPermission::default());
        let store = Arc::new(RecordingStore::default());
        let writer = BatchWriter::new(store.clone(), ImageCodec::default());
        let gate = PermissionGate::new(permission.clone(), writer);

        let receivers: Vec<_> = ["first", "second", "third"]
            .into_iter()
            .map(|name| {
                let (request, rx) = named_request(name);
                gate.submit(request);
                rx
            })
            .collect();

        assert_eq!(gate.pending_len(), 3);
        assert_eq!(permission.prompts(), 1, "prompts are coalesced");
        assert!(store.writes.lock().unwrap().is_empty());

        permission.answer(true);

        assert_eq!(
            *store.writes.lock().unwrap(),
            vec!["first.png", "second.png", "third.png"]
        );
        for mut rx in receivers {
            assert_eq!(rx.try_recv().unwrap(), Ok(true));
        }
        assert_eq!(gate.pending_len(), 0);
    }

    #[test]
    fn test_request_arriving_mid_drain_waits_for_queue() {
        let permission = Arc::new(ManualPermission::default());
        let store = Arc::new(RecordingStore::default());
        let gate = PermissionGate::new(
            permission.clone(),
            BatchWriter::new(store.clone(), ImageCodec::default()),
        );

        let (request, mut q1) = named_request("q1");
        gate.submit(request);
        let (request, mut q2) = named_request("q2");
        gate.submit(request);

        let (late, mut late_rx) = named_request("late");
        let late_gate = Arc::clone(&gate);
        *store.after_first_write.lock().unwrap() = Some(Box::new(move || late_gate.submit(late)));

        permission.answer(true);

        assert_eq!(
            *store.writes.lock().unwrap(),
            vec!["q1.png", "q2.png", "late.png"]
        );
        assert_eq!(q1.try_recv().unwrap(), Ok(true));
        assert_eq!(q2.try_recv().unwrap(), Ok(true));
        assert_eq!(late_rx.try_recv().unwrap(), Ok(true));
        assert_eq!(gate.pending_len(), 0);
        assert_eq!(permission.prompts(), 1);
    }

    #[test]
    fn test_denied_permission_rejects_every_queued_request() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        let gate = fs_gate(permission.clone(), tmp.path());

        let receivers: Vec<_> = (0..4)
            .map(|i| {
                let (request, rx) = named_request(&format!("img{i}"));
                gate.submit(request);
                rx
            })
            .collect();

        permission.answer(false);

        for mut rx in receivers {
            assert_eq!(rx.try_recv().unwrap(), Err(Error::PermissionDenied));
        }
        assert_eq!(gate.pending_len(), 0);
        assert_eq!(permission.prompts(), 1);
    }

    #[test]
    fn test_new_prompt_after_previous_decision() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        let gate = fs_gate(permission.clone(), tmp.path());

        let (request, mut first) = named_request("one");
        gate.submit(request);
        permission.answer(false);
        assert_eq!(first.try_recv().unwrap(), Err(Error::PermissionDenied));

        let (request, mut second) = named_request("two");
        gate.submit(request);
        assert_eq!(permission.prompts(), 2);

        permission.answer(true);
        assert_eq!(second.try_recv().unwrap(), Ok(true));
        assert!(tmp.path().join("two.png").is_file());
    }

    #[test]
    fn test_still_ungranted_after_grant_requeues_in_order() {
        let permission = Arc::new(ManualPermission::default());
        let store = Arc::new(RecordingStore::default());
        let gate = PermissionGate::new(
            permission.clone(),
            BatchWriter::new(store.clone(), ImageCodec::default()),
        );

        let (request, mut a) = named_request("a");
        gate.submit(request);
        let (request, mut b) = named_request("b");
        gate.submit(request);

        // The OS reports a grant but the re-check still fails
        gate.on_permission_result(true);
        assert_eq!(gate.pending_len(), 2);
        assert_eq!(permission.prompts(), 2);
        assert_eq!(a.try_recv(), Err(TryRecvError::Empty));

        permission.answer(true);
        assert_eq!(*store.writes.lock().unwrap(), vec!["a.png", "b.png"]);
        assert_eq!(a.try_recv().unwrap(), Ok(true));
        assert_eq!(b.try_recv().unwrap(), Ok(true));
    }

    #[test]
    fn test_permission_check_failure_is_delivered() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        permission.fail_check.store(true, Ordering::SeqCst);
        let gate = fs_gate(permission.clone(), tmp.path());

        let (request, mut rx) = named_request("x");
        gate.submit(request);

        assert!(matches!(rx.try_recv().unwrap(), Err(Error::Platform(_))));
        assert_eq!(gate.pending_len(), 0);
        assert_eq!(permission.prompts(), 0);
    }

    #[test]
    fn test_stray_permission_result_is_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = fs_gate(ManualPermission::granted(), tmp.path());
        gate.on_permission_result(true);
        assert!(!gate.is_awaiting_decision());
    }

    #[test]
    fn test_write_failure_reaches_caller() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = fs_gate(ManualPermission::granted(), tmp.path());

        let (responder, mut rx) = Responder::channel();
        gate.handle(
            MethodCall::new("saveImageKey", json!({ "imageBytes": [0, 1, 2], "imageName": "bad" })),
            responder,
        );

        let err = rx.try_recv().unwrap().unwrap_err();
        assert_eq!(err.code(), "SAVE_IMAGE_ERROR");
        assert!(!tmp.path().join("bad.png").exists());
    }

    #[test]
    fn test_dropped_gate_closes_pending_receivers() {
        let tmp = tempfile::tempdir().unwrap();
        let permission = Arc::new(ManualPermission::default());
        let gate = fs_gate(permission.clone(), tmp.path());

        let (request, mut rx) = named_request("lost");
        gate.submit(request);

        // The outstanding prompt holds the gate; dropping both releases the queue
        drop(gate);
        permission.pending.lock().unwrap().clear();

        assert_eq!(rx.try_recv(), Err(TryRecvError::Closed));
    }
}
