//! A routed save request and its one-shot result handle.

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::Result;
use crate::models::{SaveBatch, SaveMethod};

/// Write-once handle delivering the terminal outcome of a request.
///
/// Resolving consumes the handle, so an outcome can be delivered at most once.
#[derive(Debug)]
pub struct Responder(oneshot::Sender<Result<bool>>);

impl Responder {
    /// Create a responder and the receiver its outcome arrives on.
    pub fn channel() -> (Self, oneshot::Receiver<Result<bool>>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    pub fn resolve(self, outcome: Result<bool>) {
        if self.0.send(outcome).is_err() {
            debug!("Save result discarded, caller is gone");
        }
    }
}

/// A save request waiting for (or going through) the permission gate.
#[derive(Debug)]
pub struct SaveRequest {
    pub method: SaveMethod,
    pub batch: SaveBatch,
    pub responder: Responder,
}

impl SaveRequest {
    pub fn new(method: SaveMethod, batch: SaveBatch, responder: Responder) -> Self {
        Self {
            method,
            batch,
            responder,
        }
    }
}
