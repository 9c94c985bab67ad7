//! Plugin state shared by the desktop and mobile backends.

use std::sync::Arc;

use save_in_gallery_core::{
    BatchWriter, Config, Error, GalleryStore, ImageCodec, MethodCall, PermissionGate,
    PermissionProvider, Responder, Result, SaveBatch, SaveMethod, SaveRequest,
};
use tracing::debug;

/// Access to the save-in-gallery APIs.
pub struct SaveInGallery {
    gate: Arc<PermissionGate>,
}

impl SaveInGallery {
    pub(crate) fn new(
        permission: Arc<dyn PermissionProvider>,
        store: Arc<dyn GalleryStore>,
        config: &Config,
    ) -> Self {
        let writer = BatchWriter::new(store, ImageCodec::new(config));
        Self {
            gate: PermissionGate::new(permission, writer),
        }
    }

    /// Save a routed batch. Resolves once the images are written, or with
    /// the error that ended the request. If the permission has not been
    /// granted yet this waits for the user's answer to the prompt.
    pub async fn save(&self, method: SaveMethod, batch: SaveBatch) -> Result<bool> {
        self.run(move |gate, responder| gate.submit(SaveRequest::new(method, batch, responder)))
            .await
    }

    /// Save from a raw method call (`saveImageKey`, `saveImagesKey`,
    /// `saveNamedImagesKey`). Other method names resolve to
    /// [`Error::NotImplemented`].
    pub async fn call(&self, call: MethodCall) -> Result<bool> {
        self.run(move |gate, responder| gate.handle(call, responder))
            .await
    }

    async fn run<F>(&self, submit: F) -> Result<bool>
    where
        F: FnOnce(&Arc<PermissionGate>, Responder) + Send + 'static,
    {
        let (responder, outcome) = Responder::channel();
        let gate = Arc::clone(&self.gate);

        // Decoding and disk writes block
        tauri::async_runtime::spawn_blocking(move || submit(&gate, responder));

        outcome.await.map_err(|_| {
            debug!("Save request dropped before an outcome was delivered");
            Error::Internal("save request dropped before completion".into())
        })?
    }
}
