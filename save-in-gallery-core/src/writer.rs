//! Materializes a batch of images into the gallery.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::codec::ImageCodec;
use crate::error::Result;
use crate::models::SaveBatch;
use crate::naming::ResolvedFileName;
use crate::store::GalleryStore;

/// Writes batches into a [`GalleryStore`].
///
/// Failure policy is fail-fast: the first image that cannot be decoded,
/// encoded or written ends the batch with that error. Images written before
/// it stay in the gallery.
#[derive(Clone)]
pub struct BatchWriter {
    store: Arc<dyn GalleryStore>,
    codec: ImageCodec,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn GalleryStore>, codec: ImageCodec) -> Self {
        Self { store, codec }
    }

    /// Save every image of the batch, in batch order.
    pub fn write(&self, batch: &SaveBatch) -> Result<bool> {
        let album = batch.directory.as_deref();
        self.store.prepare_album(album)?;

        for image in &batch.images {
            let file = ResolvedFileName::resolve(image.name.as_deref());
            debug!(
                "Saving {} ({} bytes) into album {:?}",
                file,
                image.data.len(),
                album
            );

            let encoded = self.codec.transcode(&image.data, file.format).map_err(|e| {
                error!("Failed to encode {}: {}", file, e);
                e
            })?;
            self.store.replace(album, &file, &encoded).map_err(|e| {
                error!("Failed to write {}: {}", file, e);
                e
            })?;
        }

        info!("Saved {} image(s) to gallery", batch.len());
        Ok(true)
    }
}
