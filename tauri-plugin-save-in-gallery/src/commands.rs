//! Tauri command handlers for the save-in-gallery plugin.

use save_in_gallery_core::{
    MethodCall, SaveImageRequest, SaveImagesRequest, SaveMethod, SaveNamedImagesRequest,
};
use tauri::{command, AppHandle, Runtime};

use crate::Result;
use crate::SaveInGalleryExt;

/// Save one image, optionally named and optionally into a sub-album.
///
/// The name's extension picks the format (`png`, `jpg`/`jpeg`, `webp`);
/// anything else is saved as PNG.
#[command]
pub(crate) async fn save_image<R: Runtime>(
    app: AppHandle<R>,
    request: SaveImageRequest,
) -> Result<bool> {
    app.save_in_gallery()
        .save(SaveMethod::SaveImage, request.into())
        .await
}

/// Save several images under timestamp names.
#[command]
pub(crate) async fn save_images<R: Runtime>(
    app: AppHandle<R>,
    request: SaveImagesRequest,
) -> Result<bool> {
    app.save_in_gallery()
        .save(SaveMethod::SaveImages, request.into())
        .await
}

/// Save several images, each under the name it is keyed by.
#[command]
pub(crate) async fn save_named_images<R: Runtime>(
    app: AppHandle<R>,
    request: SaveNamedImagesRequest,
) -> Result<bool> {
    app.save_in_gallery()
        .save(SaveMethod::SaveNamedImages, request.into())
        .await
}

/// Generic channel entry: routes `call.method` to one of the save methods.
#[command]
pub(crate) async fn invoke_method<R: Runtime>(app: AppHandle<R>, call: MethodCall) -> Result<bool> {
    app.save_in_gallery().call(call).await
}
