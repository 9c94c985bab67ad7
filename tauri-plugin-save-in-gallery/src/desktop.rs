//! Desktop implementation writing straight into the user's pictures folder.
//!
//! Desktop platforms have no runtime media permission, so the gate always
//! sees the grant and requests are written immediately.

use std::sync::Arc;

use save_in_gallery_core::{AlwaysGranted, Config, Error, FsGallery};
use tauri::{plugin::PluginApi, AppHandle, Manager, Runtime};
use tracing::info;

use crate::SaveInGallery;

/// Initialize the desktop plugin.
pub fn init<R: Runtime>(
    app: &AppHandle<R>,
    api: PluginApi<R, Option<Config>>,
) -> crate::Result<SaveInGallery> {
    let config = api.config().clone().unwrap_or_default();

    let root = match &config.gallery_root {
        Some(root) => root.clone(),
        None => app.path().picture_dir().map_err(|e| {
            Error::Platform(format!("Could not determine pictures directory: {}", e))
        })?,
    };
    info!("Gallery root: {}", root.display());

    Ok(SaveInGallery::new(
        Arc::new(AlwaysGranted),
        Arc::new(FsGallery::new(root)),
        &config,
    ))
}
