//! Mobile implementation bridging to native Android/iOS code.
//!
//! - **Android**: Kotlin plugin holding the storage permission and inserting
//!   into `MediaStore` under `Pictures/<album>`
//! - **iOS**: Swift plugin using the Photos framework, grouping images into an
//!   album collection when one is named
//!
//! Images are decoded and re-encoded on the Rust side; the native layer only
//! receives finished files.

use std::sync::Arc;

use save_in_gallery_core::{
    Config, Error, GalleryStore, GrantCallback, PermissionProvider, ResolvedFileName,
};
use serde::Serialize;
use tauri::{
    plugin::{mobile::PluginInvokeError, PluginApi, PluginHandle},
    AppHandle, Runtime,
};
use tracing::{debug, warn};

use crate::status::{PermissionStatus, RequestPermissions};
use crate::SaveInGallery;

#[cfg(target_os = "ios")]
tauri::ios_plugin_binding!(init_plugin_save_in_gallery);

/// Initialize the mobile plugin by registering native code.
pub fn init<R: Runtime>(
    _app: &AppHandle<R>,
    api: PluginApi<R, Option<Config>>,
) -> crate::Result<SaveInGallery> {
    let config = api.config().clone().unwrap_or_default();

    #[cfg(target_os = "android")]
    let handle = api
        .register_android_plugin("com.fdt.saveingallery", "SaveInGalleryPlugin")
        .map_err(map_plugin_error)?;
    #[cfg(target_os = "ios")]
    let handle = api
        .register_ios_plugin(init_plugin_save_in_gallery)
        .map_err(map_plugin_error)?;

    Ok(SaveInGallery::new(
        Arc::new(NativePermission(handle.clone())),
        Arc::new(NativeGallery(handle)),
        &config,
    ))
}

/// Arguments of the native `saveImage` command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveImageArgs<'a> {
    directory: Option<&'a str>,
    file_name: String,
    mime_type: &'static str,
    data: &'a [u8],
}

/// Gallery write permission as reported by the native plugin.
struct NativePermission<R: Runtime>(PluginHandle<R>);

impl<R: Runtime> PermissionProvider for NativePermission<R> {
    fn check_granted(&self) -> crate::Result<bool> {
        let status: PermissionStatus = self
            .0
            .run_mobile_plugin("checkPermissions", ())
            .map_err(map_plugin_error)?;
        debug!("Gallery permission state: {:?}", status.photos);
        Ok(status.is_granted())
    }

    fn request_grant(&self, on_result: GrantCallback) {
        let handle = self.0.clone();

        // The native prompt blocks until the user answers
        tauri::async_runtime::spawn_blocking(move || {
            let request = RequestPermissions::photos();
            let granted = match handle.run_mobile_plugin::<PermissionStatus>("requestPermissions", request)
            {
                Ok(status) => status.is_granted(),
                Err(e) => {
                    warn!("Gallery permission request failed: {}", e);
                    false
                }
            };
            on_result(granted);
        });
    }
}

/// The platform media store, reached through the native plugin.
struct NativeGallery<R: Runtime>(PluginHandle<R>);

impl<R: Runtime> GalleryStore for NativeGallery<R> {
    fn prepare_album(&self, _album: Option<&str>) -> crate::Result<()> {
        // Albums are created by the native side on first insert
        Ok(())
    }

    fn replace(&self, album: Option<&str>, file: &ResolvedFileName, bytes: &[u8]) -> crate::Result<()> {
        let args = SaveImageArgs {
            directory: album,
            file_name: file.file_name(),
            mime_type: file.format.mime_type(),
            data: bytes,
        };
        // Native side returns an empty object
        self.0
            .run_mobile_plugin::<serde_json::Value>("saveImage", args)
            .map(|_| ())
            .map_err(map_plugin_error)
    }
}

/// Map native plugin errors to our error type.
///
/// Native code rejects with the same error codes the Rust side serializes.
fn map_plugin_error(err: PluginInvokeError) -> Error {
    match err {
        PluginInvokeError::InvokeRejected(response) => {
            Error::from_native(response.code.as_deref(), response.message)
        }
        other => Error::Platform(other.to_string()),
    }
}
