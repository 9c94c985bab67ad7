//! Permission payloads exchanged with the native plugins.
//!
//! Android 10+ and iOS report `photos` as granted without a runtime prompt
//! when the app only adds images; older Android versions go through the
//! `WRITE_EXTERNAL_STORAGE` dialog.

use serde::{Deserialize, Serialize};
use tauri::plugin::PermissionState;

/// Permission alias declared by the native plugins.
pub(crate) const PHOTOS_PERMISSION: &str = "photos";

/// Reply of the native `checkPermissions` / `requestPermissions` commands.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionStatus {
    pub photos: PermissionState,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        self.photos == PermissionState::Granted
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RequestPermissions {
    permissions: Vec<&'static str>,
}

impl RequestPermissions {
    pub fn photos() -> Self {
        Self {
            permissions: vec![PHOTOS_PERMISSION],
        }
    }
}
