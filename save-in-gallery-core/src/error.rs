//! Error types for gallery save operations.
//!
//! Every variant is a terminal outcome for exactly one save request. Nothing
//! here is retried automatically; the caller resubmits to try again.

use thiserror::Error;

/// Result type alias for gallery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be delivered to a save request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Decoding, encoding or writing one of the batch images failed.
    /// The message embeds the underlying failure text.
    #[error("Error while saving image into file: {0}")]
    SaveFailed(String),

    /// The user rejected the shared media write permission.
    #[error("Permission to write into the gallery was denied")]
    PermissionDenied,

    /// The method name is not one this plugin understands.
    #[error("Method not implemented: {0}")]
    NotImplemented(String),

    /// The arguments for a known method are missing or malformed.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The native platform layer failed (permission check, media store call).
    #[error("Platform error: {0}")]
    Platform(String),

    /// The request could not be completed for an internal reason.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Prefix `SaveFailed` adds when displayed.
const SAVE_FAILED_PREFIX: &str = "Error while saving image into file: ";

impl Error {
    /// Rebuild an error rejected by the native plugin from its code and
    /// message. A message that already carries the save failure prefix is
    /// unwrapped so it is not repeated.
    pub fn from_native(code: Option<&str>, message: Option<String>) -> Self {
        let message = message.unwrap_or_default();
        match code {
            Some("WRITE_STORAGE_PERMISSION_ERROR") => Error::PermissionDenied,
            Some("SAVE_IMAGE_ERROR") => Error::SaveFailed(
                message
                    .strip_prefix(SAVE_FAILED_PREFIX)
                    .map(str::to_string)
                    .unwrap_or(message),
            ),
            _ => Error::Platform(message),
        }
    }

    /// Stable error code for programmatic handling on the frontend.
    pub fn code(&self) -> &'static str {
        match self {
            Error::SaveFailed(_) => "SAVE_IMAGE_ERROR",
            Error::PermissionDenied => "WRITE_STORAGE_PERMISSION_ERROR",
            Error::NotImplemented(_) => "NOT_IMPLEMENTED",
            Error::InvalidArguments(_) => "INVALID_ARGUMENTS",
            Error::Platform(_) => "PLATFORM_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::SaveFailed(err.to_string())
    }
}

// ============================================================================
// Serialization for Tauri IPC
// ============================================================================

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_failed_message_embeds_cause() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "disk full").into();
        assert_eq!(
            err.to_string(),
            "Error while saving image into file: disk full"
        );
        assert_eq!(err.code(), "SAVE_IMAGE_ERROR");
    }

    #[test]
    fn test_native_save_failure_is_not_prefixed_twice() {
        let err = Error::from_native(
            Some("SAVE_IMAGE_ERROR"),
            Some("Error while saving image into file: no space left".into()),
        );
        assert_eq!(err, Error::SaveFailed("no space left".into()));
        assert_eq!(
            err.to_string(),
            "Error while saving image into file: no space left"
        );

        let err = Error::from_native(Some("SAVE_IMAGE_ERROR"), Some("no space left".into()));
        assert_eq!(err, Error::SaveFailed("no space left".into()));
    }

    #[test]
    fn test_native_codes_map_to_variants() {
        assert_eq!(
            Error::from_native(Some("WRITE_STORAGE_PERMISSION_ERROR"), None),
            Error::PermissionDenied
        );
        assert_eq!(
            Error::from_native(None, Some("bridge gone".into())),
            Error::Platform("bridge gone".into())
        );
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(Error::PermissionDenied).unwrap();
        assert_eq!(json["code"], "WRITE_STORAGE_PERMISSION_ERROR");
        assert_eq!(
            json["message"],
            "Permission to write into the gallery was denied"
        );

        let json = serde_json::to_value(Error::NotImplemented("rotateKey".into())).unwrap();
        assert_eq!(json["code"], "NOT_IMPLEMENTED");
        assert!(json["message"].as_str().unwrap().contains("rotateKey"));
    }
}
