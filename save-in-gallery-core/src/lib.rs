//! Platform-independent engine of the save-in-gallery plugin.
//!
//! Incoming calls are routed to a [`SaveBatch`], passed through the
//! [`PermissionGate`] and written by the [`BatchWriter`] into a
//! [`GalleryStore`]. The Tauri plugin supplies the platform permission
//! provider and store.

mod codec;
mod config;
mod error;
mod gate;
mod models;
mod naming;
mod permission;
mod request;
mod store;
mod writer;

pub use codec::ImageCodec;
pub use config::{Config, MAX_JPEG_QUALITY};
pub use error::{Error, Result};
pub use gate::PermissionGate;
pub use models::*;
pub use naming::{GalleryFormat, ResolvedFileName};
pub use permission::{AlwaysGranted, GrantCallback, PermissionProvider};
pub use request::{Responder, SaveRequest};
pub use store::{FsGallery, GalleryStore};
pub use writer::BatchWriter;
