//! Request payloads and their normalized batch form.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Save methods understood by the plugin, keyed by their channel names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveMethod {
    /// One image with an optional name.
    SaveImage,
    /// Several unnamed images.
    SaveImages,
    /// Several images keyed by name.
    SaveNamedImages,
}

impl SaveMethod {
    pub const ALL: [SaveMethod; 3] = [
        SaveMethod::SaveImage,
        SaveMethod::SaveImages,
        SaveMethod::SaveNamedImages,
    ];

    /// Channel method key.
    pub fn key(&self) -> &'static str {
        match self {
            SaveMethod::SaveImage => "saveImageKey",
            SaveMethod::SaveImages => "saveImagesKey",
            SaveMethod::SaveNamedImages => "saveNamedImagesKey",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.key() == key)
    }
}

/// A raw channel invocation: method name plus its argument mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Route the call to a known method and normalize its arguments.
    ///
    /// Unknown methods yield [`Error::NotImplemented`]; malformed arguments
    /// for a known method yield [`Error::InvalidArguments`].
    pub fn route(self) -> Result<(SaveMethod, SaveBatch)> {
        let method = SaveMethod::from_key(&self.method)
            .ok_or_else(|| Error::NotImplemented(self.method.clone()))?;

        let batch = match method {
            SaveMethod::SaveImage => parse_arguments::<SaveImageRequest>(self.arguments)?.into(),
            SaveMethod::SaveImages => parse_arguments::<SaveImagesRequest>(self.arguments)?.into(),
            SaveMethod::SaveNamedImages => {
                parse_arguments::<SaveNamedImagesRequest>(self.arguments)?.into()
            }
        };
        Ok((method, batch))
    }
}

fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidArguments(e.to_string()))
}

/// Arguments of `saveImageKey`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    pub image_bytes: Vec<u8>,
    pub image_name: Option<String>,
    pub directory_name: Option<String>,
}

/// Arguments of `saveImagesKey`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImagesRequest {
    pub images: Vec<Vec<u8>>,
    pub directory_name: Option<String>,
}

/// Arguments of `saveNamedImagesKey`. Key order carries no meaning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveNamedImagesRequest {
    pub images: HashMap<String, Vec<u8>>,
    pub directory_name: Option<String>,
}

/// One image of a batch, with the name it was submitted under (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImage {
    pub name: Option<String>,
    pub data: Vec<u8>,
}

impl NamedImage {
    pub fn new(name: Option<String>, data: Vec<u8>) -> Self {
        Self { name, data }
    }

    pub fn unnamed(data: Vec<u8>) -> Self {
        Self { name: None, data }
    }
}

/// Images submitted together, plus the optional album they go into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveBatch {
    pub images: Vec<NamedImage>,
    pub directory: Option<String>,
}

impl SaveBatch {
    pub fn new(images: Vec<NamedImage>, directory: Option<String>) -> Self {
        // An empty album name means the gallery root
        let directory = directory.filter(|d| !d.is_empty());
        Self { images, directory }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl From<SaveImageRequest> for SaveBatch {
    fn from(request: SaveImageRequest) -> Self {
        SaveBatch::new(
            vec![NamedImage::new(request.image_name, request.image_bytes)],
            request.directory_name,
        )
    }
}

impl From<SaveImagesRequest> for SaveBatch {
    fn from(request: SaveImagesRequest) -> Self {
        SaveBatch::new(
            request.images.into_iter().map(NamedImage::unnamed).collect(),
            request.directory_name,
        )
    }
}

impl From<SaveNamedImagesRequest> for SaveBatch {
    fn from(request: SaveNamedImagesRequest) -> Self {
        SaveBatch::new(
            request
                .images
                .into_iter()
                .map(|(name, data)| NamedImage::new(Some(name), data))
                .collect(),
            request.directory_name,
        )
    }
}
