//! File name and encoding format inference for saved images.
//!
//! An optional user supplied name is turned into a base name plus one of the
//! supported gallery formats. Missing names fall back to a UTC timestamp and
//! anything that is not a recognized extension falls back to PNG.
//!
//! - `photo` -> `photo.png`
//! - `photo.` -> `photo.png`
//! - `.` -> `<timestamp>.png`
//! - `photo.jpg` -> `photo.jpeg`
//! - `photo.JPEG` -> `photo.jpeg`
//! - `photo.webp` -> `photo.webp`

use std::fmt;

use chrono::{DateTime, Utc};

/// Timestamp layout used when no usable base name is supplied.
/// Renders as `yyyy-MM-ddTHH:mm:ss.SSSZ`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Encoding formats an image can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GalleryFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl GalleryFormat {
    /// Match a file extension, ignoring ASCII case. `jpg` is accepted as JPEG.
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("png") {
            Some(GalleryFormat::Png)
        } else if extension.eq_ignore_ascii_case("webp") {
            Some(GalleryFormat::Webp)
        } else if extension.eq_ignore_ascii_case("jpeg") || extension.eq_ignore_ascii_case("jpg") {
            Some(GalleryFormat::Jpeg)
        } else {
            None
        }
    }

    /// Canonical lowercase extension written to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            GalleryFormat::Png => "png",
            GalleryFormat::Jpeg => "jpeg",
            GalleryFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            GalleryFormat::Png => "image/png",
            GalleryFormat::Jpeg => "image/jpeg",
            GalleryFormat::Webp => "image/webp",
        }
    }
}

impl fmt::Display for GalleryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A base name paired with the format the image will be encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFileName {
    pub base_name: String,
    pub format: GalleryFormat,
}

impl ResolvedFileName {
    /// Resolve a name using the current time for timestamp fallbacks.
    pub fn resolve(name: Option<&str>) -> Self {
        Self::resolve_at(name, Utc::now())
    }

    /// Resolve a name, using `now` for timestamp fallbacks.
    pub fn resolve_at(name: Option<&str>, now: DateTime<Utc>) -> Self {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => return Self::timestamped(now),
        };

        let Some(index) = name.rfind('.') else {
            return Self {
                base_name: name.to_string(),
                format: GalleryFormat::Png,
            };
        };

        let base_name = match &name[..index] {
            "" => timestamp(now),
            base => base.to_string(),
        };
        let format = GalleryFormat::from_extension(&name[index + 1..]).unwrap_or_default();

        Self { base_name, format }
    }

    fn timestamped(now: DateTime<Utc>) -> Self {
        Self {
            base_name: timestamp(now),
            format: GalleryFormat::Png,
        }
    }

    /// The on-disk file name, `{base_name}.{extension}`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.format.extension())
    }
}

impl fmt::Display for ResolvedFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base_name, self.format.extension())
    }
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}
