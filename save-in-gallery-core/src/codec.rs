//! Image decoding and re-encoding, delegated to the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use tracing::debug;

use crate::config::{Config, MAX_JPEG_QUALITY};
use crate::error::Result;
use crate::naming::GalleryFormat;

/// Decodes submitted bytes and re-encodes them in the gallery format.
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    jpeg_quality: u8,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self {
            jpeg_quality: MAX_JPEG_QUALITY,
        }
    }
}

impl ImageCodec {
    pub fn new(config: &Config) -> Self {
        Self {
            jpeg_quality: config.effective_jpeg_quality(),
        }
    }

    /// Decode `data` (any format the `image` crate recognizes) and encode it
    /// as `format`. PNG and WebP are lossless; JPEG drops the alpha channel.
    pub fn transcode(&self, data: &[u8], format: GalleryFormat) -> Result<Vec<u8>> {
        let image = image::load_from_memory(data)?;
        debug!(
            width = image.width(),
            height = image.height(),
            %format,
            "Decoded image for gallery"
        );

        let mut encoded = Vec::new();
        match format {
            GalleryFormat::Png => image.write_with_encoder(PngEncoder::new(&mut encoded))?,
            GalleryFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(
                JpegEncoder::new_with_quality(&mut encoded, self.jpeg_quality),
            )?,
            GalleryFormat::Webp => DynamicImage::ImageRgba8(image.to_rgba8())
                .write_with_encoder(WebPEncoder::new_lossless(&mut encoded))?,
        }
        Ok(encoded)
    }
}
