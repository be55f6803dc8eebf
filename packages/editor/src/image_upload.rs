//! # Image Replacement
//!
//! Turns an uploaded file into an embeddable data URI: decode, downscale so
//! neither side exceeds the limit (aspect ratio preserved), then encode.
//!
//! Opaque images become JPEG at the configured quality. Images with
//! transparent pixels become WebP, the only alpha-capable encoder available,
//! which is lossless. Either encoder falls back to the other on failure.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::errors::EditorError;

/// Longest allowed side in pixels
pub const MAX_IMAGE_SIDE: u32 = 1920;

/// JPEG quality for opaque images
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageOptions {
    pub max_side: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_side: MAX_IMAGE_SIDE,
            jpeg_quality: JPEG_QUALITY,
        }
    }
}

/// Target size after downscaling; unchanged when already within `max_side`
pub fn downscale_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    if width <= max_side && height <= max_side {
        return (width, height);
    }
    let ratio = (max_side as f64 / width as f64).min(max_side as f64 / height as f64);
    let scaled = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode, resize and re-encode `bytes` into a `data:` URI
pub fn encode_data_uri(bytes: &[u8], options: ImageOptions) -> Result<String, EditorError> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) =
        downscale_dimensions(decoded.width(), decoded.height(), options.max_side);
    let resized = if (width, height) != (decoded.width(), decoded.height()) {
        tracing::debug!(
            from = ?(decoded.width(), decoded.height()),
            to = ?(width, height),
            "downscaling image"
        );
        decoded.resize_exact(width, height, FilterType::Triangle)
    } else {
        decoded
    };

    if has_transparency(&resized) {
        match encode_webp(&resized) {
            Ok(encoded) => Ok(to_data_uri("image/webp", &encoded)),
            Err(e) => {
                tracing::debug!(error = %e, "webp encoding failed, falling back to jpeg");
                let encoded = encode_jpeg(&resized, options.jpeg_quality)
                    .map_err(|_| EditorError::ImageEncoding)?;
                Ok(to_data_uri("image/jpeg", &encoded))
            }
        }
    } else {
        match encode_jpeg(&resized, options.jpeg_quality) {
            Ok(encoded) => Ok(to_data_uri("image/jpeg", &encoded)),
            Err(e) => {
                tracing::debug!(error = %e, "jpeg encoding failed, falling back to webp");
                let encoded = encode_webp(&resized).map_err(|_| EditorError::ImageEncoding)?;
                Ok(to_data_uri("image/webp", &encoded))
            }
        }
    }
}

fn has_transparency(image: &DynamicImage) -> bool {
    image.color().has_alpha() && image.to_rgba8().pixels().any(|pixel| pixel[3] < u8::MAX)
}

fn encode_webp(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
    Ok(buffer)
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Vec::new();
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))?;
    Ok(buffer)
}

fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, image::Rgb([200, 120, 40]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Noisy gradient, compresses like a photograph
    fn photo_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut seed: u32 = 0x2545_f491;
        let image = RgbImage::from_fn(width, height, |x, y| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let noise = (seed >> 24) as u8 / 4;
            image::Rgb([
                ((x * 255 / width) as u8).saturating_add(noise),
                ((y * 255 / height) as u8).saturating_add(noise),
                128u8.saturating_add(noise),
            ])
        });
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, 95))
            .unwrap();
        bytes
    }

    fn decode_payload(uri: &str) -> Vec<u8> {
        STANDARD.decode(uri.split_once(",").unwrap().1).unwrap()
    }

    #[test]
    fn test_small_images_keep_their_size() {
        assert_eq!(downscale_dimensions(800, 600, 1920), (800, 600));
        assert_eq!(downscale_dimensions(1920, 1920, 1920), (1920, 1920));
    }

    #[test]
    fn test_downscale_uses_smaller_ratio() {
        assert_eq!(downscale_dimensions(3840, 2160, 1920), (1920, 1080));
        assert_eq!(downscale_dimensions(1000, 4000, 1920), (480, 1920));
        assert_eq!(downscale_dimensions(2000, 1000, 1920), (1920, 960));
    }

    #[test]
    fn test_encode_produces_data_uri() {
        let uri = encode_data_uri(&png_bytes(64, 32), ImageOptions::default()).unwrap();
        assert!(uri.starts_with("data:image/webp;base64,") || uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_encoded_image_is_downscaled() {
        let options = ImageOptions {
            max_side: 16,
            ..ImageOptions::default()
        };
        let uri = encode_data_uri(&png_bytes(64, 32), options).unwrap();
        let decoded = image::load_from_memory(&decode_payload(&uri)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn test_photo_does_not_grow() {
        let input = photo_jpeg(800, 600);
        let uri = encode_data_uri(&input, ImageOptions::default()).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        let output = decode_payload(&uri);
        assert!(
            output.len() <= input.len(),
            "re-encoded {} bytes from {} bytes",
            output.len(),
            input.len()
        );
    }

    #[test]
    fn test_transparent_image_keeps_alpha() {
        let mut image = RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 255]));
        image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        let uri = encode_data_uri(&bytes, ImageOptions::default()).unwrap();
        assert!(uri.starts_with("data:image/webp;base64,"));
        let decoded = image::load_from_memory(&decode_payload(&uri)).unwrap();
        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(encode_data_uri(b"not an image", ImageOptions::default()).is_err());
    }
}
