//! Cover art processing.
//!
//! This module provides functions for:
//! - Detecting image formats from magic bytes (JPEG, PNG, WebP)
//! - Fetching a thumbnail over HTTP
//! - Center-cropping it to a square (no resize)
//! - Re-encoding it as JPEG, converting the color space first when needed

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageFormat as EncodeFormat};
use url::Url;

use crate::core::config;
use crate::core::error::AppError;

/// Image format detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Unknown,
}

/// Detects image format from the first bytes of a file (magic bytes)
///
/// # Arguments
///
/// * `bytes` - The first bytes of the image file (at least 12 bytes recommended)
///
/// # Returns
///
/// The detected `ImageFormat` or `ImageFormat::Unknown` if the format cannot be determined
pub fn detect_image_format(bytes: &[u8]) -> ImageFormat {
    if bytes.len() < 4 {
        return ImageFormat::Unknown;
    }

    // JPEG: FF D8 FF
    if bytes[0] == 0xFF && bytes[1] == 0xD8 && bytes[2] == 0xFF {
        return ImageFormat::Jpeg;
    }

    // PNG: 89 50 4E 47
    if bytes[0] == 0x89 && bytes[1] == 0x50 && bytes[2] == 0x4E && bytes[3] == 0x47 {
        return ImageFormat::Png;
    }

    // WebP: RIFF...WEBP
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return ImageFormat::WebP;
    }

    ImageFormat::Unknown
}

/// Square crop window `(left, top, side)` for an image of `width` × `height`.
///
/// `left = (width - side) / 2` and `top = (height - side) / 2` with integer division,
/// so an odd remainder leaves the extra pixel on the right/bottom.
pub fn square_crop_window(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Center-crops an image to a square of side `min(width, height)`.
pub fn crop_square(img: &DynamicImage) -> DynamicImage {
    let (left, top, side) = square_crop_window(img.width(), img.height());
    img.crop_imm(left, top, side, side)
}

/// Converts pixel formats the JPEG encoder cannot take (alpha, 16-bit, float) to RGB.
pub fn to_jpeg_compatible(img: DynamicImage) -> DynamicImage {
    match img.color() {
        ColorType::Rgb8 | ColorType::L8 => img,
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

/// Decodes raw image bytes, crops them square and re-encodes as JPEG.
pub fn process_cover(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let source_format = detect_image_format(bytes);
    let img = image::load_from_memory(bytes)?;
    log::debug!(
        "[COVER] Decoded {:?} thumbnail {}x{} ({:?})",
        source_format,
        img.width(),
        img.height(),
        img.color()
    );

    let squared = to_jpeg_compatible(crop_square(&img));

    let mut buffer = Cursor::new(Vec::new());
    squared.write_to(&mut buffer, EncodeFormat::Jpeg)?;
    Ok(buffer.into_inner())
}

/// Fetches thumbnails and turns them into square JPEG covers.
///
/// Every failure (bad URL, transport error, non-success status, undecodable
/// image) is logged and yields `None`: missing cover art never fails an item.
#[derive(Clone)]
pub struct CoverFetcher {
    client: reqwest::Client,
}

impl CoverFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config::network::cover_timeout())
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Returns square-cropped JPEG bytes, or `None` if the image is unavailable.
    pub async fn fetch_cover(&self, cover_url: &str) -> Option<Vec<u8>> {
        match self.try_fetch_cover(cover_url).await {
            Ok(bytes) => {
                log::info!("[COVER] Prepared {} KB cover from {}", bytes.len() / 1024, cover_url);
                Some(bytes)
            }
            Err(e) => {
                log::warn!("[COVER] Proceeding without cover art for {}: {}", cover_url, e);
                None
            }
        }
    }

    async fn try_fetch_cover(&self, cover_url: &str) -> Result<Vec<u8>, AppError> {
        let url = Url::parse(cover_url).map_err(|e| AppError::from(format!("invalid cover url: {}", e)))?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpStatus(status));
        }

        let bytes = response.bytes().await?;
        // Decoding and encoding are CPU-bound; keep them off the async workers.
        tokio::task::spawn_blocking(move || process_cover(&bytes)).await?
    }
}
