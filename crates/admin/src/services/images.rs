//! Image upload pipeline.
//!
//! Uploaded files are decoded, shrunk to fit the configured bounding box
//! (never enlarged) and re-encoded before they are forwarded to the backend.
//! PNG stays PNG to keep transparency; everything else becomes JPEG.

use std::io::Cursor;

use futures::future::try_join_all;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

use storedesk_core::StoreId;

use crate::api::{ImageRef, StoreApiClient, StoreApiError};
use crate::config::ImageLimits;

const JPEG_QUALITY: u8 = 85;

/// Errors from the upload pipeline.
#[derive(Debug, Error)]
pub enum ImageError {
    /// No files in the request.
    #[error("No image files were uploaded")]
    Empty,

    /// File exceeds the upload limit.
    #[error("{file_name} is too large ({size} bytes, limit {max} bytes)")]
    TooLarge {
        file_name: String,
        size: usize,
        max: usize,
    },

    /// File is not an image format we can read.
    #[error("{0} is not a supported image (use JPEG, PNG, GIF, BMP or WebP)")]
    Unsupported(String),

    /// File claims a supported format but does not decode.
    #[error("{file_name} could not be read: {source}")]
    Decode {
        file_name: String,
        #[source]
        source: image::ImageError,
    },

    /// Re-encoding failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// The backend rejected or failed the upload.
    #[error("Upload failed: {0}")]
    Api(#[from] StoreApiError),

    /// The blocking resize task panicked or was cancelled.
    #[error("Image processing task failed: {0}")]
    Task(String),
}

impl ImageError {
    /// Whether the error is the uploader's fault (bad file) rather than ours.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Empty | Self::TooLarge { .. } | Self::Unsupported(_) | Self::Decode { .. }
        )
    }
}

/// A file as received from the browser.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A resized, re-encoded image ready to upload.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Dimensions that fit `width`x`height` inside `max_width`x`max_height`,
/// keeping the aspect ratio. Images already inside the box are unchanged.
///
/// ```
/// use storedesk_admin::services::images::fit_within;
///
/// assert_eq!(fit_within(4000, 2000, 1200, 1200), (1200, 600));
/// assert_eq!(fit_within(800, 600, 1200, 1200), (800, 600));
/// ```
#[must_use]
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }

    let (w, h) = (u64::from(width), u64::from(height));
    let (max_w, max_h) = (u64::from(max_width), u64::from(max_height));

    // Compare w/h against max_w/max_h without floats.
    let (new_w, new_h) = if w * max_h >= h * max_w {
        (max_w, (h * max_w + w / 2) / w)
    } else {
        ((w * max_h + h / 2) / h, max_h)
    };

    (
        u32::try_from(new_w.max(1)).unwrap_or(max_width),
        u32::try_from(new_h.max(1)).unwrap_or(max_height),
    )
}

/// Decode, shrink and re-encode one file.
///
/// CPU-bound; call from `spawn_blocking`.
///
/// # Errors
///
/// Returns an error if the file is too large, not an image, or fails to
/// decode or encode.
pub fn prepare_image(
    file_name: &str,
    bytes: &[u8],
    limits: ImageLimits,
) -> Result<PreparedImage, ImageError> {
    if bytes.len() > limits.max_upload_bytes {
        return Err(ImageError::TooLarge {
            file_name: file_name.to_string(),
            size: bytes.len(),
            max: limits.max_upload_bytes,
        });
    }

    let format =
        image::guess_format(bytes).map_err(|_| ImageError::Unsupported(file_name.to_string()))?;
    let decoded = image::load_from_memory_with_format(bytes, format).map_err(|source| {
        ImageError::Decode {
            file_name: file_name.to_string(),
            source,
        }
    })?;

    let (width, height) = fit_within(
        decoded.width(),
        decoded.height(),
        limits.max_width,
        limits.max_height,
    );
    let resized = if (width, height) == (decoded.width(), decoded.height()) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Lanczos3)
    };

    let stem = file_stem(file_name);
    let mut out = Vec::new();
    let (content_type, extension) = if format == ImageFormat::Png {
        resized
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(ImageError::Encode)?;
        ("image/png", "png")
    } else {
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
            .map_err(ImageError::Encode)?;
        ("image/jpeg", "jpg")
    };

    Ok(PreparedImage {
        file_name: format!("{stem}.{extension}"),
        content_type,
        bytes: out,
        width,
        height,
    })
}

/// Process and upload a batch of files in parallel.
///
/// The batch fails as a whole if any file fails; images already uploaded
/// for that batch are left on the backend.
///
/// # Errors
///
/// Returns the first processing or upload error.
pub async fn upload_images(
    api: &StoreApiClient,
    token: &str,
    store_id: &StoreId,
    files: Vec<UploadedFile>,
    limits: ImageLimits,
) -> Result<Vec<ImageRef>, ImageError> {
    if files.is_empty() {
        return Err(ImageError::Empty);
    }

    let uploads = files.into_iter().map(|file| async move {
        let UploadedFile { file_name, bytes } = file;
        let prepared =
            tokio::task::spawn_blocking(move || prepare_image(&file_name, &bytes, limits))
                .await
                .map_err(|e| ImageError::Task(e.to_string()))??;

        tracing::debug!(
            file_name = %prepared.file_name,
            width = prepared.width,
            height = prepared.height,
            size = prepared.bytes.len(),
            "Prepared image for upload"
        );

        let uploaded = api
            .upload_image(
                token,
                store_id,
                &prepared.file_name,
                prepared.content_type,
                prepared.bytes,
            )
            .await?;
        Ok::<_, ImageError>(uploaded)
    });

    try_join_all(uploads).await
}

/// File name without directory or extension, restricted to safe characters.
fn file_stem(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.trim_matches('-').is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}
