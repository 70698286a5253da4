//! Image Input
//!
//! Reads a photo from disk and tags it with a media type the inference
//! provider accepts.

use std::path::Path;

use base64::Engine;
use image::ImageFormat;

use flora_lens_llm::PromptPart;

use crate::utils::error::{AppError, AppResult};

/// Media types the primary stage sends inline.
const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/heic",
    "image/heif",
];

/// Largest photo sent inline and kept in history (20MB)
pub const MAX_IMAGE_SIZE: u64 = 20 * 1024 * 1024;

/// A decoded photo ready for the primary stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    bytes: Vec<u8>,
    media_type: String,
}

impl ImageInput {
    /// Wrap raw bytes, detecting the media type from magic bytes first and
    /// the file extension second.
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<&str>) -> AppResult<Self> {
        if bytes.is_empty() {
            return Err(AppError::validation("Image file is empty"));
        }

        let media_type = detect_media_type(&bytes, extension).ok_or_else(|| {
            AppError::validation(format!(
                "Unsupported image format{}",
                extension.map(|e| format!(" (.{})", e)).unwrap_or_default()
            ))
        })?;

        Ok(Self { bytes, media_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`, the form kept in history records.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }

    pub fn to_prompt_part(&self) -> PromptPart {
        PromptPart::image(self.media_type.clone(), self.to_base64())
    }
}

fn detect_media_type(bytes: &[u8], extension: Option<&str>) -> Option<String> {
    let sniffed = image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type());

    let from_extension = extension.and_then(|ext| {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "heic" => Some("image/heic"),
            "heif" => Some("image/heif"),
            _ => ImageFormat::from_extension(&ext).map(|format| format.to_mime_type()),
        }
    });

    sniffed
        .or(from_extension)
        .filter(|mime| SUPPORTED_MEDIA_TYPES.contains(mime))
        .map(str::to_string)
}

/// Check file size against the inline limit
async fn check_file_size(path: &Path, max_size: u64) -> AppResult<u64> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        AppError::validation(format!("Could not read image {}: {}", path.display(), e))
    })?;
    let size = metadata.len();
    if size > max_size {
        return Err(AppError::validation(format!(
            "Image too large: {:.1} MB (max {:.1} MB)",
            size as f64 / (1024.0 * 1024.0),
            max_size as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(size)
}

/// Read and tag an image file.
///
/// Files over [`MAX_IMAGE_SIZE`] are rejected before they are read.
pub async fn read_image(path: &Path) -> AppResult<ImageInput> {
    check_file_size(path, MAX_IMAGE_SIZE).await?;
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        AppError::validation(format!("Could not read image {}: {}", path.display(), e))
    })?;
    let extension = path.extension().and_then(|e| e.to_str());
    let image = ImageInput::from_bytes(bytes, extension)?;

    tracing::debug!(
        "[Identify] Loaded {} ({}, {} bytes)",
        path.display(),
        image.media_type(),
        image.bytes().len()
    );
    Ok(image)
}
