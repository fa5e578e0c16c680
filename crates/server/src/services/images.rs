//! Product image storage and processing.
//!
//! Uploads are validated, decoded, resized to a maximum width, re-encoded
//! as JPEG, and written to a local directory served as static files. Keys
//! are random UUIDs so filenames from clients never touch the filesystem.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Upload size limit in bytes.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Images wider than this are scaled down, preserving aspect ratio.
const MAX_WIDTH: u32 = 800;

/// JPEG quality for re-encoded images.
const JPEG_QUALITY: u8 = 70;

/// File extensions accepted for upload.
const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Errors from image upload handling.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Upload exceeds [`MAX_IMAGE_BYTES`].
    #[error("image larger than {MAX_IMAGE_BYTES} bytes")]
    TooLarge,

    /// Filename extension is not in the allowlist.
    #[error("unsupported image type")]
    UnsupportedType,

    /// Bytes could not be decoded as an image.
    #[error("invalid image data")]
    InvalidImage,

    /// Filesystem error.
    #[error("image storage i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Background processing task failed.
    #[error("image processing task failed")]
    Task,
}

/// Stores processed product images under a local directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` if the directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, ImageError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "image store ready");
        Ok(Self { root })
    }

    /// Validate, process, and store an uploaded image.
    ///
    /// Returns the stored key. Decoding and re-encoding run on a blocking
    /// thread so the async runtime is not stalled by large images.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::TooLarge`, `ImageError::UnsupportedType`, or
    /// `ImageError::InvalidImage` for rejected uploads, `ImageError::Io`
    /// if the write fails.
    pub async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        validate_extension(filename)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge);
        }

        let processed = tokio::task::spawn_blocking(move || process_image(&bytes))
            .await
            .map_err(|_| ImageError::Task)??;

        let key = format!("{}.jpg", Uuid::new_v4());
        tokio::fs::write(self.root.join(&key), &processed).await?;
        info!(key, size = processed.len(), "stored product image");

        Ok(key)
    }

    /// Delete a stored image by key. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Io` for filesystem failures other than the
    /// file being absent.
    pub async fn delete(&self, key: &str) -> Result<(), ImageError> {
        // Keys are always our own UUID filenames; reject anything else.
        if key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(ImageError::UnsupportedType);
        }

        match tokio::fs::remove_file(self.root.join(key)).await {
            Ok(()) => {
                debug!(key, "deleted product image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageError::Io(e)),
        }
    }

    /// Public URL for a stored key.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        format!("/uploads/{key}")
    }

    /// Directory the store writes to, for mounting as static files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn validate_extension(filename: &str) -> Result<(), ImageError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(ImageError::UnsupportedType)?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ImageError::UnsupportedType)
    }
}

/// Decode, downscale to [`MAX_WIDTH`], and re-encode as JPEG.
fn process_image(bytes: &[u8]) -> Result<Vec<u8>, ImageError> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| ImageError::InvalidImage)?
        .decode()
        .map_err(|_| ImageError::InvalidImage)?;

    let resized = if decoded.width() > MAX_WIDTH {
        decoded.resize(MAX_WIDTH, u32::MAX, FilterType::Triangle)
    } else {
        decoded
    };

    // JPEG has no alpha channel.
    let rgb = image::DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
        .map_err(|_| ImageError::InvalidImage)?;

    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 80, 40]),
        ));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    async fn temp_store() -> ImageStore {
        let dir = std::env::temp_dir().join(format!("warung-images-{}", Uuid::new_v4()));
        ImageStore::new(dir).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_produces_jpg_key() {
        let store = temp_store().await;
        let key = store.save("foto.png", png_bytes(100, 60)).await.unwrap();
        assert!(key.ends_with(".jpg"));
        assert!(store.root().join(&key).exists());
        assert_eq!(store.url_for(&key), format!("/uploads/{key}"));
    }

    #[tokio::test]
    async fn test_wide_image_is_resized() {
        let store = temp_store().await;
        let key = store.save("lebar.png", png_bytes(1600, 400)).await.unwrap();

        let stored = tokio::fs::read(store.root().join(&key)).await.unwrap();
        let img = image::load_from_memory(&stored).unwrap();
        assert_eq!(img.width(), 800);
        assert_eq!(img.height(), 200);
    }

    #[tokio::test]
    async fn test_small_image_is_not_upscaled() {
        let store = temp_store().await;
        let key = store.save("kecil.jpg", png_bytes(200, 150)).await.unwrap();

        let stored = tokio::fs::read(store.root().join(&key)).await.unwrap();
        let img = image::load_from_memory(&stored).unwrap();
        assert_eq!(img.width(), 200);
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let store = temp_store().await;
        let err = store
            .save("besar.png", vec![0u8; MAX_IMAGE_BYTES + 1])
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::TooLarge));
    }

    #[tokio::test]
    async fn test_disallowed_extension_rejected() {
        let store = temp_store().await;
        let err = store.save("virus.exe", png_bytes(10, 10)).await.unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedType));

        let err = store.save("tanpa-ekstensi", png_bytes(10, 10)).await.unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedType));
    }

    #[tokio::test]
    async fn test_garbage_bytes_rejected() {
        let store = temp_store().await;
        let err = store.save("rusak.png", b"not an image".to_vec()).await.unwrap_err();
        assert!(matches!(err, ImageError::InvalidImage));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent_and_guards_paths() {
        let store = temp_store().await;
        let key = store.save("foto.png", png_bytes(10, 10)).await.unwrap();

        store.delete(&key).await.unwrap();
        assert!(!store.root().join(&key).exists());
        store.delete(&key).await.unwrap();

        assert!(store.delete("../etc/passwd").await.is_err());
    }
}
