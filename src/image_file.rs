//! Image file loading and preview utilities
//!
//! This module loads images selected for analysis, detects their format,
//! and derives the data-URL preview shown in the image view.

use base64::Engine;
use bytes::Bytes;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Extensions the analysis backend accepts
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Error type for image file operations
#[derive(Error, Debug)]
pub enum ImageFileError {
    /// Extension is not one the backend accepts
    #[error("Unsupported file format '{0}'. Use PNG, JPG, JPEG, GIF or WEBP")]
    UnsupportedFormat(String),

    /// File exceeds the configured upload limit
    #[error("Image is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge {
        /// Actual file size
        size: u64,
        /// Configured maximum
        limit: u64,
    },

    /// Path has no usable file name
    #[error("Invalid image path: {0}")]
    InvalidPath(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An image held in memory, ready to upload
///
/// Cloning is cheap: the bytes are reference counted, so the image view can
/// snapshot the file for a request while keeping its own copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    mime_type: String,
    bytes: Bytes,
}

impl ImageFile {
    /// Create an image from raw bytes
    ///
    /// The MIME type is sniffed from the bytes, falling back to the file
    /// name's extension and finally `application/octet-stream`.
    ///
    /// # Examples
    ///
    /// ```
    /// use searchlens::image_file::ImageFile;
    ///
    /// let file = ImageFile::new("photo.jpg", b"not really a jpeg".to_vec());
    /// assert_eq!(file.mime_type(), "image/jpeg");
    /// assert_eq!(file.len(), 17);
    /// ```
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let bytes = bytes.into();
        let mime_type = detect_mime_type(&name, &bytes).to_string();
        Self {
            name,
            mime_type,
            bytes,
        }
    }

    /// Load an image from disk
    ///
    /// # Arguments
    ///
    /// * `path` - Image path
    /// * `max_bytes` - Largest accepted file size
    ///
    /// # Errors
    ///
    /// Returns `ImageFileError` if the extension is not accepted by the
    /// backend, the file is larger than `max_bytes`, or it cannot be read
    pub async fn load(path: &Path, max_bytes: u64) -> Result<Self, ImageFileError> {
        if !is_allowed_image(path) {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            return Err(ImageFileError::UnsupportedFormat(ext));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| ImageFileError::InvalidPath(path.display().to_string()))?;

        let size = tokio::fs::metadata(path).await?.len();
        if size > max_bytes {
            return Err(ImageFileError::TooLarge {
                size,
                limit: max_bytes,
            });
        }

        let bytes = tokio::fs::read(path).await?;
        tracing::debug!("Loaded image {} ({} bytes)", name, bytes.len());
        Ok(Self::new(name, bytes))
    }

    /// File name sent with the upload
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detected MIME type
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw file content
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Locally derived representation of a selected image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// `data:<mime>;base64,<payload>` URL of the whole file
    pub data_url: String,
    /// Pixel dimensions, when the header could be decoded
    pub dimensions: Option<(u32, u32)>,
}

/// Derive the preview for an image
///
/// # Examples
///
/// ```
/// use searchlens::image_file::{derive_preview, ImageFile};
///
/// let preview = derive_preview(&ImageFile::new("a.png", b"abc".to_vec()));
/// assert_eq!(preview.data_url, "data:image/png;base64,YWJj");
/// assert_eq!(preview.dimensions, None);
/// ```
pub fn derive_preview(file: &ImageFile) -> Preview {
    let payload = base64::engine::general_purpose::STANDARD.encode(file.bytes());
    Preview {
        data_url: format!("data:{};base64,{}", file.mime_type(), payload),
        dimensions: read_dimensions(file.bytes()),
    }
}

/// Checks if a path has an extension the backend accepts
///
/// # Examples
///
/// ```
/// use searchlens::image_file::is_allowed_image;
/// use std::path::Path;
///
/// assert!(is_allowed_image(Path::new("photo.JPG")));
/// assert!(!is_allowed_image(Path::new("scan.tiff")));
/// ```
pub fn is_allowed_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn detect_mime_type(name: &str, bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }

    Path::new(name)
        .extension()
        .and_then(image::ImageFormat::from_extension)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
