//! Image loading utilities
//!
//! Reads the product image from disk for upload. The bytes are sent as-is;
//! the image is never decoded, only sniffed for a MIME type and its header
//! read for dimensions.

use anyhow::{Context, Result};
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

use crate::inputs::ImageUpload;

/// MIME type used when the format cannot be recognized
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Load an image file into an upload
pub fn load_image(path: &Path) -> Result<ImageUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());

    let mut upload = load_image_from_bytes(file_name, bytes);
    upload.source_path = Some(path.to_path_buf());
    Ok(upload)
}

/// Build an upload from in-memory bytes
pub fn load_image_from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> ImageUpload {
    let file_name = file_name.into();
    let format = image::guess_format(&bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(&file_name).ok());

    let mime_type = format
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| FALLBACK_MIME.to_string());
    let dimensions = format.and_then(|f| read_dimensions(&bytes, f));

    let mut upload = ImageUpload::new(file_name, mime_type, bytes);
    upload.dimensions = dimensions;
    upload
}

fn read_dimensions(bytes: &[u8], format: ImageFormat) -> Option<(u32, u32)> {
    image::ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 RGB PNG
    const PNG_1X1: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1
        0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, // 8-bit RGB
        0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, // IDAT chunk
        0x54, 0x08, 0xD7, 0x63, 0xF8, 0xFF, 0xFF, 0xFF, // data
        0x00, 0x05, 0xFE, 0x02, 0xFE, 0xDC, 0xCC, 0x59, // checksum
        0xE7, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
        0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_mime_from_magic_bytes() {
        let upload = load_image_from_bytes("mislabeled.jpg", PNG_1X1.to_vec());
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.file_name, "mislabeled.jpg");
        assert_eq!(upload.dimensions, Some((1, 1)));
    }

    #[test]
    fn test_mime_from_extension_fallback() {
        let upload = load_image_from_bytes("photo.jpeg", b"not really a jpeg".to_vec());
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.dimensions, None);
    }

    #[test]
    fn test_unknown_format() {
        let upload = load_image_from_bytes("notes.bin", vec![0, 1, 2, 3]);
        assert_eq!(upload.mime_type, FALLBACK_MIME);
        assert_eq!(upload.bytes.len(), 4);
    }

    #[test]
    fn test_load_from_disk_keeps_path_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product.png");
        std::fs::write(&path, PNG_1X1).unwrap();

        let upload = load_image(&path).unwrap();
        assert_eq!(upload.file_name, "product.png");
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(&upload.bytes[..], PNG_1X1);
        assert_eq!(upload.source_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("Failed to read image"));
    }
}
