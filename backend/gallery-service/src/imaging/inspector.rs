//! Header-only image inspection
//!
//! Reports the width and height of an uploaded image without decoding its
//! pixel payload. The extension hint selects the decoder; bytes that do not
//! parse as that container are rejected as unreadable.
//!
//! Inputs are attacker-controlled, so decoder allocations are capped.

use image::io::{Limits, Reader};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

use super::ImageKind;

/// Upper bound on what a decoder may allocate while reading a header
const MAX_HEADER_ALLOC_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(String),

    #[error("unreadable image: {0}")]
    UnreadableImage(#[source] image::ImageError),
}

/// Probe `raw` as the container named by `extension_hint`.
pub fn inspect(raw: &[u8], extension_hint: &str) -> Result<ImageDimensions, InspectError> {
    let kind = ImageKind::from_extension(extension_hint)
        .ok_or_else(|| InspectError::UnsupportedFormat(extension_hint.to_string()))?;

    let mut reader = Reader::with_format(Cursor::new(raw), kind.format());
    reader.limits(header_limits());

    let (width, height) = reader
        .into_dimensions()
        .map_err(InspectError::UnreadableImage)?;

    debug!(?kind, width, height, size = raw.len(), "Image header inspected");

    Ok(ImageDimensions { width, height })
}

fn header_limits() -> Limits {
    let mut limits = Limits::default();
    limits.max_alloc = Some(MAX_HEADER_ALLOC_BYTES);
    limits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::test_support::{encode_jpeg, encode_png};

    #[test]
    fn test_png_dimensions() {
        let bytes = encode_png(64, 32);
        let dims = inspect(&bytes, "png").unwrap();
        assert_eq!(dims, ImageDimensions { width: 64, height: 32 });
    }

    #[test]
    fn test_jpeg_dimensions_with_either_extension() {
        let bytes = encode_jpeg(40, 30);
        assert_eq!(
            inspect(&bytes, ".jpg").unwrap(),
            ImageDimensions { width: 40, height: 30 }
        );
        assert_eq!(
            inspect(&bytes, "JPEG").unwrap(),
            ImageDimensions { width: 40, height: 30 }
        );
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let bytes = encode_png(8, 8);
        let err = inspect(&bytes, "gif").unwrap_err();
        assert!(matches!(err, InspectError::UnsupportedFormat(ext) if ext == "gif"));
    }

    #[test]
    fn test_unknown_extension_ignores_bytes() {
        let err = inspect(&[], "bmp").unwrap_err();
        assert!(matches!(err, InspectError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_truncated_header_is_unreadable() {
        let bytes = encode_png(16, 16);
        for len in [0, 4, 8, 12, 20] {
            let err = inspect(&bytes[..len], "png").unwrap_err();
            assert!(
                matches!(err, InspectError::UnreadableImage(_)),
                "prefix of {} bytes should be unreadable",
                len
            );
        }

        let jpeg = encode_jpeg(16, 16);
        let err = inspect(&jpeg[..3], "jpg").unwrap_err();
        assert!(matches!(err, InspectError::UnreadableImage(_)));
    }

    #[test]
    fn test_mismatched_container_is_unreadable() {
        let png = encode_png(16, 16);
        let err = inspect(&png, "jpg").unwrap_err();
        assert!(matches!(err, InspectError::UnreadableImage(_)));

        let garbage = vec![0xAB; 512];
        let err = inspect(&garbage, "png").unwrap_err();
        assert!(matches!(err, InspectError::UnreadableImage(_)));
    }
}
