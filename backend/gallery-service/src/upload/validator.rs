/// Upload admission pipeline
///
/// Gates run strictly in order and stop at the first failure:
/// 1. declared size of the outer request
/// 2. actual size of the file part
/// 3. file extension allow-list
/// 4. header decodability
/// 5. pixel dimensions
///
/// Validation is pure: no I/O, no storage access.
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::imaging::{self, ImageDimensions, ImageKind, InspectError};

/// Configurable admission limits (`UPLOAD_*` variables).
///
/// `max_request_bytes` and `max_file_bytes` overlap: the first is a cheap
/// pre-filter on the whole request, the second bounds the file part itself.
/// With the defaults the request threshold (32 MiB) is looser than the file
/// threshold (20 MB), so the request gate only ever catches grossly oversized
/// bodies. Both are kept independent.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadLimits {
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: u64,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_request_bytes: default_max_request_bytes(),
            max_file_bytes: default_max_file_bytes(),
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

fn default_max_request_bytes() -> u64 {
    1 << 25
}

fn default_max_file_bytes() -> u64 {
    20_000_000
}

fn default_max_width() -> u32 {
    1920
}

fn default_max_height() -> u32 {
    1080
}

/// In-memory representation of one upload before it is admitted.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub title: String,
    pub file_name: String,
    pub raw_bytes: Bytes,
    /// Lower-cased extension of `file_name`, without the dot
    pub declared_ext: String,
    /// Content length reported for the whole request, if any
    pub declared_length: Option<u64>,
    /// Size of the materialized file part
    pub file_size: u64,
}

impl UploadCandidate {
    pub fn new(title: impl Into<String>, file_name: impl Into<String>, raw_bytes: Bytes) -> Self {
        let file_name = file_name.into();
        let declared_ext = imaging::file_extension(&file_name).to_ascii_lowercase();
        let file_size = raw_bytes.len() as u64;
        Self {
            title: title.into(),
            file_name,
            raw_bytes,
            declared_ext,
            declared_length: Some(file_size),
            file_size,
        }
    }

    pub fn with_declared_length(mut self, declared_length: Option<u64>) -> Self {
        self.declared_length = declared_length;
        self
    }
}

/// A candidate that passed every gate
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub candidate: UploadCandidate,
    pub kind: ImageKind,
    pub dimensions: ImageDimensions,
}

/// Terminal, non-retryable rejection of an upload
#[derive(Debug, Error)]
pub enum UploadRejection {
    #[error("Invalid file size: {0}")]
    SizeInvalid(String),

    #[error("Invalid file type. Only JPG or PNG images are supported")]
    UnsupportedFormat(#[source] InspectError),

    #[error("Invalid image size {width}x{height}, up to {max_width}x{max_height}")]
    DimensionsExceeded {
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    },
}

impl UploadRejection {
    /// Stable machine-readable reason code
    pub fn code(&self) -> &'static str {
        match self {
            UploadRejection::SizeInvalid(_) => "size_invalid",
            UploadRejection::UnsupportedFormat(_) => "unsupported_format",
            UploadRejection::DimensionsExceeded { .. } => "dimensions_exceeded",
        }
    }
}

/// Gate 1: the request must announce a nonzero length below the request cap.
pub fn check_declared_length(
    declared_length: Option<u64>,
    limits: &UploadLimits,
) -> Result<(), UploadRejection> {
    match declared_length {
        None | Some(0) => Err(UploadRejection::SizeInvalid(
            "request content length is missing or zero".to_string(),
        )),
        Some(len) if len >= limits.max_request_bytes => Err(UploadRejection::SizeInvalid(format!(
            "request must be smaller than {} bytes",
            limits.max_request_bytes
        ))),
        Some(_) => Ok(()),
    }
}

/// Gate 2: the file part must be strictly below the file cap.
pub fn check_file_size(file_size: u64, limits: &UploadLimits) -> Result<(), UploadRejection> {
    if file_size >= limits.max_file_bytes {
        return Err(UploadRejection::SizeInvalid(format!(
            "file must be smaller than {} bytes",
            limits.max_file_bytes
        )));
    }
    Ok(())
}

/// Run every gate in order against `candidate`.
pub fn validate(
    candidate: UploadCandidate,
    limits: &UploadLimits,
) -> Result<ValidatedUpload, UploadRejection> {
    check_declared_length(candidate.declared_length, limits)?;
    check_file_size(candidate.file_size, limits)?;

    let kind = ImageKind::from_extension(&candidate.declared_ext).ok_or_else(|| {
        UploadRejection::UnsupportedFormat(InspectError::UnsupportedFormat(
            candidate.declared_ext.clone(),
        ))
    })?;

    let dimensions = imaging::inspect(&candidate.raw_bytes, &candidate.declared_ext)
        .map_err(|e| {
            debug!(file_name = %candidate.file_name, error = %e, "Upload failed decodability gate");
            UploadRejection::UnsupportedFormat(e)
        })?;

    if dimensions.width > limits.max_width || dimensions.height > limits.max_height {
        return Err(UploadRejection::DimensionsExceeded {
            width: dimensions.width,
            height: dimensions.height,
            max_width: limits.max_width,
            max_height: limits.max_height,
        });
    }

    Ok(ValidatedUpload {
        candidate,
        kind,
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::test_support::{encode_jpeg, encode_png};

    fn candidate(file_name: &str, bytes: Vec<u8>) -> UploadCandidate {
        UploadCandidate::new("title", file_name, Bytes::from(bytes))
    }

    #[test]
    fn test_accepts_small_png_and_jpeg() {
        let limits = UploadLimits::default();

        let png = validate(candidate("a.png", encode_png(10, 20)), &limits).unwrap();
        assert_eq!(png.kind, ImageKind::Png);
        assert_eq!(png.dimensions, ImageDimensions { width: 10, height: 20 });

        let jpeg = validate(candidate("b.JPEG", encode_jpeg(10, 20)), &limits).unwrap();
        assert_eq!(jpeg.kind, ImageKind::Jpeg);
        assert_eq!(jpeg.candidate.declared_ext, "jpeg");
    }

    #[test]
    fn test_boundary_dimensions_accepted() {
        let limits = UploadLimits::default();
        let validated = validate(candidate("edge.png", encode_png(1920, 1080)), &limits).unwrap();
        assert_eq!(
            validated.dimensions,
            ImageDimensions { width: 1920, height: 1080 }
        );
    }

    #[test]
    fn test_one_pixel_over_is_rejected() {
        let limits = UploadLimits::default();

        for (w, h) in [(1921, 1080), (1920, 1081)] {
            let err = validate(candidate("big.png", encode_png(w, h)), &limits).unwrap_err();
            assert!(
                matches!(err, UploadRejection::DimensionsExceeded { width, height, .. } if width == w && height == h),
                "{}x{} should exceed the limits",
                w,
                h
            );
            assert_eq!(err.code(), "dimensions_exceeded");
        }
    }

    #[test]
    fn test_disallowed_extension_rejected_even_if_decodable() {
        let limits = UploadLimits::default();
        let err = validate(candidate("a.gif", encode_png(10, 10)), &limits).unwrap_err();
        assert!(matches!(
            err,
            UploadRejection::UnsupportedFormat(InspectError::UnsupportedFormat(_))
        ));
        assert_eq!(err.code(), "unsupported_format");
    }

    #[test]
    fn test_truncated_payload_is_unsupported_format() {
        let limits = UploadLimits::default();
        let png = encode_png(10, 10);
        let err = validate(candidate("a.png", png[..10].to_vec()), &limits).unwrap_err();
        assert!(matches!(
            err,
            UploadRejection::UnsupportedFormat(InspectError::UnreadableImage(_))
        ));
    }

    #[test]
    fn test_declared_length_gate() {
        let limits = UploadLimits::default();
        assert!(check_declared_length(None, &limits).is_err());
        assert!(check_declared_length(Some(0), &limits).is_err());
        assert!(check_declared_length(Some(1 << 25), &limits).is_err());
        assert!(check_declared_length(Some((1 << 25) - 1), &limits).is_ok());
    }

    #[test]
    fn test_file_size_gate_is_strict() {
        let limits = UploadLimits::default();
        assert!(check_file_size(19_999_999, &limits).is_ok());
        let err = check_file_size(20_000_000, &limits).unwrap_err();
        assert_eq!(err.code(), "size_invalid");
    }

    #[test]
    fn test_size_reported_before_extension() {
        let limits = UploadLimits::default();
        let c = candidate("a.gif", vec![1, 2, 3]).with_declared_length(Some(0));
        let err = validate(c, &limits).unwrap_err();
        assert!(matches!(err, UploadRejection::SizeInvalid(_)));

        let limits = UploadLimits {
            max_file_bytes: 2,
            ..UploadLimits::default()
        };
        let err = validate(candidate("a.gif", vec![1, 2, 3]), &limits).unwrap_err();
        assert!(matches!(err, UploadRejection::SizeInvalid(_)));
    }

    #[test]
    fn test_extension_reported_before_decodability() {
        let limits = UploadLimits::default();
        let err = validate(candidate("a.bmp", vec![0xFF; 64]), &limits).unwrap_err();
        assert!(matches!(
            err,
            UploadRejection::UnsupportedFormat(InspectError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_decodability_reported_before_dimensions() {
        let limits = UploadLimits {
            max_width: 1,
            max_height: 1,
            ..UploadLimits::default()
        };
        let png = encode_png(100, 100);
        let err = validate(candidate("a.png", png[..16].to_vec()), &limits).unwrap_err();
        assert!(matches!(
            err,
            UploadRejection::UnsupportedFormat(InspectError::UnreadableImage(_))
        ));
    }

    #[test]
    fn test_missing_extension_is_unsupported() {
        let limits = UploadLimits::default();
        let err = validate(candidate("noext", encode_png(4, 4)), &limits).unwrap_err();
        assert_eq!(err.code(), "unsupported_format");
    }
}
