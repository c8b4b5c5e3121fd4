//! Image container handling
//!
//! - `ImageKind`: the allow-listed raster formats and their extensions
//! - `inspector`: header-only dimension probing for uploaded bytes

pub mod inspector;

pub use inspector::{inspect, ImageDimensions, InspectError};

use image::ImageFormat;

/// Raster formats accepted for upload.
///
/// Adding a format means adding a variant here together with its
/// extensions, decoder format and content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub const ALL: [ImageKind; 2] = [ImageKind::Jpeg, ImageKind::Png];

    /// Resolve a kind from a file extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let ext = extension.strip_prefix('.').unwrap_or(extension);
        Self::ALL
            .into_iter()
            .find(|kind| kind.extensions().iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageKind::Jpeg => &["jpg", "jpeg"],
            ImageKind::Png => &["png"],
        }
    }

    pub fn format(self) -> ImageFormat {
        match self {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

/// Extension of the last path segment of `file_name`, without the dot.
///
/// Returns an empty string when there is no extension.
pub fn file_extension(file_name: &str) -> &str {
    let base = file_name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) => &base[idx + 1..],
        None => "",
    }
}

/// Content type to serve a stored file with, if its extension is known.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    ImageKind::from_extension(file_extension(file_name)).map(ImageKind::content_type)
}
