//! Core types shared between the upload path and the decoder.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::paths::format_from_extension;

/// Format tag attached to an upload by the client.
///
/// Resolved once per file and used to pick a decode path. This is the
/// client's claim about the bytes, not the result of sniffing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "format", content = "tag")]
pub enum DeclaredFormat {
    /// HEIC/HEIF container.
    Heic,
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
    /// Anything else, with the tag the client sent.
    Unsupported(String),
}

impl DeclaredFormat {
    /// Every format with a decode path.
    pub const ACCEPTED: [DeclaredFormat; 3] = [Self::Heic, Self::Jpeg, Self::Png];

    /// Resolve a format from a MIME type.
    ///
    /// Parameters after `;` are ignored and matching is case-insensitive.
    /// Returns `Unsupported` for types outside the accepted set.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "image/heic" | "image/heif" | "image/heic-sequence" | "image/heif-sequence" => {
                Self::Heic
            }
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Self::Jpeg,
            "image/png" => Self::Png,
            _ => Self::Unsupported(essence),
        }
    }

    /// Resolve a format for an upload.
    ///
    /// Uses the MIME type when the client sent a meaningful one, and falls
    /// back to the filename extension for empty or generic binary types.
    pub fn resolve(mime: Option<&str>, file_name: &str) -> Self {
        match mime.map(str::trim) {
            Some(m) if !m.is_empty() && !is_generic_binary(m) => Self::from_mime(m),
            _ => format_from_extension(Path::new(file_name)),
        }
    }

    /// Whether this format has a decode path.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// Canonical MIME type of an accepted format.
    pub fn mime(&self) -> Option<&'static str> {
        match self {
            Self::Heic => Some("image/heif"),
            Self::Jpeg => Some("image/jpeg"),
            Self::Png => Some("image/png"),
            Self::Unsupported(_) => None,
        }
    }
}

fn is_generic_binary(mime: &str) -> bool {
    mime.to_lowercase().starts_with("application/octet-stream")
}

impl fmt::Display for DeclaredFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heic => write!(f, "heic"),
            Self::Jpeg => write!(f, "jpeg"),
            Self::Png => write!(f, "png"),
            Self::Unsupported(tag) if tag.is_empty() => write!(f, "unknown type"),
            Self::Unsupported(tag) => write!(f, "{}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime_accepted() {
        assert_eq!(DeclaredFormat::from_mime("image/heif"), DeclaredFormat::Heic);
        assert_eq!(DeclaredFormat::from_mime("image/HEIC"), DeclaredFormat::Heic);
        assert_eq!(DeclaredFormat::from_mime("image/jpeg"), DeclaredFormat::Jpeg);
        assert_eq!(DeclaredFormat::from_mime("image/pjpeg"), DeclaredFormat::Jpeg);
        assert_eq!(
            DeclaredFormat::from_mime("image/png; charset=binary"),
            DeclaredFormat::Png
        );
    }

    #[test]
    fn test_from_mime_unsupported() {
        let format = DeclaredFormat::from_mime("image/gif");
        assert_eq!(format, DeclaredFormat::Unsupported("image/gif".to_string()));
        assert!(!format.is_accepted());
        assert_eq!(format.to_string(), "image/gif");
    }

    #[test]
    fn test_resolve_prefers_mime() {
        let format = DeclaredFormat::resolve(Some("image/png"), "photo.heic");
        assert_eq!(format, DeclaredFormat::Png);
    }

    #[test]
    fn test_resolve_falls_back_to_extension() {
        assert_eq!(
            DeclaredFormat::resolve(Some("application/octet-stream"), "IMG_0042.HEIC"),
            DeclaredFormat::Heic
        );
        assert_eq!(DeclaredFormat::resolve(None, "still.jpg"), DeclaredFormat::Jpeg);
        assert_eq!(DeclaredFormat::resolve(Some(""), "still.png"), DeclaredFormat::Png);
        assert!(!DeclaredFormat::resolve(None, "notes.txt").is_accepted());
    }

    #[test]
    fn test_mime_round_trip() {
        for format in [DeclaredFormat::Heic, DeclaredFormat::Jpeg, DeclaredFormat::Png] {
            let mime = format.mime().unwrap();
            assert_eq!(DeclaredFormat::from_mime(mime), format);
        }
        assert_eq!(DeclaredFormat::Unsupported("x".into()).mime(), None);
    }
}
