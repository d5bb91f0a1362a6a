//! Path utilities for mapping file extensions to upload formats.
//!
//! Browsers often send HEIC files as `application/octet-stream`, and the
//! command-line importer has no MIME type at all, so the filename extension is
//! the fallback for resolving a [`DeclaredFormat`].

use std::path::Path;

use crate::types::DeclaredFormat;

/// Extensions of HEIF containers.
const HEIC_EXTENSIONS: &[&str] = &["heic", "heif", "hif"];

/// Extensions of JPEG files.
const JPEG_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe"];

/// Extensions of PNG files.
const PNG_EXTENSIONS: &[&str] = &["png"];

/// Resolve a format from a file name or path by its extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use portfolio_common::paths::format_from_extension;
/// use portfolio_common::DeclaredFormat;
///
/// assert_eq!(format_from_extension(Path::new("IMG_0001.HEIC")), DeclaredFormat::Heic);
/// assert_eq!(format_from_extension(Path::new("/tmp/headshot.jpeg")), DeclaredFormat::Jpeg);
/// assert!(!format_from_extension(Path::new("clip.gif")).is_accepted());
/// ```
pub fn format_from_extension(path: &Path) -> DeclaredFormat {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return DeclaredFormat::Unsupported(String::new());
    };
    let ext = ext.to_lowercase();

    if HEIC_EXTENSIONS.contains(&ext.as_str()) {
        DeclaredFormat::Heic
    } else if JPEG_EXTENSIONS.contains(&ext.as_str()) {
        DeclaredFormat::Jpeg
    } else if PNG_EXTENSIONS.contains(&ext.as_str()) {
        DeclaredFormat::Png
    } else {
        DeclaredFormat::Unsupported(ext)
    }
}

/// Check if a path has an extension the gallery accepts.
pub fn is_image_file(path: &Path) -> bool {
    format_from_extension(path).is_accepted()
}

/// Get every accepted extension, for `accept=` attributes on upload forms.
#[must_use]
pub fn image_extensions() -> Vec<&'static str> {
    HEIC_EXTENSIONS
        .iter()
        .chain(JPEG_EXTENSIONS)
        .chain(PNG_EXTENSIONS)
        .copied()
        .collect()
}

/// Value for the `accept` attribute of an upload input: every accepted
/// extension followed by the canonical MIME types.
pub fn accept_attribute() -> String {
    image_extensions()
        .into_iter()
        .map(|ext| format!(".{}", ext))
        .chain(
            DeclaredFormat::ACCEPTED
                .iter()
                .filter_map(DeclaredFormat::mime)
                .map(str::to_string),
        )
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension_case_insensitive() {
        assert_eq!(format_from_extension(Path::new("a.HeIf")), DeclaredFormat::Heic);
        assert_eq!(format_from_extension(Path::new("a.JPG")), DeclaredFormat::Jpeg);
        assert_eq!(format_from_extension(Path::new("a.Png")), DeclaredFormat::Png);
    }

    #[test]
    fn test_format_from_extension_unsupported() {
        assert_eq!(
            format_from_extension(Path::new("a.gif")),
            DeclaredFormat::Unsupported("gif".to_string())
        );
        assert!(!format_from_extension(Path::new("no_extension")).is_accepted());
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("/photos/IMG_1234.heic")));
        assert!(is_image_file(Path::new("portrait.png")));
        assert!(!is_image_file(Path::new("resume.pdf")));
    }

    #[test]
    fn test_image_extensions() {
        let extensions = image_extensions();
        assert!(extensions.contains(&"heic"));
        assert!(extensions.contains(&"jpg"));
        assert!(extensions.contains(&"png"));
        assert!(!extensions.contains(&"gif"));
    }

    #[test]
    fn test_accept_attribute() {
        let accept = accept_attribute();
        assert!(accept.starts_with(".heic,.heif,.hif,.jpg"));
        assert!(accept.contains(",.png,"));
        assert!(accept.ends_with("image/heif,image/jpeg,image/png"));
    }
}
