//! Upload ingestion.
//!
//! Each uploaded file is checked against the accepted formats and size
//! limit, decoded according to its declared format and stored. Files are
//! processed one after another; one file's failure never stops the batch.

use std::path::Path;

use bytes::Bytes;
use portfolio_common::{DeclaredFormat, ImageId};
use portfolio_imaging::decode;
use serde::Serialize;

use super::{ImageStore, PipelineError};

/// One file taken from an upload form or from disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name.
    pub name: String,
    /// Client-supplied MIME type, if any.
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Read a file from disk. The format is later taken from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, None, data))
    }

    pub fn declared_format(&self) -> DeclaredFormat {
        DeclaredFormat::resolve(self.content_type.as_deref(), &self.name)
    }
}

/// Limits applied before a file reaches the decoder.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_file_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 200 * 1024 * 1024,
        }
    }
}

impl From<&crate::config::UploadConfig> for UploadLimits {
    fn from(config: &crate::config::UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes(),
        }
    }
}

/// What happened to one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
    Saved {
        name: String,
        id: ImageId,
        /// Whether the file was converted from HEIC.
        converted: bool,
    },
    Rejected {
        name: String,
        reason: String,
    },
    Failed {
        name: String,
        error: String,
    },
}

impl UploadOutcome {
    pub fn name(&self) -> &str {
        match self {
            Self::Saved { name, .. } | Self::Rejected { name, .. } | Self::Failed { name, .. } => {
                name
            }
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }

    /// The message shown to the user for this outcome.
    pub fn notification(&self) -> Notification {
        match self {
            Self::Saved {
                name,
                converted: true,
                ..
            } => Notification::success(format!("{} converted and saved to database.", name)),
            Self::Saved { name, .. } => {
                Notification::success(format!("{} saved to database.", name))
            }
            Self::Rejected { name, reason } => {
                Notification::error(format!("{} was not uploaded: {}", name, reason))
            }
            Self::Failed { name, error } => Notification::error(format!(
                "An error occurred while saving {}: {}",
                name, error
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// A user-visible status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Ingest every file in order and report one outcome per file.
pub fn ingest_batch<I>(store: &ImageStore, files: I, limits: UploadLimits) -> Vec<UploadOutcome>
where
    I: IntoIterator<Item = UploadedFile>,
{
    let outcomes: Vec<UploadOutcome> = files
        .into_iter()
        .map(|file| ingest_file(store, &file, limits))
        .collect();

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    tracing::info!(
        "Upload batch finished: {} saved, {} not saved",
        saved,
        outcomes.len() - saved
    );

    outcomes
}

/// Ingest a single file.
pub fn ingest_file(store: &ImageStore, file: &UploadedFile, limits: UploadLimits) -> UploadOutcome {
    let name = file.name.clone();
    let format = file.declared_format();

    if !format.is_accepted() {
        tracing::warn!("Rejected {}: unsupported type {}", name, format);
        return UploadOutcome::Rejected {
            name,
            reason: format!("unsupported file type {}", format),
        };
    }

    if file.data.is_empty() {
        tracing::warn!("Rejected {}: empty file", name);
        return UploadOutcome::Rejected {
            name,
            reason: "file is empty".to_string(),
        };
    }

    if file.data.len() as u64 > limits.max_file_size {
        tracing::warn!("Rejected {}: {} bytes over limit", name, file.data.len());
        return UploadOutcome::Rejected {
            name,
            reason: format!(
                "file is larger than {} MB",
                limits.max_file_size / (1024 * 1024)
            ),
        };
    }

    match save(store, file, &format) {
        Ok(id) => UploadOutcome::Saved {
            name,
            id,
            converted: format == DeclaredFormat::Heic,
        },
        Err(e) => {
            tracing::warn!("Failed to save {}: {}", name, e);
            UploadOutcome::Failed {
                name,
                error: e.to_string(),
            }
        }
    }
}

fn save(
    store: &ImageStore,
    file: &UploadedFile,
    format: &DeclaredFormat,
) -> Result<ImageId, PipelineError> {
    let image = decode(&file.data, format)?;
    tracing::debug!(
        "Decoded {} as {} {}x{} {}",
        file.name,
        format,
        image.width(),
        image.height(),
        image.mode()
    );
    store.insert(&file.name, &image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use portfolio_imaging::heif::UncompressedWriter;
    use portfolio_imaging::DecodedImage;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(5, 4, Rgb([10, 200, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn heic_bytes() -> Vec<u8> {
        let img = DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            6,
            2,
            Rgb([50, 60, 70]),
        )));
        UncompressedWriter::new().row_align(32).write(&img).unwrap()
    }

    #[test]
    fn test_png_saved() {
        let store = ImageStore::in_memory(75).unwrap();
        let file = UploadedFile::new("still.png", Some("image/png".into()), png_bytes());

        let outcome = ingest_file(&store, &file, UploadLimits::default());
        assert!(matches!(outcome, UploadOutcome::Saved { converted: false, .. }));
        assert_eq!(
            outcome.notification(),
            Notification::success("still.png saved to database.")
        );
    }

    #[test]
    fn test_heic_converted() {
        let store = ImageStore::in_memory(75).unwrap();
        let file = UploadedFile::new("IMG_0001.HEIC", Some("image/heif".into()), heic_bytes());

        let outcome = ingest_file(&store, &file, UploadLimits::default());
        assert!(matches!(outcome, UploadOutcome::Saved { converted: true, .. }));
        assert_eq!(
            outcome.notification().message,
            "IMG_0001.HEIC converted and saved to database."
        );

        let listing = store.list_all().unwrap();
        assert_eq!(listing.entries[0].image.dimensions(), (6, 2));
    }

    #[test]
    fn test_gif_rejected_and_batch_continues() {
        let store = ImageStore::in_memory(75).unwrap();
        let files = vec![
            UploadedFile::new("anim.gif", Some("image/gif".into()), b"GIF89a".to_vec()),
            UploadedFile::new("still.png", Some("image/png".into()), png_bytes()),
        ];

        let outcomes = ingest_batch(&store, files, UploadLimits::default());
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], UploadOutcome::Rejected { .. }));
        assert_eq!(
            outcomes[0].notification().message,
            "anim.gif was not uploaded: unsupported file type image/gif"
        );
        assert!(outcomes[1].is_saved());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_jpeg_fails() {
        let store = ImageStore::in_memory(75).unwrap();
        let file = UploadedFile::new("broken.jpg", Some("image/jpeg".into()), vec![0xFF, 0xD8, 0xFF]);

        let outcome = ingest_file(&store, &file, UploadLimits::default());
        let notification = outcome.notification();
        assert_eq!(notification.level, Level::Error);
        assert!(notification
            .message
            .starts_with("An error occurred while saving broken.jpg: "));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_oversized_heif_box_fails_only_that_file() {
        let mut crafted = 20u32.to_be_bytes().to_vec();
        crafted.extend_from_slice(b"ftypmif1");
        crafted.extend_from_slice(&0u32.to_be_bytes());
        crafted.extend_from_slice(b"mif1");
        crafted.extend_from_slice(&1u32.to_be_bytes());
        crafted.extend_from_slice(b"meta");
        crafted.extend_from_slice(&u64::MAX.to_be_bytes());

        let store = ImageStore::in_memory(75).unwrap();
        let files = vec![
            UploadedFile::new("crafted.heic", Some("image/heic".into()), crafted),
            UploadedFile::new("after.png", Some("image/png".into()), png_bytes()),
        ];

        let outcomes = ingest_batch(&store, files, UploadLimits::default());
        assert!(matches!(&outcomes[0], UploadOutcome::Failed { name, .. } if name == "crafted.heic"));
        assert!(outcomes[1].is_saved());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_size_limit() {
        let store = ImageStore::in_memory(75).unwrap();
        let file = UploadedFile::new("still.png", Some("image/png".into()), png_bytes());
        let limits = UploadLimits { max_file_size: 8 };

        let outcome = ingest_file(&store, &file, limits);
        assert!(matches!(outcome, UploadOutcome::Rejected { .. }));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_empty_file_rejected() {
        let store = ImageStore::in_memory(75).unwrap();
        let file = UploadedFile::new("empty.jpg", Some("image/jpeg".into()), Vec::new());

        let outcome = ingest_file(&store, &file, UploadLimits::default());
        assert_eq!(
            outcome,
            UploadOutcome::Rejected {
                name: "empty.jpg".into(),
                reason: "file is empty".into()
            }
        );
    }

    #[test]
    fn test_octet_stream_uses_extension() {
        let file = UploadedFile::new(
            "IMG_0002.heic",
            Some("application/octet-stream".into()),
            Vec::new(),
        );
        assert_eq!(file.declared_format(), DeclaredFormat::Heic);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let file = UploadedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "still.png");
        assert_eq!(file.declared_format(), DeclaredFormat::Png);
    }

    #[test]
    fn test_outcome_json() {
        let outcome = UploadOutcome::Saved {
            name: "a.jpg".into(),
            id: ImageId::from(3),
            converted: false,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "saved");
        assert_eq!(json["id"], 3);
    }
}
