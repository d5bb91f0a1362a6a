//! Persistent image store.
//!
//! Wraps the SQLite pool from `portfolio-db`. Images go in as decoded
//! bitmaps and are stored as JPEG; listings decode every blob again.

use std::path::Path;

use portfolio_common::{Error as StorageError, ImageId, Result as StorageResult};
use portfolio_db::models::StoredImage;
use portfolio_db::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use portfolio_db::{migrations, queries::images};
use portfolio_imaging::{decode_jpeg, encode_jpeg, DecodedImage};
use serde::Serialize;

use super::PipelineError;

/// One decoded gallery image.
#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub id: ImageId,
    pub name: String,
    pub image: DecodedImage,
}

impl GalleryEntry {
    /// Display metadata without the pixels.
    pub fn card(&self) -> ImageCard {
        ImageCard {
            id: self.id,
            name: self.name.clone(),
            width: self.image.width(),
            height: self.image.height(),
            mode: self.image.mode().as_str(),
        }
    }
}

/// What the presenter needs to show one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCard {
    pub id: ImageId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub mode: &'static str,
}

/// Result of [`ImageStore::list_all`].
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Decodable rows in ascending id order.
    pub entries: Vec<GalleryEntry>,
    /// Rows whose blob could not be decoded.
    pub skipped: Vec<ImageId>,
}

/// Handle to the image table.
///
/// Cheap to clone; clones share the same single-connection pool.
#[derive(Clone)]
pub struct ImageStore {
    pool: DbPool,
    jpeg_quality: u8,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("jpeg_quality", &self.jpeg_quality)
            .finish_non_exhaustive()
    }
}

impl ImageStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path, jpeg_quality: u8) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        tracing::info!("Opening image store at {}", path.display());
        let pool = init_pool(path)?;
        Ok(Self::with_pool(pool, jpeg_quality))
    }

    /// Store backed by a private in-memory database.
    pub fn in_memory(jpeg_quality: u8) -> StorageResult<Self> {
        Ok(Self::with_pool(init_memory_pool()?, jpeg_quality))
    }

    /// Wrap an existing pool. The schema is assumed to be in place.
    pub fn with_pool(pool: DbPool, jpeg_quality: u8) -> Self {
        Self { pool, jpeg_quality }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Create the image table if it is absent. Safe to call repeatedly.
    pub fn ensure_schema(&self) -> StorageResult<()> {
        let conn = get_conn(&self.pool)?;
        migrations::ensure_schema(&conn)
            .map_err(|e| StorageError::storage(format!("Failed to create schema: {}", e)))
    }

    /// Re-encode `image` as JPEG and store it under `name`.
    pub fn insert(&self, name: &str, image: &DecodedImage) -> Result<ImageId, PipelineError> {
        let jpeg = encode_jpeg(image, self.jpeg_quality)?;
        Ok(self.insert_encoded(name, &jpeg)?)
    }

    /// Store already-encoded JPEG bytes as they are.
    pub fn insert_encoded(&self, name: &str, jpeg: &[u8]) -> StorageResult<ImageId> {
        let conn = get_conn(&self.pool)?;
        let id = images::insert_image(&conn, name, jpeg)?;
        tracing::info!("Stored {} as image {} ({} bytes)", name, id, jpeg.len());
        Ok(id)
    }

    /// Every stored image in ascending id order, decoded.
    ///
    /// A row whose blob does not decode is left out of `entries` and its id
    /// is recorded in `skipped`.
    pub fn list_all(&self) -> StorageResult<Listing> {
        let rows = {
            let conn = get_conn(&self.pool)?;
            images::list_images(&conn)?
        };

        let mut listing = Listing::default();
        for row in rows {
            match decode_jpeg(&row.image) {
                Ok(image) => listing.entries.push(GalleryEntry {
                    id: row.id,
                    name: row.name,
                    image,
                }),
                Err(e) => {
                    tracing::warn!("Skipping image {} ({}): {}", row.id, row.name, e);
                    listing.skipped.push(row.id);
                }
            }
        }

        tracing::debug!(
            "Listed {} images, skipped {}",
            listing.entries.len(),
            listing.skipped.len()
        );
        Ok(listing)
    }

    /// The stored row, JPEG bytes included.
    pub fn get(&self, id: ImageId) -> StorageResult<Option<StoredImage>> {
        let conn = get_conn(&self.pool)?;
        images::get_image(&conn, id)
    }

    pub fn count(&self) -> StorageResult<u64> {
        let conn = get_conn(&self.pool)?;
        images::count_images(&conn)
    }
}
