//! Gallery pipeline: upload ingestion, the persistent image store and the
//! three-column presenter.
//!
//! ```text
//! upload bytes -> decode (per declared format) -> JPEG -> ImageStore
//! ImageStore -> decode each JPEG -> layout -> page
//! ```

pub mod ingest;
pub mod layout;
pub mod store;

pub use ingest::{
    ingest_batch, ingest_file, Level, Notification, UploadLimits, UploadOutcome, UploadedFile,
};
pub use layout::{layout, Cell, GridLayout, COLUMNS};
pub use store::{GalleryEntry, ImageCard, ImageStore, Listing};

pub use portfolio_common::Error as StorageError;
pub use portfolio_imaging::DecodeError;

use thiserror::Error;

/// Failure of one file on its way through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
