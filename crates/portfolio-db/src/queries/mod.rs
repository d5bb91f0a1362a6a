//! Database query modules.
//!
//! - images: insert and read the gallery's stored JPEG blobs

pub mod images;
