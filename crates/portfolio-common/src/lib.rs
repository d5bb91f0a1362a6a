//! Portfolio-Common: Shared types and errors for the portfolio gallery.
//!
//! This crate provides functionality used by the store, the decoder and the
//! web front end:
//!
//! - **Typed IDs**: `ImageId`, the store-assigned row identifier
//! - **Declared formats**: the closed set of upload formats the gallery accepts
//! - **Path Utilities**: Functions to map file extensions to formats
//! - **Error Handling**: The storage error type and result alias
//!
//! # Examples
//!
//! ```
//! use portfolio_common::{DeclaredFormat, Error, ImageId, Result};
//!
//! let format = DeclaredFormat::from_mime("image/heif");
//! assert_eq!(format, DeclaredFormat::Heic);
//!
//! let id = ImageId::from(7);
//! assert_eq!(id.to_string(), "7");
//!
//! fn example() -> Result<()> {
//!     Err(Error::storage("database is locked"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
