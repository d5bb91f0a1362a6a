//! Portfolio - Actress portfolio site with an image gallery
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod gallery;
pub mod pages;
pub mod server;
