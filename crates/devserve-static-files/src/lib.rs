//! Static file serving
//!
//! The local half of the dev server: requests no proxy rule claims are
//! resolved beneath the configured root directory, with an index-document
//! fallback for SPA-style navigation paths.

pub mod handler;
pub mod service;

pub use handler::serve;
pub use service::{FileService, ServedFile};
