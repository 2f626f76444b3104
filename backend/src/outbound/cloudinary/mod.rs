//! Image host outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `AssetTransport`
//! port for unsigned multipart uploads.

mod dto;
mod http_uploader;

pub use http_uploader::{CloudinaryHttpTransport, DEFAULT_UPLOAD_BASE_URL};
