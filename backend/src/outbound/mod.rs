//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **document_store**: record store backed by memory or a JSON snapshot file
//! - **cloudinary**: reqwest-backed unsigned image uploads
//! - **upload_override**: locally persisted image host settings
//! - **local_fs**: parent-directory and replacing-write helpers
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cloudinary;
pub mod document_store;
pub mod local_fs;
pub mod upload_override;
