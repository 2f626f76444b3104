//! Record store adapters.
//!
//! `InMemoryRecordStore` backs tests and embedding callers;
//! `JsonFileRecordStore` persists the same model to a single JSON file for
//! operator tooling.

mod json_file;
mod memory;

pub use json_file::JsonFileRecordStore;
pub use memory::{InMemoryRecordStore, StoreSnapshot};
