//! Eco Club console library: member directory, registration reconciliation
//! and image uploads over pluggable storage and image host adapters.

pub mod config;
pub mod domain;
pub mod outbound;
