//! TTL Store - An in-process concurrent key/value cache
//!
//! Provides a lock-protected map with per-entry TTL and a cancellable
//! background purge loop that reclaims expired entries.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{ConcurrentStore, Entry, StoreBuilder, StoreStats};
pub use config::StoreConfig;
pub use error::StoreError;
pub use tasks::spawn_purge_task;
