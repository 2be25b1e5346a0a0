//! Cache Module
//!
//! Provides the concurrent TTL store, its entries and statistics.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::Entry;
pub use stats::StoreStats;
pub use store::{ConcurrentStore, StoreBuilder};
