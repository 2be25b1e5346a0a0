//! Background Tasks Module
//!
//! Contains the background task that keeps a store free of expired entries.
//!
//! # Tasks
//! - Purge: sweeps expired entries at the store's configured interval

mod purge;

pub use purge::spawn_purge_task;
