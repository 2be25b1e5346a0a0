//! TTL Purge Task
//!
//! Background task that periodically removes expired store entries.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::ConcurrentStore;

/// Spawns the store's purge loop on the current tokio runtime.
///
/// The task owns a shared reference to the store, so the store outlives it.
/// It finishes once `cancel` fires; await the returned handle to know the
/// loop has exited.
///
/// # Arguments
/// * `store` - Arc<ConcurrentStore> shared reference to the store
/// * `cancel` - Token that stops the loop
///
/// # Example
/// ```no_run
/// # use std::{sync::Arc, time::Duration};
/// # use tokio_util::sync::CancellationToken;
/// # use ttl_store::{spawn_purge_task, ConcurrentStore};
/// # #[tokio::main]
/// # async fn main() {
/// let store = Arc::new(
///     ConcurrentStore::builder()
///         .with_purge_interval(Duration::from_secs(1))
///         .build()
///         .unwrap(),
/// );
/// let cancel = CancellationToken::new();
/// let purge_handle = spawn_purge_task(store.clone(), cancel.clone());
/// // Later, during shutdown:
/// cancel.cancel();
/// purge_handle.await.unwrap();
/// # }
/// ```
pub fn spawn_purge_task(store: Arc<ConcurrentStore>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move { store.run_purge_loop(cancel).await })
}
