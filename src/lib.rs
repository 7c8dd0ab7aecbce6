pub mod config;
pub mod connectivity;
pub mod engine;
pub mod handlers;
pub mod models;
pub mod payloads;
pub mod store;

use std::sync::Arc;

use crate::config::Config;
use crate::connectivity::ConnectivityHandle;
use crate::engine::{SyncEngine, SystemClock};
use crate::store::JsonFileStore;

/// Wire up an engine with the production pieces: a JSON file store at
/// the configured path, system time, and a connectivity handle the
/// application flips from platform online/offline events.
///
/// The engine is already watching the returned handle; flipping it
/// online drains the queue.
pub async fn build_engine(config: Config) -> (Arc<SyncEngine>, Arc<ConnectivityHandle>) {
    let store = JsonFileStore::new(&config.queue_path);
    let connectivity = Arc::new(ConnectivityHandle::new(true));

    let engine = SyncEngine::new(
        Box::new(store),
        connectivity.clone(),
        Box::new(SystemClock),
        &config,
    )
    .await;

    engine.watch_connectivity();

    (engine, connectivity)
}
