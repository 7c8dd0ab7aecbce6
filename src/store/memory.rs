use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ActionStore, StoreError, recover_interrupted};
use crate::models::Action;

/// In-memory store with the same contract as [`JsonFileStore`].
///
/// Used as a deterministic test double: records can be seeded to simulate
/// a restart, inspected after the fact, and writes can be made to fail to
/// exercise the engine's persistence-failure path.
///
/// [`JsonFileStore`]: super::JsonFileStore
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<Action>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot, as if a previous process had persisted `actions`.
    pub fn with_records(actions: Vec<Action>) -> Self {
        Self {
            records: Arc::new(Mutex::new(actions)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of what is currently persisted.
    pub async fn records(&self) -> Vec<Action> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl ActionStore for MemoryStore {
    async fn load(&self) -> Vec<Action> {
        recover_interrupted(self.records.lock().await.clone())
    }

    async fn save(&self, actions: &[Action]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write failure".into()));
        }
        *self.records.lock().await = actions.to_vec();
        Ok(())
    }
}
