pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::models::{Action, ActionStatus};

/// Persistence for the whole action list in one slot.
///
/// The in-memory queue stays authoritative: `save` failures are reported
/// to the engine, which logs and keeps going, and `load` degrades to an
/// empty list rather than failing.
#[async_trait]
pub trait ActionStore: Send + Sync {
    /// Return the previously persisted list, or an empty list if the
    /// slot is absent or corrupt. Interrupted `processing` records come
    /// back as `pending`.
    async fn load(&self) -> Vec<Action>;

    /// Overwrite the slot with the current list.
    async fn save(&self, actions: &[Action]) -> Result<(), StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "I/O error: {err}"),
            StoreError::Serialize(err) => write!(f, "Serialization error: {err}"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err)
    }
}

/// Crash recovery applied on every load: a record left `processing` by a
/// process that died mid-handler must not wedge the queue, so it is
/// rewritten to `pending` and will be attempted again.
pub fn recover_interrupted(mut actions: Vec<Action>) -> Vec<Action> {
    for action in &mut actions {
        if action.status == ActionStatus::Processing {
            tracing::info!(
                "Recovering interrupted action {} ({}) as pending",
                action.id,
                action.kind
            );
            action.status = ActionStatus::Pending;
        }
    }
    actions
}
