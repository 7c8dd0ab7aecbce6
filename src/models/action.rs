use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One queued client mutation awaiting delivery to the SafeCon API.
///
/// Records only ever rest in the `pending`, `processing`, or `failed`
/// states: a successfully delivered action is removed from the queue
/// rather than archived as `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: Uuid,
    /// Open tag identifying which handler processes this action
    /// (e.g. "CREATE_CONTRACT"). Not a closed enum: embedders may
    /// register kinds this crate has never heard of.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque to the engine; only the matching handler inspects it.
    pub payload: serde_json::Value,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub retries: u32,
    #[serde(rename = "maxRetries")]
    pub max_retries: u32,
    pub status: ActionStatus,
    /// Last failure message; present only while `status` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Action {
    /// True if the action still needs delivery (pending) or ended in
    /// exhaustion (failed, awaiting a manual retry).
    pub fn needs_attention(&self) -> bool {
        matches!(self.status, ActionStatus::Pending | ActionStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Processing,
    Failed,
    Completed,
}
