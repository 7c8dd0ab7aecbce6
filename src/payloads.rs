//! Typed payloads for the action kinds the SafeCon client queues.
//!
//! The engine itself is open: any string kind with any JSON payload can
//! be enqueued via [`SyncEngine::add`]. These types are the typed front
//! door for the kinds the client actually uses — enqueueing through
//! [`SyncEngine::enqueue`] ties the payload shape to its kind tag at
//! compile time, so a typo'd kind or a mismatched payload cannot reach
//! the queue.
//!
//! [`SyncEngine::add`]: crate::engine::SyncEngine::add
//! [`SyncEngine::enqueue`]: crate::engine::SyncEngine::enqueue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// A payload that knows which handler kind processes it.
pub trait QueuePayload: Serialize + DeserializeOwned {
    const KIND: &'static str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContract {
    pub title: String,
    pub contract_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl QueuePayload for CreateContract {
    const KIND: &'static str = "CREATE_CONTRACT";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddParty {
    pub contract_id: Uuid,
    /// "party_a", "party_b", or "witness".
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl QueuePayload for AddParty {
    const KIND: &'static str = "ADD_PARTY";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSignature {
    pub contract_id: Uuid,
    pub party_id: Uuid,
}

impl QueuePayload for RequestSignature {
    const KIND: &'static str = "REQUEST_SIGNATURE";
}

/// Anchor a contract document hash on chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorContract {
    pub contract_id: Uuid,
    pub document_hash: String,
}

impl QueuePayload for AnchorContract {
    const KIND: &'static str = "ANCHOR_CONTRACT";
}

/// Issue a decentralized identifier credential for a signed contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCredential {
    pub contract_id: Uuid,
}

impl QueuePayload for IssueCredential {
    const KIND: &'static str = "ISSUE_CREDENTIAL";
}
