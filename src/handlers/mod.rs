use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

#[derive(Debug)]
pub struct HandlerError {
    pub message: String,
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<String> for HandlerError {
    fn from(s: String) -> Self {
        HandlerError { message: s }
    }
}

impl From<&str> for HandlerError {
    fn from(s: &str) -> Self {
        HandlerError {
            message: s.to_string(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError {
            message: format!("Invalid payload: {err}"),
        }
    }
}

/// The real side effect for one action kind, supplied by the API client
/// layer (e.g. "CREATE_CONTRACT" posts to the contracts endpoint).
///
/// Payload shape is the handler's own business; the engine never
/// inspects it.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn kind(&self) -> &str;
    async fn execute(&self, payload: &serde_json::Value) -> Result<(), HandlerError>;
}

pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Last registration for a kind wins.
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(handler.kind().to_string(), handler);
    }

    pub fn get(&self, kind: &str) -> Option<&Arc<dyn ActionHandler>> {
        self.handlers.get(kind)
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.handlers.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
