use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use safecon_sync::config::Config;
use safecon_sync::connectivity::ConnectivityHandle;
use safecon_sync::engine::{SyncEngine, SystemClock};
use safecon_sync::handlers::{ActionHandler, HandlerError};
use safecon_sync::store::MemoryStore;

/// An engine wired to deterministic fakes: an in-memory store that can
/// be inspected and a connectivity handle tests flip directly.
pub struct TestQueue {
    pub engine: Arc<SyncEngine>,
    pub connectivity: Arc<ConnectivityHandle>,
    pub store: MemoryStore,
    /// Shared call-order log; every test handler appends its kind here
    /// on each invocation.
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl TestQueue {
    pub async fn call_log(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    /// Handler that records the call and succeeds.
    pub fn ok_handler(&self, kind: &str) -> Arc<TestHandler> {
        Arc::new(TestHandler {
            kind: kind.to_string(),
            calls: self.calls.clone(),
            fail_with: None,
            delay: None,
            go_offline: None,
        })
    }

    /// Handler that records the call and fails with `message`.
    pub fn failing_handler(&self, kind: &str, message: &str) -> Arc<TestHandler> {
        Arc::new(TestHandler {
            kind: kind.to_string(),
            calls: self.calls.clone(),
            fail_with: Some(message.to_string()),
            delay: None,
            go_offline: None,
        })
    }

    /// Handler that holds its invocation open for `delay` before
    /// succeeding, to probe the single-flight guard.
    pub fn slow_handler(&self, kind: &str, delay: Duration) -> Arc<TestHandler> {
        Arc::new(TestHandler {
            kind: kind.to_string(),
            calls: self.calls.clone(),
            fail_with: None,
            delay: Some(delay),
            go_offline: None,
        })
    }

    /// Handler that succeeds but drops connectivity while running,
    /// simulating a disconnect mid-drain.
    pub fn disconnecting_handler(&self, kind: &str) -> Arc<TestHandler> {
        Arc::new(TestHandler {
            kind: kind.to_string(),
            calls: self.calls.clone(),
            fail_with: None,
            delay: None,
            go_offline: Some(self.connectivity.clone()),
        })
    }
}

pub struct TestHandler {
    kind: String,
    calls: Arc<Mutex<Vec<String>>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
    go_offline: Option<Arc<ConnectivityHandle>>,
}

#[async_trait]
impl ActionHandler for TestHandler {
    fn kind(&self) -> &str {
        &self.kind
    }

    async fn execute(&self, _payload: &serde_json::Value) -> Result<(), HandlerError> {
        self.calls.lock().await.push(self.kind.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(handle) = &self.go_offline {
            handle.set_offline();
        }
        match &self.fail_with {
            Some(message) => Err(message.as_str().into()),
            None => Ok(()),
        }
    }
}

/// Spawn an engine on a fresh in-memory store.
pub async fn spawn_engine(online: bool) -> TestQueue {
    spawn_engine_with(online, MemoryStore::new()).await
}

/// Spawn an engine on a pre-seeded store, as after a restart.
pub async fn spawn_engine_with(online: bool, store: MemoryStore) -> TestQueue {
    init_tracing();

    let config = Config::new("unused.json");
    let connectivity = Arc::new(ConnectivityHandle::new(online));

    let engine = SyncEngine::new(
        Box::new(store.clone()),
        connectivity.clone(),
        Box::new(SystemClock),
        &config,
    )
    .await;

    TestQueue {
        engine,
        connectivity,
        store,
        calls: Arc::new(Mutex::new(Vec::new())),
    }
}

/// Test log output, controlled by RUST_LOG. Safe to call repeatedly.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Poll until the queue is empty, or panic after ~1s.
pub async fn wait_for_empty(engine: &Arc<SyncEngine>) {
    for _ in 0..200 {
        if engine.queue().await.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("queue did not drain in time");
}
