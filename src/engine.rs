use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock, watch};
use uuid::Uuid;

use crate::config::Config;
use crate::connectivity::ConnectivitySignal;
use crate::handlers::{ActionHandler, HandlerRegistry};
use crate::models::{Action, ActionStatus};
use crate::payloads::QueuePayload;
use crate::store::ActionStore;

/// Time source, injected so tests can pin action timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Single-flight guard for the drain loop. A `process_queue` call that
/// finds the engine `Draining` is a no-op; the running drain clears the
/// state back to `Idle` when its snapshotted worklist is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainState {
    Idle,
    Draining,
}

/// The offline action queue: accepts mutations while disconnected and
/// replays them, at-least-once and in insertion order, once connectivity
/// returns.
///
/// All state is owned by the engine instance; persistence, connectivity,
/// and the clock are injected, so independent engines (and tests) never
/// interfere with each other.
pub struct SyncEngine {
    actions: Mutex<Vec<Action>>,
    drain: Mutex<DrainState>,
    registry: RwLock<HandlerRegistry>,
    store: Box<dyn ActionStore>,
    connectivity: Arc<dyn ConnectivitySignal>,
    clock: Box<dyn Clock>,
    default_max_retries: u32,
    snapshots: watch::Sender<Vec<Action>>,
}

impl SyncEngine {
    /// Build an engine over the given store, loading whatever the
    /// previous process left behind (interrupted `processing` records
    /// come back `pending`).
    pub async fn new(
        store: Box<dyn ActionStore>,
        connectivity: Arc<dyn ConnectivitySignal>,
        clock: Box<dyn Clock>,
        config: &Config,
    ) -> Arc<Self> {
        let actions = store.load().await;
        if !actions.is_empty() {
            tracing::info!("Loaded {} queued actions", actions.len());
        }
        let (snapshots, _) = watch::channel(actions.clone());

        Arc::new(Self {
            actions: Mutex::new(actions),
            drain: Mutex::new(DrainState::Idle),
            registry: RwLock::new(HandlerRegistry::new()),
            store,
            connectivity,
            clock,
            default_max_retries: config.default_max_retries,
            snapshots,
        })
    }

    /// Install the handler for its action kind. Last registration wins.
    pub async fn register_handler(&self, handler: Arc<dyn ActionHandler>) {
        self.registry.write().await.register(handler);
    }

    /// Queue an action with the configured default retry ceiling.
    ///
    /// The action is persisted and observers notified before this
    /// returns. If currently online, a drain is started fire-and-forget;
    /// `add` does not wait for delivery.
    pub async fn add(
        self: &Arc<Self>,
        kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> Action {
        self.add_with_retries(kind, payload, self.default_max_retries)
            .await
    }

    pub async fn add_with_retries(
        self: &Arc<Self>,
        kind: impl Into<String>,
        payload: serde_json::Value,
        max_retries: u32,
    ) -> Action {
        let action = Action {
            id: Uuid::now_v7(),
            kind: kind.into(),
            payload,
            timestamp: self.clock.now(),
            retries: 0,
            max_retries,
            status: ActionStatus::Pending,
            error: None,
        };

        tracing::debug!("Queued action {} ({})", action.id, action.kind);

        {
            let mut actions = self.actions.lock().await;
            actions.push(action.clone());
        }
        self.commit().await;

        if self.connectivity.is_online() {
            let engine = Arc::clone(self);
            tokio::spawn(async move {
                engine.process_queue().await;
            });
        }

        action
    }

    /// Queue a typed payload under its compile-time kind tag.
    pub async fn enqueue<P: QueuePayload>(
        self: &Arc<Self>,
        payload: &P,
    ) -> Result<Action, serde_json::Error> {
        let value = serde_json::to_value(payload)?;
        Ok(self.add(P::KIND, value).await)
    }

    /// Drop one action, whatever its status. Used for UI-driven
    /// dismissal; delivery itself removes records on success.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = {
            let mut actions = self.actions.lock().await;
            let before = actions.len();
            actions.retain(|a| a.id != id);
            actions.len() != before
        };
        if removed {
            self.commit().await;
        }
        removed
    }

    pub async fn clear(&self) {
        {
            let mut actions = self.actions.lock().await;
            actions.clear();
        }
        self.commit().await;
    }

    /// Defensive snapshot of the queue; callers cannot mutate engine
    /// state through it.
    pub async fn queue(&self) -> Vec<Action> {
        self.actions.lock().await.clone()
    }

    pub async fn has_pending_actions(&self) -> bool {
        self.actions.lock().await.iter().any(Action::needs_attention)
    }

    /// Watch queue snapshots. A fresh snapshot is published after every
    /// persisted mutation; dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Action>> {
        self.snapshots.subscribe()
    }

    /// Drain once per offline-to-online transition until the signal's
    /// sender goes away.
    pub fn watch_connectivity(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut rx = engine.connectivity.subscribe();
        tokio::spawn(async move {
            let mut online = *rx.borrow();
            while rx.changed().await.is_ok() {
                let now = *rx.borrow_and_update();
                if now && !online {
                    tracing::info!("Back online, draining queue");
                    engine.process_queue().await;
                }
                online = now;
            }
        })
    }

    /// One drain pass: attempt every action that was `pending` when the
    /// pass began, in insertion order.
    ///
    /// Single-flight: a call made while a drain is running returns
    /// immediately without touching the queue. The worklist is
    /// snapshotted at entry, so actions added mid-drain (including by a
    /// handler) wait for the next pass, and one pass is always finite.
    pub async fn process_queue(&self) {
        if !self.begin_drain().await {
            tracing::debug!("Drain already in progress, skipping");
            return;
        }

        if !self.connectivity.is_online() {
            tracing::debug!("Offline, skipping drain");
            self.end_drain().await;
            return;
        }

        let worklist: Vec<Uuid> = {
            let actions = self.actions.lock().await;
            actions
                .iter()
                .filter(|a| a.status == ActionStatus::Pending)
                .map(|a| a.id)
                .collect()
        };

        for id in worklist {
            // A disconnect mid-pass aborts the rest of the worklist;
            // those actions stay pending for the next reconnect.
            if !self.connectivity.is_online() {
                tracing::info!("Went offline mid-drain, leaving remaining actions pending");
                break;
            }

            // The record may have been removed or reset since the
            // snapshot was taken.
            let next = {
                let actions = self.actions.lock().await;
                actions
                    .iter()
                    .find(|a| a.id == id && a.status == ActionStatus::Pending)
                    .map(|a| (a.kind.clone(), a.payload.clone()))
            };
            let Some((kind, payload)) = next else {
                continue;
            };

            let handler = self.registry.read().await.get(&kind).cloned();
            let Some(handler) = handler else {
                // An action nothing can process would otherwise sit
                // pending forever, indistinguishable from one waiting
                // for connectivity.
                tracing::warn!("No handler registered for kind {kind}, failing action {id}");
                self.mark_failed(id, format!("No handler registered for action type {kind}"))
                    .await;
                continue;
            };

            self.set_status(id, ActionStatus::Processing).await;

            match handler.execute(&payload).await {
                Ok(()) => {
                    tracing::info!("Action {id} ({kind}) delivered");
                    {
                        let mut actions = self.actions.lock().await;
                        actions.retain(|a| a.id != id);
                    }
                    self.commit().await;
                }
                Err(err) => {
                    self.record_failure(id, &kind, err.message).await;
                }
            }
        }

        self.end_drain().await;
    }

    /// Reset every exhausted action to pending with a clean slate, then
    /// drain.
    pub async fn retry_failed(&self) {
        {
            let mut actions = self.actions.lock().await;
            for action in actions
                .iter_mut()
                .filter(|a| a.status == ActionStatus::Failed)
            {
                action.status = ActionStatus::Pending;
                action.retries = 0;
                action.error = None;
            }
        }
        self.commit().await;
        self.process_queue().await;
    }

    /// Persist the current list and publish a snapshot to observers.
    /// Persistence failures are logged, never propagated: the in-memory
    /// queue stays authoritative.
    async fn commit(&self) {
        let snapshot = self.actions.lock().await.clone();
        if let Err(err) = self.store.save(&snapshot).await {
            tracing::warn!("Failed to persist action queue: {err}");
        }
        self.snapshots.send_replace(snapshot);
    }

    async fn begin_drain(&self) -> bool {
        let mut state = self.drain.lock().await;
        if *state == DrainState::Draining {
            return false;
        }
        *state = DrainState::Draining;
        true
    }

    async fn end_drain(&self) {
        *self.drain.lock().await = DrainState::Idle;
    }

    async fn set_status(&self, id: Uuid, status: ActionStatus) {
        {
            let mut actions = self.actions.lock().await;
            if let Some(action) = actions.iter_mut().find(|a| a.id == id) {
                action.status = status;
            }
        }
        self.commit().await;
    }

    async fn mark_failed(&self, id: Uuid, message: String) {
        {
            let mut actions = self.actions.lock().await;
            if let Some(action) = actions.iter_mut().find(|a| a.id == id) {
                action.status = ActionStatus::Failed;
                action.error = Some(message);
            }
        }
        self.commit().await;
    }

    /// One failed attempt: bump `retries` (never past `max_retries`) and
    /// either re-pend for the next pass or fail terminally at
    /// exhaustion.
    async fn record_failure(&self, id: Uuid, kind: &str, message: String) {
        {
            let mut actions = self.actions.lock().await;
            if let Some(action) = actions.iter_mut().find(|a| a.id == id) {
                if action.retries < action.max_retries {
                    action.retries += 1;
                }
                if action.retries >= action.max_retries {
                    tracing::warn!(
                        "Action {id} ({kind}) exhausted after {} attempts: {message}",
                        action.retries
                    );
                    action.status = ActionStatus::Failed;
                    action.error = Some(message);
                } else {
                    tracing::debug!(
                        "Action {id} ({kind}) attempt {}/{} failed: {message}, will retry",
                        action.retries,
                        action.max_retries
                    );
                    action.status = ActionStatus::Pending;
                    action.error = None;
                }
            }
        }
        self.commit().await;
    }
}
