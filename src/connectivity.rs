use tokio::sync::watch;

/// Online/offline state as seen by the queue engine.
///
/// Injected rather than read from ambient platform events so tests can
/// simulate transitions deterministically.
pub trait ConnectivitySignal: Send + Sync {
    fn is_online(&self) -> bool;

    /// Watch for state changes. Receivers observe the current value plus
    /// every subsequent transition; dropping the receiver unsubscribes.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Watch-channel backed signal. The application layer flips it from
/// platform online/offline events; tests flip it directly.
pub struct ConnectivityHandle {
    state: watch::Sender<bool>,
}

impl ConnectivityHandle {
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        Self { state }
    }

    pub fn set_online(&self) {
        if !*self.state.borrow() {
            tracing::info!("Connectivity: online");
        }
        self.state.send_replace(true);
    }

    pub fn set_offline(&self) {
        if *self.state.borrow() {
            tracing::info!("Connectivity: offline");
        }
        self.state.send_replace(false);
    }
}

impl ConnectivitySignal for ConnectivityHandle {
    fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}
