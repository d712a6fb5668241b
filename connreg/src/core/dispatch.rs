//! Shared registry state and connection event dispatch.
//!
//! All registry state lives behind one mutex. A transition takes the lock,
//! updates the status, records the failure or suspend detail, publishes the
//! new status on the watch channel and the event on the broadcast channel,
//! and clones the listener sequence for the event. The lock is released
//! before any listener runs, so listeners may call back into the registry
//! freely. Subscribers therefore see events in the order transitions were
//! applied, possibly before that transition's listeners have finished.
//!
//! A listener registered before a transition takes its snapshot is invoked
//! by that transition; one registered after it is not.

use log::{debug, info, warn};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{broadcast, watch};

use crate::api::models::{
    ConnectionEvent, ConnectionFailure, RegistryOptions, Status, SuspendCause,
};
use crate::core::client::PlatformClient;
use crate::core::listeners::{Action, EventKind, ListenerSet};

pub(crate) struct State<C> {
    pub(crate) client: Option<Arc<C>>,
    /// Set while an `init` builds the client outside the lock.
    pub(crate) initializing: bool,
    pub(crate) status: Status,
    pub(crate) last_failure: Option<ConnectionFailure>,
    pub(crate) last_suspend: Option<SuspendCause>,
    listeners: ListenerSet<C>,
}

/// State shared between a registry, its clones and the callback sink.
pub(crate) struct Shared<C> {
    state: Mutex<State<C>>,
    status_tx: watch::Sender<Status>,
    events_tx: broadcast::Sender<ConnectionEvent>,
    pub(crate) options: RegistryOptions,
}

impl<C: PlatformClient> Shared<C> {
    pub(crate) fn new(options: RegistryOptions) -> Self {
        let (status_tx, _) = watch::channel(Status::None);
        let (events_tx, _) = broadcast::channel(options.event_capacity.max(1));
        Self {
            state: Mutex::new(State {
                client: None,
                initializing: false,
                status: Status::None,
                last_failure: None,
                last_suspend: None,
                listeners: ListenerSet::new(),
            }),
            status_tx,
            events_tx,
            options,
        }
    }

    /// Locks the state.
    ///
    /// State is never left half-updated while a listener runs, so a
    /// poisoned lock is recovered rather than propagated.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State<C>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn status_receiver(&self) -> watch::Receiver<Status> {
        self.status_tx.subscribe()
    }

    pub(crate) fn event_receiver(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events_tx.subscribe()
    }

    /// Appends `action` and, when `sticky` and the status already matches,
    /// invokes it once with the current client.
    pub(crate) fn register(&self, kind: EventKind, sticky: bool, action: Action<C>) {
        let fire_with = {
            let mut state = self.lock();
            state.listeners.push(kind, action.clone());
            debug!(
                "Registered {kind} action ({} total, sticky: {sticky})",
                state.listeners.len(kind)
            );

            if sticky && state.status == kind.status() {
                state.client.clone()
            } else {
                None
            }
        };

        if let Some(client) = fire_with {
            debug!("Status already {}, invoking sticky {kind} action", kind.status());
            action.call(&client);
        }
    }

    pub(crate) fn remove(&self, kind: EventKind, action: &Action<C>) -> bool {
        let removed = self.lock().listeners.remove(kind, action);
        debug!("Remove {kind} action: {}", if removed { "removed" } else { "not found" });
        removed
    }

    /// Applies a transition and fans it out to listeners and subscribers.
    fn dispatch(&self, event: ConnectionEvent) {
        let kind = match &event {
            ConnectionEvent::Connected => EventKind::Connect,
            ConnectionEvent::Suspended(_) => EventKind::Suspend,
            ConnectionEvent::Failed(_) => EventKind::Failed,
        };

        let (client, actions) = {
            let mut state = self.lock();
            state.status = event.status();
            match &event {
                ConnectionEvent::Suspended(cause) => state.last_suspend = Some(*cause),
                ConnectionEvent::Failed(failure) => state.last_failure = Some(failure.clone()),
                ConnectionEvent::Connected => {}
            }
            self.status_tx.send_replace(state.status);
            // Err only means there are no subscribers right now
            let _ = self.events_tx.send(event.clone());
            (state.client.clone(), state.listeners.snapshot(kind))
        };

        match &client {
            Some(client) => {
                debug!("Dispatching {event} to {} {kind} action(s)", actions.len());
                for action in &actions {
                    action.call(client);
                }
            }
            None => warn!("Received {event} before a client was set, skipping listeners"),
        }

        if kind == EventKind::Suspend
            && self.options.reconnect_on_suspend
            && let Some(client) = &client
        {
            debug!("Reconnecting after suspension");
            client.connect();
        }
    }
}

/// Entry points the platform client invokes on connection events.
///
/// Handed to [`PlatformClient::register_callbacks`] during `init`. It is
/// cheap to clone and safe to call from any thread. It does not keep the
/// registry alive: once every registry clone is dropped, calls are logged
/// and ignored.
pub struct ConnectionCallbacks<C> {
    shared: Weak<Shared<C>>,
}

impl<C: PlatformClient> ConnectionCallbacks<C> {
    pub(crate) fn new(shared: &Arc<Shared<C>>) -> Self {
        Self {
            shared: Arc::downgrade(shared),
        }
    }

    fn with_shared(&self, event: ConnectionEvent) {
        match self.shared.upgrade() {
            Some(shared) => shared.dispatch(event),
            None => warn!("Registry dropped, ignoring {event} callback"),
        }
    }

    /// The connect request completed successfully.
    pub fn on_connected(&self) {
        info!("Connected");
        self.with_shared(ConnectionEvent::Connected);
    }

    /// The connection was suspended with the given cause code.
    pub fn on_connection_suspended(&self, cause: i32) {
        let cause = SuspendCause::from(cause);
        info!("Connection suspended: {cause}");
        self.with_shared(ConnectionEvent::Suspended(cause));
    }

    /// The connection attempt failed.
    pub fn on_connection_failed(&self, failure: ConnectionFailure) {
        warn!("Connection failed: {failure}");
        self.with_shared(ConnectionEvent::Failed(failure));
    }
}

impl<C> Clone for ConnectionCallbacks<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Weak::clone(&self.shared),
        }
    }
}

impl<C> fmt::Debug for ConnectionCallbacks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCallbacks")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}
