//! The [`ConnectionRegistry`] facade.

use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::Result;
use crate::api::builders::ClientConfig;
use crate::api::models::{
    Capability, ConnectionEvent, ConnectionFailure, RegistryError, RegistryOptions, Status,
    SuspendCause,
};
use crate::core::client::{ClientFactory, PlatformClient};
use crate::core::dispatch::{ConnectionCallbacks, Shared};
use crate::core::listeners::{Action, EventKind};
use crate::core::state_wait::wait_for_status;
use crate::monitoring::events as event_monitor;

/// Shared reference to the platform client owned by a registry.
pub type Handle<C> = Arc<C>;

/// Connection status registry for a platform connectivity client.
///
/// This is the main entry point of the crate. It builds the platform client
/// through a [`ClientFactory`], registers itself for the client's three
/// connection callbacks, issues the initial connect request, and then keeps
/// a cached [`Status`] and fans each transition out to registered
/// [`Action`]s.
///
/// # Creating an Instance
///
/// ```no_run
/// use connreg::{Capability, ClientFactory, ConnectionRegistry};
///
/// # fn example<F: ClientFactory>(factory: F, context: &F::Context) -> connreg::Result<()> {
/// let registry = ConnectionRegistry::new(factory);
/// registry.init(context, [Capability::new("fitness.sensors")])?;
/// # Ok(())
/// # }
/// ```
///
/// # Listeners
///
/// ```no_run
/// use connreg::{Action, ClientFactory, ConnectionRegistry};
///
/// # fn example<F: ClientFactory>(registry: &ConnectionRegistry<F>) {
/// let on_connect = Action::new(|_client| println!("connected"));
///
/// // Also runs right away if the client is already connected
/// registry.register_on_connect(true, on_connect.clone());
///
/// // Later
/// assert!(registry.remove_on_connect(&on_connect));
/// # }
/// ```
///
/// # Thread Safety
///
/// `ConnectionRegistry` is `Clone`; every clone shares the same client,
/// status and listeners. The platform client may fire callbacks from any
/// thread. Status updates and listener snapshots happen under one lock, and
/// listeners run after the lock is released, so a listener may register or
/// remove other listeners.
pub struct ConnectionRegistry<F: ClientFactory> {
    factory: Arc<F>,
    shared: Arc<Shared<F::Client>>,
}

impl<F: ClientFactory> ConnectionRegistry<F> {
    /// Creates a registry with default options. No client is built yet.
    pub fn new(factory: F) -> Self {
        Self::with_options(factory, RegistryOptions::default())
    }

    /// Creates a registry with custom options.
    pub fn with_options(factory: F, options: RegistryOptions) -> Self {
        Self {
            factory: Arc::new(factory),
            shared: Arc::new(Shared::new(options)),
        }
    }

    /// Returns the options this registry was created with.
    pub fn options(&self) -> &RegistryOptions {
        &self.shared.options
    }

    /// Builds the client, registers the connection callbacks and connects.
    ///
    /// `capabilities` may be empty. The connection outcome is asynchronous:
    /// a failure to connect arrives later as a [`Status::Failed`] transition,
    /// not as an error here.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AlreadyInitialized` if a client was already
    /// built or another `init` is building one, or `RegistryError::Build` if
    /// the factory rejects the configuration. The factory runs without the
    /// registry lock held.
    pub fn init<I>(&self, context: &F::Context, capabilities: I) -> Result<Handle<F::Client>>
    where
        I: IntoIterator<Item = Capability>,
    {
        self.init_with_config(context, ClientConfig::new().capabilities_from(capabilities))
    }

    /// Like [`init`](Self::init), with scopes as well as capabilities.
    pub fn init_with_config(
        &self,
        context: &F::Context,
        config: ClientConfig,
    ) -> Result<Handle<F::Client>> {
        {
            let mut state = self.shared.lock();
            if state.client.is_some() || state.initializing {
                return Err(RegistryError::AlreadyInitialized);
            }
            state.initializing = true;
        }

        debug!(
            "Building client with {} capability(ies) and {} scope(s)",
            config.capabilities().len(),
            config.scopes().len()
        );
        let built = self.factory.build(context, &config);

        let client = {
            let mut state = self.shared.lock();
            state.initializing = false;
            let client = Arc::new(built?);
            state.client = Some(Arc::clone(&client));
            client
        };

        client.register_callbacks(ConnectionCallbacks::new(&self.shared));
        info!("Client built, connecting");
        client.connect();

        Ok(client)
    }

    /// Returns the client handle, or `None` before [`init`](Self::init).
    #[must_use]
    pub fn client(&self) -> Option<Handle<F::Client>> {
        self.shared.lock().client.clone()
    }

    /// Returns the client handle.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotInitialized` before [`init`](Self::init).
    pub fn try_client(&self) -> Result<Handle<F::Client>> {
        self.client().ok_or(RegistryError::NotInitialized)
    }

    /// Returns the cached connection status.
    #[must_use]
    pub fn status(&self) -> Status {
        self.shared.lock().status
    }

    /// Returns the most recent connection failure, if any.
    ///
    /// Kept after later transitions; it is the last failure seen, not
    /// necessarily the reason for the current status.
    #[must_use]
    pub fn last_failure(&self) -> Option<ConnectionFailure> {
        self.shared.lock().last_failure.clone()
    }

    /// Returns the cause of the most recent suspension, if any.
    #[must_use]
    pub fn last_suspend_cause(&self) -> Option<SuspendCause> {
        self.shared.lock().last_suspend
    }

    /// Asks the client to connect again.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::NotInitialized` before [`init`](Self::init).
    pub fn connect(&self) -> Result<()> {
        let client = self.try_client()?;
        debug!("Requesting connect");
        client.connect();
        Ok(())
    }

    /// Disconnects the client if it reports itself connected.
    ///
    /// Returns whether a disconnect was issued. The cached status is not
    /// changed; only the platform client's callbacks move it.
    pub fn disconnect(&self) -> Result<bool> {
        let client = self.try_client()?;
        if client.is_connected() {
            info!("Disconnecting client");
            client.disconnect();
            Ok(true)
        } else {
            debug!("Client not connected, nothing to disconnect");
            Ok(false)
        }
    }

    /// Returns whether the client reports itself connected.
    ///
    /// Always `false` before [`init`](Self::init).
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client().is_some_and(|c| c.is_connected())
    }

    /// Registers an action to run when the client connects.
    ///
    /// If `sticky` is true and the status is already [`Status::Connected`],
    /// the action is also invoked once, synchronously, before this returns.
    pub fn register_on_connect(&self, sticky: bool, action: Action<F::Client>) {
        self.shared.register(EventKind::Connect, sticky, action);
    }

    /// Registers an action to run when the connection is suspended.
    ///
    /// If `sticky` is true and the status is already [`Status::Suspended`],
    /// the action is also invoked once, synchronously, before this returns.
    pub fn register_on_suspend(&self, sticky: bool, action: Action<F::Client>) {
        self.shared.register(EventKind::Suspend, sticky, action);
    }

    /// Registers an action to run when the connection fails.
    ///
    /// If `sticky` is true and the status is already [`Status::Failed`],
    /// the action is also invoked once, synchronously, before this returns.
    pub fn register_on_failed(&self, sticky: bool, action: Action<F::Client>) {
        self.shared.register(EventKind::Failed, sticky, action);
    }

    /// Removes the first registration of `action` from the connect listeners.
    ///
    /// Returns whether an action was removed.
    pub fn remove_on_connect(&self, action: &Action<F::Client>) -> bool {
        self.shared.remove(EventKind::Connect, action)
    }

    /// Removes the first registration of `action` from the suspend listeners.
    pub fn remove_on_suspend(&self, action: &Action<F::Client>) -> bool {
        self.shared.remove(EventKind::Suspend, action)
    }

    /// Removes the first registration of `action` from the failed listeners.
    pub fn remove_on_failed(&self, action: &Action<F::Client>) -> bool {
        self.shared.remove(EventKind::Failed, action)
    }

    /// Subscribes to connection events.
    ///
    /// Events arrive in the order transitions are applied. Each is sent
    /// when its status is set, so it may arrive before that transition's
    /// listeners have finished. Only events after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.shared.event_receiver()
    }

    /// Returns a watch receiver tracking the cached status.
    pub fn watch_status(&self) -> watch::Receiver<Status> {
        self.shared.status_receiver()
    }

    /// Waits until the status equals `target`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Timeout` if `timeout` elapses first. When
    /// waiting for [`Status::Connected`], a status that is already
    /// [`Status::Failed`] or a failure transition during the wait returns
    /// `RegistryError::ConnectionFailed` with the recorded failure. To wait
    /// for a reconnect after a failure, call [`connect`](Self::connect) and
    /// wait for a different status first, or watch
    /// [`watch_status`](Self::watch_status) directly.
    pub async fn wait_for_status(&self, target: Status, timeout: Duration) -> Result<()> {
        wait_for_status(&self.shared, target, timeout).await
    }

    /// Waits until connected, using the configured `wait_timeout`.
    pub async fn wait_for_connected(&self) -> Result<()> {
        let timeout = self.shared.options.wait_timeout;
        wait_for_status(&self.shared, Status::Connected, timeout).await
    }

    /// Invokes `callback` for each connection event until `shutdown` fires.
    ///
    /// The subscription is taken when this is called, not when the returned
    /// future is first polled, so events fired after this returns are
    /// delivered even if the future is spawned later. Run it in a background
    /// task.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (stop_tx, stop_rx) = tokio::sync::watch::channel(());
    /// let monitor = tokio::spawn(
    ///     registry.monitor_status_changes(stop_rx, |event| println!("{event}")),
    /// );
    /// // ...
    /// stop_tx.send(()).ok();
    /// monitor.await.ok();
    /// ```
    pub fn monitor_status_changes<G>(
        &self,
        shutdown: watch::Receiver<()>,
        callback: G,
    ) -> impl Future<Output = Result<()>> + use<F, G>
    where
        G: Fn(&ConnectionEvent),
    {
        event_monitor::monitor_status_changes(self.subscribe(), shutdown, callback)
    }
}

impl<F: ClientFactory> Clone for ConnectionRegistry<F> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<F: ClientFactory> std::fmt::Debug for ConnectionRegistry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ConnectionRegistry")
            .field("initialized", &state.client.is_some())
            .field("status", &state.status)
            .field("options", &self.shared.options)
            .finish()
    }
}
