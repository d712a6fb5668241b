//! Mock platform client shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use connreg::{
    Action, ClientConfig, ClientFactory, ConnectionCallbacks, ConnectionFailure,
    ConnectionRegistry, PlatformClient, RegistryError, RegistryOptions,
};

/// Platform client that records requests and lets tests fire callbacks.
#[derive(Debug, Default)]
pub struct MockClient {
    pub config: ClientConfig,
    callbacks: Mutex<Option<ConnectionCallbacks<MockClient>>>,
    connected: AtomicBool,
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
}

impl MockClient {
    fn callbacks(&self) -> ConnectionCallbacks<MockClient> {
        self.callbacks
            .lock()
            .unwrap()
            .clone()
            .expect("callbacks not registered")
    }

    pub fn fire_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
        self.callbacks().on_connected();
    }

    pub fn fire_suspended(&self, cause: i32) {
        self.connected.store(false, Ordering::SeqCst);
        self.callbacks().on_connection_suspended(cause);
    }

    pub fn fire_failed(&self, failure: ConnectionFailure) {
        self.connected.store(false, Ordering::SeqCst);
        self.callbacks().on_connection_failed(failure);
    }

    pub fn has_callbacks(&self) -> bool {
        self.callbacks.lock().unwrap().is_some()
    }

    pub fn connects(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

impl PlatformClient for MockClient {
    fn register_callbacks(&self, callbacks: ConnectionCallbacks<Self>) {
        *self.callbacks.lock().unwrap() = Some(callbacks);
    }

    fn connect(&self) {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Context handed to the factory. `None` makes the build fail.
pub struct MockContext(pub Option<&'static str>);

pub struct MockFactory;

impl ClientFactory for MockFactory {
    type Client = MockClient;
    type Context = MockContext;

    fn build(&self, context: &MockContext, config: &ClientConfig) -> connreg::Result<MockClient> {
        match context.0 {
            Some(_) => Ok(MockClient {
                config: config.clone(),
                ..MockClient::default()
            }),
            None => Err(RegistryError::Build("no application context".into())),
        }
    }
}

pub fn context() -> MockContext {
    MockContext(Some("app"))
}

/// A registry with its client already built.
pub fn initialized() -> (ConnectionRegistry<MockFactory>, Arc<MockClient>) {
    initialized_with(RegistryOptions::default())
}

pub fn initialized_with(
    options: RegistryOptions,
) -> (ConnectionRegistry<MockFactory>, Arc<MockClient>) {
    let registry = ConnectionRegistry::with_options(MockFactory, options);
    let client = registry
        .init(&context(), [])
        .expect("mock init should succeed");
    (registry, client)
}

/// Shared call log for ordering assertions.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// An action that appends `name` to `log` each time it runs.
pub fn recorder(log: &CallLog, name: &str) -> Action<MockClient> {
    let log = Arc::clone(log);
    let name = name.to_string();
    Action::new(move |_client| log.lock().unwrap().push(name.clone()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}
