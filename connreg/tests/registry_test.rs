//! Tests for client initialization, listener registration and dispatch.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

use common::{
    MockClient, MockContext, MockFactory, call_log, context, entries, initialized,
    initialized_with, recorder,
};
use connreg::{
    Action, Capability, ClientConfig, ClientFactory, ConnectionFailure, ConnectionRegistry,
    FailureCode, RegistryError, RegistryOptions, Status, SuspendCause,
};

/// Factory whose build blocks on a barrier twice: once on entry and once
/// before returning.
struct GatedFactory {
    gate: Arc<Barrier>,
}

impl ClientFactory for GatedFactory {
    type Client = MockClient;
    type Context = MockContext;

    fn build(
        &self,
        _context: &MockContext,
        _config: &ClientConfig,
    ) -> connreg::Result<MockClient> {
        self.gate.wait();
        self.gate.wait();
        Ok(MockClient::default())
    }
}

#[test]
fn test_status_starts_none() {
    let registry = ConnectionRegistry::new(MockFactory);
    assert_eq!(registry.status(), Status::None);
    assert!(registry.client().is_none());
    assert!(!registry.is_connected());
}

#[test]
fn test_init_builds_registers_and_connects() {
    let registry = ConnectionRegistry::new(MockFactory);
    let client = registry
        .init(
            &context(),
            [Capability::new("sensors"), Capability::new("history")],
        )
        .unwrap();

    assert!(client.has_callbacks());
    assert_eq!(client.connects(), 1);
    assert_eq!(client.config.capabilities().len(), 2);
    assert_eq!(client.config.capabilities()[0].name(), "sensors");

    // Status is untouched until the client calls back
    assert_eq!(registry.status(), Status::None);
    assert!(Arc::ptr_eq(&registry.client().unwrap(), &client));
}

#[test]
fn test_init_with_empty_capabilities() {
    let registry = ConnectionRegistry::new(MockFactory);
    let client = registry.init(&context(), Vec::new()).unwrap();
    assert!(client.config.capabilities().is_empty());
}

#[test]
fn test_init_with_scopes() {
    let registry = ConnectionRegistry::new(MockFactory);
    let config = ClientConfig::new()
        .capability("sensors")
        .scope("fitness.location.read");
    let client = registry.init_with_config(&context(), config).unwrap();

    assert_eq!(client.config.scopes()[0].name(), "fitness.location.read");
}

#[test]
fn test_init_twice_is_rejected() {
    let (registry, client) = initialized();
    let err = registry.init(&context(), []).unwrap_err();

    assert!(matches!(err, RegistryError::AlreadyInitialized));
    assert_eq!(client.connects(), 1);
}

#[test]
fn test_init_build_failure() {
    let registry = ConnectionRegistry::new(MockFactory);
    let err = registry.init(&MockContext(None), []).unwrap_err();

    assert!(matches!(err, RegistryError::Build(_)));
    assert!(registry.client().is_none());

    // A failed build leaves the registry usable
    assert!(registry.init(&context(), []).is_ok());
}

#[test]
fn test_build_runs_without_holding_the_registry() {
    let gate = Arc::new(Barrier::new(2));
    let registry = ConnectionRegistry::new(GatedFactory {
        gate: Arc::clone(&gate),
    });

    let building = registry.clone();
    let handle = std::thread::spawn(move || building.init(&context(), []));

    // Build in progress: the registry stays readable and refuses a second init
    gate.wait();
    assert_eq!(registry.status(), Status::None);
    assert!(registry.client().is_none());
    registry.register_on_connect(false, Action::new(|_client| {}));
    assert!(matches!(
        registry.init(&context(), []),
        Err(RegistryError::AlreadyInitialized)
    ));
    gate.wait();

    let client = handle.join().unwrap().unwrap();
    assert!(Arc::ptr_eq(&registry.client().unwrap(), &client));
    assert_eq!(client.connects(), 1);
}

#[test]
fn test_try_client_before_init() {
    let registry = ConnectionRegistry::new(MockFactory);
    assert!(matches!(
        registry.try_client(),
        Err(RegistryError::NotInitialized)
    ));
    assert!(matches!(
        registry.connect(),
        Err(RegistryError::NotInitialized)
    ));
    assert!(matches!(
        registry.disconnect(),
        Err(RegistryError::NotInitialized)
    ));
}

#[test]
fn test_connect_listeners_run_in_order_with_handle() {
    let (registry, client) = initialized();
    let log = call_log();

    let seen = Arc::new(AtomicUsize::new(0));
    let expected = Arc::clone(&client);
    let seen_clone = Arc::clone(&seen);
    registry.register_on_connect(false, recorder(&log, "L1"));
    registry.register_on_connect(false, recorder(&log, "L2"));
    registry.register_on_connect(
        false,
        Action::new(move |handle| {
            assert!(Arc::ptr_eq(handle, &expected));
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }),
    );

    client.fire_connected();

    assert_eq!(entries(&log), vec!["L1", "L2"]);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(registry.status(), Status::Connected);
}

#[test]
fn test_suspend_listeners_run_in_order() {
    let (registry, client) = initialized();
    let log = call_log();
    registry.register_on_suspend(false, recorder(&log, "S1"));
    registry.register_on_suspend(false, recorder(&log, "S2"));
    registry.register_on_suspend(false, recorder(&log, "S3"));

    client.fire_suspended(2);

    assert_eq!(entries(&log), vec!["S1", "S2", "S3"]);
    assert_eq!(registry.status(), Status::Suspended);
    assert_eq!(registry.last_suspend_cause(), Some(SuspendCause::NetworkLost));
}

#[test]
fn test_failed_listeners_run_in_order() {
    let (registry, client) = initialized();
    let log = call_log();
    registry.register_on_failed(false, recorder(&log, "F1"));
    registry.register_on_failed(false, recorder(&log, "F2"));

    client.fire_failed(ConnectionFailure::new(4).with_message("no account"));

    assert_eq!(entries(&log), vec!["F1", "F2"]);
    assert_eq!(registry.status(), Status::Failed);

    let failure = registry.last_failure().unwrap();
    assert_eq!(failure.code, FailureCode::SignInRequired);
    assert_eq!(failure.message.as_deref(), Some("no account"));
}

#[test]
fn test_each_kind_has_its_own_listeners() {
    let (registry, client) = initialized();
    let log = call_log();
    registry.register_on_connect(false, recorder(&log, "connect"));
    registry.register_on_suspend(false, recorder(&log, "suspend"));
    registry.register_on_failed(false, recorder(&log, "failed"));

    client.fire_connected();
    assert_eq!(entries(&log), vec!["connect"]);

    client.fire_suspended(1);
    assert_eq!(entries(&log), vec!["connect", "suspend"]);

    client.fire_failed(ConnectionFailure::new(7));
    assert_eq!(entries(&log), vec!["connect", "suspend", "failed"]);
}

#[test]
fn test_sticky_connect_fires_once_when_connected() {
    let (registry, client) = initialized();
    client.fire_connected();

    let log = call_log();
    registry.register_on_connect(true, recorder(&log, "A"));
    assert_eq!(entries(&log), vec!["A"]);

    // Registered too, so a later transition runs it again
    client.fire_connected();
    assert_eq!(entries(&log), vec!["A", "A"]);
}

#[test]
fn test_sticky_failed_fires_and_keeps_status() {
    let (registry, client) = initialized();
    client.fire_failed(ConnectionFailure::new(16));

    let log = call_log();
    registry.register_on_failed(true, recorder(&log, "F"));

    assert_eq!(entries(&log), vec!["F"]);
    assert_eq!(registry.status(), Status::Failed);
}

#[test]
fn test_sticky_does_not_fire_on_other_status() {
    let (registry, client) = initialized();
    let log = call_log();

    registry.register_on_connect(true, recorder(&log, "before"));
    assert!(entries(&log).is_empty());

    client.fire_suspended(1);
    registry.register_on_connect(true, recorder(&log, "connect"));
    registry.register_on_failed(true, recorder(&log, "failed"));
    assert!(entries(&log).is_empty());

    registry.register_on_suspend(true, recorder(&log, "suspend"));
    assert_eq!(entries(&log), vec!["suspend"]);
}

#[test]
fn test_non_sticky_does_not_fire_immediately() {
    let (registry, client) = initialized();
    client.fire_connected();

    let log = call_log();
    registry.register_on_connect(false, recorder(&log, "A"));
    assert!(entries(&log).is_empty());
}

#[test]
fn test_remove_unknown_action_returns_false() {
    let (registry, _client) = initialized();
    let action = Action::new(|_| {});

    assert!(!registry.remove_on_connect(&action));
    assert!(!registry.remove_on_suspend(&action));
    assert!(!registry.remove_on_failed(&action));
}

#[test]
fn test_remove_takes_one_duplicate_at_a_time() {
    let (registry, client) = initialized();
    let log = call_log();
    let a = recorder(&log, "A");
    registry.register_on_connect(false, a.clone());
    registry.register_on_connect(false, a.clone());

    assert!(registry.remove_on_connect(&a));
    client.fire_connected();
    assert_eq!(entries(&log), vec!["A"]);

    assert!(registry.remove_on_connect(&a));
    assert!(!registry.remove_on_connect(&a));
    client.fire_connected();
    assert_eq!(entries(&log), vec!["A"]);
}

#[test]
fn test_remove_only_affects_matching_kind() {
    let (registry, client) = initialized();
    let log = call_log();
    let a = recorder(&log, "A");
    registry.register_on_suspend(false, a.clone());

    assert!(!registry.remove_on_connect(&a));
    assert!(!registry.remove_on_failed(&a));

    client.fire_suspended(1);
    assert_eq!(entries(&log), vec!["A"]);

    assert!(registry.remove_on_suspend(&a));
}

#[test]
fn test_remove_keeps_order_of_remaining() {
    let (registry, client) = initialized();
    let log = call_log();
    let a = recorder(&log, "A");
    let b = recorder(&log, "B");
    let c = recorder(&log, "C");
    registry.register_on_failed(false, a);
    registry.register_on_failed(false, b.clone());
    registry.register_on_failed(false, c);

    assert!(registry.remove_on_failed(&b));
    client.fire_failed(ConnectionFailure::new(8));

    assert_eq!(entries(&log), vec!["A", "C"]);
}

#[test]
fn test_transitions_are_unconstrained() {
    let (registry, client) = initialized();

    client.fire_connected();
    assert_eq!(registry.status(), Status::Connected);
    client.fire_connected();
    assert_eq!(registry.status(), Status::Connected);
    client.fire_failed(ConnectionFailure::new(7));
    assert_eq!(registry.status(), Status::Failed);
    client.fire_suspended(1);
    assert_eq!(registry.status(), Status::Suspended);
    client.fire_connected();
    assert_eq!(registry.status(), Status::Connected);

    // Last failure is kept after recovery
    assert_eq!(
        registry.last_failure().map(|f| f.code),
        Some(FailureCode::NetworkError)
    );
}

#[test]
fn test_listener_can_register_during_dispatch() {
    let (registry, client) = initialized();
    let log = call_log();

    let inner_registry = registry.clone();
    let inner_log = Arc::clone(&log);
    registry.register_on_connect(
        false,
        Action::new(move |_| {
            inner_log.lock().unwrap().push("outer".into());
            // Sticky, and the status is already Connected
            inner_registry.register_on_connect(true, recorder(&inner_log, "inner"));
        }),
    );

    client.fire_connected();
    assert_eq!(entries(&log), vec!["outer", "inner"]);

    // The inner action joined the listener list for later transitions
    log.lock().unwrap().clear();
    client.fire_connected();
    assert_eq!(entries(&log)[..2], ["outer".to_string(), "inner".to_string()]);
}

#[test]
fn test_listener_can_remove_itself() {
    let (registry, client) = initialized();
    let count = Arc::new(AtomicUsize::new(0));

    let slot: Arc<std::sync::Mutex<Option<Action<common::MockClient>>>> =
        Arc::new(std::sync::Mutex::new(None));
    let action = {
        let registry = registry.clone();
        let count = Arc::clone(&count);
        let slot = Arc::clone(&slot);
        Action::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
            if let Some(me) = slot.lock().unwrap().take() {
                assert!(registry.remove_on_connect(&me));
            }
        })
    };
    *slot.lock().unwrap() = Some(action.clone());
    registry.register_on_connect(false, action);

    client.fire_connected();
    client.fire_connected();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_disconnect_only_when_connected() {
    let (registry, client) = initialized();

    assert!(!registry.disconnect().unwrap());
    assert_eq!(client.disconnects(), 0);

    client.fire_connected();
    assert!(registry.is_connected());
    assert!(registry.disconnect().unwrap());
    assert_eq!(client.disconnects(), 1);
    assert!(!registry.is_connected());

    // Cached status only follows callbacks
    assert_eq!(registry.status(), Status::Connected);
}

#[test]
fn test_connect_reissues_request() {
    let (registry, client) = initialized();
    registry.connect().unwrap();
    assert_eq!(client.connects(), 2);
}

#[test]
fn test_reconnect_on_suspend() {
    let (registry, client) =
        initialized_with(RegistryOptions::new().with_reconnect_on_suspend(true));
    client.fire_connected();
    client.fire_suspended(1);

    assert_eq!(client.connects(), 2);
    assert_eq!(registry.status(), Status::Suspended);
}

#[test]
fn test_no_reconnect_on_suspend_by_default() {
    let (_registry, client) = initialized();
    client.fire_suspended(2);
    assert_eq!(client.connects(), 1);
}

#[test]
fn test_callbacks_after_registry_dropped_are_ignored() {
    let (registry, client) = initialized();
    drop(registry);

    // Must not panic
    client.fire_connected();
    client.fire_failed(ConnectionFailure::new(7));
}

#[test]
fn test_clones_share_state() {
    let (registry, client) = initialized();
    let other = registry.clone();
    let log = call_log();
    other.register_on_connect(false, recorder(&log, "A"));

    client.fire_connected();

    assert_eq!(registry.status(), Status::Connected);
    assert_eq!(other.status(), Status::Connected);
    assert_eq!(entries(&log), vec!["A"]);
}

#[test]
fn test_callbacks_from_another_thread() {
    let (registry, client) = initialized();
    let log = call_log();
    registry.register_on_connect(false, recorder(&log, "A"));
    registry.register_on_failed(false, recorder(&log, "F"));

    let remote = Arc::clone(&client);
    std::thread::spawn(move || {
        remote.fire_connected();
        remote.fire_failed(ConnectionFailure::new(7));
    })
    .join()
    .unwrap();

    assert_eq!(entries(&log), vec!["A", "F"]);
    assert_eq!(registry.status(), Status::Failed);
}
