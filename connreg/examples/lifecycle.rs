/// Example showing listener registration against a simulated platform client.
///
/// The simulated client connects, loses the network, reconnects and finally
/// fails, each from its own background thread, the way a platform service
/// would report events.
use connreg::{
    Action, Capability, ClientConfig, ClientFactory, ConnectionCallbacks, ConnectionFailure,
    ConnectionRegistry, PlatformClient, Status,
};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

struct SimulatedClient {
    callbacks: Mutex<Option<ConnectionCallbacks<SimulatedClient>>>,
    connected: Arc<AtomicBool>,
}

impl PlatformClient for SimulatedClient {
    fn register_callbacks(&self, callbacks: ConnectionCallbacks<Self>) {
        *self.callbacks.lock().unwrap() = Some(callbacks);
    }

    fn connect(&self) {
        let Some(callbacks) = self.callbacks.lock().unwrap().clone() else {
            return;
        };
        let connected = Arc::clone(&self.connected);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            connected.store(true, Ordering::SeqCst);
            callbacks.on_connected();
            thread::sleep(Duration::from_millis(100));
            connected.store(false, Ordering::SeqCst);
            callbacks.on_connection_suspended(2);
            thread::sleep(Duration::from_millis(100));
            connected.store(true, Ordering::SeqCst);
            callbacks.on_connected();
            thread::sleep(Duration::from_millis(100));
            connected.store(false, Ordering::SeqCst);
            callbacks.on_connection_failed(ConnectionFailure::new(7).with_message("simulated"));
        });
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

struct SimulatedPlatform;

impl ClientFactory for SimulatedPlatform {
    type Client = SimulatedClient;
    type Context = str;

    fn build(&self, context: &str, config: &ClientConfig) -> connreg::Result<SimulatedClient> {
        println!(
            "Building client for {context} with {:?}",
            config.capabilities()
        );
        Ok(SimulatedClient {
            callbacks: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
        })
    }
}

fn main() -> connreg::Result<()> {
    env_logger::init();

    let registry = ConnectionRegistry::new(SimulatedPlatform);

    registry.register_on_connect(false, Action::new(|_client| println!("-> connected")));
    registry.register_on_suspend(false, Action::new(|_client| println!("-> suspended")));
    registry.register_on_failed(false, Action::new(|_client| println!("-> failed")));

    registry.init("demo-app", [Capability::new("fitness.sensors")])?;

    thread::sleep(Duration::from_millis(150));
    println!(
        "Status now: {} (client connected: {})",
        registry.status(),
        registry.is_connected()
    );

    // Joins late, fires right away because the client is connected
    let late = Action::new(|_client| println!("-> late subscriber caught up"));
    registry.register_on_connect(true, late.clone());

    thread::sleep(Duration::from_millis(400));
    println!("Final status: {}", registry.status());
    if let Some(failure) = registry.last_failure() {
        println!("Last failure: {failure}");
    }
    assert_eq!(registry.status(), Status::Failed);

    registry.remove_on_connect(&late);
    Ok(())
}
