/// Example waiting for a connection and monitoring events in the background.
use connreg::{
    ClientConfig, ClientFactory, ConnectionCallbacks, ConnectionRegistry, PlatformClient,
    RegistryError, RegistryOptions,
};
use std::sync::Mutex;
use std::time::Duration;

struct DelayedClient {
    callbacks: Mutex<Option<ConnectionCallbacks<DelayedClient>>>,
}

impl PlatformClient for DelayedClient {
    fn register_callbacks(&self, callbacks: ConnectionCallbacks<Self>) {
        *self.callbacks.lock().unwrap() = Some(callbacks);
    }

    fn connect(&self) {
        if let Some(callbacks) = self.callbacks.lock().unwrap().clone() {
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(250));
                callbacks.on_connected();
                std::thread::sleep(Duration::from_millis(250));
                callbacks.on_connection_suspended(1);
            });
        }
    }

    fn disconnect(&self) {}

    fn is_connected(&self) -> bool {
        false
    }
}

struct DelayedPlatform;

impl ClientFactory for DelayedPlatform {
    type Client = DelayedClient;
    type Context = ();

    fn build(&self, _context: &(), _config: &ClientConfig) -> connreg::Result<DelayedClient> {
        Ok(DelayedClient {
            callbacks: Mutex::new(None),
        })
    }
}

#[tokio::main]
async fn main() -> connreg::Result<()> {
    env_logger::init();

    let options = RegistryOptions::new()
        .with_wait_timeout(Duration::from_secs(2))
        .with_reconnect_on_suspend(true);
    let registry = ConnectionRegistry::with_options(DelayedPlatform, options);

    let (stop_tx, stop_rx) = tokio::sync::watch::channel(());
    let monitor = tokio::spawn(
        registry.monitor_status_changes(stop_rx, |event| println!("event: {event}")),
    );

    registry.init_with_config(&(), ClientConfig::new().capability("location"))?;

    match registry.wait_for_connected().await {
        Ok(()) => println!("Connected!"),
        Err(RegistryError::ConnectionFailed(failure)) => eprintln!("Failed: {failure}"),
        Err(e) => return Err(e),
    }

    tokio::time::sleep(Duration::from_millis(400)).await;
    stop_tx.send(()).ok();
    if let Ok(result) = monitor.await {
        result?;
    }

    Ok(())
}
