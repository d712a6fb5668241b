//! Connection event monitoring.
//!
//! Drives a callback from the registry's event broadcast channel until the
//! caller signals shutdown. This gives UI layers a single loop to run in a
//! background task instead of registering three separate listeners.

use futures::{FutureExt, select};
use log::{debug, warn};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;

use crate::Result;
use crate::api::models::{ConnectionEvent, RegistryError};

/// Invokes `callback` for every connection event until shutdown.
///
/// Returns `Ok(())` when the shutdown watch changes or its sender is
/// dropped, and `RegistryError::Closed` if the registry goes away first.
/// A receiver that falls behind skips the missed events and keeps going.
pub(crate) async fn monitor_status_changes<F>(
    mut events: broadcast::Receiver<ConnectionEvent>,
    mut shutdown: watch::Receiver<()>,
    callback: F,
) -> Result<()>
where
    F: Fn(&ConnectionEvent),
{
    debug!("Monitoring connection events");

    loop {
        let next = select! {
            _ = shutdown.changed().fuse() => None,
            event = events.recv().fuse() => Some(event),
        };

        match next {
            None => {
                debug!("Connection event monitoring shut down");
                return Ok(());
            }
            Some(Ok(event)) => {
                debug!("Connection event: {event}");
                callback(&event);
            }
            Some(Err(RecvError::Lagged(skipped))) => {
                warn!("Connection event monitor lagged, skipped {skipped} event(s)");
            }
            Some(Err(RecvError::Closed)) => {
                warn!("Connection event stream ended unexpectedly");
                return Err(RegistryError::Closed);
            }
        }
    }
}
