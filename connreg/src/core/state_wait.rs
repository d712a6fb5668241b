//! Waiting for status transitions.
//!
//! Waits subscribe to the registry's status watch channel rather than
//! polling `status()`. The subscription is taken before the current status
//! is read, so a transition that lands between the two is not missed.

use futures::{FutureExt, select};
use futures_timer::Delay;
use log::{debug, warn};
use std::pin::pin;
use std::time::Duration;

use crate::Result;
use crate::api::models::{ConnectionFailure, FailureCode, RegistryError, Status};
use crate::core::client::PlatformClient;
use crate::core::dispatch::Shared;

/// Waits until the registry reaches `target`.
///
/// Returns immediately if the status already equals `target`. When the
/// target is [`Status::Connected`], [`Status::Failed`] is terminal: a status
/// that is already failed, or a transition to it during the wait, ends the
/// wait with [`RegistryError::ConnectionFailed`] carrying the recorded
/// failure.
pub(crate) async fn wait_for_status<C: PlatformClient>(
    shared: &Shared<C>,
    target: Status,
    timeout: Duration,
) -> Result<()> {
    // Subscribe FIRST to avoid race condition
    let mut rx = shared.status_receiver();

    let current = *rx.borrow_and_update();
    debug!("Waiting for status {target}, currently {current}");
    if current == target {
        return Ok(());
    }
    if is_terminal(target, current) {
        warn!("Already {current} while waiting for {target}");
        return Err(connection_failed(shared));
    }

    let mut timeout_delay = pin!(Delay::new(timeout).fuse());

    loop {
        let changed = select! {
            _ = timeout_delay => None,
            res = rx.changed().fuse() => Some(res),
        };

        match changed {
            None => {
                warn!("Timed out after {timeout:?} waiting for status {target}");
                return Err(RegistryError::Timeout);
            }
            Some(Err(_)) => return Err(RegistryError::Closed),
            Some(Ok(())) => {
                let status = *rx.borrow_and_update();
                debug!("Status changed to {status} while waiting for {target}");

                if status == target {
                    return Ok(());
                }
                if is_terminal(target, status) {
                    return Err(connection_failed(shared));
                }
            }
        }
    }
}

fn is_terminal(target: Status, status: Status) -> bool {
    target == Status::Connected && status == Status::Failed
}

fn connection_failed<C: PlatformClient>(shared: &Shared<C>) -> RegistryError {
    let failure = shared
        .lock()
        .last_failure
        .clone()
        .unwrap_or_else(|| ConnectionFailure::from(FailureCode::Other(0)));
    RegistryError::ConnectionFailed(failure)
}
