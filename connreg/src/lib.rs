//! A Rust library for tracking the connection status of a platform
//! connectivity client.
//!
//! Platform services usually hand out a client object that connects in the
//! background and reports back through callbacks. This crate wraps such a
//! client in a [`ConnectionRegistry`] which:
//!
//! - Builds the client from a context and a list of requested capabilities
//! - Registers for the client's connected, suspended and failed callbacks
//! - Caches a coarse [`Status`] and the detail of the last failure
//! - Runs registered listener [`Action`]s, in registration order, on each
//!   transition
//!
//! The connection protocol itself stays with the platform client, which is
//! plugged in through the [`ClientFactory`] and [`PlatformClient`] traits.
//!
//! # Example
//!
//! ```no_run
//! use connreg::{Action, Capability, ClientFactory, ConnectionRegistry, Status};
//!
//! # async fn example<F: ClientFactory>(factory: F, context: &F::Context) -> connreg::Result<()> {
//! let registry = ConnectionRegistry::new(factory);
//!
//! registry.register_on_connect(true, Action::new(|_client| {
//!     println!("client ready");
//! }));
//! registry.register_on_failed(false, Action::new(|_client| {
//!     eprintln!("client failed to connect");
//! }));
//!
//! registry.init(context, [Capability::new("fitness.sensors")])?;
//! registry.wait_for_connected().await?;
//! assert_eq!(registry.status(), Status::Connected);
//! # Ok(())
//! # }
//! ```
//!
//! # Sticky Registration
//!
//! Passing `sticky = true` to a `register_on_*` method also invokes the
//! action immediately, once, if the status already matches the event. This
//! lets late subscribers catch up without checking the status themselves.
//!
//! # Concurrency
//!
//! The platform client may invoke its callbacks from any thread. Status
//! updates and listener snapshots are taken under a single lock, and
//! listeners run after it is released. Transitions are also published on a
//! broadcast channel ([`ConnectionRegistry::subscribe`]) and a status watch
//! ([`ConnectionRegistry::watch_status`]).
//!
//! # Error Handling
//!
//! Registry operations return `Result<T, RegistryError>`. A failed
//! connection is not an error of the registry: it is a [`Status::Failed`]
//! transition carrying a [`ConnectionFailure`].
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod monitoring;
mod types;

// Public API modules
pub mod api;

pub use crate::api::builders;

// Re-exported public API
pub use crate::api::builders::ClientConfig;
pub use crate::api::models::{
    Capability, ConnectionEvent, ConnectionFailure, FailureCode, RegistryError, RegistryOptions,
    Scope, Status, SuspendCause,
};
pub use crate::api::registry::{ConnectionRegistry, Handle};
pub use crate::core::client::{ClientFactory, PlatformClient};
pub use crate::core::dispatch::ConnectionCallbacks;
pub use crate::core::listeners::Action;

/// A specialized `Result` type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
