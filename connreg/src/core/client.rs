//! Seams to the external platform connectivity client.
//!
//! The registry never talks to the platform service itself. A
//! [`ClientFactory`] builds the client from an opaque context, and the built
//! [`PlatformClient`] owns every connect, disconnect and retry decision. The
//! client reports back through the [`ConnectionCallbacks`] it is handed
//! during `init`, from whatever thread it likes.

use crate::Result;
use crate::api::builders::ClientConfig;
use crate::core::dispatch::ConnectionCallbacks;

/// A built platform connectivity client.
///
/// Implementations wrap the platform library's client object. All methods
/// are expected to return quickly: `connect` only issues the request, and
/// the outcome arrives later through the registered callbacks.
pub trait PlatformClient: Send + Sync + Sized + 'static {
    /// Registers the sink the client must invoke on connection events.
    ///
    /// The client must call exactly one of
    /// [`on_connected`](ConnectionCallbacks::on_connected),
    /// [`on_connection_suspended`](ConnectionCallbacks::on_connection_suspended) or
    /// [`on_connection_failed`](ConnectionCallbacks::on_connection_failed)
    /// for each lifecycle transition.
    fn register_callbacks(&self, callbacks: ConnectionCallbacks<Self>);

    /// Requests a connection. Non-blocking.
    fn connect(&self);

    /// Disconnects the client.
    fn disconnect(&self);

    /// Returns whether the client currently reports itself connected.
    fn is_connected(&self) -> bool;
}

/// Builds a [`PlatformClient`] from an opaque context.
///
/// This is the builder side of the platform library: it receives the
/// requested capabilities and scopes and produces an unconnected client.
pub trait ClientFactory: Send + Sync + 'static {
    /// The client type this factory builds.
    type Client: PlatformClient;

    /// The platform context the client is built from.
    type Context: ?Sized;

    /// Builds an unconnected client.
    ///
    /// Return [`RegistryError::Build`](crate::RegistryError::Build) if the
    /// platform refuses the configuration.
    fn build(&self, context: &Self::Context, config: &ClientConfig) -> Result<Self::Client>;
}
