//! Data types shared across the registry API: statuses, events,
//! failure details, options and the error type.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use thiserror::Error;

use crate::types::constants::{defaults, failure_code, suspend_cause};

/// Coarse status of the platform client's connection.
///
/// Exactly one value is current per registry. It starts at [`Status::None`]
/// and only changes when the platform client invokes one of the connection
/// callbacks. Transitions are not validated: any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// Prior to any events occurring.
    #[default]
    None,
    /// The connect request completed and the client is usable.
    Connected,
    /// The client is temporarily disconnected.
    ///
    /// All outstanding requests on the client have been canceled. The
    /// platform client attempts to restore the connection on its own.
    Suspended,
    /// An attempt to connect the client failed.
    Failed,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Connected => write!(f, "connected"),
            Self::Suspended => write!(f, "suspended"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Reason code delivered with a connection suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuspendCause {
    /// The remote service was killed or disconnected.
    ServiceDisconnected,
    /// The network connection was lost.
    NetworkLost,
    /// Unknown cause code not mapped to a specific variant.
    Other(i32),
}

impl From<i32> for SuspendCause {
    fn from(code: i32) -> Self {
        match code {
            suspend_cause::SERVICE_DISCONNECTED => Self::ServiceDisconnected,
            suspend_cause::NETWORK_LOST => Self::NetworkLost,
            v => Self::Other(v),
        }
    }
}

impl Display for SuspendCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceDisconnected => write!(f, "service disconnected"),
            Self::NetworkLost => write!(f, "connection lost"),
            Self::Other(v) => write!(f, "unknown cause ({v})"),
        }
    }
}

/// Result code delivered with a failed connection attempt.
///
/// Use `FailureCode::from(code)` to convert from the raw value the
/// platform client reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCode {
    /// The platform service is missing on this device.
    ServiceMissing,
    /// The installed platform service is out of date.
    ServiceVersionUpdateRequired,
    /// The platform service has been disabled.
    ServiceDisabled,
    /// The user must sign in before connecting.
    SignInRequired,
    /// The client requested an account that does not exist.
    InvalidAccount,
    /// Completing the connection needs user interaction.
    ResolutionRequired,
    /// A network error occurred.
    NetworkError,
    /// An internal error occurred.
    InternalError,
    /// The installed platform service is not authentic.
    ServiceInvalid,
    /// The application is misconfigured.
    DeveloperError,
    /// The application is not licensed to the user.
    LicenseCheckFailed,
    /// The client canceled the connection.
    Canceled,
    /// The connection timed out while waiting for the service.
    Timeout,
    /// The connect request was interrupted.
    Interrupted,
    /// A requested capability is not available on this device.
    ApiUnavailable,
    /// Signing in failed.
    SignInFailed,
    /// The platform service is being updated.
    ServiceUpdating,
    /// The platform service lacks a required permission.
    ServiceMissingPermission,
    /// The current user profile is restricted.
    RestrictedProfile,
    /// Unknown result code not mapped to a specific variant.
    Other(i32),
}

impl From<i32> for FailureCode {
    fn from(code: i32) -> Self {
        match code {
            failure_code::SERVICE_MISSING => Self::ServiceMissing,
            failure_code::SERVICE_VERSION_UPDATE_REQUIRED => Self::ServiceVersionUpdateRequired,
            failure_code::SERVICE_DISABLED => Self::ServiceDisabled,
            failure_code::SIGN_IN_REQUIRED => Self::SignInRequired,
            failure_code::INVALID_ACCOUNT => Self::InvalidAccount,
            failure_code::RESOLUTION_REQUIRED => Self::ResolutionRequired,
            failure_code::NETWORK_ERROR => Self::NetworkError,
            failure_code::INTERNAL_ERROR => Self::InternalError,
            failure_code::SERVICE_INVALID => Self::ServiceInvalid,
            failure_code::DEVELOPER_ERROR => Self::DeveloperError,
            failure_code::LICENSE_CHECK_FAILED => Self::LicenseCheckFailed,
            failure_code::CANCELED => Self::Canceled,
            failure_code::TIMEOUT => Self::Timeout,
            failure_code::INTERRUPTED => Self::Interrupted,
            failure_code::API_UNAVAILABLE => Self::ApiUnavailable,
            failure_code::SIGN_IN_FAILED => Self::SignInFailed,
            failure_code::SERVICE_UPDATING => Self::ServiceUpdating,
            failure_code::SERVICE_MISSING_PERMISSION => Self::ServiceMissingPermission,
            failure_code::RESTRICTED_PROFILE => Self::RestrictedProfile,
            v => Self::Other(v),
        }
    }
}

impl Display for FailureCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServiceMissing => write!(f, "service missing"),
            Self::ServiceVersionUpdateRequired => write!(f, "service version update required"),
            Self::ServiceDisabled => write!(f, "service disabled"),
            Self::SignInRequired => write!(f, "sign-in required"),
            Self::InvalidAccount => write!(f, "invalid account"),
            Self::ResolutionRequired => write!(f, "resolution required"),
            Self::NetworkError => write!(f, "network error"),
            Self::InternalError => write!(f, "internal error"),
            Self::ServiceInvalid => write!(f, "service invalid"),
            Self::DeveloperError => write!(f, "developer error"),
            Self::LicenseCheckFailed => write!(f, "license check failed"),
            Self::Canceled => write!(f, "canceled"),
            Self::Timeout => write!(f, "timed out"),
            Self::Interrupted => write!(f, "interrupted"),
            Self::ApiUnavailable => write!(f, "API unavailable"),
            Self::SignInFailed => write!(f, "sign-in failed"),
            Self::ServiceUpdating => write!(f, "service updating"),
            Self::ServiceMissingPermission => write!(f, "service missing permission"),
            Self::RestrictedProfile => write!(f, "restricted profile"),
            Self::Other(v) => write!(f, "unknown result ({v})"),
        }
    }
}

/// Details of a failed connection attempt.
///
/// Recorded alongside [`Status::Failed`] so that listeners and waiters can
/// find out why the client could not connect.
///
/// # Example
///
/// ```rust
/// use connreg::{ConnectionFailure, FailureCode};
///
/// let failure = ConnectionFailure::new(7).with_message("no route to host");
/// assert_eq!(failure.code, FailureCode::NetworkError);
/// assert_eq!(failure.to_string(), "network error: no route to host");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionFailure {
    /// Mapped result code.
    pub code: FailureCode,
    /// Optional message supplied by the platform client.
    pub message: Option<String>,
}

impl ConnectionFailure {
    /// Creates a failure from a raw result code.
    pub fn new(code: i32) -> Self {
        Self {
            code: FailureCode::from(code),
            message: None,
        }
    }

    /// Attaches a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl From<FailureCode> for ConnectionFailure {
    fn from(code: FailureCode) -> Self {
        Self {
            code,
            message: None,
        }
    }
}

impl Display for ConnectionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// A connection lifecycle transition reported by the platform client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionEvent {
    /// The client connected.
    Connected,
    /// The connection was suspended.
    Suspended(SuspendCause),
    /// The connection attempt failed.
    Failed(ConnectionFailure),
}

impl ConnectionEvent {
    /// Returns the status this event transitions the registry to.
    pub fn status(&self) -> Status {
        match self {
            Self::Connected => Status::Connected,
            Self::Suspended(_) => Status::Suspended,
            Self::Failed(_) => Status::Failed,
        }
    }
}

impl Display for ConnectionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Suspended(cause) => write!(f, "suspended ({cause})"),
            Self::Failed(failure) => write!(f, "failed ({failure})"),
        }
    }
}

/// Opaque token identifying one platform feature to request at build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability(String);

impl Capability {
    /// Creates a capability descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the descriptor's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque access scope to request from the platform at build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope(String);

impl Scope {
    /// Creates an access scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the scope's name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options controlling registry behavior.
///
/// # Examples
///
/// ```rust
/// use connreg::RegistryOptions;
/// use std::time::Duration;
///
/// let opts = RegistryOptions::new()
///     .with_reconnect_on_suspend(true)
///     .with_wait_timeout(Duration::from_secs(5));
/// assert!(opts.reconnect_on_suspend);
/// ```
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Ask the client to connect again after a suspension has been dispatched.
    pub reconnect_on_suspend: bool,
    /// Capacity of the connection event channel.
    pub event_capacity: usize,
    /// Timeout used by `wait_for_connected`.
    pub wait_timeout: Duration,
}

impl RegistryOptions {
    /// Creates options with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a suspension triggers a reconnect.
    #[must_use]
    pub fn with_reconnect_on_suspend(mut self, reconnect: bool) -> Self {
        self.reconnect_on_suspend = reconnect;
        self
    }

    /// Sets the event channel capacity. Zero is raised to one.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Sets the timeout used by `wait_for_connected`.
    #[must_use]
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }
}

impl Default for RegistryOptions {
    /// Returns the default registry options.
    ///
    /// Defaults:
    /// - `reconnect_on_suspend`: `false` (the platform client restores the connection)
    /// - `event_capacity`: 64
    /// - `wait_timeout`: 30 seconds
    fn default() -> Self {
        Self {
            reconnect_on_suspend: false,
            event_capacity: defaults::EVENT_CAPACITY,
            wait_timeout: defaults::wait_timeout(),
        }
    }
}

/// Errors that can occur while using a connection registry.
///
/// Connection failures reported by the platform client are not errors of the
/// registry itself: they arrive as a [`Status::Failed`] transition. They only
/// surface here when a caller is explicitly waiting for a connection.
///
/// # Example
///
/// ```no_run
/// use connreg::{ClientFactory, ConnectionRegistry, RegistryError};
/// # async fn example<F: ClientFactory>(registry: ConnectionRegistry<F>) {
/// match registry.wait_for_connected().await {
///     Ok(()) => println!("connected"),
///     Err(RegistryError::ConnectionFailed(failure)) => eprintln!("failed: {failure}"),
///     Err(RegistryError::Timeout) => eprintln!("still waiting"),
///     Err(e) => eprintln!("error: {e}"),
/// }
/// # }
/// ```
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The operation needs a client but `init` has not been called.
    #[error("client not initialized")]
    NotInitialized,

    /// `init` was called on a registry that already holds a client.
    #[error("client already initialized")]
    AlreadyInitialized,

    /// The client factory could not build a client.
    #[error("failed to build client: {0}")]
    Build(String),

    /// A status wait timed out.
    #[error("timed out waiting for status")]
    Timeout,

    /// The connection failed while a caller was waiting for it.
    #[error("connection failed: {0}")]
    ConnectionFailed(ConnectionFailure),

    /// The registry was dropped while a caller was waiting on it.
    #[error("registry closed")]
    Closed,
}
