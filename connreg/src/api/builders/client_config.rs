//! Build configuration handed to a [`ClientFactory`](crate::ClientFactory).
//!
//! A `ClientConfig` collects the capabilities and access scopes the platform
//! client should request when it is built. The registry passes it to the
//! factory unchanged; what each capability or scope means is up to the
//! platform.
//!
//! # Example
//!
//! ```rust
//! use connreg::builders::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .capability("fitness.sensors")
//!     .scope("fitness.location.read");
//!
//! assert_eq!(config.capabilities().len(), 1);
//! assert_eq!(config.scopes()[0].name(), "fitness.location.read");
//! ```

use crate::api::models::{Capability, Scope};

/// Capabilities and scopes to request from the platform client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    capabilities: Vec<Capability>,
    scopes: Vec<Scope>,
}

impl ClientConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a capability to request. Order is preserved.
    #[must_use]
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(Capability::new(capability));
        self
    }

    /// Adds several capabilities at once.
    #[must_use]
    pub fn capabilities_from<I>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = Capability>,
    {
        self.capabilities.extend(capabilities);
        self
    }

    /// Adds an access scope to request.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(Scope::new(scope));
        self
    }

    /// Returns the requested capabilities in insertion order.
    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// Returns the requested scopes in insertion order.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}

impl From<Vec<Capability>> for ClientConfig {
    fn from(capabilities: Vec<Capability>) -> Self {
        Self::new().capabilities_from(capabilities)
    }
}
