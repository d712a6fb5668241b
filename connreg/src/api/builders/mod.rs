//! Builders for platform client configuration.
//!
//! Most users pass capabilities straight to
//! [`ConnectionRegistry::init`](crate::ConnectionRegistry::init). Use
//! [`ClientConfig`] with
//! [`init_with_config`](crate::ConnectionRegistry::init_with_config) when the
//! platform client also needs access scopes.

pub mod client_config;

pub use client_config::ClientConfig;
