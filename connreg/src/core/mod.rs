//! Core internal logic for the connection registry.
//!
//! This module contains the platform client seams, listener storage,
//! event dispatch and status waiting.

pub(crate) mod client;
pub(crate) mod dispatch;
pub(crate) mod listeners;
pub(crate) mod state_wait;
