//! Real-time monitoring of connection events.

pub(crate) mod events;
