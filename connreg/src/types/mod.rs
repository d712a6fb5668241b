//! Type definitions and constants.
//!
//! This module contains platform callback codes and registry defaults.

pub(crate) mod constants;
