//! Constants for platform connectivity client callback values.
//!
//! These constants correspond to the numeric codes a platform client passes
//! to the suspended and connection-failed callbacks.

/// Cause codes passed to the connection-suspended callback.
pub mod suspend_cause {
    pub const SERVICE_DISCONNECTED: i32 = 1;
    pub const NETWORK_LOST: i32 = 2;
}

/// Result codes passed to the connection-failed callback.
pub mod failure_code {
    pub const SERVICE_MISSING: i32 = 1;
    pub const SERVICE_VERSION_UPDATE_REQUIRED: i32 = 2;
    pub const SERVICE_DISABLED: i32 = 3;
    pub const SIGN_IN_REQUIRED: i32 = 4;
    pub const INVALID_ACCOUNT: i32 = 5;
    pub const RESOLUTION_REQUIRED: i32 = 6;
    pub const NETWORK_ERROR: i32 = 7;
    pub const INTERNAL_ERROR: i32 = 8;
    pub const SERVICE_INVALID: i32 = 9;
    pub const DEVELOPER_ERROR: i32 = 10;
    pub const LICENSE_CHECK_FAILED: i32 = 11;
    pub const CANCELED: i32 = 13;
    pub const TIMEOUT: i32 = 14;
    pub const INTERRUPTED: i32 = 15;
    pub const API_UNAVAILABLE: i32 = 16;
    pub const SIGN_IN_FAILED: i32 = 17;
    pub const SERVICE_UPDATING: i32 = 18;
    pub const SERVICE_MISSING_PERMISSION: i32 = 19;
    pub const RESTRICTED_PROFILE: i32 = 20;
}

/// Defaults for registry options.
pub mod defaults {
    use std::time::Duration;

    /// Capacity of the broadcast channel carrying connection events.
    ///
    /// Subscribers that fall further behind than this will observe a lag
    /// and skip the oldest events.
    pub const EVENT_CAPACITY: usize = 64;

    /// Default time to wait for a status transition (30 seconds).
    const WAIT_TIMEOUT_SECS: u64 = 30;

    /// Returns the default status wait timeout.
    pub fn wait_timeout() -> Duration {
        Duration::from_secs(WAIT_TIMEOUT_SECS)
    }
}
