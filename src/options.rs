// Copyright 2023 Behavior Tree Project Authors. Licensed under Apache-2.0.

//! Options for the simulator client and the tree runner

use std::time::Duration;

/// Default cap on outstanding requests, inherited from the remote API's
/// connection table size.
pub const MAX_IN_FLIGHT: usize = 255;

/// Config for the underlying simulator connection.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Timeout for establishing the connection.
    ///
    /// Default value is 3s.
    pub connect_timeout: Duration,
    /// Timeout for a single request when the context does not override it.
    ///
    /// Default value is 5s.
    pub request_timeout: Duration,
    /// Max number of outstanding requests on one connection.
    ///
    /// Default value is 255.
    pub max_in_flight: usize,
    /// Initial capacity of the read buffer in bytes.
    ///
    /// Default value is 16KB.
    pub read_buffer_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            max_in_flight: MAX_IN_FLIGHT,
            // 16KB
            read_buffer_size: 16 * (1 << 10),
        }
    }
}

/// Options for driving a tree with [`TreeRunner`].
///
/// [`TreeRunner`]: crate::engine::TreeRunner
#[derive(Debug, Clone)]
pub struct TickOptions {
    /// Interval between two root ticks.
    ///
    /// Default value is 100ms.
    pub tick_interval: Duration,
    /// Abort the run after this many root ticks.
    ///
    /// Unlimited if not set.
    pub max_ticks: Option<u64>,
}

impl Default for TickOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            max_ticks: None,
        }
    }
}
