//! Transport settings for requests against a live server.
//!
//! # Design
//! `TesterConfig::default()` carries the fixed values: 30 s connect timeout,
//! 30 s idle keep-alive, `vestibule.io` as the virtual-host suffix. A config
//! is consumed when an agent is built, by a `Session` or by a sessionless
//! `ServerTester`, and never changes afterwards.

use std::time::Duration;

/// Domain whose subdomains are all routed to the loopback address.
pub const DEFAULT_VHOST_SUFFIX: &str = "vestibule.io";

/// Transport settings for the network variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TesterConfig {
    pub connect_timeout: Duration,
    /// How long an idle pooled connection is kept for reuse.
    pub keep_alive: Duration,
    /// Hosts ending with this suffix dial `127.0.0.1` instead of DNS.
    pub vhost_suffix: String,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            keep_alive: Duration::from_secs(30),
            vhost_suffix: DEFAULT_VHOST_SUFFIX.to_string(),
        }
    }
}

impl TesterConfig {
    pub fn with_vhost_suffix(mut self, suffix: &str) -> Self {
        self.vhost_suffix = suffix.to_string();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
