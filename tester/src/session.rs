//! Caller-owned cookie store for a sequence of network requests.
//!
//! # Design
//! A `Session` is one `ureq::Agent` with its own cookie jar, connection pool
//! and [`VhostResolver`]. Reuse the same session across calls to carry
//! cookies from one response into the next request; calls made without a
//! session get a throwaway agent and keep nothing.

use ureq::config::IpFamily;
use ureq::unversioned::transport::DefaultConnector;
use ureq::Agent;

use crate::config::TesterConfig;
use crate::resolver::VhostResolver;

#[derive(Debug, Clone)]
pub struct Session {
    agent: Agent,
    config: TesterConfig,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(TesterConfig::default())
    }

    pub fn with_config(config: TesterConfig) -> Self {
        Self {
            agent: build_agent(&config),
            config,
        }
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub(crate) fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Forgets every cookie collected so far.
    pub fn clear_cookies(&self) {
        self.agent.cookie_jar_lock().clear();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Agent that returns 4xx/5xx as data, ignores proxy env vars and dials
/// through the vhost resolver.
pub(crate) fn build_agent(config: &TesterConfig) -> Agent {
    let agent_config = Agent::config_builder()
        .http_status_as_error(false)
        .proxy(None)
        .timeout_connect(Some(config.connect_timeout))
        .max_idle_age(config.keep_alive)
        .ip_family(IpFamily::Any)
        .build();
    Agent::with_parts(
        agent_config,
        DefaultConnector::default(),
        VhostResolver::new(&config.vhost_suffix),
    )
}
