//! Dial-time address rewriting for virtual-host tests.
//!
//! # Design
//! Every hostname under the configured suffix resolves to `127.0.0.1` on the
//! port it was dialed with. The request URL is left alone, so the server
//! still sees the original name in `Host` and the cookie jar still scopes
//! cookies to it. One local server can then stand in for any number of
//! virtual hosts without DNS or `/etc/hosts` entries.
//!
//! The resolver belongs to one `ureq::Agent`; nothing process-wide changes.

use ureq::config::Config;
use ureq::http::uri::Authority;
use ureq::http::Uri;
use ureq::unversioned::resolver::{DefaultResolver, ResolvedSocketAddrs, Resolver};
use ureq::unversioned::transport::NextTimeout;

/// Loopback host every matching name is sent to.
pub const LOOPBACK: &str = "127.0.0.1";

/// Maps `host:port` to `127.0.0.1:port` when `host` ends with `suffix`.
///
/// Addresses that do not match are returned unchanged.
pub fn rewrite_dial_addr(addr: &str, suffix: &str) -> String {
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (addr, None),
    };
    if suffix.is_empty() || !host.ends_with(suffix) {
        return addr.to_string();
    }
    match port {
        Some(port) => format!("{LOOPBACK}:{port}"),
        None => LOOPBACK.to_string(),
    }
}

/// `Resolver` that applies [`rewrite_dial_addr`] before normal resolution.
#[derive(Debug)]
pub struct VhostResolver {
    suffix: String,
    inner: DefaultResolver,
}

impl VhostResolver {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            inner: DefaultResolver::default(),
        }
    }

    fn dial_uri(&self, uri: &Uri) -> Result<Option<Uri>, ureq::Error> {
        let Some(authority) = uri.authority() else {
            return Ok(None);
        };
        let dial = rewrite_dial_addr(authority.as_str(), &self.suffix);
        if dial == authority.as_str() {
            return Ok(None);
        }
        tracing::trace!(from = %authority, to = %dial, "rewriting dial address");
        let mut parts = uri.clone().into_parts();
        parts.authority = Some(
            dial.parse::<Authority>()
                .map_err(|e| ureq::Error::BadUri(e.to_string()))?,
        );
        let rewritten = Uri::from_parts(parts).map_err(|e| ureq::Error::BadUri(e.to_string()))?;
        Ok(Some(rewritten))
    }
}

impl Resolver for VhostResolver {
    fn resolve(
        &self,
        uri: &Uri,
        config: &Config,
        timeout: NextTimeout,
    ) -> Result<ResolvedSocketAddrs, ureq::Error> {
        match self.dial_uri(uri)? {
            Some(rewritten) => self.inner.resolve(&rewritten, config, timeout),
            None => self.inner.resolve(uri, config, timeout),
        }
    }

    fn empty(&self) -> ResolvedSocketAddrs {
        self.inner.empty()
    }
}
