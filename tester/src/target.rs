//! Where a network request goes.
//!
//! The string entry points take a single `target` and guess its meaning from
//! a leading slash. `Target` keeps the two forms apart and adds a third for
//! callers that already hold a full URL.

use std::fmt;

/// Destination of a request against a live server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path on the configured hostname, e.g. `/health`.
    Path(String),
    /// Alternate hostname on the configured port, requested at `/`.
    Host(String),
    /// Fully qualified URL, used as-is.
    Url(String),
}

impl Target {
    /// `/`-prefixed strings are paths, anything else is a hostname.
    pub fn infer(target: &str) -> Self {
        if target.starts_with('/') {
            Target::Path(target.to_string())
        } else {
            Target::Host(target.to_string())
        }
    }

    pub fn url(&self, hostname: &str, port: u16) -> String {
        match self {
            Target::Path(path) => format!("http://{hostname}:{port}{path}"),
            Target::Host(host) => format!("http://{host}:{port}"),
            Target::Url(url) => url.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Path(s) | Target::Host(s) | Target::Url(s) => f.write_str(s),
        }
    }
}
