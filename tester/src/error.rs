//! Errors that abort a test.
//!
//! # Design
//! Only conditions that make the test itself meaningless live here: a request
//! that cannot be built, a transport that cannot deliver it, a body that
//! cannot be read. Status and body mismatches are not errors; they go through
//! `Reporter::error` and the test keeps running.

use thiserror::Error;

/// Fatal conditions raised while issuing a request.
#[derive(Debug, Error)]
pub enum TesterError {
    /// Method, URI or header value was rejected by the request builder.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] axum::http::Error),

    /// The in-process runtime could not be started.
    #[error("runtime setup failed: {0}")]
    Runtime(#[from] std::io::Error),

    /// DNS, connect or read failure on the network path.
    #[error("transport failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The in-process handler returned an error instead of a response.
    #[error("handler failed: {0}")]
    Handler(String),

    /// The response body could not be collected.
    #[error("reading body failed: {0}")]
    Body(String),
}
