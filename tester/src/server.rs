//! Requests against a live server.
//!
//! # Design
//! Each call resolves its target to a URL, sends it through either the
//! caller's [`Session`] or a throwaway agent, and checks the outcome exactly
//! like the in-process variant. Transport failures are fatal; there is no
//! retry.
//!
//! An empty payload is sent with no body at all, which keeps `GET` and
//! `HEAD` requests standard. Non-empty payloads go out as raw text. Response
//! bodies are read without a size limit and decoded lossily, so any body the
//! server sends reaches the prefix check.

use ureq::http::{header, Request};
use ureq::Agent;

use crate::check::{check_response, Exchange};
use crate::config::TesterConfig;
use crate::error::TesterError;
use crate::report::Reporter;
use crate::session::{build_agent, Session};
use crate::target::Target;

/// Sends one request to `hostname:port` and checks status and body prefix.
///
/// `target` starting with `/` is a path on `hostname`; anything else is an
/// alternate hostname requested at `/` on the same port. Use
/// [`do_request_on_target`] to say which one explicitly.
#[allow(clippy::too_many_arguments)]
pub fn do_request_on_server<R: Reporter + ?Sized>(
    t: &R,
    hostname: &str,
    port: u16,
    session: Option<&Session>,
    method: &str,
    target: &str,
    auth_header: &str,
    payload: &str,
    expected_status: u16,
    expected_body: &str,
) -> String {
    do_request_on_target(
        t,
        hostname,
        port,
        session,
        method,
        &Target::infer(target),
        auth_header,
        payload,
        expected_status,
        expected_body,
    )
}

/// [`do_request_on_server`] with an explicit [`Target`].
#[allow(clippy::too_many_arguments)]
pub fn do_request_on_target<R: Reporter + ?Sized>(
    t: &R,
    hostname: &str,
    port: u16,
    session: Option<&Session>,
    method: &str,
    target: &Target,
    auth_header: &str,
    payload: &str,
    expected_status: u16,
    expected_body: &str,
) -> String {
    match session {
        Some(session) => exchange_over(
            t,
            session.agent(),
            hostname,
            port,
            method,
            target,
            auth_header,
            payload,
            expected_status,
            expected_body,
        ),
        None => exchange_over(
            t,
            &build_agent(&TesterConfig::default()),
            hostname,
            port,
            method,
            target,
            auth_header,
            payload,
            expected_status,
            expected_body,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn exchange_over<R: Reporter + ?Sized>(
    t: &R,
    agent: &Agent,
    hostname: &str,
    port: u16,
    method: &str,
    target: &Target,
    auth_header: &str,
    payload: &str,
    expected_status: u16,
    expected_body: &str,
) -> String {
    let url = target.url(hostname, port);
    let outcome = send(agent, method, &url, auth_header, payload);
    let (status, body) = match outcome {
        Ok(observed) => observed,
        Err(e) => t.fatal(format!("{method} {url}: {e}")),
    };
    let exchange = Exchange {
        method,
        target: &url,
        payload,
    };
    check_response(t, exchange, status, &body, expected_status, expected_body);
    body
}

fn send(
    agent: &Agent,
    method: &str,
    url: &str,
    auth_header: &str,
    payload: &str,
) -> Result<(u16, String), TesterError> {
    let builder = Request::builder()
        .method(method)
        .uri(url)
        .header(header::AUTHORIZATION, auth_header);
    tracing::debug!(%method, %url, "sending request");

    let mut response = if payload.is_empty() {
        agent.run(builder.body(())?)?
    } else {
        agent.run(builder.body(payload)?)?
    };
    let status = response.status().as_u16();
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;
    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}

/// Binds `t`, `hostname`, `port` and `session` for repeated calls.
///
/// The returned closure takes `(method, target, auth_header, payload,
/// expected_status, expected_body)` and discards the response body; use
/// [`ServerTester`] when the body is needed.
pub fn create_server_tester<'a, R: Reporter + ?Sized>(
    t: &'a R,
    hostname: &'a str,
    port: u16,
    session: Option<&'a Session>,
) -> impl Fn(&str, &str, &str, &str, u16, &str) + 'a {
    move |method, target, auth_header, payload, expected_status, expected_body| {
        do_request_on_server(
            t,
            hostname,
            port,
            session,
            method,
            target,
            auth_header,
            payload,
            expected_status,
            expected_body,
        );
    }
}

/// Reusable binding of a reporter, server address and optional session.
///
/// Without a session each request gets a fresh agent built from the
/// tester's [`TesterConfig`]; with one, the session's own config applies.
pub struct ServerTester<'a, R: Reporter + ?Sized> {
    t: &'a R,
    hostname: String,
    port: u16,
    session: Option<&'a Session>,
    config: TesterConfig,
}

impl<'a, R: Reporter + ?Sized> ServerTester<'a, R> {
    pub fn new(t: &'a R, hostname: &str, port: u16, session: Option<&'a Session>) -> Self {
        Self {
            t,
            hostname: hostname.to_string(),
            port,
            session,
            config: TesterConfig::default(),
        }
    }

    /// Config used for sessionless requests.
    pub fn with_config(mut self, config: TesterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// See [`do_request_on_server`].
    pub fn request(
        &self,
        method: &str,
        target: &str,
        auth_header: &str,
        payload: &str,
        expected_status: u16,
        expected_body: &str,
    ) -> String {
        self.request_target(
            method,
            &Target::infer(target),
            auth_header,
            payload,
            expected_status,
            expected_body,
        )
    }

    /// See [`do_request_on_target`]; sessionless requests use [`Self::config`].
    pub fn request_target(
        &self,
        method: &str,
        target: &Target,
        auth_header: &str,
        payload: &str,
        expected_status: u16,
        expected_body: &str,
    ) -> String {
        let fresh;
        let agent = match self.session {
            Some(session) => session.agent(),
            None => {
                fresh = build_agent(&self.config);
                &fresh
            }
        };
        exchange_over(
            self.t,
            agent,
            &self.hostname,
            self.port,
            method,
            target,
            auth_header,
            payload,
            expected_status,
            expected_body,
        )
    }
}
