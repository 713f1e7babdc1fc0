//! Requests against an in-process handler.
//!
//! # Design
//! The handler is any `tower::Service` over axum requests, which covers a
//! `Router` as well as bare `service_fn`s. The blocking entry point drives
//! it on a private current-thread runtime, so it must be called from plain
//! `#[test]` functions; async tests use the `_async` variant instead.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::{BoxError, Service, ServiceExt};

use crate::check::{check_response, Exchange};
use crate::error::TesterError;
use crate::report::Reporter;

/// Sends one request to `handler` and checks status and body prefix.
///
/// Mismatches are reported through `t.error` and the body is returned
/// either way, decoded lossily when it is not UTF-8. A request that cannot
/// be built or a body that cannot be read goes to `t.fatal`.
#[allow(clippy::too_many_arguments)]
pub fn do_request_on_handler<R, S>(
    t: &R,
    handler: S,
    method: &str,
    route: &str,
    auth_header: &str,
    payload: &str,
    expected_status: u16,
    expected_body: &str,
) -> String
where
    R: Reporter + ?Sized,
    S: Service<Request<Body>, Response = Response>,
    S::Error: Into<BoxError>,
{
    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(TesterError::from)
        .and_then(|runtime| {
            runtime.block_on(exchange(handler, method, route, auth_header, payload))
        });
    finish(t, outcome, method, route, payload, expected_status, expected_body)
}

/// Same as [`do_request_on_handler`], for callers already inside a runtime.
#[allow(clippy::too_many_arguments)]
pub async fn do_request_on_handler_async<R, S>(
    t: &R,
    handler: S,
    method: &str,
    route: &str,
    auth_header: &str,
    payload: &str,
    expected_status: u16,
    expected_body: &str,
) -> String
where
    R: Reporter + ?Sized,
    S: Service<Request<Body>, Response = Response>,
    S::Error: Into<BoxError>,
{
    let outcome = exchange(handler, method, route, auth_header, payload).await;
    finish(t, outcome, method, route, payload, expected_status, expected_body)
}

fn finish<R: Reporter + ?Sized>(
    t: &R,
    outcome: Result<(u16, String), TesterError>,
    method: &str,
    route: &str,
    payload: &str,
    expected_status: u16,
    expected_body: &str,
) -> String {
    let (status, body) = match outcome {
        Ok(observed) => observed,
        Err(e) => t.fatal(format!("{method} {route}: {e}")),
    };
    let exchange = Exchange {
        method,
        target: route,
        payload,
    };
    check_response(t, exchange, status, &body, expected_status, expected_body);
    body
}

async fn exchange<S>(
    handler: S,
    method: &str,
    route: &str,
    auth_header: &str,
    payload: &str,
) -> Result<(u16, String), TesterError>
where
    S: Service<Request<Body>, Response = Response>,
    S::Error: Into<BoxError>,
{
    let request = Request::builder()
        .method(method)
        .uri(route)
        .header(header::AUTHORIZATION, auth_header)
        .body(Body::from(payload.to_owned()))?;
    tracing::debug!(%method, %route, "calling handler");

    let response = handler
        .oneshot(request)
        .await
        .map_err(|e| {
            let e: BoxError = e.into();
            TesterError::Handler(e.to_string())
        })?;
    let status = response.status().as_u16();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| TesterError::Body(e.to_string()))?
        .to_bytes();
    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}
