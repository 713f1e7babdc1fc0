//! Status and body-prefix comparison shared by both request variants.
//!
//! # Design
//! The two checks are independent: a response can fail either, both or
//! neither, and each failure is its own report. The body check is
//! `starts_with`, never equality, so callers pin only the part they care
//! about.

use crate::report::Reporter;

/// What was sent, kept for failure messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Exchange<'a> {
    pub method: &'a str,
    pub target: &'a str,
    pub payload: &'a str,
}

/// Compares the observed response with the expectation, reporting each
/// mismatch separately. Returns the number of failures reported.
pub(crate) fn check_response<R: Reporter + ?Sized>(
    t: &R,
    exchange: Exchange<'_>,
    status: u16,
    body: &str,
    expected_status: u16,
    expected_body: &str,
) -> usize {
    let Exchange {
        method,
        target,
        payload,
    } = exchange;
    let mut failures = 0;
    if status != expected_status {
        t.error(format!(
            "tested {method} {target} {payload:?}: wrong status code: got {status}, want {expected_status}"
        ));
        failures += 1;
    }
    if !body.starts_with(expected_body) {
        t.error(format!(
            "tested {method} {target} {payload:?}: unexpected body: got {body:?}, want prefix {expected_body:?}"
        ));
        failures += 1;
    }
    failures
}
