//! The test handle: where assertion outcomes go.
//!
//! # Design
//! Rust's test harness only knows "panicked" and "did not panic", so the
//! non-fatal half of the contract is provided here. `TestContext` collects
//! recoverable failures and panics with all of them when it is dropped,
//! which lets a single test surface every mismatch instead of the first.
//! Fatal reports panic on the spot.

use std::sync::Mutex;

/// Sink for the outcome of a request assertion.
pub trait Reporter {
    /// Record a failure and keep going.
    fn error(&self, message: String);

    /// Record a failure and abort the test.
    fn fatal(&self, message: String) -> !;
}

/// Default `Reporter` for `#[test]` functions.
///
/// ```should_panic
/// use http_tester::{Reporter, TestContext};
///
/// let t = TestContext::new();
/// t.error("first".to_string());
/// t.error("second".to_string());
/// // dropping `t` panics, listing both failures
/// ```
#[derive(Debug, Default)]
pub struct TestContext {
    failures: Mutex<Vec<String>>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failed(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Snapshot of the failures recorded so far.
    pub fn failures(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Drains the recorded failures. Anything drained is no longer reported
    /// when the context is dropped.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // a poisoned lock still holds valid failure messages
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for TestContext {
    fn error(&self, message: String) {
        tracing::warn!("{message}");
        self.lock().push(message);
    }

    fn fatal(&self, message: String) -> ! {
        tracing::error!("{message}");
        panic!("{message}");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let failures = self.take_failures();
        if !failures.is_empty() {
            panic!(
                "{} request assertion(s) failed:\n{}",
                failures.len(),
                failures.join("\n")
            );
        }
    }
}
