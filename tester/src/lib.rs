//! Request-and-assert helpers for HTTP tests.
//!
//! # Overview
//! One call builds a request, sends it, and checks the status code and the
//! start of the response body. It runs either against an in-process handler
//! ([`do_request_on_handler`]) or against a live server over the network
//! ([`do_request_on_server`]). Mismatches are reported through a
//! [`Reporter`] and the test keeps going; a request that cannot be built or
//! delivered aborts the test.
//!
//! # Design
//! - [`TestContext`] is the default reporter: it collects mismatches and
//!   panics with all of them when the test ends.
//! - [`Session`] owns one HTTP agent and its cookie jar. Reusing it carries
//!   cookies across calls; nothing is shared process-wide.
//! - Hosts under [`DEFAULT_VHOST_SUFFIX`] dial `127.0.0.1`, so a single local
//!   server can be addressed under many virtual host names.
//!
//! ```no_run
//! use http_tester::{create_server_tester, Session, TestContext};
//!
//! let t = TestContext::new();
//! let session = Session::new();
//! let tester = create_server_tester(&t, "app.vestibule.io", 8080, Some(&session));
//! tester("POST", "/login", "", "ada", 200, "logged in");
//! tester("GET", "/whoami", "", "", 200, "user:ada");
//! ```

mod check;
pub mod config;
pub mod error;
pub mod handler;
pub mod report;
pub mod resolver;
pub mod server;
pub mod session;
pub mod target;

pub use config::{TesterConfig, DEFAULT_VHOST_SUFFIX};
pub use error::TesterError;
pub use handler::{do_request_on_handler, do_request_on_handler_async};
pub use report::{Reporter, TestContext};
pub use resolver::{rewrite_dial_addr, VhostResolver};
pub use server::{create_server_tester, do_request_on_server, do_request_on_target, ServerTester};
pub use session::Session;
pub use target::Target;
