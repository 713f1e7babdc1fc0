//! Requests against the live mock server.
//!
//! # Design
//! Every test starts its own mock server on a random loopback port, running
//! on a background thread with its own tokio runtime, then talks to it over
//! real HTTP. Virtual-host tests rely on `*.vestibule.io` dialing
//! `127.0.0.1`, so no DNS is involved. Broken responses come from a raw TCP
//! responder instead of axum.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use axum::routing::get;
use axum::Router;

use http_tester::{
    create_server_tester, do_request_on_server, do_request_on_target, ServerTester, Session,
    Target, TestContext, TesterConfig,
};

fn spawn_router(app: Router) -> u16 {
    let std_listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = std_listener.local_addr().unwrap().port();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app).await
        })
        .unwrap();
    });

    port
}

fn spawn_server() -> u16 {
    spawn_router(mock_server::app())
}

/// Answers every connection with `response` after reading the request head,
/// then closes the socket.
fn spawn_raw(response: &'static [u8]) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { return };
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(response);
            let _ = stream.flush();
        }
    });

    port
}

#[test]
fn path_target_uses_configured_host() {
    let port = spawn_server();
    let t = TestContext::new();
    let body = do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/health", "", "", 200, "ok");
    assert_eq!(body, "ok");
}

#[test]
fn host_target_is_dialed_on_loopback_with_original_host_header() {
    let port = spawn_server();
    let t = TestContext::new();
    let body = do_request_on_server(
        &t,
        "127.0.0.1",
        port,
        None,
        "GET",
        "alpha.vestibule.io",
        "",
        "",
        200,
        "alpha.vestibule.io",
    );
    assert!(body.starts_with("alpha.vestibule.io"), "host header was {body:?}");
}

#[test]
fn distinct_virtual_hosts_share_one_server() {
    let port = spawn_server();
    let t = TestContext::new();
    for host in ["one.vestibule.io", "two.vestibule.io", "vestibule.io"] {
        let body = do_request_on_server(&t, host, port, None, "GET", "/", "", "", 200, host);
        assert!(body.starts_with(host));
    }
}

#[test]
fn payload_and_auth_header_are_sent_raw() {
    let port = spawn_server();
    let t = TestContext::new();
    let body = do_request_on_server(
        &t,
        "127.0.0.1",
        port,
        None,
        "PUT",
        "/echo",
        "Bearer t",
        "hello world",
        200,
        "PUT auth=Bearer t body=hello world",
    );
    assert_eq!(body, "PUT auth=Bearer t body=hello world");
}

#[test]
fn created_item_can_be_fetched() {
    let port = spawn_server();
    let t = TestContext::new();
    let tester = ServerTester::new(&t, "127.0.0.1", port, None);

    let body = tester.request("POST", "/items", "", r#"{"name":"lamp"}"#, 201, "created:");
    assert_eq!(body, "created:1");
    tester.request("GET", "/items/1", "", "", 200, r#"{"id":1,"name":"lamp"}"#);
    tester.request("GET", "/items/2", "", "", 404, "");
}

#[test]
fn mismatches_are_reported_and_the_test_continues() {
    let port = spawn_server();
    let t = TestContext::new();
    let body = do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/whoami", "", "", 200, "user:");
    assert_eq!(body, "unauthorized");

    let failures = t.take_failures();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].contains(&format!("GET http://127.0.0.1:{port}/whoami")));
    assert!(failures[0].contains("got 401, want 200"));
}

#[test]
fn session_carries_cookies_between_calls() {
    let port = spawn_server();
    let t = TestContext::new();
    let session = Session::new();

    do_request_on_server(&t, "app.vestibule.io", port, Some(&session), "POST", "/login", "", "ada", 200, "logged in:ada");
    let body = do_request_on_server(&t, "app.vestibule.io", port, Some(&session), "GET", "/whoami", "", "", 200, "user:");
    assert_eq!(body, "user:ada");
}

#[test]
fn without_a_session_nothing_is_remembered() {
    let port = spawn_server();
    let t = TestContext::new();

    do_request_on_server(&t, "app.vestibule.io", port, None, "POST", "/login", "", "ada", 200, "logged in");
    do_request_on_server(&t, "app.vestibule.io", port, None, "GET", "/whoami", "", "", 401, "unauthorized");
}

#[test]
fn sessions_do_not_share_cookies() {
    let port = spawn_server();
    let t = TestContext::new();
    let (ada, bob) = (Session::new(), Session::new());

    do_request_on_server(&t, "app.vestibule.io", port, Some(&ada), "POST", "/login", "", "ada", 200, "");
    do_request_on_server(&t, "app.vestibule.io", port, Some(&bob), "POST", "/login", "", "bob", 200, "");
    do_request_on_server(&t, "app.vestibule.io", port, Some(&ada), "GET", "/whoami", "", "", 200, "user:ada");
    do_request_on_server(&t, "app.vestibule.io", port, Some(&bob), "GET", "/whoami", "", "", 200, "user:bob");
}

#[test]
fn clearing_cookies_ends_the_session() {
    let port = spawn_server();
    let t = TestContext::new();
    let session = Session::new();
    let tester = ServerTester::new(&t, "app.vestibule.io", port, Some(&session));

    tester.request("POST", "/login", "", "ada", 200, "logged in");
    tester.request("GET", "/whoami", "", "", 200, "user:ada");
    session.clear_cookies();
    tester.request("GET", "/whoami", "", "", 401, "unauthorized");
}

#[test]
fn factory_binds_hostname_and_port_in_order() {
    let port = spawn_server();
    let t = TestContext::new();
    let session = Session::new();
    let tester = create_server_tester(&t, "factory.vestibule.io", port, Some(&session));

    tester("GET", "/", "", "", 200, "factory.vestibule.io");
    tester("GET", "/health", "", "", 200, "ok");
    tester("POST", "/login", "", "eve", 200, "logged in:eve");
    tester("GET", "/whoami", "", "", 200, "user:eve");
    tester("GET", "other.vestibule.io", "", "", 200, "other.vestibule.io");
    assert!(!t.failed());
}

#[test]
fn explicit_url_target() {
    let port = spawn_server();
    let t = TestContext::new();
    let url = Target::Url(format!("http://127.0.0.1:{port}/health"));
    let body = do_request_on_target(&t, "ignored", 1, None, "GET", &url, "", "", 200, "ok");
    assert_eq!(body, "ok");
}

#[test]
fn custom_suffix_routes_to_loopback() {
    let port = spawn_server();
    let t = TestContext::new();
    let session = Session::with_config(
        TesterConfig::default()
            .with_vhost_suffix("test.local")
            .with_connect_timeout(Duration::from_secs(5)),
    );
    assert_eq!(session.config().vhost_suffix, "test.local");

    let tester = ServerTester::new(&t, "svc.test.local", port, Some(&session));
    let body = tester.request_target("GET", &Target::Path("/".to_string()), "", "", 200, "svc.test.local");
    assert!(body.starts_with("svc.test.local"));
    assert_eq!(tester.hostname(), "svc.test.local");
    assert_eq!(tester.port(), port);
}

#[test]
fn sessionless_tester_uses_its_own_config() {
    let port = spawn_server();
    let t = TestContext::new();
    let tester = ServerTester::new(&t, "svc.test.local", port, None)
        .with_config(TesterConfig::default().with_vhost_suffix("test.local"));
    assert_eq!(tester.config().vhost_suffix, "test.local");

    let body = tester.request("GET", "/", "", "", 200, "svc.test.local");
    assert!(body.starts_with("svc.test.local"));
    tester.request("GET", "/health", "", "", 200, "ok");
}

#[test]
fn bodies_over_ten_mebibytes_are_read_whole() {
    const SIZE: usize = 11 * 1024 * 1024;
    let port = spawn_router(Router::new().route("/big", get(|| async { "a".repeat(SIZE) })));
    let t = TestContext::new();

    let body = do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/big", "", "", 200, "aaaa");
    assert_eq!(body.len(), SIZE);
}

#[test]
fn binary_body_is_compared_not_fatal() {
    let port = spawn_router(
        Router::new().route("/bin", get(|| async { vec![0xffu8, 0xfe, b'x'] })),
    );
    let t = TestContext::new();

    let body = do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/bin", "", "", 200, "");
    assert_eq!(body, "\u{FFFD}\u{FFFD}x");
    assert!(!t.failed());

    do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/bin", "", "", 200, "x");
    let failures = t.take_failures();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("unexpected body"));
}

#[test]
#[should_panic(expected = "transport failed")]
fn truncated_body_aborts() {
    let port = spawn_raw(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello");
    let t = TestContext::new();
    do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/", "", "", 200, "hello");
}

#[test]
#[should_panic(expected = "transport failed")]
fn connection_refused_aborts() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let t = TestContext::new();
    do_request_on_server(&t, "127.0.0.1", port, None, "GET", "/health", "", "", 200, "ok");
}

#[test]
#[should_panic(expected = "invalid request")]
fn malformed_method_aborts() {
    let port = spawn_server();
    let t = TestContext::new();
    do_request_on_server(&t, "127.0.0.1", port, None, "NOT VALID", "/health", "", "", 200, "ok");
}
