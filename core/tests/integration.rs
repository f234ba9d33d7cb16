//! End-to-end tests against the live mock inbox.
//!
//! # Design
//! Starts the mock server on a random port, then drives `MsggoClient` with the
//! real `UreqTransport` over HTTP. Validates request building, the ureq
//! round trip, and response parsing together.

use std::net::SocketAddr;
use std::time::Duration;

use msggo_core::{ClientConfig, MsggoClient, MsggoError};
use serde_json::json;

const KEY: &str = "integration-key";

/// Start the mock server on a background thread and return its address.
fn start_server(inbox: mock_server::Inbox) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener, inbox).await
        })
        .unwrap();
    });

    addr
}

fn recorded(inbox: &mock_server::Inbox) -> Vec<serde_json::Value> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(inbox.events())
}

fn client_for(addr: SocketAddr, key: &str) -> MsggoClient {
    let config = ClientConfig::default()
        .base_url(format!("http://{addr}/"))
        .timeout(Some(Duration::from_secs(10)));
    MsggoClient::with_config(key, config).unwrap()
}

#[test]
fn event_lifecycle() {
    // Step 1: start mock server on a random port.
    let inbox = mock_server::Inbox::new(KEY);
    let addr = start_server(inbox.clone());
    let client = client_for(addr, KEY);
    assert!(!client.transport().is_open(), "agent should be acquired lazily");

    // Step 2: send an event; it is accepted and recorded verbatim.
    let accepted = client.send_event(&json!({"event": "signup", "plan": "pro"})).unwrap();
    assert_eq!(accepted.status, 200);
    assert_eq!(accepted.response, json!({"ok": true}));
    assert!(client.transport().is_open());
    assert_eq!(recorded(&inbox), vec![json!({"event": "signup", "plan": "pro"})]);

    // Step 3: the same payload again gives the same outcome.
    let again = client.send_event(&json!({"event": "signup", "plan": "pro"})).unwrap();
    assert_eq!(again, accepted);
    assert_eq!(recorded(&inbox).len(), 2);

    // Step 4: close releases the agent; a later send re-acquires it.
    client.close();
    client.close();
    assert!(!client.transport().is_open());
    client.send_event(&json!({"event": "login"})).unwrap();
    assert_eq!(recorded(&inbox).len(), 3);
    client.close();
}

#[test]
fn shared_client_survives_concurrent_sends_and_close() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 5;

    let inbox = mock_server::Inbox::new(KEY);
    let addr = start_server(inbox.clone());
    let client = client_for(addr, KEY);

    std::thread::scope(|s| {
        let senders: Vec<_> = (0..THREADS)
            .map(|t| {
                let client = &client;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        let accepted = client
                            .send_event(&json!({"thread": t, "seq": i}))
                            .unwrap_or_else(|e| panic!("thread {t} event {i}: {e}"));
                        assert_eq!(accepted.status, 200);
                    }
                })
            })
            .collect();

        // Release the agent repeatedly while sends are in flight.
        for _ in 0..PER_THREAD {
            client.close();
            std::thread::sleep(Duration::from_millis(2));
        }

        for sender in senders {
            sender.join().unwrap();
        }
    });

    let events = recorded(&inbox);
    assert_eq!(events.len(), THREADS * PER_THREAD);
    for t in 0..THREADS {
        let seen = events.iter().filter(|e| e["thread"] == json!(t)).count();
        assert_eq!(seen, PER_THREAD, "thread {t}");
    }
    client.close();
}

#[test]
fn wrong_key_is_an_auth_error() {
    let inbox = mock_server::Inbox::new(KEY);
    let addr = start_server(inbox.clone());
    let client = client_for(addr, "not-the-key");

    let err = client.send_event(&json!({"x": 1})).unwrap_err();
    let api = err.as_api().expect("api error");
    assert_eq!(api.status_code(), 401);
    assert_eq!(api.error_kind(), "auth_error");
    assert_eq!(api.message(), "Invalid key");
    assert!(recorded(&inbox).is_empty());
    assert!(!client.transport().is_open(), "transport is released on rejection");

    client.close();
}

#[test]
fn non_json_error_body_is_a_transport_error() {
    let addr = start_server(mock_server::Inbox::new(KEY));
    // The mock only routes `/inbox`; a path prefix yields an empty 404 body.
    let config = ClientConfig::default().base_url(format!("http://{addr}/missing"));
    let client = MsggoClient::with_config(KEY, config).unwrap();

    let err = client.send_event(&json!({"x": 1})).unwrap_err();
    match err {
        MsggoError::Transport(msg) => assert!(msg.contains("status: 404"), "{msg}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert!(!client.transport().is_open(), "transport is released on failure");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr, KEY);

    let err = client.send_event(&json!({"x": 1})).unwrap_err();
    assert!(matches!(err, MsggoError::Transport(_)));
    assert!(!client.transport().is_open());
    client.close();
}
