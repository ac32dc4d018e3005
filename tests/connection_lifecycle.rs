//! Integration tests for departures, keepalive, and protocol errors.

mod common;

use common::{ServerOptions, TestServer};
use slchat_proto::{ClientMessage, ServerMessage};
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_abrupt_disconnect_sends_empty_farewell() {
    let server = TestServer::spawn(17201)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("Alice").await.unwrap();
    let mut bob = server.connect("Bob").await.unwrap();
    alice.join().await.unwrap();
    bob.join().await.unwrap();

    // Bob vanishes without a leave
    drop(bob);

    assert_eq!(alice.recv().await.unwrap(), ServerMessage::chat("Bob", ""));
    assert_eq!(alice.list().await.unwrap(), vec!["Alice"]);
}

#[tokio::test]
async fn test_leave_closes_session_with_one_farewell() {
    let server = TestServer::spawn(17202)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("Alice").await.unwrap();
    let mut bob = server.connect("Bob").await.unwrap();
    alice.join().await.unwrap();
    bob.join().await.unwrap();

    bob.leave("see you").await.unwrap();
    bob.expect_closed(Duration::from_secs(5))
        .await
        .expect("server closes the session after leave");

    assert_eq!(alice.recv().await.unwrap(), ServerMessage::chat("Bob", "see you"));
    alice.expect_silence(QUIET).await.expect("no second farewell");
}

#[tokio::test]
async fn test_ping_answered_keeps_session() {
    let options = ServerOptions {
        ping: 1,
        timeout: 2,
        ..ServerOptions::default()
    };
    let server = TestServer::spawn_with(17203, options)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("Alice").await.unwrap();
    alice.join().await.unwrap();

    for _ in 0..2 {
        let token = match alice.recv().await.unwrap() {
            ServerMessage::Ping { token } => token,
            other => panic!("Expected ping, got {other:?}"),
        };
        alice.send(ClientMessage::Pong { token }).await.unwrap();
    }

    assert_eq!(alice.list().await.unwrap(), vec!["Alice"]);
}

#[tokio::test]
async fn test_ping_timeout_departs_participant() {
    let options = ServerOptions {
        ping: 1,
        timeout: 1,
        ..ServerOptions::default()
    };
    let server = TestServer::spawn_with(17204, options)
        .await
        .expect("Failed to spawn test server");

    let mut watcher = server.connect("Watcher").await.unwrap();
    let mut sleeper = server.connect("Sleeper").await.unwrap();
    watcher.join().await.unwrap();
    sleeper.join().await.unwrap();

    // Sleeper never answers
    let sleeper_task = tokio::spawn(async move {
        let mut frames = Vec::new();
        while let Ok(msg) = sleeper.recv_timeout(Duration::from_secs(5)).await {
            frames.push(msg);
        }
        frames
    });

    // Watcher answers every ping until the farewell shows up
    let farewell = loop {
        match watcher.recv().await.unwrap() {
            ServerMessage::Ping { token } => {
                watcher.send(ClientMessage::Pong { token }).await.unwrap();
            }
            other => break other,
        }
    };
    assert_eq!(farewell, ServerMessage::chat("Sleeper", ""));

    let sleeper_frames = sleeper_task.await.unwrap();
    assert!(matches!(sleeper_frames.first(), Some(ServerMessage::Ping { .. })));
    assert!(matches!(
        sleeper_frames.last(),
        Some(ServerMessage::Error { message }) if message.starts_with("Ping timeout")
    ));
}

#[tokio::test]
async fn test_oversized_line_is_recoverable() {
    let options = ServerOptions {
        max_line_len: 128,
        ..ServerOptions::default()
    };
    let server = TestServer::spawn_with(17205, options)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("Alice").await.unwrap();
    alice.join().await.unwrap();

    let long_body = "x".repeat(512);
    alice.chat(&long_body).await.unwrap();

    match alice.recv().await.unwrap() {
        ServerMessage::Error { message } => assert!(message.contains("too long"), "{message}"),
        other => panic!("Expected error, got {other:?}"),
    }
    assert_eq!(alice.list().await.unwrap(), vec!["Alice"]);
}

#[tokio::test]
async fn test_malformed_frame_is_fatal() {
    let server = TestServer::spawn(17206)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("Alice").await.unwrap();
    let mut bob = server.connect("Bob").await.unwrap();
    alice.join().await.unwrap();
    bob.join().await.unwrap();

    bob.send_raw("this is not json").await.unwrap();

    match bob.recv().await.unwrap() {
        ServerMessage::Error { message } => assert!(message.starts_with("Malformed message")),
        other => panic!("Expected error, got {other:?}"),
    }
    bob.expect_closed(Duration::from_secs(5)).await.unwrap();

    assert_eq!(alice.recv().await.unwrap(), ServerMessage::chat("Bob", ""));
}

#[tokio::test]
async fn test_port_flag_runs_with_defaults() {
    let server = TestServer::spawn_with_port_flag(17207)
        .await
        .expect("Failed to spawn test server");

    let mut alice = server.connect("Alice").await.unwrap();
    assert_eq!(alice.join().await.unwrap(), vec!["Alice"]);
}
