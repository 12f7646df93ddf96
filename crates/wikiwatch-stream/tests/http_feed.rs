//! `HttpFeed` against a loopback HTTP server.

use futures::StreamExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use wikiwatch_core::error::{SessionError, StreamError};
use wikiwatch_core::WatchConfig;
use wikiwatch_sink::InMemorySink;
use wikiwatch_stream::{FeedSource, HttpFeed, HttpFeedConfig, SessionState, StreamSession};

/// Serve one connection with `status` and `body`, then close it. The task
/// yields the raw request head.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/v2/stream/recentchange", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n{body}"
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&head).into_owned()
    });
    (url, handle)
}

const BODY: &str = concat!(
    ":ok\r\n",
    "\r\n",
    "event: message\r\n",
    r#"data: {"wiki":"enwiki","title":"Drama film","timestamp":1700000000,"user":"ExampleUser","type":"edit","length":{"old":100,"new":7000}}"#,
    "\r\n\r\n",
);

#[tokio::test]
async fn sends_event_stream_headers_and_frames_body() {
    let (url, server) = serve_once("200 OK", BODY).await;
    let feed = HttpFeed::new(
        url,
        HttpFeedConfig {
            user_agent: "wikiwatch-test/1".into(),
            ..HttpFeedConfig::default()
        },
    )
    .unwrap();

    let lines: Vec<String> = feed
        .connect()
        .await
        .unwrap()
        .map(|l| String::from_utf8(l.unwrap().to_vec()).unwrap())
        .collect()
        .await;
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], ":ok");
    assert!(lines[3].starts_with("data: {"));

    let head = server.await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /v2/stream/recentchange "));
    assert!(head.contains("accept: text/event-stream"));
    assert!(head.contains("user-agent: wikiwatch-test/1"));
}

#[tokio::test]
async fn non_success_status_is_a_connection_failure() {
    let (url, _server) = serve_once("503 Service Unavailable", "").await;
    let feed = HttpFeed::new(url, HttpFeedConfig::default()).unwrap();

    match feed.connect().await {
        Err(StreamError::HttpStatus { status, .. }) => assert_eq!(status, 503),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("503 must not open a stream"),
    }
}

#[tokio::test]
async fn session_logs_then_fails_when_server_closes() {
    let (url, _server) = serve_once("200 OK", BODY).await;
    let config = WatchConfig {
        endpoint: url,
        watchlist: vec!["Drama film".into()],
        ..WatchConfig::default()
    };
    let feed = HttpFeed::from_config(&config).unwrap();
    let mut session = StreamSession::new(&config, feed, InMemorySink::new());

    let err = session.run(std::future::pending()).await.unwrap_err();
    assert!(matches!(err, SessionError::Stream(StreamError::Closed)));
    assert_eq!(session.state(), SessionState::Failed);

    let sink = session.into_sink();
    assert_eq!(sink.events().len(), 1);
    assert_eq!(sink.events()[0][9], "6900");
    assert_eq!(sink.alerts().len(), 1);
}
