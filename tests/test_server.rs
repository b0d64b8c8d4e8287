//! End-to-end over real TCP against the bundled `public/` directory.

use std::sync::Arc;
use std::time::Duration;

use portico::config::StaticFilesConfig;
use portico::server::serve;
use portico::site::Site;
use portico::site::whitelist::DEFAULT_PATHS;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

async fn start() -> std::net::SocketAddr {
    start_with_limit(4).await
}

async fn start_with_limit(max_connections: usize) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let site = Arc::new(Site::from_config(&StaticFilesConfig::default()));

    tokio::spawn(serve(listener, site, max_connections));
    addr
}

async fn get(addr: std::net::SocketAddr, path: &str) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path);
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|l| l.strip_prefix("Content-Length: "))
        .and_then(|v| v.parse().ok())
        .expect("Content-Length header")
}

fn split(raw: &[u8]) -> (String, &[u8]) {
    let at = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    (String::from_utf8_lossy(&raw[..at]).into_owned(), &raw[at + 4..])
}

#[tokio::test]
async fn test_every_whitelisted_path_is_served() {
    let addr = start().await;

    for path in DEFAULT_PATHS {
        let out = get(addr, path).await;
        let (head, body) = split(&out);

        assert!(head.starts_with("HTTP/1.1 200 OK"), "{}: {}", path, head);
        assert_eq!(content_length(&head), body.len(), "{}", path);
    }
}

#[tokio::test]
async fn test_static_body_matches_disk() {
    let addr = start().await;

    let out = get(addr, "/index.html").await;
    let (_, body) = split(&out);

    assert_eq!(body, &std::fs::read("public/index.html").unwrap()[..]);
}

#[tokio::test]
async fn test_classic_page_is_rendered() {
    let addr = start().await;

    let out = get(addr, "/classic.html").await;
    let (_, body) = split(&out);
    let body = String::from_utf8(body.to_vec()).unwrap();

    assert!(!body.contains("{time}"));
    assert!(body.contains("Rendered at 20"));
}

#[tokio::test]
async fn test_unlisted_paths_are_rejected() {
    let addr = start().await;

    for path in ["/Cargo.toml", "/../Cargo.toml", "/", "/index.html/"] {
        let out = get(addr, path).await;
        assert!(out.starts_with(b"HTTP/1.1 400 Bad Request\r\n"), "{}", path);
    }
}

#[tokio::test]
async fn test_concurrent_clients_beyond_pool_size() {
    let addr = start().await;

    let clients: Vec<_> = (0..12)
        .map(|_| tokio::spawn(async move { get(addr, "/styles.css").await }))
        .collect();

    for client in clients {
        let out = client.await.unwrap();
        assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
    }
}

#[tokio::test]
async fn test_connection_limit_holds_later_clients() {
    let addr = start_with_limit(1).await;

    // connects and never sends, keeping the only slot busy
    let silent = TcpStream::connect(addr).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let waiting = tokio::spawn(async move { get(addr, "/styles.css").await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!waiting.is_finished(), "second client served while the slot was held");

    drop(silent);

    let out = timeout(Duration::from_secs(5), waiting)
        .await
        .expect("second client not served after the slot was freed")
        .unwrap();
    assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_rejected_client_with_pending_body_reads_full_400() {
    let addr = start().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    let body = vec![b'x'; 30_000];
    let head = format!("POST /secret HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len());
    stream.write_all(head.as_bytes()).await.unwrap();
    stream.write_all(&body).await.unwrap();

    let mut out = Vec::new();
    timeout(Duration::from_secs(5), stream.read_to_end(&mut out))
        .await
        .expect("server did not close")
        .expect("connection reset instead of a clean close");

    assert_eq!(
        out,
        b"HTTP/1.1 400 Bad Request\r\nContent-Type: text/plain\r\nContent-Length: 11\r\n\r\nBad Request".to_vec()
    );
}
