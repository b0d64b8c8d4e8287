//! HTTP protocol implementation.
//!
//! This module implements the subset of HTTP/1.1 the server speaks: one
//! request per connection, `Content-Length` framed bodies, no keep-alive.
//!
//! # Architecture
//!
//! - **`connection`**: The per-connection state machine
//! - **`parser`**: Reads a request off a buffered stream
//! - **`request`**: The parsed request and its builder
//! - **`form`**: URL-encoded query string and form body decoding
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Parsing   │ ← Read request line, headers, body
//!        └──────┬──────┘
//!       ok      │      malformed / forbidden
//!       ┌───────┴────────┐
//!       ▼                ▼
//!  ┌──────────┐    ┌──────────┐
//!  │ Serving  │    │ Rejected │ ← 400 Bad Request
//!  └────┬─────┘    └────┬─────┘
//!       │ static or     │
//!       │ template      │
//!       ▼               ▼
//!  ┌──────────────────────────┐
//!  │         Writing          │ ← Send response, half-close
//!  └────────────┬─────────────┘
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │
//!        └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use portico::http::connection::Connection;
//! use portico::site::Site;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let site = Arc::new(Site::from_config(&Default::default()));
//!     let listener = TcpListener::bind("127.0.0.1:9999").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let site = site.clone();
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, site);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod mime;
pub mod form;
