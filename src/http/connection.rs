use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::timeout;

use crate::http::parser::{ParseError, RejectReason, parse_request};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::site::{Clock, FileSource, Route, Site};

/// Upper bound on bytes discarded from a rejected client before closing.
const DRAIN_LIMIT: u64 = 64 * 1024;
const DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// One client connection, from the first byte read to close.
///
/// No read timeout is applied while parsing: a client that stalls mid-request
/// keeps its worker slot until it sends more data or disconnects.
pub struct Connection<S, F, C> {
    stream: BufReader<S>,
    site: Arc<Site<F, C>>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Parsing,
    Serving(Request),
    Rejected(RejectReason),
    /// bool = drain unread input before closing?
    Writing(ResponseWriter, bool),
    Closed,
}

impl<S, F, C> Connection<S, F, C>
where
    S: AsyncRead + AsyncWrite + Unpin,
    F: FileSource,
    C: Clock,
{
    pub fn new(stream: S, site: Arc<Site<F, C>>) -> Self {
        Self {
            stream: BufReader::new(stream),
            site,
            state: ConnectionState::Parsing,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Drives the connection to `Closed`.
    ///
    /// Errors are socket faults. The stream is owned by `self`, so it is
    /// released on every path once the connection is dropped.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Parsing => {
                    match parse_request(&mut self.stream, &self.site.whitelist).await {
                        Ok(req) => ConnectionState::Serving(req),
                        Err(ParseError::Rejected(reason)) => ConnectionState::Rejected(reason),
                        Err(ParseError::Io(e)) => {
                            return Err(anyhow::Error::new(e).context("reading request"));
                        }
                    }
                }

                ConnectionState::Rejected(reason) => {
                    tracing::debug!(%reason, "rejecting request");
                    ConnectionState::Writing(ResponseWriter::new(&Response::bad_request()), true)
                }

                ConnectionState::Serving(req) => {
                    let response = self.respond(&req).await;
                    tracing::info!(
                        method = req.method(),
                        path = req.path(),
                        status = response.status.as_u16(),
                        "served"
                    );
                    ConnectionState::Writing(ResponseWriter::new(&response), false)
                }

                ConnectionState::Writing(mut writer, drain) => {
                    writer.write_to_stream(self.stream.get_mut()).await?;
                    self.close(drain).await;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => {
                    break;
                }
            };
        }

        Ok(())
    }

    /// Builds the response for an accepted request. Resource failures are
    /// logged and turned into a bare 500; nothing about them reaches the client.
    async fn respond(&self, req: &Request) -> Response {
        let path = req.path();
        let result = match self.site.route(path) {
            Route::Template => self.render_template(path).await,
            Route::Static => self
                .site
                .files
                .resolve(path)
                .await
                .map(|resolved| Response::ok(resolved.body, resolved.mime.as_deref())),
        };

        result.unwrap_or_else(|e| {
            tracing::error!(path, error = %e, "failed to load resource");
            Response::internal_error()
        })
    }

    async fn render_template(&self, path: &str) -> std::io::Result<Response> {
        let template = self.site.files.read_template(path).await?;
        let body = self.site.template.render(&template, &self.site.clock.now());
        let mime = crate::http::mime::guess(path);
        Ok(Response::ok(body, mime.as_deref()))
    }

    /// Half-closes the socket after the response. A rejected client may still
    /// be sending; its pending bytes are read and discarded (bounded) so the
    /// close does not turn into a reset that swallows the 400.
    async fn close(&mut self, drain: bool) {
        if let Err(e) = self.stream.get_mut().shutdown().await {
            tracing::debug!(error = %e, "shutdown failed");
            return;
        }

        if drain {
            let mut pending = (&mut self.stream).take(DRAIN_LIMIT);
            let _ = timeout(DRAIN_TIMEOUT, tokio::io::copy(&mut pending, &mut tokio::io::sink())).await;
        }
    }
}
