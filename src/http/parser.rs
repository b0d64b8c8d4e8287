use std::collections::HashMap;
use std::fmt;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::request::{RequestBuilder, RequestError, Request};
use crate::site::whitelist::Whitelist;

/// Longest request or header line accepted, terminator excluded.
pub const MAX_LINE_LEN: usize = 8 * 1024;
/// Largest `Content-Length` accepted; anything above is rejected unread.
pub const MAX_BODY_LEN: usize = 1024 * 1024;

/// Outcome of a failed parse.
///
/// `Rejected` is the client's fault and gets a 400. `Io` is a socket fault;
/// the connection is dropped without a reply.
#[derive(Debug)]
pub enum ParseError {
    Rejected(RejectReason),
    Io(io::Error),
}

/// Why a request was rejected. Only used for logging; clients see the same
/// 400 for every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    EmptyRequestLine,
    InvalidRequestLine,
    ForbiddenPath(String),
    /// Stream ended before the blank line closing the header block
    Truncated,
    LineTooLong,
    BodyTooLarge(usize),
    InvalidRequest(RequestError),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::EmptyRequestLine => write!(f, "empty request line"),
            RejectReason::InvalidRequestLine => write!(f, "invalid request line"),
            RejectReason::ForbiddenPath(p) => write!(f, "path not whitelisted: {}", p),
            RejectReason::Truncated => write!(f, "stream ended inside header block"),
            RejectReason::LineTooLong => write!(f, "line exceeds {} bytes", MAX_LINE_LEN),
            RejectReason::BodyTooLarge(n) => {
                write!(f, "content length {} exceeds {} bytes", n, MAX_BODY_LEN)
            }
            RejectReason::InvalidRequest(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Rejected(reason) => write!(f, "rejected: {}", reason),
            ParseError::Io(e) => write!(f, "i/o error while reading request: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(e: io::Error) -> Self {
        ParseError::Io(e)
    }
}

impl From<RejectReason> for ParseError {
    fn from(reason: RejectReason) -> Self {
        ParseError::Rejected(reason)
    }
}

/// Reads one request off `reader`.
///
/// The path is checked against `whitelist` straight after the request line,
/// before any header is consumed. The body is read only when a numeric
/// `Content-Length` is present; if the stream ends early the body is
/// whatever arrived.
pub async fn parse_request<R>(reader: &mut R, whitelist: &Whitelist) -> Result<Request, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    // Request line
    let request_line = read_line(reader)
        .await?
        .filter(|line| !line.is_empty())
        .ok_or(RejectReason::EmptyRequestLine)?;

    // trailing spaces after the version are tolerated
    let mut parts: Vec<&str> = request_line.split(' ').collect();
    while parts.last() == Some(&"") {
        parts.pop();
    }
    let [method, target, _version] = parts[..] else {
        return Err(RejectReason::InvalidRequestLine.into());
    };

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    if !whitelist.contains(path) {
        return Err(RejectReason::ForbiddenPath(path.to_string()).into());
    }

    // Headers
    let mut headers = HashMap::new();
    let mut content_length = 0usize;

    loop {
        let line = read_line(reader).await?.ok_or(RejectReason::Truncated)?;
        if line.is_empty() {
            break;
        }

        // lines without a colon are skipped
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());

        if key.eq_ignore_ascii_case("Content-Length") {
            if let Ok(n) = value.parse::<usize>() {
                content_length = n;
            }
        }
        headers.insert(key.to_string(), value.to_string());
    }

    if content_length > MAX_BODY_LEN {
        return Err(RejectReason::BodyTooLarge(content_length).into());
    }

    // Body
    let body = if content_length > 0 {
        let mut buf = Vec::new();
        (&mut *reader).take(content_length as u64).read_to_end(&mut buf).await?;
        Some(String::from_utf8_lossy(&buf).into_owned())
    } else {
        None
    };

    let mut builder = RequestBuilder::new()
        .method(method)
        .path(path)
        .headers(headers);
    if let Some(query) = query {
        builder = builder.query(query);
    }
    if let Some(body) = body {
        builder = builder.body(body);
    }

    builder
        .build()
        .map_err(|e| RejectReason::InvalidRequest(e).into())
}

/// Reads one line without its `\n` or `\r\n` terminator.
///
/// Returns `None` at end of stream. A final line without a terminator is
/// still returned.
async fn read_line<R>(reader: &mut R) -> Result<Option<String>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let limit = (MAX_LINE_LEN + 2) as u64;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;

    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    if buf.len() > MAX_LINE_LEN {
        return Err(RejectReason::LineTooLong.into());
    }

    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}
