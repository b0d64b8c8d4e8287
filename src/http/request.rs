use std::collections::HashMap;
use std::fmt;

use crate::http::form::{self, DecodeError, FORM_URLENCODED, Params};

/// Represents a parsed HTTP request from a client.
///
/// Immutable once built. Query and form parameters are decoded eagerly, so
/// every accessor is a plain lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query_params: Params,
    headers: HashMap<String, String>,
    body: Option<String>,
    post_params: Params,
}

/// Reasons a [`RequestBuilder`] refuses to produce a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    MissingMethod,
    /// Path is missing, empty, or does not start with `/`
    InvalidPath,
    /// Form body could not be decoded
    Form(DecodeError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingMethod => write!(f, "method missing"),
            RequestError::InvalidPath => write!(f, "path missing or not absolute"),
            RequestError::Form(e) => write!(f, "malformed form body: {}", e),
        }
    }
}

impl std::error::Error for RequestError {}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    query: Option<String>,
    headers: HashMap<String, String>,
    body: Option<String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Raw query string, without the leading `?`.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Adds a header. A repeated name overwrites the earlier value.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builds the request, decoding query and form parameters.
    ///
    /// A malformed query string yields empty query parameters rather than
    /// an error. A malformed form body is an error.
    pub fn build(self) -> Result<Request, RequestError> {
        let method = self.method.ok_or(RequestError::MissingMethod)?;
        let path = self
            .path
            .filter(|p| p.starts_with('/'))
            .ok_or(RequestError::InvalidPath)?;

        let query_params = match self.query.as_deref() {
            Some(query) => form::parse_query(query).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "query string not decodable, using empty parameters");
                Params::new()
            }),
            None => Params::new(),
        };

        let is_form = self.headers.get("Content-Type").map(String::as_str) == Some(FORM_URLENCODED);
        let post_params = match self.body.as_deref() {
            Some(body) if is_form => form::parse_form(body).map_err(RequestError::Form)?,
            _ => Params::new(),
        };

        Ok(Request {
            method,
            path,
            query_params,
            headers: self.headers,
            body: self.body,
            post_params,
        })
    }
}

impl Request {
    /// Shorthand for the builder with every part supplied at once.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        query: Option<&str>,
        headers: HashMap<String, String>,
        body: Option<String>,
    ) -> Result<Self, RequestError> {
        let mut builder = RequestBuilder::new().method(method).path(path).headers(headers);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder.build()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request-target path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    /// Returns the first value given for `name` in the query string.
    ///
    /// # Example
    ///
    /// ```
    /// # use portico::http::request::Request;
    /// # use std::collections::HashMap;
    /// let req = Request::new("GET", "/index.html", Some("a=1&a=2"), HashMap::new(), None).unwrap();
    /// assert_eq!(req.query_param("a"), Some("1"));
    /// assert_eq!(req.query_param("b"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Retrieves a header value by its exact name.
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if present, `None` otherwise.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(key)
            .map(|v| v.as_str())
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn post_params(&self) -> &Params {
        &self.post_params
    }

    /// Returns every value submitted for a form field, in order.
    pub fn post_param(&self, name: &str) -> Option<&[String]> {
        self.post_params.get(name).map(Vec::as_slice)
    }
}
