use std::collections::HashSet;

/// Paths served when no whitelist is configured.
pub const DEFAULT_PATHS: &[&str] = &[
    "/index.html",
    "/spring.svg",
    "/spring.png",
    "/resources.html",
    "/styles.css",
    "/app.js",
    "/links.html",
    "/forms.html",
    "/classic.html",
    "/events.html",
    "/events.js",
];

/// Fixed set of request paths the server is willing to serve.
///
/// Built once at startup and only read afterwards, so it is shared between
/// connections without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Whitelist {
    paths: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Default for Whitelist {
    fn default() -> Self {
        Self::new(DEFAULT_PATHS.iter().copied())
    }
}
