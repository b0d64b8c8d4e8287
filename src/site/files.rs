//! Static file access for whitelisted paths.

use std::future::Future;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::http::mime;

/// Bytes of a resolved resource and its MIME type, if one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub body: Vec<u8>,
    pub mime: Option<String>,
}

/// Where connection handlers load resources from.
pub trait FileSource: Send + Sync {
    /// Loads the raw bytes served for `path`.
    fn resolve(&self, path: &str) -> impl Future<Output = io::Result<Resolved>> + Send;

    /// Loads `path` as UTF-8 text for placeholder substitution.
    fn read_template(&self, path: &str) -> impl Future<Output = io::Result<String>> + Send;
}

/// Serves files from a directory on disk.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Maps a request path under the root. Anything other than plain
    /// segments (`..`, absolute prefixes) maps to nothing.
    fn map_path(&self, url_path: &str) -> io::Result<PathBuf> {
        let mut pb = self.root.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("path escapes root: {}", url_path),
                    ));
                }
            }
        }
        Ok(pb)
    }
}

impl FileSource for StaticFiles {
    async fn resolve(&self, path: &str) -> io::Result<Resolved> {
        let file = self.map_path(path)?;
        let body = tokio::fs::read(&file).await?;
        Ok(Resolved {
            body,
            mime: mime::guess(path),
        })
    }

    async fn read_template(&self, path: &str) -> io::Result<String> {
        let file = self.map_path(path)?;
        tokio::fs::read_to_string(&file).await
    }
}
