//! What the server serves: the whitelist, where files come from, and the
//! one templated page.
//!
//! A [`Site`] is built once at startup and shared read-only by every
//! connection through an `Arc`.

pub mod clock;
pub mod files;
pub mod whitelist;

pub use clock::{Clock, SystemClock};
pub use files::{FileSource, Resolved, StaticFiles};
pub use whitelist::Whitelist;

use crate::config::StaticFilesConfig;

/// The page whose content gets the current time substituted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRoute {
    pub path: String,
    pub placeholder: String,
}

impl TemplateRoute {
    /// Replaces every occurrence of the placeholder in `template`.
    pub fn render(&self, template: &str, now: &str) -> String {
        template.replace(&self.placeholder, now)
    }
}

impl Default for TemplateRoute {
    fn default() -> Self {
        Self {
            path: "/classic.html".to_string(),
            placeholder: "{time}".to_string(),
        }
    }
}

/// How an accepted path is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Static,
    Template,
}

pub struct Site<F = StaticFiles, C = SystemClock> {
    pub whitelist: Whitelist,
    pub files: F,
    pub clock: C,
    pub template: TemplateRoute,
}

impl<F: FileSource, C: Clock> Site<F, C> {
    pub fn new(whitelist: Whitelist, files: F, clock: C, template: TemplateRoute) -> Self {
        Self {
            whitelist,
            files,
            clock,
            template,
        }
    }

    /// Exact match on the template path picks the templated route.
    pub fn route(&self, path: &str) -> Route {
        if path == self.template.path {
            Route::Template
        } else {
            Route::Static
        }
    }
}

impl Site {
    /// Disk-backed site using the local clock.
    pub fn from_config(cfg: &StaticFilesConfig) -> Self {
        Self::new(
            Whitelist::new(cfg.whitelist.iter().cloned()),
            StaticFiles::new(cfg.root.clone()),
            SystemClock,
            TemplateRoute {
                path: cfg.template_path.clone(),
                placeholder: cfg.placeholder.clone(),
            },
        )
    }
}
