//! MIME type detection based on file extensions.

/// Sent when the extension gives no answer.
pub const FALLBACK: &str = "application/octet-stream";

/// Guesses the MIME type of a request path from its extension.
///
/// Returns `None` for unknown or missing extensions; callers pick the
/// fallback so that the decision stays visible at the call site.
pub fn guess(path: &str) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
