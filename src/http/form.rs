//! `application/x-www-form-urlencoded` decoding.
//!
//! Used for both the query string of the request-target and form bodies.
//! Decoding is strict here; the caller decides whether a failure degrades to
//! an empty mapping (query strings) or rejects the request (form bodies).

use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::fmt;

/// Media type that triggers form-body decoding.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Parameter name to every value it was given, in order of appearance.
pub type Params = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A `%` not followed by two hex digits
    InvalidEscape(String),
    /// Escapes decoded to bytes that are not UTF-8
    InvalidUtf8(String),
    /// A form pair without `=`
    MissingSeparator(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidEscape(s) => write!(f, "invalid percent-escape in {:?}", s),
            DecodeError::InvalidUtf8(s) => write!(f, "non UTF-8 sequence in {:?}", s),
            DecodeError::MissingSeparator(s) => write!(f, "form pair without '=': {:?}", s),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Parses a raw query string (without the leading `?`).
///
/// A name without `=` maps to an empty value. Empty segments (`a=1&&b=2`)
/// are skipped.
pub fn parse_query(query: &str) -> Result<Params, DecodeError> {
    let mut params = Params::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        push(&mut params, decode_component(name)?, decode_component(value)?);
    }

    Ok(params)
}

/// Parses a form body.
///
/// Unlike [`parse_query`], every non-empty pair must contain `=`. Only the
/// first `=` splits; the rest stays in the value.
pub fn parse_form(body: &str) -> Result<Params, DecodeError> {
    let mut params = Params::new();

    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| DecodeError::MissingSeparator(pair.to_string()))?;
        push(&mut params, decode_component(name)?, decode_component(value)?);
    }

    Ok(params)
}

fn push(params: &mut Params, name: String, value: String) {
    params.entry(name).or_default().push(value);
}

/// Decodes one name or value: `+` is a space, `%XX` is a byte, and the
/// resulting bytes must be UTF-8.
pub fn decode_component(raw: &str) -> Result<String, DecodeError> {
    validate_escapes(raw)?;

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8(raw.to_string()))
}

// percent_decode passes malformed escapes through untouched
fn validate_escapes(raw: &str) -> Result<(), DecodeError> {
    let bytes = raw.as_bytes();
    let mut i = 0;

    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        let well_formed = bytes
            .get(at + 1..at + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));

        if !well_formed {
            return Err(DecodeError::InvalidEscape(raw.to_string()));
        }
        i = at + 3;
    }

    Ok(())
}
