//! Request-args builder.
//!
//! # Design
//! `generate_request_args` is a pure, total function. The default header
//! mapping is an immutable template; every call that falls back to it gets
//! its own copy, so adding `content-length` for one request can never leak
//! into another.

use crate::http::{Headers, HttpMethod};

pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_LENGTH: &str = "content-length";

const DEFAULT_HEADERS: [(&str, &str); 1] = [(CONTENT_TYPE, "application/json")];

/// A fresh copy of the default header template, `{content-type: application/json}`.
pub fn default_headers() -> Headers {
    DEFAULT_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

/// Connection parameters handed to a [`Transport`](crate::Transport) to open
/// one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportArgs {
    pub host: String,
    pub path: String,
    pub method: HttpMethod,
    pub headers: Headers,
    /// Absent when the URL uses its scheme's default port.
    pub port: Option<u16>,
}

/// Build the transport arguments for one request.
///
/// `custom_headers`, when supplied, replaces the defaults entirely. A
/// non-empty `body` sets `content-length` (in bytes) on whichever mapping is
/// in effect, replacing any caller entry of that name in any letter case.
pub fn generate_request_args(
    host: &str,
    path: &str,
    method: HttpMethod,
    body: Option<&str>,
    custom_headers: Option<Headers>,
    port: Option<u16>,
) -> TransportArgs {
    let mut headers = custom_headers.unwrap_or_else(default_headers);
    if let Some(body) = body.filter(|body| !body.is_empty()) {
        headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_LENGTH));
        headers.insert(CONTENT_LENGTH.to_string(), body.len().to_string());
    }

    TransportArgs {
        host: host.to_string(),
        path: path.to_string(),
        method,
        headers,
        port,
    }
}
