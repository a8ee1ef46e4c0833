//! URL parsing and scheme selection.
//!
//! # Design
//! The scheme is an explicit two-variant choice. Anything other than `http`
//! or `https` is rejected here, before a transport is ever touched.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::RequestError;

/// Which transport variant a request travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// `http`
    Plain,
    /// `https`
    Encrypted,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Plain => "http",
            Scheme::Encrypted => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Plain => 80,
            Scheme::Encrypted => 443,
        }
    }
}

impl FromStr for Scheme {
    type Err = RequestError;

    /// Accepts the scheme with or without its trailing `:` delimiter.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.strip_suffix(':').unwrap_or(raw) {
            "http" => Ok(Scheme::Plain),
            "https" => Ok(Scheme::Encrypted),
            other => Err(RequestError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a request URL the args builder needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub scheme: Scheme,
    pub host: String,
    /// Path plus query string, as sent in the request line.
    pub path: String,
    pub port: Option<u16>,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let url = Url::parse(raw)?;
        let scheme = url.scheme().parse::<Scheme>()?;
        let host = url.host_str().ok_or(url::ParseError::EmptyHost)?.to_string();

        let path = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        Ok(Target {
            scheme,
            host,
            path,
            port: url.port(),
        })
    }
}
