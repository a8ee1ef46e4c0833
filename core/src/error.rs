//! Error types for the request client.
//!
//! # Design
//! Transport failures are carried as the boxed error the network layer
//! produced and rendered transparently, so callers see the I/O, TLS or hyper
//! error itself rather than a re-worded copy. Everything that can go wrong
//! before the first byte is written (bad URL, unknown scheme, unserializable
//! body, unrepresentable header) gets its own variant.

use std::error::Error as StdError;

use thiserror::Error;
use tokio_rustls::rustls;

/// Boxed error produced by the network layer.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The failure half of an execution's outcome.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The URL could not be parsed, or has no host.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URL scheme is neither `http` nor `https`.
    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A header or the request line could not be represented on the wire.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// The TLS client configuration could not be built.
    #[error("tls configuration failed: {0}")]
    Tls(#[from] rustls::Error),

    /// Connection, handshake or body error reported by the transport.
    #[error(transparent)]
    Transport(BoxError),

    /// The execution ended without producing an outcome.
    #[error("request aborted before completion")]
    Aborted,
}

impl RequestError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RequestError::Transport(err.into())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::Serialization(err.to_string())
    }
}
