//! Single-shot asynchronous HTTP request client.
//!
//! # Overview
//! Given a method, a URL, an optional JSON body and optional headers, a
//! request is issued over HTTP or HTTPS and the whole response body comes
//! back as one string, or the request fails with one error.
//!
//! # Design
//! - Requests are cold: [`get`], [`post`], [`put`], [`delete`] (and the same
//!   methods on [`RequestClient`]) only describe a request. Each
//!   [`RequestObservable::subscribe`] or [`RequestObservable::execute`] runs
//!   an independent execution.
//! - [`generate_request_args`] resolves headers (caller mapping or a copy of
//!   the `content-type: application/json` default, never merged) and sets
//!   `content-length` in bytes when there is a body.
//! - The network sits behind the [`Transport`] trait; [`HttpTransport`] is
//!   the hyper/rustls implementation.
//! - Dropping a subscription cancels its request and closes the connection.
//!
//! ```no_run
//! # async fn run() -> Result<(), request_core::RequestError> {
//! let body = request_core::get("https://example.test/items", None, None)
//!     .subscribe()
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod client;
mod decode;
pub mod error;
pub mod executor;
pub mod http;
pub mod http_transport;
pub mod observable;
pub mod request;
pub mod target;
pub mod transport;

#[cfg(test)]
mod testing;

pub use args::{default_headers, generate_request_args, TransportArgs};
pub use client::{default_transport, delete, get, post, put, request, RequestClient};
pub use error::RequestError;
pub use executor::{execute, Outcome};
pub use crate::http::{Headers, HttpMethod};
pub use http_transport::HttpTransport;
pub use observable::{RequestObservable, Subscription};
pub use request::{Payload, RequestSpec};
pub use target::{Scheme, Target};
pub use transport::{ChunkStream, Transport};
