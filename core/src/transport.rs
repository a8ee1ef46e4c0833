//! The seam between the executor and the network.
//!
//! # Design
//! A transport opens exactly one request per call to [`Transport::open`],
//! writes the body (if any), and hands back the response body as a stream of
//! raw chunks. Chunks never reach the caller of the client; the executor
//! folds them into the final text. Status and response headers stay inside
//! the transport.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::args::TransportArgs;
use crate::error::RequestError;
use crate::target::Scheme;

/// Response body chunks in network arrival order. The stream ends after the
/// last chunk, or yields one error and ends.
pub type ChunkStream = BoxStream<'static, Result<Bytes, RequestError>>;

/// Opens a single HTTP request.
///
/// Implemented by [`HttpTransport`](crate::HttpTransport) for real traffic;
/// tests implement it to script chunks and errors.
///
/// # Examples
/// ```
/// use bytes::Bytes;
/// use futures::stream::{self, StreamExt};
/// use request_core::{ChunkStream, RequestError, Scheme, Transport, TransportArgs};
///
/// struct Canned;
///
/// #[async_trait::async_trait]
/// impl Transport for Canned {
///     async fn open(
///         &self,
///         _scheme: Scheme,
///         _args: TransportArgs,
///         _body: Option<Bytes>,
///     ) -> Result<ChunkStream, RequestError> {
///         Ok(stream::iter([Ok(Bytes::from_static(b"ok"))]).boxed())
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the request described by `args` over the `scheme` variant and
    /// write `body` in full.
    ///
    /// # Errors
    /// Returns a [`RequestError`] if the connection cannot be established or
    /// the request cannot be sent. Failures after the response headers arrive
    /// are reported through the returned stream.
    async fn open(
        &self,
        scheme: Scheme,
        args: TransportArgs,
        body: Option<Bytes>,
    ) -> Result<ChunkStream, RequestError>;
}
