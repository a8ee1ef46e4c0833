//! Network transport: tokio TCP, rustls for `https`, hyper HTTP/1.1.
//!
//! # Design
//! One TCP connection per [`Transport::open`] call, never pooled. The hyper
//! connection driver runs as its own task and is owned by the returned chunk
//! stream: dropping the stream (because the body ended, failed, or the
//! execution was cancelled) aborts the driver and closes the socket.

use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{future, Stream, StreamExt, TryStreamExt};
use http::{header, Request};
use http_body_util::{BodyStream, Full};
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{self, ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::args::TransportArgs;
use crate::error::RequestError;
use crate::target::Scheme;
use crate::transport::{ChunkStream, Transport};

/// [`Transport`] over real sockets.
///
/// The TLS client configuration is built on the first `https` request from
/// the webpki root store unless one was supplied with
/// [`HttpTransport::with_tls_config`].
#[derive(Debug, Default)]
pub struct HttpTransport {
    tls: OnceLock<Arc<ClientConfig>>,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tls_config(config: Arc<ClientConfig>) -> Self {
        Self {
            tls: OnceLock::from(config),
        }
    }

    fn tls_config(&self) -> Result<Arc<ClientConfig>, RequestError> {
        if let Some(config) = self.tls.get() {
            return Ok(Arc::clone(config));
        }
        let config = Arc::new(webpki_client_config()?);
        Ok(Arc::clone(self.tls.get_or_init(|| config)))
    }
}

fn webpki_client_config() -> Result<ClientConfig, rustls::Error> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    Ok(ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(
        &self,
        scheme: Scheme,
        args: TransportArgs,
        body: Option<Bytes>,
    ) -> Result<ChunkStream, RequestError> {
        let request = build_request(&args, body)?;
        let host = connect_host(&args.host);
        let port = args.port.unwrap_or_else(|| scheme.default_port());

        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(RequestError::transport)?;
        debug!(host, port, %scheme, "connected");

        match scheme {
            Scheme::Plain => send(tcp, request).await,
            Scheme::Encrypted => {
                let connector = TlsConnector::from(self.tls_config()?);
                let server_name = ServerName::try_from(host.to_string()).map_err(RequestError::transport)?;
                let tls = connector
                    .connect(server_name, tcp)
                    .await
                    .map_err(RequestError::transport)?;
                send(tls, request).await
            }
        }
    }
}

/// IPv6 literals arrive bracketed from the URL; sockets and SNI want them bare.
fn connect_host(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

fn build_request(args: &TransportArgs, body: Option<Bytes>) -> Result<Request<Full<Bytes>>, RequestError> {
    let mut builder = Request::builder()
        .method(http::Method::from(args.method))
        .uri(args.path.as_str());

    if !args.headers.keys().any(|name| name.eq_ignore_ascii_case(header::HOST.as_str())) {
        let host = match args.port {
            Some(port) => format!("{}:{port}", args.host),
            None => args.host.clone(),
        };
        builder = builder.header(header::HOST, host);
    }
    for (name, value) in &args.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    Ok(builder.body(Full::new(body.unwrap_or_default()))?)
}

async fn send<S>(io: S, request: Request<Full<Bytes>>) -> Result<ChunkStream, RequestError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(TokioIo::new(io))
        .await
        .map_err(RequestError::transport)?;
    let driver = DriverGuard(tokio::spawn(async move {
        if let Err(err) = connection.await {
            debug!(error = %err, "connection closed with error");
        }
    }));

    let response = sender.send_request(request).await.map_err(RequestError::transport)?;
    debug!(status = %response.status(), "response headers received");

    let chunks = BodyStream::new(response.into_body())
        .try_filter_map(|frame| future::ready(Ok(frame.into_data().ok())))
        .map_err(RequestError::transport)
        .boxed();

    Ok(GuardedChunks {
        chunks,
        _driver: driver,
    }
    .boxed())
}

struct DriverGuard(JoinHandle<()>);

impl Drop for DriverGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Body chunks that keep the connection driver alive for as long as they
/// are being read.
struct GuardedChunks {
    chunks: ChunkStream,
    _driver: DriverGuard,
}

impl Stream for GuardedChunks {
    type Item = Result<Bytes, RequestError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.chunks.poll_next_unpin(cx)
    }
}
