//! Fixture HTTP server for exercising the request client over real sockets.
//!
//! Routes:
//! - `GET /items` — fixed JSON text, counted in `/hits`
//! - `GET /hits` — how many times `/items` was served
//! - `ANY /echo` — the request as seen by the server, as JSON
//! - `GET /chunked` — UTF-8 text streamed with a character split across chunks
//! - `GET /status/{code}` — responds with `code` and a short text body
//!
//! [`run`] serves plain HTTP; [`run_tls`] serves the same routes behind TLS.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::debug;

pub const ITEMS_BODY: &str = r#"{"a":1}"#;

/// Text served by `/chunked`, and the chunks it is sent in.
pub const CHUNKED_TEXT: &str = "café ☕ ok";
static CHUNKED_PARTS: [&[u8]; 4] = [b"caf", b"\xC3", b"\xA9 \xE2\x98", b"\x95 ok"];

/// What `/echo` reports back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub type Hits = Arc<AtomicUsize>;

pub fn app() -> Router {
    let hits: Hits = Arc::new(AtomicUsize::new(0));
    Router::new()
        .route("/items", get(items))
        .route("/hits", get(hit_count))
        .route("/echo", any(echo))
        .route("/chunked", get(chunked))
        .route("/status/{code}", get(status))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve [`app`] over TLS, one HTTP/1 connection per accepted socket.
/// Failed handshakes are logged and the listener keeps accepting.
pub async fn run_tls(listener: TcpListener, config: Arc<ServerConfig>) -> Result<(), std::io::Error> {
    let acceptor = TlsAcceptor::from(config);
    let service = TowerToHyperService::new(app());

    loop {
        let (tcp, peer) = listener.accept().await?;
        let acceptor = acceptor.clone();
        let service = service.clone();

        tokio::spawn(async move {
            let tls = match acceptor.accept(tcp).await {
                Ok(tls) => tls,
                Err(err) => {
                    debug!(%peer, error = %err, "tls handshake failed");
                    return;
                }
            };
            if let Err(err) = http1::Builder::new()
                .serve_connection(TokioIo::new(tls), service)
                .await
            {
                debug!(%peer, error = %err, "connection closed with error");
            }
        });
    }
}

async fn items(State(hits): State<Hits>) -> ([(&'static str, &'static str); 1], &'static str) {
    let served = hits.fetch_add(1, Ordering::SeqCst) + 1;
    debug!(served, "items");
    ([("content-type", "application/json")], ITEMS_BODY)
}

async fn hit_count(State(hits): State<Hits>) -> String {
    hits.load(Ordering::SeqCst).to_string()
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    Json(Echo {
        method: method.to_string(),
        path,
        headers,
        body,
    })
}

async fn chunked() -> Body {
    let parts = CHUNKED_PARTS
        .iter()
        .map(|part| Ok::<_, Infallible>(Bytes::from_static(part)));
    Body::from_stream(futures::stream::iter(parts))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}
