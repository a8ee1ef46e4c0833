//! End-to-end requests against the fixture server over loopback.
//!
//! # Design
//! Each test starts `mock_server` on a random port and drives the real
//! `HttpTransport` through the public entry points, so URL parsing, header
//! resolution, the hyper connection and UTF-8 accumulation are all exercised
//! on an actual socket.

use std::net::SocketAddr;
use std::sync::Arc;

use mock_server::{Echo, CHUNKED_TEXT, ITEMS_BODY};
use request_core::{Headers, HttpMethod, HttpTransport, RequestClient, RequestError};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivatePkcs8KeyDer};
use tokio_rustls::rustls::{ClientConfig, RootCertStore, ServerConfig};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn start_server() -> SocketAddr {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    addr
}

/// Start the fixture server behind TLS with a fresh self-signed certificate
/// for `localhost`. Returns the port and the certificate.
async fn start_tls_server() -> (u16, CertificateDer<'static>) {
    init_tracing();
    let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
    let cert = certified.cert.der().clone();
    let key = PrivatePkcs8KeyDer::from(certified.key_pair.serialize_der());

    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.clone()], key.into())
        .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(mock_server::run_tls(listener, Arc::new(config)));
    (port, cert)
}

fn trusting(cert: CertificateDer<'static>) -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.add(cert).unwrap();
    let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Arc::new(config)
}

fn echo(body: &str) -> Echo {
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn get_delivers_the_whole_body() {
    let addr = start_server().await;
    let body = request_core::get(&format!("http://{addr}/items"), None, None)
        .subscribe()
        .await
        .unwrap();
    assert_eq!(body, ITEMS_BODY);
}

#[tokio::test]
async fn default_headers_go_on_the_wire() {
    let addr = start_server().await;
    let body = request_core::get(&format!("http://{addr}/echo?q=1"), None, None)
        .subscribe()
        .await
        .unwrap();

    let seen = echo(&body);
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.path, "/echo?q=1");
    assert_eq!(seen.headers["content-type"], "application/json");
    assert_eq!(seen.headers["host"], addr.to_string());
}

#[tokio::test]
async fn post_writes_json_body_with_byte_length() {
    let addr = start_server().await;
    let payload = json!({"name": "crème brûlée"});
    let expected = serde_json::to_string(&payload).unwrap();

    let body = request_core::post(&format!("http://{addr}/echo"), Some(payload), None)
        .subscribe()
        .await
        .unwrap();

    let seen = echo(&body);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.body, expected);
    assert_eq!(seen.headers["content-length"], expected.len().to_string());
    assert_ne!(expected.len(), expected.chars().count());
}

#[tokio::test]
async fn custom_headers_replace_the_defaults() {
    let addr = start_server().await;
    let headers = Headers::from([("x-api-key".to_string(), "k1".to_string())]);

    let body = request_core::put(&format!("http://{addr}/echo"), Some(json!([1])), Some(headers))
        .subscribe()
        .await
        .unwrap();

    let seen = echo(&body);
    assert_eq!(seen.method, "PUT");
    assert_eq!(seen.headers["x-api-key"], "k1");
    assert_eq!(seen.headers["content-length"], "3");
    assert!(!seen.headers.contains_key("content-type"));
}

#[tokio::test]
async fn delete_reaches_the_server() {
    let addr = start_server().await;
    let body = request_core::delete(&format!("http://{addr}/echo"), None, None)
        .subscribe()
        .await
        .unwrap();
    assert_eq!(echo(&body).method, "DELETE");
}

#[tokio::test]
async fn chunked_multibyte_text_is_reassembled() {
    let addr = start_server().await;
    let body = request_core::get(&format!("http://{addr}/chunked"), None, None)
        .subscribe()
        .await
        .unwrap();
    assert_eq!(body, CHUNKED_TEXT);
}

#[tokio::test]
async fn error_status_still_delivers_the_body() {
    let addr = start_server().await;
    let body = request_core::get(&format!("http://{addr}/status/500"), None, None)
        .subscribe()
        .await
        .unwrap();
    assert_eq!(body, "status 500");
}

#[tokio::test]
async fn every_subscription_is_a_new_request() {
    let addr = start_server().await;
    let client = RequestClient::new(HttpTransport::new());
    let items = client.get(&format!("http://{addr}/items"), None, None);

    items.subscribe().await.unwrap();
    items.execute().await.unwrap();

    let hits = client
        .request(HttpMethod::Get, &format!("http://{addr}/hits"), None, None)
        .subscribe()
        .await
        .unwrap();
    assert_eq!(hits, "2");
}

#[tokio::test]
async fn connection_refused_is_a_transport_failure() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = request_core::get(&format!("http://{addr}/items"), None, None)
        .subscribe()
        .await
        .unwrap_err();
    let RequestError::Transport(inner) = err else {
        panic!("expected transport error, got {err:?}");
    };
    let io_err = inner.downcast_ref::<std::io::Error>().unwrap();
    assert_eq!(io_err.kind(), std::io::ErrorKind::ConnectionRefused);
}

#[tokio::test]
async fn unsupported_scheme_fails_fast() {
    let err = request_core::get("ftp://127.0.0.1/items", None, None)
        .subscribe()
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::UnsupportedScheme(ref s) if s == "ftp"));
}

#[tokio::test]
async fn https_with_trusted_certificate_delivers_the_body() {
    let (port, cert) = start_tls_server().await;
    let client = RequestClient::new(HttpTransport::with_tls_config(trusting(cert)));

    let body = client
        .get(&format!("https://localhost:{port}/items"), None, None)
        .subscribe()
        .await
        .unwrap();
    assert_eq!(body, ITEMS_BODY);
}

#[tokio::test]
async fn https_post_writes_the_body_through_tls() {
    let (port, cert) = start_tls_server().await;
    let client = RequestClient::new(HttpTransport::with_tls_config(trusting(cert)));

    let body = client
        .post(&format!("https://localhost:{port}/echo"), Some(json!({"id": 1})), None)
        .subscribe()
        .await
        .unwrap();

    let seen = echo(&body);
    assert_eq!(seen.body, r#"{"id":1}"#);
    assert_eq!(seen.headers["content-length"], "8");
    assert_eq!(seen.headers["host"], format!("localhost:{port}"));
}

#[tokio::test]
async fn https_with_untrusted_certificate_is_a_transport_failure() {
    let (port, _cert) = start_tls_server().await;
    let client = RequestClient::new(HttpTransport::new());

    let err = client
        .get(&format!("https://localhost:{port}/items"), None, None)
        .subscribe()
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)), "got {err:?}");
}
