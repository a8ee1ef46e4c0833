//! Method-bound entry points.
//!
//! # Design
//! `RequestClient` holds only a shared transport and carries no state between
//! calls. Each method builds a [`RequestSpec`] and wraps it in a cold
//! [`RequestObservable`]; nothing is sent until the caller subscribes. The
//! crate-level functions do the same against one process-wide
//! [`HttpTransport`].

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use serde_json::Value;

use crate::http::{Headers, HttpMethod};
use crate::http_transport::HttpTransport;
use crate::observable::RequestObservable;
use crate::request::{Payload, RequestSpec};
use crate::transport::Transport;

/// Entry points bound to one transport.
#[derive(Debug)]
pub struct RequestClient<T = HttpTransport> {
    transport: Arc<T>,
}

impl<T> Clone for RequestClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Default for RequestClient<HttpTransport> {
    fn default() -> Self {
        Self::from_shared(default_transport())
    }
}

impl<T> RequestClient<T>
where
    T: Transport + 'static,
{
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<Value>,
        headers: Option<Headers>,
    ) -> RequestObservable<T> {
        self.observe(method, url, body.into(), headers)
    }

    /// Like [`request`](Self::request) with any serializable body. A body
    /// that cannot be represented as JSON fails every execution with
    /// [`RequestError::Serialization`](crate::RequestError::Serialization).
    pub fn request_json<B>(
        &self,
        method: HttpMethod,
        url: &str,
        body: &B,
        headers: Option<Headers>,
    ) -> RequestObservable<T>
    where
        B: Serialize + ?Sized,
    {
        self.observe(method, url, Payload::from_serialize(body), headers)
    }

    pub fn get(&self, url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<T> {
        self.request(HttpMethod::Get, url, body, headers)
    }

    pub fn post(&self, url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<T> {
        self.request(HttpMethod::Post, url, body, headers)
    }

    pub fn put(&self, url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<T> {
        self.request(HttpMethod::Put, url, body, headers)
    }

    pub fn delete(&self, url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<T> {
        self.request(HttpMethod::Delete, url, body, headers)
    }

    fn observe(&self, method: HttpMethod, url: &str, body: Payload, headers: Option<Headers>) -> RequestObservable<T> {
        let spec = RequestSpec::new(method, url).body(body).headers(headers);
        RequestObservable::new(Arc::clone(&self.transport), spec)
    }
}

/// The transport shared by the crate-level entry points.
pub fn default_transport() -> Arc<HttpTransport> {
    static DEFAULT: OnceLock<Arc<HttpTransport>> = OnceLock::new();
    Arc::clone(DEFAULT.get_or_init(|| Arc::new(HttpTransport::new())))
}

pub fn request(
    method: HttpMethod,
    url: &str,
    body: Option<Value>,
    headers: Option<Headers>,
) -> RequestObservable<HttpTransport> {
    RequestClient::default().request(method, url, body, headers)
}

pub fn get(url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<HttpTransport> {
    request(HttpMethod::Get, url, body, headers)
}

pub fn post(url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<HttpTransport> {
    request(HttpMethod::Post, url, body, headers)
}

pub fn put(url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<HttpTransport> {
    request(HttpMethod::Put, url, body, headers)
}

pub fn delete(url: &str, body: Option<Value>, headers: Option<Headers>) -> RequestObservable<HttpTransport> {
    request(HttpMethod::Delete, url, body, headers)
}
