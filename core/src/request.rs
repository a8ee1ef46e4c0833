//! The immutable description of one request.

use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;
use crate::http::{Headers, HttpMethod};

/// Request body as held by a [`RequestSpec`].
///
/// Serialization to text happens when the request executes, so a body that
/// could not even be turned into JSON is kept as a deferred failure and
/// surfaces as the execution's outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    Unserializable(String),
}

impl Payload {
    pub fn from_serialize<B>(body: &B) -> Self
    where
        B: Serialize + ?Sized,
    {
        match serde_json::to_value(body) {
            Ok(value) => Payload::Json(value),
            Err(err) => Payload::Unserializable(err.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// JSON text of the body, `None` when there is no body.
    pub(crate) fn to_text(&self) -> Result<Option<String>, RequestError> {
        match self {
            Payload::Empty => Ok(None),
            Payload::Json(value) => Ok(Some(serde_json::to_string(value)?)),
            Payload::Unserializable(msg) => Err(RequestError::Serialization(msg.clone())),
        }
    }
}

impl From<Option<Value>> for Payload {
    fn from(body: Option<Value>) -> Self {
        body.map_or(Payload::Empty, Payload::Json)
    }
}

/// Method, URL, body and headers of one request. Shared unchanged by every
/// execution of the same [`RequestObservable`](crate::RequestObservable).
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub body: Payload,
    pub headers: Option<Headers>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: Payload::Empty,
            headers: None,
        }
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = body.into();
        self
    }

    pub fn headers(mut self, headers: Option<Headers>) -> Self {
        self.headers = headers;
        self
    }
}
