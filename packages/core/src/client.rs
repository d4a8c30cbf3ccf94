//! The requester seam between domain objects and the transport.
//!
//! The core crate performs no I/O. Domain objects that need to talk to the
//! server later (lazy fetches, friend/unfriend, ...) hold a [`ClientHandle`],
//! which wraps whatever [`Requester`] the host application plugged in. The
//! objectification code only threads the handle through to constructors and
//! never calls it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::objector::check_error;

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    None,
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// A JSON document.
    Json(Value),
}

/// A request against an API path, independent of any HTTP library.
///
/// `path` is relative to the API base URL (see `orangered_api::paths`).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: Body::None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query-string parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a form body. Replaces any previous body.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Set a JSON body. Replaces any previous body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }
}

/// Something that can execute an [`ApiRequest`] and return the decoded
/// response body.
///
/// Implementations own authentication, timeouts and status handling. An
/// empty response body is returned as [`Value::Null`].
#[async_trait]
pub trait Requester: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<Value, Error>;
}

/// Opaque, cheaply cloneable capability handed to every domain-object
/// constructor.
#[derive(Clone)]
pub struct ClientHandle {
    requester: Arc<dyn Requester>,
}

impl ClientHandle {
    pub fn new(requester: impl Requester + 'static) -> Self {
        Self {
            requester: Arc::new(requester),
        }
    }

    pub fn from_arc(requester: Arc<dyn Requester>) -> Self {
        Self { requester }
    }

    /// A handle with no transport. Objectification works normally; any
    /// request made through it fails with [`Error::Detached`].
    pub fn detached() -> Self {
        Self::new(Detached)
    }

    /// Execute `request` and return the raw decoded body.
    pub async fn request(&self, request: ApiRequest) -> Result<Value, Error> {
        self.requester.request(request).await
    }

    /// Execute `request` and pass the body through the error gate before
    /// returning it.
    pub async fn request_checked(&self, request: ApiRequest) -> Result<Value, Error> {
        let value = self.request(request).await?;
        check_error(&value)?;
        Ok(value)
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle").finish_non_exhaustive()
    }
}

struct Detached;

#[async_trait]
impl Requester for Detached {
    async fn request(&self, _request: ApiRequest) -> Result<Value, Error> {
        Err(Error::Detached)
    }
}
