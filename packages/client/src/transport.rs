//! [`Requester`] implementation backed by `reqwest`.

use async_trait::async_trait;
use orangered::{check_error, ApiRequest, Body, Error, Method, Requester};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::config::ClientConfig;

/// Sends [`ApiRequest`]s to the API host with a bearer token.
///
/// Every request carries `raw_json=1` so the server does not HTML-escape
/// text fields. A `401` drops the cached token and the request is sent once
/// more with a fresh one.
pub struct HttpRequester {
    http: Client,
    api_url: String,
    auth: Authenticator,
}

impl HttpRequester {
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;
        Ok(Self::with_client(http, config))
    }

    /// Use a pre-configured `reqwest::Client`.
    pub fn with_client(http: Client, config: ClientConfig) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            auth: Authenticator::new(http.clone(), config),
            http,
        }
    }

    /// `{api_url}/{path}`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: &ApiRequest) -> Result<Response, Error> {
        let token = self.auth.access_token().await?;
        let mut builder = self
            .http
            .request(to_reqwest_method(request.method), self.url(&request.path))
            .bearer_auth(token)
            .query(&[("raw_json", "1")])
            .query(&request.params);
        builder = match &request.body {
            Body::None => builder,
            Body::Form(pairs) => builder.form(pairs),
            Body::Json(value) => builder.json(value),
        };
        builder.send().await.map_err(transport)
    }
}

#[async_trait]
impl Requester for HttpRequester {
    async fn request(&self, request: ApiRequest) -> Result<Value, Error> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let mut response = self.send(&request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("access token rejected; refreshing");
            self.auth.invalidate().await;
            response = self.send(&request).await?;
        }
        decode(response).await
    }
}

/// Decode a response body. Empty bodies become `null`.
///
/// A non-2xx response that carries an error envelope is reported as that
/// error; any other non-2xx response becomes [`Error::BadStatus`].
async fn decode(response: Response) -> Result<Value, Error> {
    let status = response.status();
    let text = response.text().await.map_err(transport)?;

    let value = if text.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) if status.is_success() => return Err(Error::Decode(e.to_string())),
            Err(_) => Value::Null,
        }
    };

    if !status.is_success() {
        warn!(%status, "request failed");
        check_error(&value)?;
        return Err(Error::BadStatus {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(value)
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.to_string())
}
