//! OAuth2 access tokens.
//!
//! [`Authenticator`] fetches a bearer token from the token endpoint and
//! caches it until shortly before it expires. Concurrent callers share one
//! in-flight refresh through the cache lock.

use std::time::{Duration, Instant};

use orangered::Error;
use orangered_api::paths;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{ClientConfig, Grant};

/// Tokens are treated as expired this long before the server says so.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Clone)]
struct Token {
    access_token: String,
    refresh_at: Instant,
}

impl Token {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

pub struct Authenticator {
    http: reqwest::Client,
    config: ClientConfig,
    token: Mutex<Option<Token>>,
}

impl Authenticator {
    pub fn new(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            token: Mutex::new(None),
        }
    }

    /// A valid access token, fetching a new one if the cached token is
    /// missing or about to expire.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }
        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token so the next request fetches a new one.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    async fn fetch(&self) -> Result<Token, Error> {
        let url = format!(
            "{}/{}",
            self.config.oauth_url.trim_end_matches('/'),
            paths::ACCESS_TOKEN
        );
        let form: Vec<(&str, &str)> = match self.config.grant() {
            Grant::Password { .. } => vec![
                ("grant_type", "password"),
                ("username", self.config.username.as_deref().unwrap_or_default()),
                ("password", self.config.password.as_deref().unwrap_or_default()),
            ],
            Grant::ClientCredentials => vec![("grant_type", "client_credentials")],
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, self.config.client_secret.as_ref())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "token endpoint rejected the request");
            return Err(Error::Auth(format!("token endpoint returned status {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Auth(format!("token response is not JSON: {e}")))?;
        // The endpoint reports bad credentials as `{"error": "..."}` with a 200.
        if let Some(error) = body.get("error") {
            warn!(%error, "token endpoint reported an error");
            return Err(Error::Auth(format!("token endpoint reported {error}")));
        }
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| Error::Auth(format!("unexpected token response: {e}")))?;

        info!(
            expires_in = token.expires_in,
            scope = token.scope.as_deref().unwrap_or(""),
            "obtained access token"
        );
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
        Ok(Token {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}
