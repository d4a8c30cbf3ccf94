//! Client configuration, populated from environment variables.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = concat!("orangered/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_OAUTH_URL: &str = "https://www.reddit.com";
pub const DEFAULT_API_URL: &str = "https://oauth.reddit.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// How the client obtains its access token.
#[derive(Debug, Clone, PartialEq)]
pub enum Grant {
    /// Act as a specific user (script apps).
    Password { username: String, password: String },
    /// Act as the application itself; read-only access.
    ClientCredentials,
}

/// Runtime configuration for an API client.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `ORANGERED_CLIENT_ID` | (required) | OAuth2 client id |
/// | `ORANGERED_CLIENT_SECRET` | (absent) | OAuth2 client secret |
/// | `ORANGERED_USERNAME` | (absent) | Account for the password grant |
/// | `ORANGERED_PASSWORD` | (absent) | Password for the password grant |
/// | `ORANGERED_USER_AGENT` | `orangered/<version>` | `User-Agent` header |
/// | `ORANGERED_OAUTH_URL` | `https://www.reddit.com` | Host of the token endpoint |
/// | `ORANGERED_API_URL` | `https://oauth.reddit.com` | Base URL of API requests |
/// | `ORANGERED_TIMEOUT_SECS` | `30` | Per-request timeout |
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: String,

    /// Host of `api/v1/access_token`, without a trailing slash.
    pub oauth_url: String,

    /// Base URL every API path is joined to, without a trailing slash.
    pub api_url: String,

    pub timeout: Duration,
}

impl ClientConfig {
    /// Config with every optional field at its default.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            username: None,
            password: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Populate config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Populate config from an arbitrary variable lookup. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.is_empty());

        let client_id = get("ORANGERED_CLIENT_ID").ok_or(ConfigError::Missing("ORANGERED_CLIENT_ID"))?;

        let timeout = match get("ORANGERED_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::Invalid {
                    var: "ORANGERED_TIMEOUT_SECS",
                    reason: e.to_string(),
                }
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let mut config = Self::new(client_id);
        config.client_secret = get("ORANGERED_CLIENT_SECRET");
        config.username = get("ORANGERED_USERNAME");
        config.password = get("ORANGERED_PASSWORD");
        if let Some(agent) = get("ORANGERED_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(url) = get("ORANGERED_OAUTH_URL") {
            config.oauth_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = get("ORANGERED_API_URL") {
            config.api_url = url.trim_end_matches('/').to_string();
        }
        config.timeout = timeout;

        if config.username.is_some() != config.password.is_some() {
            return Err(ConfigError::Invalid {
                var: "ORANGERED_USERNAME",
                reason: "username and password must be set together".into(),
            });
        }
        Ok(config)
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_password(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Point the client at other hosts, e.g. a local mock server.
    pub fn with_urls(mut self, oauth_url: &str, api_url: &str) -> Self {
        self.oauth_url = oauth_url.trim_end_matches('/').to_string();
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The token grant implied by the configured credentials.
    pub fn grant(&self) -> Grant {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Grant::Password {
                username: username.clone(),
                password: password.clone(),
            },
            _ => Grant::ClientCredentials,
        }
    }
}
