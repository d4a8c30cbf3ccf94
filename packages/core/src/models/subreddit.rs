//! Communities (`t5`).

use chrono::{DateTime, Utc};
use orangered_api::{kinds, paths, Fullname};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{decode, expect_envelope, timestamp, ModelError};
use crate::client::{ApiRequest, ClientHandle};
use crate::error::Error;

/// Payload of a `t5` thing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SubredditData {
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub over18: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A community. Like [`Redditor`](super::Redditor) it can start out as a
/// bare name and be loaded on demand.
#[derive(Debug, Clone)]
pub struct Subreddit {
    client: ClientHandle,
    pub data: SubredditData,
    fetched: bool,
}

impl Subreddit {
    /// Registry constructor for `t5` payloads.
    pub fn from_data(client: ClientHandle, data: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(Self {
            client,
            data: decode(kinds::SUBREDDIT, data)?,
            fetched: true,
        })
    }

    pub fn named(client: ClientHandle, name: impl Into<String>) -> Self {
        Self {
            client,
            data: SubredditData {
                display_name: name.into(),
                ..Default::default()
            },
            fetched: false,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.data.display_name
    }

    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    pub fn fullname(&self) -> Option<String> {
        self.data
            .id
            .as_ref()
            .map(|id| Fullname::new(kinds::SUBREDDIT, id.as_str()).to_string())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.data.created_utc)
    }

    pub fn path(&self) -> String {
        paths::subreddit(&self.data.display_name)
    }

    pub async fn fetch(&mut self) -> Result<(), Error> {
        debug!(name = %self.data.display_name, "fetching subreddit");
        let value = self
            .client
            .request_checked(ApiRequest::get(paths::subreddit_about(
                &self.data.display_name,
            )))
            .await?;
        let data = expect_envelope(kinds::SUBREDDIT, value)?;
        self.data = decode(kinds::SUBREDDIT, data)?;
        self.fetched = true;
        Ok(())
    }
}
