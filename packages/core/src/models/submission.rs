//! Link and self posts (`t3`).

use chrono::{DateTime, Utc};
use orangered_api::{kinds, paths, Fullname};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{decode, is_default, timestamp, ModelError, Redditor};
use crate::client::ClientHandle;

/// Payload of a `t3` thing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionData {
    pub id: String,

    #[serde(default, skip_serializing_if = "is_default")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,

    #[serde(default, skip_serializing_if = "is_default")]
    pub selftext: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,

    #[serde(default, skip_serializing_if = "is_default")]
    pub score: i64,

    #[serde(default, skip_serializing_if = "is_default")]
    pub num_comments: u64,

    #[serde(default, skip_serializing_if = "is_default")]
    pub is_self: bool,

    #[serde(default, skip_serializing_if = "is_default")]
    pub over_18: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Submission {
    client: ClientHandle,
    pub data: SubmissionData,
}

impl Submission {
    /// Registry constructor for `t3` payloads.
    pub fn from_data(client: ClientHandle, data: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(Self {
            client,
            data: decode(kinds::SUBMISSION, data)?,
        })
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn fullname(&self) -> String {
        Fullname::new(kinds::SUBMISSION, self.data.id.as_str()).to_string()
    }

    pub fn title(&self) -> &str {
        &self.data.title
    }

    pub fn author(&self) -> Option<Redditor> {
        Redditor::from_author(&self.client, self.data.author.as_deref())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.data.created_utc)
    }

    /// Path of the comment tree, e.g. `comments/abc123`.
    pub fn comments_path(&self) -> String {
        paths::comments(&self.data.id)
    }
}
