//! Comments (`t1`).

use chrono::{DateTime, Utc};
use orangered_api::{kinds, Fullname};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{decode, is_default, timestamp, ModelError, Redditor};
use crate::client::ClientHandle;
use crate::error::ObjectifyError;
use crate::objector::{Objectified, Objector};

/// Payload of a `t1` thing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentData {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "is_default")]
    pub body: String,

    #[serde(default, skip_serializing_if = "is_default")]
    pub score: i64,

    /// Fullname of the submission the comment belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,

    /// Fullname of the parent comment, or of the submission for top-level
    /// comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<f64>,

    /// Either `""` or a nested listing envelope. Left unconverted until
    /// [`Comment::replies`] is called.
    #[serde(default, skip_serializing_if = "is_default")]
    pub replies: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Comment {
    client: ClientHandle,
    pub data: CommentData,
}

impl Comment {
    /// Registry constructor for `t1` payloads.
    pub fn from_data(client: ClientHandle, data: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(Self {
            client,
            data: decode(kinds::COMMENT, data)?,
        })
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn fullname(&self) -> String {
        Fullname::new(kinds::COMMENT, self.data.id.as_str()).to_string()
    }

    /// `None` for deleted accounts.
    pub fn author(&self) -> Option<Redditor> {
        Redditor::from_author(&self.client, self.data.author.as_deref())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.data.created_utc)
    }

    /// `true` when the comment replies directly to the submission.
    pub fn is_root(&self) -> bool {
        self.data
            .parent_id
            .as_deref()
            .is_some_and(|p| p.starts_with("t3_"))
    }

    /// Objectify the nested replies listing.
    ///
    /// The server sends `""` when there are no replies.
    pub fn replies(&self, objector: &Objector) -> Result<Vec<Objectified>, ObjectifyError> {
        match &self.data.replies {
            Value::Null => Ok(Vec::new()),
            Value::String(s) if s.is_empty() => Ok(Vec::new()),
            replies => match objector.objectify(replies.clone())? {
                Objectified::Listing(listing) => Ok(listing.children),
                Objectified::List(items) => Ok(items),
                other => Ok(vec![other]),
            },
        }
    }
}
