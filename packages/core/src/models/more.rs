//! Collapsed comment stubs (`more`).

use orangered_api::kinds;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{decode, is_default, ModelError};
use crate::client::ClientHandle;

/// Payload of a `more` thing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoreCommentsData {
    #[serde(default, skip_serializing_if = "is_default")]
    pub count: u64,

    /// Ids of the comments this stub stands in for.
    #[serde(default, skip_serializing_if = "is_default")]
    pub children: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Placeholder for comments the server did not include in a tree.
#[derive(Debug, Clone)]
pub struct MoreComments {
    pub data: MoreCommentsData,
}

impl MoreComments {
    /// Registry constructor for `more` payloads.
    pub fn from_data(_client: ClientHandle, data: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(Self {
            data: decode(kinds::MORE, data)?,
        })
    }

    pub fn count(&self) -> u64 {
        self.data.count
    }

    /// A "continue this thread" link rather than a batch of loadable ids.
    pub fn is_continue_this_thread(&self) -> bool {
        self.data.id.as_deref() == Some("_")
    }
}
