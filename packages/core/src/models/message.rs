//! Private messages and comment-reply notifications (`t4`).

use chrono::{DateTime, Utc};
use orangered_api::{kinds, Fullname};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{decode, is_default, timestamp, ModelError, Redditor};
use crate::client::ClientHandle;

/// Payload of a `t4` thing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageData {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Recipient name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    #[serde(default, skip_serializing_if = "is_default")]
    pub subject: String,

    #[serde(default, skip_serializing_if = "is_default")]
    pub body: String,

    /// Unread flag.
    #[serde(default, skip_serializing_if = "is_default")]
    pub new: bool,

    #[serde(default, skip_serializing_if = "is_default")]
    pub was_comment: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Message {
    client: ClientHandle,
    pub data: MessageData,
}

impl Message {
    /// Registry constructor for `t4` payloads.
    pub fn from_data(client: ClientHandle, data: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(Self {
            client,
            data: decode(kinds::MESSAGE, data)?,
        })
    }

    pub fn fullname(&self) -> String {
        Fullname::new(kinds::MESSAGE, self.data.id.as_str()).to_string()
    }

    pub fn author(&self) -> Option<Redditor> {
        Redditor::from_author(&self.client, self.data.author.as_deref())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.data.created_utc)
    }

    /// Comment replies show up in the inbox as messages.
    pub fn is_comment_reply(&self) -> bool {
        self.data.was_comment
    }

    pub fn is_unread(&self) -> bool {
        self.data.new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_message() {
        let Value::Object(map) = json!({
            "id": "m1",
            "author": "spez",
            "dest": "ferris",
            "subject": "hello",
            "body": "hi there",
            "new": true,
            "was_comment": false
        }) else {
            unreachable!()
        };
        let m = Message::from_data(ClientHandle::detached(), map).unwrap();
        assert_eq!(m.fullname(), "t4_m1");
        assert!(m.is_unread());
        assert!(!m.is_comment_reply());
        assert_eq!(m.author().unwrap().name(), "spez");
    }
}
