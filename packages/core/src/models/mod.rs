//! Domain objects built by the registry's constructors.
//!
//! Each model keeps the [`ClientHandle`] it was built with so it can issue
//! follow-up requests, plus its payload decoded into a typed `*Data` struct.
//! Fields the struct does not name are kept in its `extra` map, so no
//! attribute sent by the server is lost.

pub mod comment;
pub mod listing;
pub mod message;
pub mod more;
pub mod redditor;
pub mod submission;
pub mod subreddit;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use orangered_api::kinds;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use comment::{Comment, CommentData};
pub use listing::Listing;
pub use message::{Message, MessageData};
pub use more::{MoreComments, MoreCommentsData};
pub use redditor::{Redditor, RedditorData};
pub use submission::{Submission, SubmissionData};
pub use subreddit::{Subreddit, SubredditData};

/// Errors raised by model constructors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The payload did not match the model's shape.
    #[error("{kind} payload could not be decoded: {source}")]
    Decode {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} payload is missing required field {field:?}")]
    MissingField { kind: String, field: &'static str },

    /// The server answered a follow-up request with a different kind than
    /// the model asked for.
    #[error("expected a {expected} thing, got {found:?}")]
    UnexpectedKind { expected: String, found: String },
}

/// A typed domain object produced by a registered constructor.
#[derive(Debug, Clone)]
pub enum Thing {
    Comment(Comment),
    Redditor(Redditor),
    Submission(Submission),
    Message(Message),
    Subreddit(Subreddit),
    MoreComments(MoreComments),
    /// Output of a constructor added with
    /// [`TypeRegistry::register_custom`](crate::TypeRegistry::register_custom).
    Custom(CustomThing),
}

impl Thing {
    /// The discriminator code this thing was built from.
    pub fn kind(&self) -> &str {
        match self {
            Thing::Comment(_) => kinds::COMMENT,
            Thing::Redditor(_) => kinds::REDDITOR,
            Thing::Submission(_) => kinds::SUBMISSION,
            Thing::Message(_) => kinds::MESSAGE,
            Thing::Subreddit(_) => kinds::SUBREDDIT,
            Thing::MoreComments(_) => kinds::MORE,
            Thing::Custom(c) => c.kind(),
        }
    }

    /// Fullname (`t1_abc`) when the payload carried an id.
    pub fn fullname(&self) -> Option<String> {
        match self {
            Thing::Comment(c) => Some(c.fullname()),
            Thing::Redditor(r) => r.fullname(),
            Thing::Submission(s) => Some(s.fullname()),
            Thing::Message(m) => Some(m.fullname()),
            Thing::Subreddit(s) => s.fullname(),
            Thing::MoreComments(_) | Thing::Custom(_) => None,
        }
    }

    /// Re-encode as a `{"kind": ..., "data": {...}}` envelope.
    pub fn to_value(&self) -> Value {
        let data = match self {
            Thing::Comment(c) => encode(&c.data),
            Thing::Redditor(r) => encode(&r.data),
            Thing::Submission(s) => encode(&s.data),
            Thing::Message(m) => encode(&m.data),
            Thing::Subreddit(s) => encode(&s.data),
            Thing::MoreComments(m) => encode(&m.data),
            Thing::Custom(c) => Value::Object(c.data.clone()),
        };
        serde_json::json!({ "kind": self.kind(), "data": data })
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Thing::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_redditor(&self) -> Option<&Redditor> {
        match self {
            Thing::Redditor(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_submission(&self) -> Option<&Submission> {
        match self {
            Thing::Submission(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_subreddit(&self) -> Option<&Subreddit> {
        match self {
            Thing::Subreddit(s) => Some(s),
            _ => None,
        }
    }
}

/// An application-defined object built by a custom constructor.
///
/// Keeps the raw payload alongside the object so the thing can still be
/// re-encoded or rendered without knowing its concrete type.
#[derive(Clone)]
pub struct CustomThing {
    kind: String,
    data: Map<String, Value>,
    object: Arc<dyn Any + Send + Sync>,
}

impl CustomThing {
    pub fn new<T: Any + Send + Sync>(
        kind: impl Into<String>,
        data: Map<String, Value>,
        object: T,
    ) -> Self {
        Self {
            kind: kind.into(),
            data,
            object: Arc::new(object),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }
}

impl fmt::Debug for CustomThing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomThing")
            .field("kind", &self.kind)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

// --- helpers -----------------------------------------------------------------

/// Decode a payload into a model's data struct.
pub(crate) fn decode<T: DeserializeOwned>(
    kind: &str,
    data: Map<String, Value>,
) -> Result<T, ModelError> {
    serde_json::from_value(Value::Object(data)).map_err(|source| ModelError::Decode {
        kind: kind.to_string(),
        source,
    })
}

/// `skip_serializing_if` predicate for fields that fall back to their
/// default when absent, so re-encoding does not invent them.
pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

fn encode<T: Serialize>(data: &T) -> Value {
    serde_json::to_value(data).unwrap_or_default()
}

/// Convert a `created_utc` epoch (fractional seconds) to a UTC timestamp.
pub(crate) fn timestamp(created_utc: Option<f64>) -> Option<DateTime<Utc>> {
    let secs = created_utc?;
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.trunc() as i64;
    let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
    DateTime::from_timestamp(whole, nanos.min(999_999_999))
}

/// Require a bare JSON object, e.g. an untagged relationship record.
pub(crate) fn expect_object(kind: &str, value: Value) -> Result<Map<String, Value>, ModelError> {
    serde_json::from_value(value).map_err(|source| ModelError::Decode {
        kind: kind.to_string(),
        source,
    })
}

/// Unwrap the `data` of a `{"kind": expected, "data": {...}}` response to a
/// follow-up request.
pub(crate) fn expect_envelope(
    expected: &str,
    value: Value,
) -> Result<Map<String, Value>, ModelError> {
    let envelope: orangered_api::ThingEnvelope =
        serde_json::from_value(value).map_err(|source| ModelError::Decode {
            kind: expected.to_string(),
            source,
        })?;
    if envelope.kind != expected {
        return Err(ModelError::UnexpectedKind {
            expected: expected.to_string(),
            found: envelope.kind,
        });
    }
    Ok(envelope.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientHandle;
    use serde_json::json;

    #[test]
    fn timestamp_from_epoch() {
        let t = timestamp(Some(1_700_000_000.5)).unwrap();
        assert_eq!(t.timestamp(), 1_700_000_000);
        assert_eq!(t.timestamp_subsec_millis(), 500);
        assert!(timestamp(None).is_none());
        assert!(timestamp(Some(f64::NAN)).is_none());
    }

    #[test]
    fn to_value_does_not_invent_defaulted_fields() {
        let client = ClientHandle::detached();
        let data = |v: Value| match v {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        };

        let comment = Comment::from_data(client.clone(), data(json!({"id": "c1"}))).unwrap();
        assert_eq!(
            Thing::Comment(comment).to_value(),
            json!({"kind": "t1", "data": {"id": "c1"}})
        );

        let submission = Submission::from_data(client.clone(), data(json!({"id": "s1"}))).unwrap();
        assert_eq!(
            Thing::Submission(submission).to_value(),
            json!({"kind": "t3", "data": {"id": "s1"}})
        );

        let message = Message::from_data(client.clone(), data(json!({"id": "m1"}))).unwrap();
        assert_eq!(
            Thing::Message(message).to_value(),
            json!({"kind": "t4", "data": {"id": "m1"}})
        );

        let more = MoreComments::from_data(client, data(json!({"id": "x"}))).unwrap();
        assert_eq!(
            Thing::MoreComments(more).to_value(),
            json!({"kind": "more", "data": {"id": "x"}})
        );
    }

    #[test]
    fn to_value_keeps_sent_values() {
        let value = json!({"id": "c1", "body": "hi", "score": 4, "replies": "", "edited": false});
        let Value::Object(data) = value.clone() else { unreachable!() };
        let comment = Comment::from_data(ClientHandle::detached(), data).unwrap();
        assert_eq!(
            Thing::Comment(comment).to_value(),
            json!({"kind": "t1", "data": value})
        );
    }

    #[test]
    fn expect_envelope_checks_kind() {
        let data = expect_envelope("t2", json!({"kind": "t2", "data": {"name": "spez"}})).unwrap();
        assert_eq!(data.get("name"), Some(&json!("spez")));

        let err = expect_envelope("t2", json!({"kind": "t5", "data": {}})).unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedKind { .. }));

        let err = expect_envelope("t2", json!([1, 2])).unwrap_err();
        assert!(matches!(err, ModelError::Decode { .. }));
    }
}
