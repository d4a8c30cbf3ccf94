//! Response envelopes as sent by the server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the outer object that wraps an error envelope.
pub const JSON_KEY: &str = "json";

/// Key of the error list inside the `json` object.
pub const ERRORS_KEY: &str = "errors";

/// Discriminator key of a thing envelope.
pub const KIND_KEY: &str = "kind";

/// Payload key of a thing envelope.
pub const DATA_KEY: &str = "data";

/// One entry of an error envelope's `errors` list.
///
/// The server sends each error as a positional triple rather than an
/// object, so this deserialises from a three-element JSON array:
///
/// ```json
/// ["USER_REQUIRED", "Please log in to do that.", null]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEntry(
    /// Machine-readable error code, e.g. `"USER_REQUIRED"`.
    pub String,
    /// Human-readable explanation.
    pub String,
    /// The request field the error refers to, if any.
    pub Option<String>,
);

impl ErrorEntry {
    pub fn code(&self) -> &str {
        &self.0
    }

    pub fn explanation(&self) -> &str {
        &self.1
    }

    pub fn field(&self) -> Option<&str> {
        self.2.as_deref()
    }
}

/// A discriminator-tagged thing: `{"kind": "t2", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThingEnvelope {
    pub kind: String,
    pub data: Map<String, Value>,
}

impl ThingEnvelope {
    pub fn new(kind: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            data,
        }
    }
}

/// The `data` object of a listing envelope.
///
/// # Example
///
/// ```json
/// {
///   "children": [ { "kind": "t3", "data": { ... } } ],
///   "before": null,
///   "after": "t3_abc123",
///   "dist": 25
/// }
/// ```
///
/// Fields other than the children and the two cursors are kept in `extra`
/// so they survive a round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ListingData {
    /// The child envelopes, in server order.
    #[serde(default)]
    pub children: Vec<Value>,

    /// Cursor for the previous page, normally the fullname of the first
    /// item. Kept as sent; `null` and absent both read as `None`.
    #[serde(default)]
    pub before: Option<Value>,

    /// Cursor for the next page, normally the fullname of the last item.
    #[serde(default)]
    pub after: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
