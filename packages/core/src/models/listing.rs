//! Converted listings.

use serde_json::{json, Map, Value};

use super::Thing;
use crate::objector::Objectified;

/// A listing whose children have been objectified.
///
/// `before` and `after` are the server's pagination cursors, passed through
/// untouched whatever their JSON type. Any other fields of the listing's `data` (`dist`, `modhash`,
/// ...) are kept in `extra`.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// The listing kind, e.g. `"Listing"` or `"UserList"`.
    pub kind: String,
    pub children: Vec<Objectified>,
    pub before: Option<Value>,
    pub after: Option<Value>,
    pub extra: Map<String, Value>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The children that were converted to things, in order.
    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        self.children.iter().filter_map(Objectified::as_thing)
    }

    pub fn into_things(self) -> Vec<Thing> {
        self.children
            .into_iter()
            .filter_map(|child| match child {
                Objectified::Thing(thing) => Some(thing),
                _ => None,
            })
            .collect()
    }

    /// `true` when the server reported a further page.
    pub fn has_more(&self) -> bool {
        self.after.is_some()
    }

    /// Re-encode as a listing envelope.
    pub fn to_value(&self) -> Value {
        let mut data = self.extra.clone();
        data.insert(
            "children".into(),
            Value::Array(self.children.iter().map(Objectified::to_value).collect()),
        );
        data.insert("before".into(), json!(self.before));
        data.insert("after".into(), json!(self.after));
        json!({ "kind": self.kind, "data": data })
    }
}
