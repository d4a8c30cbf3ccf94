//! The kind → constructor dispatch table.
//!
//! Payloads are dispatched by their `kind` tag. Some endpoints return
//! records with no tag at all; those are matched by *shape* (the set of keys
//! they carry) against rules that name a registered tag.
//!
//! A [`TypeRegistry`] is built once at startup, then frozen behind an
//! [`Arc`] and handed to an [`Objector`](crate::Objector). It has no removal
//! operation and no interior mutability, so concurrent lookups need no
//! locking.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use orangered_api::kinds;
use serde_json::{Map, Value};

use crate::client::ClientHandle;
use crate::models::{
    Comment, CustomThing, Message, ModelError, MoreComments, Redditor, Submission, Subreddit,
    Thing,
};

/// Builds a [`Thing`] from the `data` object of a thing envelope.
pub type Constructor =
    Arc<dyn Fn(&ClientHandle, Map<String, Value>) -> Result<Thing, ModelError> + Send + Sync>;

#[derive(Clone)]
enum Entry {
    Thing(Constructor),
    Listing,
}

/// What the objector should do with a given kind.
pub enum Dispatch<'a> {
    /// Objectify `data.children` and package them with the cursors.
    Listing,
    /// Hand `data` to this constructor.
    Thing(&'a Constructor),
}

/// Keys of the untagged user records found in `UserList` children and in
/// friend responses.
pub const USER_RECORD_KEYS: [&str; 3] = ["date", "id", "name"];

/// A mapping holding every one of `keys` is built as `tag`.
#[derive(Debug, Clone)]
struct ShapeRule {
    keys: Vec<String>,
    tag: String,
}

impl ShapeRule {
    fn matches(&self, data: &Map<String, Value>) -> bool {
        self.keys.iter().all(|key| data.contains_key(key))
    }
}

#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, Entry>,
    shapes: Vec<ShapeRule>,
}

impl TypeRegistry {
    /// An empty registry. Every kind passes through unconverted.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in model and listing kind registered.
    ///
    /// | Kind | Result |
    /// |------|--------|
    /// | `t1` | [`Thing::Comment`] |
    /// | `t2` | [`Thing::Redditor`] |
    /// | `t3` | [`Thing::Submission`] |
    /// | `t4` | [`Thing::Message`] |
    /// | `t5` | [`Thing::Subreddit`] |
    /// | `more` | [`Thing::MoreComments`] |
    /// | `Listing`, `UserList` | [`Listing`](crate::models::Listing) |
    ///
    /// Untagged mappings carrying [`USER_RECORD_KEYS`] become
    /// [`Thing::Redditor`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(kinds::COMMENT, |client, data| {
            Comment::from_data(client.clone(), data).map(Thing::Comment)
        });
        registry.register(kinds::REDDITOR, |client, data| {
            Redditor::from_data(client.clone(), data).map(Thing::Redditor)
        });
        registry.register(kinds::SUBMISSION, |client, data| {
            Submission::from_data(client.clone(), data).map(Thing::Submission)
        });
        registry.register(kinds::MESSAGE, |client, data| {
            Message::from_data(client.clone(), data).map(Thing::Message)
        });
        registry.register(kinds::SUBREDDIT, |client, data| {
            Subreddit::from_data(client.clone(), data).map(Thing::Subreddit)
        });
        registry.register(kinds::MORE, |client, data| {
            MoreComments::from_data(client.clone(), data).map(Thing::MoreComments)
        });
        registry.register_listing(kinds::LISTING);
        registry.register_listing(kinds::USER_LIST);
        registry.register_shape(USER_RECORD_KEYS, kinds::REDDITOR);
        registry
    }

    /// Register `constructor` for `tag`, replacing any earlier entry.
    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        F: Fn(&ClientHandle, Map<String, Value>) -> Result<Thing, ModelError>
            + Send
            + Sync
            + 'static,
    {
        self.entries
            .insert(tag.into(), Entry::Thing(Arc::new(constructor)));
    }

    /// Register an application-defined type. Objectified values come back as
    /// [`Thing::Custom`] and can be recovered with
    /// [`CustomThing::downcast_ref`].
    pub fn register_custom<T, F>(&mut self, tag: impl Into<String>, constructor: F)
    where
        T: Any + Send + Sync,
        F: Fn(&ClientHandle, &Map<String, Value>) -> Result<T, ModelError>
            + Send
            + Sync
            + 'static,
    {
        let tag = tag.into();
        let kind = tag.clone();
        self.register(tag, move |client, data| {
            let object = constructor(client, &data)?;
            Ok(Thing::Custom(CustomThing::new(kind.clone(), data, object)))
        });
    }

    /// Mark `tag` as a listing kind.
    pub fn register_listing(&mut self, tag: impl Into<String>) {
        self.entries.insert(tag.into(), Entry::Listing);
    }

    /// Build untagged mappings that contain every key in `keys` with the
    /// constructor registered for `tag`.
    ///
    /// Rules are tried in registration order and only apply to mappings
    /// that are not `kind`/`data` envelopes. A rule whose tag has no
    /// constructor never matches.
    pub fn register_shape<I, K>(&mut self, keys: I, tag: impl Into<String>)
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.shapes.push(ShapeRule {
            keys: keys.into_iter().map(Into::into).collect(),
            tag: tag.into(),
        });
    }

    /// The first shape rule that `data` satisfies, as its tag and
    /// constructor.
    pub fn match_shape(&self, data: &Map<String, Value>) -> Option<(&str, &Constructor)> {
        self.shapes
            .iter()
            .filter(|rule| rule.matches(data))
            .find_map(|rule| Some((rule.tag.as_str(), self.resolve(&rule.tag)?)))
    }

    /// The constructor registered for `tag`. `None` for listing kinds and
    /// unknown kinds.
    pub fn resolve(&self, tag: &str) -> Option<&Constructor> {
        match self.entries.get(tag) {
            Some(Entry::Thing(constructor)) => Some(constructor),
            _ => None,
        }
    }

    pub fn is_listing(&self, tag: &str) -> bool {
        matches!(self.entries.get(tag), Some(Entry::Listing))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// How to handle `tag`, or `None` when it is unregistered.
    pub fn dispatch(&self, tag: &str) -> Option<Dispatch<'_>> {
        self.entries.get(tag).map(|entry| match entry {
            Entry::Thing(constructor) => Dispatch::Thing(constructor),
            Entry::Listing => Dispatch::Listing,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("tags", &self.tags())
            .field("shapes", &self.shapes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_cover_builtin_kinds() {
        let r = TypeRegistry::with_defaults();
        for tag in ["t1", "t2", "t3", "t4", "t5", "more"] {
            assert!(r.resolve(tag).is_some(), "{tag} should have a constructor");
        }
        assert!(r.is_listing("Listing"));
        assert!(r.is_listing("UserList"));
        assert!(r.resolve("Listing").is_none());
        assert!(!r.contains("t6"));
        assert_eq!(r.len(), 8);
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut r = TypeRegistry::new();
        r.register_listing("t9");
        assert!(r.is_listing("t9"));
        r.register("t9", |client, data| {
            Redditor::from_data(client.clone(), data).map(Thing::Redditor)
        });
        assert!(!r.is_listing("t9"));
        assert!(matches!(r.dispatch("t9"), Some(Dispatch::Thing(_))));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn custom_constructor_output_is_downcastable() {
        #[derive(Debug, PartialEq)]
        struct Trophy(String);

        let mut r = TypeRegistry::new();
        r.register_custom("t6", |_client, data| {
            data.get("name")
                .and_then(Value::as_str)
                .map(|n| Trophy(n.to_string()))
                .ok_or(ModelError::MissingField {
                    kind: "t6".into(),
                    field: "name",
                })
        });

        let constructor = r.resolve("t6").unwrap();
        let data = json!({"name": "Verified Email"});
        let Value::Object(data) = data else { unreachable!() };
        let thing = constructor(&ClientHandle::detached(), data).unwrap();
        let Thing::Custom(custom) = thing else {
            panic!("expected a custom thing");
        };
        assert_eq!(custom.kind(), "t6");
        assert_eq!(
            custom.downcast_ref::<Trophy>(),
            Some(&Trophy("Verified Email".into()))
        );
    }

    #[test]
    fn shape_rules_need_every_key_and_a_constructor() {
        let r = TypeRegistry::with_defaults();
        let Value::Object(record) = json!({"date": 1.5e9, "id": "t2_1w72", "name": "spez"}) else {
            unreachable!()
        };
        let (tag, _) = r.match_shape(&record).unwrap();
        assert_eq!(tag, "t2");

        let Value::Object(partial) = json!({"id": "t2_1w72", "name": "spez"}) else {
            unreachable!()
        };
        assert!(r.match_shape(&partial).is_none());

        let mut dangling = TypeRegistry::new();
        dangling.register_shape(["name"], "t2");
        assert!(dangling.match_shape(&record).is_none());
    }

    #[test]
    fn tags_are_sorted() {
        let r = TypeRegistry::with_defaults();
        assert_eq!(
            r.tags(),
            vec!["Listing", "UserList", "more", "t1", "t2", "t3", "t4", "t5"]
        );
    }
}
