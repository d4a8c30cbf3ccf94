//! Users of the platform (`t2`).

use chrono::{DateTime, Utc};
use orangered_api::{kinds, paths, Fullname};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{decode, expect_envelope, expect_object, timestamp, ModelError};
use crate::client::{ApiRequest, ClientHandle};
use crate::error::Error;

/// Author fields use these strings for accounts that no longer exist.
const DELETED_AUTHORS: [&str; 2] = ["", "[deleted]"];

/// Payload of a `t2` thing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RedditorData {
    pub name: String,

    /// Base-36 id, without the `t2_` prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_karma: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_karma: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_friend: Option<bool>,

    /// Epoch seconds at which a friendship or block began. Only relationship
    /// records carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A user of the platform.
///
/// A redditor can be built from a full `t2` payload, or from just a name
/// (see [`Redditor::named`]) and loaded later with [`Redditor::fetch`].
/// Two redditors are equal when their names match case-insensitively.
#[derive(Debug, Clone)]
pub struct Redditor {
    client: ClientHandle,
    pub data: RedditorData,
    fetched: bool,
}

impl Redditor {
    /// Registry constructor for `t2` payloads.
    pub fn from_data(client: ClientHandle, data: Map<String, Value>) -> Result<Self, ModelError> {
        Ok(Self {
            client,
            data: decode(kinds::REDDITOR, data)?,
            fetched: true,
        })
    }

    /// A not-yet-fetched redditor known only by name.
    pub fn named(client: ClientHandle, name: impl Into<String>) -> Self {
        Self {
            client,
            data: RedditorData {
                name: name.into(),
                ..Default::default()
            },
            fetched: false,
        }
    }

    /// Interpret an `author`-style field.
    ///
    /// Missing, empty and `"[deleted]"` authors yield `None`; any other
    /// name yields an unfetched redditor.
    pub fn from_author(client: &ClientHandle, author: Option<&str>) -> Option<Self> {
        match author {
            Some(name) if !DELETED_AUTHORS.contains(&name) => {
                Some(Self::named(client.clone(), name))
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// `true` once the full payload has been loaded.
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// `t2_<id>`, when the id is known. Relationship records send the id
    /// already prefixed.
    pub fn fullname(&self) -> Option<String> {
        let id = self.data.id.as_deref()?;
        let fullname = match id.parse::<Fullname>() {
            Ok(fullname) if fullname.kind == kinds::REDDITOR => fullname,
            _ => Fullname::new(kinds::REDDITOR, id),
        };
        Some(fullname.to_string())
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        timestamp(self.data.created_utc)
    }

    /// Listing path for this user, e.g. `user/spez`.
    pub fn path(&self) -> String {
        paths::user(&self.data.name)
    }

    /// Path of the `about` document used by [`Redditor::fetch`].
    pub fn info_path(&self) -> String {
        paths::user_about(&self.data.name)
    }

    /// Load the full payload from the server, replacing what is held.
    pub async fn fetch(&mut self) -> Result<(), Error> {
        debug!(name = %self.data.name, "fetching redditor");
        let value = self
            .client
            .request_checked(ApiRequest::get(self.info_path()))
            .await?;
        let data = expect_envelope(kinds::REDDITOR, value)?;
        self.data = decode(kinds::REDDITOR, data)?;
        self.fetched = true;
        Ok(())
    }

    /// Friend the redditor, optionally with a personal note. Calling it
    /// again updates the note. Returns the relationship record; the note,
    /// when set, is in `data.extra["note"]`.
    pub async fn friend(&self, note: Option<&str>) -> Result<Redditor, Error> {
        let body = match note {
            Some(note) => json!({ "note": note }),
            None => json!({}),
        };
        let value = self
            .client
            .request_checked(ApiRequest::put(paths::friend_v1(&self.data.name)).json(body))
            .await?;
        self.relationship(value)
    }

    pub async fn unfriend(&self) -> Result<(), Error> {
        self.client
            .request_checked(
                ApiRequest::delete(paths::friend_v1(&self.data.name))
                    .json(json!({ "id": self.data.name })),
            )
            .await?;
        Ok(())
    }

    /// Friendship details, including the personal note if one is set.
    pub async fn friend_info(&self) -> Result<Redditor, Error> {
        let value = self
            .client
            .request_checked(
                ApiRequest::get(paths::friend_v1(&self.data.name)).param("id", &self.data.name),
            )
            .await?;
        self.relationship(value)
    }

    fn relationship(&self, value: Value) -> Result<Redditor, Error> {
        let record = expect_object(kinds::REDDITOR, value)?;
        Ok(Redditor::from_data(self.client.clone(), record)?)
    }

    /// Unblock the redditor. Blocking itself happens from a message or a
    /// reply, not from here.
    pub async fn unblock(&self) -> Result<Value, Error> {
        let me = self.client.request_checked(ApiRequest::get(paths::ME)).await?;
        let my_id = me
            .get("id")
            .and_then(Value::as_str)
            .ok_or(ModelError::MissingField {
                kind: kinds::REDDITOR.into(),
                field: "id",
            })?;
        let container = Fullname::new(kinds::REDDITOR, my_id).to_string();
        self.client
            .request_checked(ApiRequest::post(paths::UNFRIEND).form([
                ("container", container.as_str()),
                ("name", self.data.name.as_str()),
                ("type", "enemy"),
            ]))
            .await
    }
}

impl PartialEq for Redditor {
    fn eq(&self, other: &Self) -> bool {
        self.data.name.to_lowercase() == other.data.name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::Scripted;
    use crate::client::{Body, Method};

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn from_data_keeps_unknown_fields() {
        let r = Redditor::from_data(
            ClientHandle::detached(),
            data(json!({"name": "spez", "id": "1w72", "link_karma": 10, "has_verified_email": true})),
        )
        .unwrap();
        assert_eq!(r.name(), "spez");
        assert_eq!(r.fullname().as_deref(), Some("t2_1w72"));
        assert_eq!(r.data.link_karma, Some(10));
        assert_eq!(r.data.extra.get("has_verified_email"), Some(&json!(true)));
        assert!(r.is_fetched());
    }

    #[test]
    fn from_data_requires_name() {
        let err = Redditor::from_data(ClientHandle::detached(), data(json!({"id": "1w72"})))
            .unwrap_err();
        assert!(matches!(err, ModelError::Decode { .. }));
    }

    #[test]
    fn author_field_rules() {
        let client = ClientHandle::detached();
        assert!(Redditor::from_author(&client, None).is_none());
        assert!(Redditor::from_author(&client, Some("")).is_none());
        assert!(Redditor::from_author(&client, Some("[deleted]")).is_none());
        let r = Redditor::from_author(&client, Some("spez")).unwrap();
        assert_eq!(r.name(), "spez");
        assert!(!r.is_fetched());
    }

    #[test]
    fn equality_ignores_case() {
        let client = ClientHandle::detached();
        assert_eq!(
            Redditor::named(client.clone(), "Spez"),
            Redditor::named(client.clone(), "spez")
        );
        assert_ne!(Redditor::named(client.clone(), "spez"), Redditor::named(client, "kn0thing"));
    }

    #[test]
    fn paths() {
        let r = Redditor::named(ClientHandle::detached(), "spez");
        assert_eq!(r.path(), "user/spez");
        assert_eq!(r.info_path(), "user/spez/about");
    }

    #[tokio::test]
    async fn fetch_loads_about_document() {
        let scripted = Scripted::new([json!({
            "kind": "t2",
            "data": {"name": "spez", "id": "1w72", "comment_karma": 5}
        })]);
        let mut r = Redditor::named(ClientHandle::from_arc(scripted.clone()), "spez");
        r.fetch().await.unwrap();
        assert!(r.is_fetched());
        assert_eq!(r.data.comment_karma, Some(5));

        let seen = scripted.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Get);
        assert_eq!(seen[0].path, "user/spez/about");
    }

    #[tokio::test]
    async fn fetch_rejects_wrong_kind() {
        let scripted = Scripted::new([json!({"kind": "t5", "data": {"display_name": "rust"}})]);
        let mut r = Redditor::named(ClientHandle::from_arc(scripted), "spez");
        let err = r.fetch().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Objectify(crate::ObjectifyError::Model(ModelError::UnexpectedKind { .. }))
        ));
        assert!(!r.is_fetched());
    }

    #[tokio::test]
    async fn friend_sends_note() {
        let scripted = Scripted::new([json!({
            "date": 1.5e9, "name": "spez", "id": "t2_1w72", "note": "hi"
        })]);
        let r = Redditor::named(ClientHandle::from_arc(scripted.clone()), "spez");
        let friend = r.friend(Some("hi")).await.unwrap();
        assert_eq!(friend, r);
        assert_eq!(friend.fullname().as_deref(), Some("t2_1w72"));
        assert_eq!(friend.data.date, Some(1.5e9));
        assert_eq!(friend.data.extra.get("note"), Some(&json!("hi")));

        let seen = scripted.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Put);
        assert_eq!(seen[0].path, "api/v1/me/friends/spez");
        assert_eq!(seen[0].body, Body::Json(json!({"note": "hi"})));
    }

    #[tokio::test]
    async fn friend_info_returns_relationship_record() {
        let scripted = Scripted::new([json!({"date": 1.6e9, "name": "spez", "id": "t2_1w72"})]);
        let r = Redditor::named(ClientHandle::from_arc(scripted.clone()), "spez");
        let info = r.friend_info().await.unwrap();
        assert_eq!(info.name(), "spez");
        assert_eq!(info.data.date, Some(1.6e9));

        let seen = scripted.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Get);
        assert_eq!(seen[0].params, vec![("id".to_string(), "spez".to_string())]);
    }

    #[tokio::test]
    async fn friend_rejects_non_object_response() {
        let scripted = Scripted::new([json!(["not", "a", "record"])]);
        let r = Redditor::named(ClientHandle::from_arc(scripted), "spez");
        let err = r.friend(None).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Objectify(crate::ObjectifyError::Model(ModelError::Decode { .. }))
        ));
    }

    #[test]
    fn fullname_accepts_prefixed_id() {
        let r = Redditor::from_data(
            ClientHandle::detached(),
            data(json!({"name": "spez", "id": "t2_1w72"})),
        )
        .unwrap();
        assert_eq!(r.fullname().as_deref(), Some("t2_1w72"));
    }

    #[tokio::test]
    async fn unfriend_uses_delete() {
        let scripted = Scripted::new(Vec::<Value>::new());
        let r = Redditor::named(ClientHandle::from_arc(scripted.clone()), "spez");
        r.unfriend().await.unwrap();

        let seen = scripted.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::Delete);
        assert_eq!(seen[0].body, Body::Json(json!({"id": "spez"})));
    }

    #[tokio::test]
    async fn unblock_targets_own_enemy_list() {
        let scripted = Scripted::new([json!({"name": "me", "id": "abc"}), json!({})]);
        let r = Redditor::named(ClientHandle::from_arc(scripted.clone()), "spez");
        r.unblock().await.unwrap();

        let seen = scripted.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].path, "api/v1/me");
        assert_eq!(seen[1].path, "api/unfriend");
        assert_eq!(
            seen[1].body,
            Body::Form(vec![
                ("container".into(), "t2_abc".into()),
                ("name".into(), "spez".into()),
                ("type".into(), "enemy".into()),
            ])
        );
    }

    #[tokio::test]
    async fn friend_surfaces_api_error() {
        let scripted = Scripted::new([json!({
            "json": {"errors": [["USER_DOESNT_EXIST", "that user doesn't exist", "name"]]}
        })]);
        let r = Redditor::named(ClientHandle::from_arc(scripted), "ghost");
        let err = r.friend(None).await.unwrap_err();
        let api = err.as_api_error().unwrap();
        assert_eq!(api.error_code, "USER_DOESNT_EXIST");
        assert_eq!(api.field.as_deref(), Some("name"));
    }
}
