//! Response objectification.
//!
//! [`Objector::objectify`] takes any decoded response body and turns it
//! into an [`Objectified`] value:
//!
//! | Input | Result |
//! |-------|--------|
//! | `null` | [`Objectified::Null`] |
//! | error envelope | `Err` (see [`parse_error`]) |
//! | array | [`Objectified::List`], element-wise, order kept |
//! | `{"kind": <listing>, "data": {...}}` | [`Objectified::Listing`] |
//! | `{"kind": <registered>, "data": {...}}` | [`Objectified::Thing`] |
//! | `{"kind": <unknown>, "data": {...}}` | [`Objectified::Data`], `data` untouched |
//! | object matching a registered shape | [`Objectified::Thing`], built from the whole object |
//! | any other object | [`Objectified::Map`], value-wise, keys kept |
//! | bool, number, string | the same scalar |
//!
//! The error gate runs at every node, not only at the top level. A failure
//! anywhere aborts the whole conversion.

use std::collections::BTreeMap;
use std::sync::Arc;

use orangered_api::envelope::{DATA_KEY, ERRORS_KEY, JSON_KEY, KIND_KEY};
use orangered_api::{ErrorEntry, ListingData};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::client::ClientHandle;
use crate::error::{ApiError, ObjectifyError};
use crate::models::{Listing, Thing};
use crate::registry::{Dispatch, TypeRegistry};

/// Default nesting limit for [`Objector::objectify`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// The result of objectifying a decoded response.
#[derive(Debug, Clone)]
pub enum Objectified {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Objectified>),
    /// An object that was not an envelope, with every value objectified.
    Map(BTreeMap<String, Objectified>),
    Thing(Thing),
    Listing(Listing),
    /// The untouched `data` of an envelope whose kind is not registered.
    Data(Map<String, Value>),
}

impl Objectified {
    pub fn is_null(&self) -> bool {
        matches!(self, Objectified::Null)
    }

    pub fn as_thing(&self) -> Option<&Thing> {
        match self {
            Objectified::Thing(thing) => Some(thing),
            _ => None,
        }
    }

    pub fn into_thing(self) -> Option<Thing> {
        match self {
            Objectified::Thing(thing) => Some(thing),
            _ => None,
        }
    }

    pub fn as_listing(&self) -> Option<&Listing> {
        match self {
            Objectified::Listing(listing) => Some(listing),
            _ => None,
        }
    }

    pub fn into_listing(self) -> Option<Listing> {
        match self {
            Objectified::Listing(listing) => Some(listing),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Objectified::String(s) => Some(s),
            _ => None,
        }
    }

    /// Re-encode as JSON. Things and listings become envelopes again, so
    /// a value with no envelopes in it comes back exactly as it went in.
    pub fn to_value(&self) -> Value {
        match self {
            Objectified::Null => Value::Null,
            Objectified::Bool(b) => Value::Bool(*b),
            Objectified::Number(n) => Value::Number(n.clone()),
            Objectified::String(s) => Value::String(s.clone()),
            Objectified::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Objectified::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Objectified::Thing(thing) => thing.to_value(),
            Objectified::Listing(listing) => listing.to_value(),
            Objectified::Data(data) => Value::Object(data.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Error gate
// ---------------------------------------------------------------------------

/// Look for an error envelope in `value`.
///
/// Returns `Ok(None)` unless `value` is an object whose `json` member is an
/// object whose `errors` member is an array. When it is:
///
/// - one entry → `Ok(Some(ApiError))`
/// - no entries → [`ObjectifyError::Client`]
/// - several entries → [`ObjectifyError::MultipleApiErrors`] with all of them
/// - an entry that is not a `[code, message, field]` triple → [`ObjectifyError::Client`]
pub fn parse_error(value: &Value) -> Result<Option<ApiError>, ObjectifyError> {
    let Some(errors) = value
        .get(JSON_KEY)
        .and_then(|json| json.get(ERRORS_KEY))
        .and_then(Value::as_array)
    else {
        return Ok(None);
    };

    match errors.as_slice() {
        [] => Err(client_error("error envelope contains no errors", value)),
        [entry] => api_error(entry, value)
            .map(Some)
            .map_err(|reason| client_error(reason, value)),
        entries => {
            let count = entries.len();
            warn!(count, "server reported multiple errors in one response");
            let parsed = entries
                .iter()
                .map(|entry| api_error(entry, value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|reason| {
                    client_error(format!("envelope reports {count} errors; {reason}"), value)
                })?;
            Err(ObjectifyError::MultipleApiErrors(parsed))
        }
    }
}

/// Fail with the server-reported error in `value`, if there is one.
pub fn check_error(value: &Value) -> Result<(), ObjectifyError> {
    match parse_error(value)? {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

fn client_error(message: impl Into<String>, envelope: &Value) -> ObjectifyError {
    ObjectifyError::Client {
        message: message.into(),
        raw_envelope: envelope.clone(),
    }
}

/// Decode one `[code, explanation, field]` entry. `Err` holds the reason
/// the entry was rejected.
fn api_error(entry: &Value, envelope: &Value) -> Result<ApiError, String> {
    let ErrorEntry(error_code, explanation, field) =
        serde_json::from_value::<ErrorEntry>(entry.clone())
            .map_err(|e| format!("malformed error entry {entry}: {e}"))?;
    Ok(ApiError {
        error_code,
        explanation,
        field,
        raw_envelope: envelope.clone(),
    })
}

// ---------------------------------------------------------------------------
// Objector
// ---------------------------------------------------------------------------

/// Converts decoded responses using a frozen [`TypeRegistry`].
///
/// Cheap to clone; all clones share the registry. Every thing it builds is
/// handed the same [`ClientHandle`].
#[derive(Debug, Clone)]
pub struct Objector {
    registry: Arc<TypeRegistry>,
    client: ClientHandle,
    max_depth: usize,
}

impl Objector {
    pub fn new(registry: Arc<TypeRegistry>, client: ClientHandle) -> Self {
        Self {
            registry,
            client,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// See [`parse_error`].
    pub fn parse_error(&self, value: &Value) -> Result<Option<ApiError>, ObjectifyError> {
        parse_error(value)
    }

    /// See [`check_error`].
    pub fn check_error(&self, value: &Value) -> Result<(), ObjectifyError> {
        check_error(value)
    }

    /// Convert `value` into domain objects. See the module docs for the
    /// rules.
    pub fn objectify(&self, value: Value) -> Result<Objectified, ObjectifyError> {
        self.convert(value, 0)
    }

    fn convert(&self, value: Value, depth: usize) -> Result<Objectified, ObjectifyError> {
        if depth > self.max_depth {
            return Err(ObjectifyError::TooDeep(self.max_depth));
        }
        if value.is_null() {
            return Ok(Objectified::Null);
        }
        check_error(&value)?;

        match value {
            Value::Null => Ok(Objectified::Null),
            Value::Bool(b) => Ok(Objectified::Bool(b)),
            Value::Number(n) => Ok(Objectified::Number(n)),
            Value::String(s) => Ok(Objectified::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.convert(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Objectified::List),
            Value::Object(map) => self.convert_object(map, depth),
        }
    }

    fn convert_object(
        &self,
        mut map: Map<String, Value>,
        depth: usize,
    ) -> Result<Objectified, ObjectifyError> {
        let kind = map
            .get(KIND_KEY)
            .and_then(Value::as_str)
            .map(str::to_owned);

        if let Some(kind) = kind {
            let dispatch = self.registry.dispatch(&kind);
            match (dispatch, map.remove(DATA_KEY)) {
                (Some(dispatch), Some(Value::Object(data))) => {
                    return self.dispatch(dispatch, kind, data, depth);
                }
                (Some(_), Some(other)) => {
                    return Err(ObjectifyError::Malformed {
                        kind,
                        reason: format!("`data` must be an object, got {}", type_name(&other)),
                    });
                }
                (None, Some(Value::Object(data))) => {
                    debug!(%kind, "no constructor registered; passing data through");
                    return Ok(Objectified::Data(data));
                }
                // Not an envelope after all: put `data` back and fall
                // through to the plain-object case.
                (None, Some(other)) => {
                    map.insert(DATA_KEY.to_string(), other);
                }
                (_, None) => {}
            }
        }

        if let Some((tag, constructor)) = self.registry.match_shape(&map) {
            debug!(kind = tag, "constructing thing from record shape");
            return Ok(Objectified::Thing(constructor(&self.client, map)?));
        }

        map.into_iter()
            .map(|(key, value)| Ok((key, self.convert(value, depth + 1)?)))
            .collect::<Result<BTreeMap<_, _>, ObjectifyError>>()
            .map(Objectified::Map)
    }

    fn dispatch(
        &self,
        dispatch: Dispatch<'_>,
        kind: String,
        data: Map<String, Value>,
        depth: usize,
    ) -> Result<Objectified, ObjectifyError> {
        match dispatch {
            Dispatch::Listing => self.convert_listing(kind, data, depth),
            Dispatch::Thing(constructor) => {
                debug!(%kind, "constructing thing");
                Ok(Objectified::Thing(constructor(&self.client, data)?))
            }
        }
    }

    fn convert_listing(
        &self,
        kind: String,
        data: Map<String, Value>,
        depth: usize,
    ) -> Result<Objectified, ObjectifyError> {
        let ListingData {
            children,
            before,
            after,
            extra,
        } = serde_json::from_value(Value::Object(data)).map_err(|e| {
            ObjectifyError::Malformed {
                kind: kind.clone(),
                reason: e.to_string(),
            }
        })?;

        let children = children
            .into_iter()
            .map(|child| self.convert(child, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(%kind, count = children.len(), "converted listing");

        Ok(Objectified::Listing(Listing {
            kind,
            children,
            before,
            after,
            extra,
        }))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// --- tests -------------------------------------------------------------------
