//! Error taxonomy for objectification and for requests made through a
//! [`ClientHandle`](crate::ClientHandle).

use orangered_api::FullnameError;
use serde_json::Value;
use thiserror::Error;

use crate::models::ModelError;

/// One error reported by the server for a single request.
///
/// Built from an entry of an error envelope:
///
/// ```json
/// { "json": { "errors": [ ["USER_REQUIRED", "Please log in to do that.", null] ] } }
/// ```
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{error_code}: {explanation}{}", on_field(.field))]
pub struct ApiError {
    /// Machine-readable code, e.g. `"USER_REQUIRED"`.
    pub error_code: String,

    /// Human-readable explanation supplied by the server.
    pub explanation: String,

    /// The request field the error refers to, when the server names one.
    pub field: Option<String>,

    /// The complete envelope the error was extracted from.
    pub raw_envelope: Value,
}

fn on_field(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|f| format!(" (field: {f})"))
        .unwrap_or_default()
}

/// Errors produced while turning a decoded response into domain objects.
#[derive(Debug, Error)]
pub enum ObjectifyError {
    /// The server reported exactly one error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server reported several errors at once. All of them are kept,
    /// in server order.
    #[error("server reported {} errors: {}", .0.len(), join_codes(.0))]
    MultipleApiErrors(Vec<ApiError>),

    /// The error envelope was present but broke the protocol: an empty
    /// error list, or an entry that is not a `[code, message, field]` triple.
    #[error("client error: {message}")]
    Client { message: String, raw_envelope: Value },

    /// A node claimed a registered kind but its payload has the wrong shape.
    #[error("malformed {kind} envelope: {reason}")]
    Malformed { kind: String, reason: String },

    #[error("response nesting exceeds the depth limit of {0}")]
    TooDeep(usize),

    /// A registered constructor rejected its payload.
    #[error(transparent)]
    Model(#[from] ModelError),
}

fn join_codes(errors: &[ApiError]) -> String {
    errors
        .iter()
        .map(|e| e.error_code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ObjectifyError {
    /// Every server-reported error carried by this value, if any.
    pub fn api_errors(&self) -> &[ApiError] {
        match self {
            ObjectifyError::Api(e) => std::slice::from_ref(e),
            ObjectifyError::MultipleApiErrors(errors) => errors,
            _ => &[],
        }
    }
}

/// Errors returned by requests issued through a [`ClientHandle`](crate::ClientHandle).
#[derive(Debug, Error)]
pub enum Error {
    /// The response was received but could not be objectified, or it
    /// carried a server-reported error.
    #[error(transparent)]
    Objectify(#[from] ObjectifyError),

    /// The request never produced a response (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status and no error envelope.
    #[error("server returned status {status}")]
    BadStatus { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("response body is not valid JSON: {0}")]
    Decode(String),

    /// Obtaining or refreshing the access token failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The handle has no transport behind it.
    #[error("client handle is detached; no requests can be made")]
    Detached,

    /// A caller-supplied fullname was rejected before any request was made.
    #[error(transparent)]
    InvalidFullname(#[from] FullnameError),
}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        Error::Objectify(ObjectifyError::Api(e))
    }
}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Self {
        Error::Objectify(ObjectifyError::Model(e))
    }
}

impl Error {
    /// The single server-reported error behind this failure, if that is
    /// what it is.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Objectify(ObjectifyError::Api(e)) => Some(e),
            _ => None,
        }
    }
}
