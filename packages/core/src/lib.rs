//! Response objectification for the orangered API client.
//!
//! The server answers every request with JSON in one of a handful of
//! shapes: error envelopes, `kind`/`data` thing envelopes, listings of
//! things, or plain data. This crate turns those decoded values into typed
//! domain objects, and turns server-reported errors into typed errors the
//! caller can branch on. It performs no I/O itself; the
//! `orangered-client` crate supplies the HTTP transport.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`objector`] | [`Objector`], [`parse_error`], [`check_error`] |
//! | [`registry`] | [`TypeRegistry`]: kind → constructor dispatch table |
//! | [`models`] | Domain objects: [`Comment`], [`Redditor`], [`Submission`], ... |
//! | [`client`] | [`Requester`] seam and the [`ClientHandle`] models hold |
//! | [`error`] | [`ApiError`], [`ObjectifyError`], [`Error`] |
//! | [`render`] | Plain-text rendering of objectified values |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orangered::{ClientHandle, Objector, Thing, TypeRegistry};
//!
//! let objector = Objector::new(
//!     Arc::new(TypeRegistry::with_defaults()),
//!     ClientHandle::detached(),
//! );
//!
//! let body = serde_json::json!({"kind": "t2", "data": {"name": "spez"}});
//! let result = objector.objectify(body)?;
//! if let Some(Thing::Redditor(r)) = result.as_thing() {
//!     println!("u/{}", r.name());
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod objector;
pub mod registry;
pub mod render;

pub use client::{ApiRequest, Body, ClientHandle, Method, Requester};
pub use error::{ApiError, Error, ObjectifyError};
pub use models::{
    Comment, CustomThing, Listing, Message, ModelError, MoreComments, Redditor, Submission,
    Subreddit, Thing,
};
pub use objector::{check_error, parse_error, Objectified, Objector, DEFAULT_MAX_DEPTH};
pub use registry::{Constructor, Dispatch, TypeRegistry, USER_RECORD_KEYS};
