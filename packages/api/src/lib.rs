//! Wire-format types for the orangered API client.
//!
//! This crate encodes the JSON shapes the server uses for its responses,
//! the discriminator codes that identify each kind of thing, and the path
//! templates of the endpoints the client calls. It performs no I/O and has
//! no opinion about how responses are turned into domain objects; that is
//! the job of the `orangered` core crate.
//!
//! # Envelopes covered
//!
//! | Shape | Type |
//! |-------|------|
//! | `{"json": {"errors": [[code, message, field], ...]}}` | [`ErrorEntry`] |
//! | `{"kind": "...", "data": {...}}` | [`ThingEnvelope`] |
//! | `{"kind": "Listing", "data": {"children": [...], "before", "after"}}` | [`ListingData`] |

pub mod envelope;
pub mod kinds;
pub mod paths;

pub use envelope::{ErrorEntry, ListingData, ThingEnvelope};
pub use kinds::{Fullname, FullnameError};
