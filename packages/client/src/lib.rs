//! HTTP transport for the orangered API client.
//!
//! This crate plugs a `reqwest`-based [`HttpRequester`] into the
//! [`Requester`](orangered::Requester) seam of the core crate, handles
//! OAuth2 token acquisition, and exposes [`Reddit`], the facade that sends a
//! request and objectifies its response in one step.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use orangered_client::{ClientConfig, Reddit};
//!
//! let reddit = Reddit::new(ClientConfig::from_env()?)?;
//! let mut user = reddit.redditor("spez");
//! user.fetch().await?;
//! println!("{} link karma", user.data.link_karma.unwrap_or(0));
//! ```

pub mod auth;
pub mod config;
pub mod reddit;
pub mod transport;

pub use config::{ClientConfig, ConfigError, Grant};
pub use reddit::Reddit;
pub use transport::HttpRequester;
