//! The client facade: transport + objectification in one place.

use std::sync::Arc;

use orangered::{
    ApiRequest, ClientHandle, Error, Listing, ModelError, Objectified, ObjectifyError, Objector,
    Redditor, Subreddit, TypeRegistry,
};
use orangered_api::{kinds, paths, Fullname};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::transport::HttpRequester;

/// An API client.
///
/// Every response goes through the [`Objector`], so callers get domain
/// objects or a typed error, never a raw error envelope. Cloning is cheap
/// and clones share the transport and token cache.
#[derive(Debug, Clone)]
pub struct Reddit {
    objector: Objector,
}

impl Reddit {
    /// Client with the built-in [`TypeRegistry`].
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::with_registry(config, TypeRegistry::with_defaults())
    }

    /// Client with a caller-built registry, frozen from here on.
    pub fn with_registry(config: ClientConfig, registry: TypeRegistry) -> Result<Self, Error> {
        let requester = HttpRequester::new(config)?;
        Ok(Self::from_parts(ClientHandle::new(requester), registry))
    }

    /// Client over any [`Requester`](orangered::Requester).
    pub fn from_parts(handle: ClientHandle, registry: TypeRegistry) -> Self {
        Self {
            objector: Objector::new(Arc::new(registry), handle),
        }
    }

    pub fn objector(&self) -> &Objector {
        &self.objector
    }

    pub fn handle(&self) -> &ClientHandle {
        self.objector.client()
    }

    /// Send `request` and objectify the response.
    pub async fn request(&self, request: ApiRequest) -> Result<Objectified, Error> {
        let value = self.handle().request(request).await?;
        Ok(self.objector.objectify(value)?)
    }

    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Objectified, Error> {
        let request = params
            .iter()
            .fold(ApiRequest::get(path), |req, (k, v)| req.param(*k, *v));
        self.request(request).await
    }

    pub async fn post(&self, path: &str, form: &[(&str, &str)]) -> Result<Objectified, Error> {
        self.request(ApiRequest::post(path).form(form.iter().copied()))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Objectified, Error> {
        self.request(ApiRequest::put(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Objectified, Error> {
        self.request(ApiRequest::delete(path)).await
    }

    /// A lazy redditor; nothing is requested until it is fetched.
    pub fn redditor(&self, name: impl Into<String>) -> Redditor {
        Redditor::named(self.handle().clone(), name)
    }

    /// A lazy subreddit; nothing is requested until it is fetched.
    pub fn subreddit(&self, name: impl Into<String>) -> Subreddit {
        Subreddit::named(self.handle().clone(), name)
    }

    /// The authenticated user.
    pub async fn me(&self) -> Result<Redditor, Error> {
        match self.handle().request_checked(ApiRequest::get(paths::ME)).await? {
            Value::Object(data) => Ok(Redditor::from_data(self.handle().clone(), data)?),
            _ => Err(ModelError::MissingField {
                kind: kinds::REDDITOR.into(),
                field: "name",
            }
            .into()),
        }
    }

    /// Look up things by fullname. Malformed fullnames fail with
    /// [`Error::InvalidFullname`] before anything is sent.
    pub async fn info(&self, fullnames: &[&str]) -> Result<Listing, Error> {
        let ids = fullnames
            .iter()
            .map(|name| name.parse::<Fullname>().map(|f| f.to_string()))
            .collect::<Result<Vec<_>, _>>()?
            .join(",");
        match self.get(paths::INFO, &[("id", &ids)]).await? {
            Objectified::Listing(listing) => Ok(listing),
            _ => Err(ObjectifyError::Malformed {
                kind: kinds::LISTING.into(),
                reason: "info did not return a listing".into(),
            }
            .into()),
        }
    }
}
