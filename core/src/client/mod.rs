//! Stateless HTTP request builder and response parser for the collaboration
//! API.
//!
//! # Design
//! `CollabClient` holds only the base URL and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`. The
//! caller executes the round-trip in between, normally through
//! `AuthenticatedClient`. Operations are grouped by resource in the
//! submodules; each group is an `impl CollabClient` block.

mod auth;
mod invitations;
mod members;
mod projects;
mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::ApiError;
use crate::http::{
    HttpRequest, HttpResponse, APPLICATION_JSON, CONFLICT, CONTENT_TYPE, NOT_FOUND, UNAUTHORIZED,
};
use crate::route::Route;

#[derive(Debug, Clone)]
pub struct CollabClient {
    base_url: Url,
}

impl CollabClient {
    /// Fails when `base_url` is not an absolute URL that can carry a path.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| ApiError::Serialization(format!("invalid base url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Serialization(format!(
                "base url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn empty_request(&self, route: Route, args: &[&str]) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: route.method,
            path: route.url(&self.base_url, args)?.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    fn json_request<B: Serialize>(
        &self,
        route: Route,
        args: &[&str],
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: route.method,
            path: route.url(&self.base_url, args)?.into(),
            headers: vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())],
            body: Some(body),
        })
    }
}

/// Map non-2xx status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = response.body.clone();
    Err(match response.status {
        UNAUTHORIZED => ApiError::Unauthorized,
        NOT_FOUND => ApiError::NotFound { body },
        CONFLICT => ApiError::Conflict { body },
        status => ApiError::Http { status, body },
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn parse_empty(response: HttpResponse) -> Result<(), ApiError> {
    check_status(&response)
}
