//! Error types for the collaboration API client.
//!
//! # Design
//! `Unauthorized`, `NotFound` and `Conflict` get dedicated variants because
//! screens react to each of them differently (login redirect, resource
//! specific message, "already exists"). Every other non-2xx response lands in
//! `Http` with the raw status and body. `Transport` means no response was
//! obtained at all. `Validation` failures are raised before a request is
//! built, so no network traffic happens for them.

use thiserror::Error;

use crate::http::{CONFLICT, NOT_FOUND, UNAUTHORIZED};

/// Errors returned by endpoint builders, parsers and the authenticated client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered 401. The session store has already been cleared.
    #[error("session is no longer valid")]
    Unauthorized,

    /// The server answered 404. The body is kept so callers can tell which
    /// resource was missing.
    #[error("resource not found: {body}")]
    NotFound { body: String },

    /// The server answered 409.
    #[error("conflict: {body}")]
    Conflict { body: String },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The credential could not be persisted.
    #[error("session store failed: {0}")]
    Session(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Status code carried by the error, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(UNAUTHORIZED),
            ApiError::NotFound { .. } => Some(NOT_FOUND),
            ApiError::Conflict { .. } => Some(CONFLICT),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server produced an answer (as opposed to a transport,
    /// codec or validation failure).
    pub fn is_server_response(&self) -> bool {
        self.status().is_some()
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Client-side input problems detected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyIdentifier(&'static str),

    #[error("{what} '{value}' cannot be used as a path segment")]
    DotSegment { what: &'static str, value: String },

    #[error("email must not be empty")]
    EmptyEmail,

    #[error("'{0}' is not a valid email address")]
    MalformedEmail(String),

    #[error("password must not be empty")]
    EmptyPassword,

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("login must not be empty")]
    EmptyLogin,

    #[error("project name must not be empty")]
    EmptyProjectName,

    #[error("the owner role cannot be assigned")]
    OwnerRoleNotAssignable,
}

/// The transport could not obtain a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures of a persistent session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("session store lock poisoned")]
    Poisoned,
}
