//! Authenticated API-access layer for the project collaboration client.
//!
//! # Overview
//! Request building and response parsing stay free of IO (host-does-IO): a
//! [`CollabClient`] turns operations into `HttpRequest` values and responses
//! back into typed results. [`AuthenticatedClient`] executes a request through
//! a [`Transport`], attaching the bearer credential from the [`SessionStore`]
//! and clearing it when the server answers 401. [`CollabApi`] ties both
//! together and is what screens hold.
//!
//! # Design
//! - One composition root (`CollabApi::from_config`); no global client.
//! - DTOs decode PascalCase and camelCase field names; requests always use
//!   PascalCase and encode absent optionals as explicit `null`.
//! - [`UserCache`] deduplicates per-row user lookups on list screens.
//! - Blocking calls run on the [`Dispatcher`]; results for screens that are
//!   gone are dropped.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod authenticated;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod feedback;
pub mod flows;
pub mod http;
pub mod route;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::CollabApi;
pub use authenticated::{AuthenticatedClient, Exchange};
pub use cache::{Poll, UserCache};
pub use client::CollabClient;
pub use config::ClientConfig;
pub use dispatch::{Dispatcher, Liveness};
pub use error::{ApiError, SessionError, TransportError, ValidationError};
pub use feedback::{Feedback, Resource};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use transport::Transport;
pub use types::{
    CurrentUser, Invitation, InvitationStatus, Project, ProjectMember, ProjectSpec, Role, User,
    Visibility,
};
