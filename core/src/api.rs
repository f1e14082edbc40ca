//! Executing facade over the endpoint contracts.
//!
//! # Design
//! `CollabApi` is the composition root's handle: one `CollabClient` for
//! building/parsing, one `AuthenticatedClient` for the round-trip, and the
//! shared session store. Every method is `build → send → parse`. It is cheap
//! to clone so screens and worker jobs can each hold a copy; all copies share
//! the same transport and session store.

use std::sync::Arc;

use crate::authenticated::{AuthenticatedClient, Exchange};
use crate::client::CollabClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, ValidationError};
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::transport::Transport;
use crate::types::{
    AuthResponse, CurrentUser, Invitation, LoginRequest, Project, ProjectMember, ProjectSpec,
    RegisterRequest, Role, User,
};

#[derive(Clone)]
pub struct CollabApi {
    client: CollabClient,
    http: AuthenticatedClient,
}

impl CollabApi {
    pub fn new(
        base_url: &str,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: CollabClient::new(base_url)?,
            http: AuthenticatedClient::new(transport, session),
        })
    }

    /// Wire up the configured session store with the given transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        let session: Arc<dyn SessionStore> = match &config.session_file {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        Self::new(&config.base_url, transport, session)
    }

    /// Composition root using the bundled `ureq` transport.
    #[cfg(feature = "ureq")]
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_transport(config, Arc::new(crate::transport::UreqTransport::new()))
    }

    pub fn client(&self) -> &CollabClient {
        &self.client
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        self.http.session()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session().get().is_some()
    }

    fn call<T>(
        &self,
        request: Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&CollabClient, HttpResponse) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        match self.http.send(request?)? {
            Exchange::Unauthenticated(_) => Err(ApiError::Unauthorized),
            Exchange::Completed(response) => parse(&self.client, response),
        }
    }

    fn store_token(&self, auth: &AuthResponse) -> Result<(), ApiError> {
        if auth.token.trim().is_empty() {
            return Err(ApiError::Deserialization("server returned an empty token".into()));
        }
        self.session()
            .save(&auth.token)
            .map_err(|e| ApiError::Session(e.to_string()))
    }

    // -- auth ---------------------------------------------------------------

    /// Sign in and persist the returned token.
    pub fn login(&self, login: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(ValidationError::EmptyLogin.into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword.into());
        }
        let input = LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        };
        let auth = self.call(self.client.build_login(&input), CollabClient::parse_login)?;
        self.store_token(&auth)?;
        tracing::info!(login, "signed in");
        Ok(auth)
    }

    /// Create an account and persist the returned token. Validate the input
    /// with `flows::validate_registration` first.
    pub fn register(&self, input: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let auth = self.call(self.client.build_register(input), CollabClient::parse_register)?;
        self.store_token(&auth)?;
        tracing::info!(email = %input.email, "registered");
        Ok(auth)
    }

    pub fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.call(self.client.build_current_user(), CollabClient::parse_current_user)
    }

    /// Drop the stored credential. There is no server-side logout.
    pub fn logout(&self) {
        if let Err(err) = self.session().clear() {
            tracing::warn!(error = %err, "failed to clear session on logout");
        }
        tracing::info!("signed out");
    }

    // -- projects -----------------------------------------------------------

    pub fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, ApiError> {
        self.call(self.client.build_list_projects(owner_id), CollabClient::parse_list_projects)
    }

    pub fn create_project(&self, input: &ProjectSpec) -> Result<Project, ApiError> {
        self.call(self.client.build_create_project(input), CollabClient::parse_create_project)
    }

    pub fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        self.call(self.client.build_get_project(id), CollabClient::parse_get_project)
    }

    pub fn update_project(&self, id: &str, input: &ProjectSpec) -> Result<(), ApiError> {
        self.call(self.client.build_update_project(id, input), CollabClient::parse_update_project)
    }

    pub fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        self.call(self.client.build_delete_project(id), CollabClient::parse_delete_project)
    }

    // -- members ------------------------------------------------------------

    pub fn list_members(&self, project_id: &str) -> Result<Vec<ProjectMember>, ApiError> {
        self.call(self.client.build_list_members(project_id), CollabClient::parse_list_members)
    }

    pub fn add_member(&self, project_id: &str, user_id: &str, role: Role) -> Result<ProjectMember, ApiError> {
        self.call(
            self.client.build_add_member(project_id, user_id, role),
            CollabClient::parse_add_member,
        )
    }

    pub fn remove_member(&self, project_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.call(
            self.client.build_remove_member(project_id, user_id),
            CollabClient::parse_remove_member,
        )
    }

    pub fn update_member_role(
        &self,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<ProjectMember, ApiError> {
        self.call(
            self.client.build_update_member_role(project_id, user_id, role),
            CollabClient::parse_update_member_role,
        )
    }

    // -- invitations --------------------------------------------------------

    pub fn lookup_user_by_email(&self, email: &str) -> Result<User, ApiError> {
        self.call(
            self.client.build_lookup_user_by_email(email),
            CollabClient::parse_lookup_user_by_email,
        )
    }

    pub fn send_invitation(
        &self,
        project_id: &str,
        invited_user_id: &str,
        role: Role,
    ) -> Result<Invitation, ApiError> {
        self.call(
            self.client.build_send_invitation(project_id, invited_user_id, role),
            CollabClient::parse_send_invitation,
        )
    }

    pub fn list_my_invitations(&self) -> Result<Vec<Invitation>, ApiError> {
        self.call(self.client.build_list_my_invitations(), CollabClient::parse_list_my_invitations)
    }

    pub fn accept_invitation(&self, invitation_id: &str) -> Result<Invitation, ApiError> {
        self.call(
            self.client.build_accept_invitation(invitation_id),
            CollabClient::parse_accept_invitation,
        )
    }

    pub fn reject_invitation(&self, invitation_id: &str) -> Result<Invitation, ApiError> {
        self.call(
            self.client.build_reject_invitation(invitation_id),
            CollabClient::parse_reject_invitation,
        )
    }

    pub fn list_project_invitations(&self, project_id: &str) -> Result<Vec<Invitation>, ApiError> {
        self.call(
            self.client.build_list_project_invitations(project_id),
            CollabClient::parse_list_project_invitations,
        )
    }

    pub fn cancel_invitation(&self, project_id: &str, invitation_id: &str) -> Result<(), ApiError> {
        self.call(
            self.client.build_cancel_invitation(project_id, invitation_id),
            CollabClient::parse_cancel_invitation,
        )
    }

    // -- users --------------------------------------------------------------

    pub fn get_user(&self, id: &str) -> Result<User, ApiError> {
        self.call(self.client.build_get_user(id), CollabClient::parse_get_user)
    }
}
