//! Transfer objects for the collaboration API.
//!
//! # Design
//! The backend is inconsistent about field casing, so every response field is
//! declared with its canonical PascalCase name and one camelCase alias; the
//! pair of spellings per field is the alias table. Request payloads always
//! encode the canonical names and emit `null` for absent optional values,
//! since the project update endpoint treats a missing key differently from an
//! explicit null.
//!
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch schema drift.

pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use wire::{InvitationStatus, Role, UnknownVariant, Visibility};

/// Placeholder the backend stores when a project has no description.
pub const NO_DESCRIPTION: &str = "No description";

/// The default language sent when the user picked none.
pub fn unset_language_id() -> String {
    Uuid::nil().to_string()
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "Login", alias = "login")]
    pub login: String,
    #[serde(rename = "Password", alias = "password")]
    pub password: String,
}

/// Registration payload. `Name` and `Login` are optional and sent as `null`
/// when left blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "Email", alias = "email")]
    pub email: String,
    #[serde(rename = "Password", alias = "password")]
    pub password: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Login", alias = "login", default)]
    pub login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "Token", alias = "token")]
    pub token: String,
}

/// The authenticated user as reported by `/api/auth/me`. `sub` is the id used
/// as "current user id" everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "Sub", alias = "sub")]
    pub sub: String,
    #[serde(rename = "Email", alias = "email", default)]
    pub email: Option<String>,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Login", alias = "login", default)]
    pub login: Option<String>,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "Description", alias = "description", default)]
    pub description: Option<String>,
    #[serde(rename = "OwnerId", alias = "ownerId", default)]
    pub owner_id: Option<String>,
    #[serde(rename = "DefaultLanguageId", alias = "defaultLanguageId", default)]
    pub default_language_id: Option<String>,
    #[serde(rename = "Visibility", alias = "visibility", default)]
    pub visibility: Visibility,
    #[serde(rename = "RequiredReviewersRules", alias = "requiredReviewersRules", default)]
    pub required_reviewers_rules: Option<String>,
    #[serde(rename = "CreatedAt", alias = "createdAt", default, with = "wire::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "UpdatedAt", alias = "updatedAt", default, with = "wire::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Role of the signed-in user, attached locally from a membership
    /// lookup. Never read from or written to the wire.
    #[serde(skip)]
    pub role: Option<Role>,
}

impl Project {
    /// The description, with the "no description" sentinel and blanks read
    /// as absent.
    pub fn description_text(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && *d != NO_DESCRIPTION)
    }
}

/// Create/update payload for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Description", alias = "description", default)]
    pub description: Option<String>,
    #[serde(rename = "OwnerId", alias = "ownerId")]
    pub owner_id: String,
    #[serde(rename = "DefaultLanguageId", alias = "defaultLanguageId", default)]
    pub default_language_id: Option<String>,
    #[serde(rename = "Visibility", alias = "visibility", default)]
    pub visibility: Visibility,
    #[serde(rename = "RequiredReviewersRules", alias = "requiredReviewersRules", default)]
    pub required_reviewers_rules: Option<String>,
}

impl ProjectSpec {
    /// A private project with the unset language and no reviewer rules. A
    /// blank description is replaced by [`NO_DESCRIPTION`].
    pub fn new(name: &str, description: &str, owner_id: &str) -> Self {
        let description = description.trim();
        Self {
            name: name.trim().to_string(),
            description: Some(if description.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                description.to_string()
            }),
            owner_id: owner_id.trim().to_string(),
            default_language_id: Some(unset_language_id()),
            visibility: Visibility::Private,
            required_reviewers_rules: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    #[serde(rename = "ProjectId", alias = "projectId")]
    pub project_id: String,
    #[serde(rename = "UserId", alias = "userId")]
    pub user_id: String,
    #[serde(rename = "Role", alias = "role")]
    pub role: Role,
    #[serde(rename = "CreatedAt", alias = "createdAt", default, with = "wire::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMemberRequest {
    #[serde(rename = "UserId", alias = "userId")]
    pub user_id: String,
    #[serde(rename = "Role", alias = "role")]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(rename = "Role", alias = "role")]
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Invitations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "ProjectId", alias = "projectId")]
    pub project_id: String,
    #[serde(rename = "InvitedUserId", alias = "invitedUserId")]
    pub invited_user_id: String,
    #[serde(rename = "InvitedByUserId", alias = "invitedByUserId", default)]
    pub invited_by_user_id: Option<String>,
    #[serde(rename = "Role", alias = "role")]
    pub role: Role,
    #[serde(rename = "Status", alias = "status")]
    pub status: InvitationStatus,
    #[serde(rename = "ExpiresAt", alias = "expiresAt", default, with = "wire::timestamp")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(rename = "CreatedAt", alias = "createdAt", default, with = "wire::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendInvitationRequest {
    #[serde(rename = "InvitedUserId", alias = "invitedUserId")]
    pub invited_user_id: String,
    #[serde(rename = "Role", alias = "role")]
    pub role: Role,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Read-only projection of an account, used for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "Login", alias = "login", default)]
    pub login: Option<String>,
    #[serde(rename = "Email", alias = "email", default)]
    pub email: Option<String>,
}

impl User {
    /// Name, else login, else email, else the raw id. Blank values are skipped.
    pub fn display_name(&self) -> &str {
        [&self.name, &self.login, &self.email]
            .into_iter()
            .filter_map(|field| field.as_deref().map(str::trim))
            .find(|value| !value.is_empty())
            .unwrap_or(self.id.as_str())
    }
}
