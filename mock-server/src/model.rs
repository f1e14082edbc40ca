//! Wire shapes of the mock backend.
//!
//! Inputs are PascalCase, matching what clients send. Outputs are split on
//! purpose: projects and members answer in PascalCase, everything else in
//! camelCase, so clients have to accept both.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_VIEWER: &str = "viewer";

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";
pub const STATUS_REJECTED: &str = "rejected";

/// Lowercased role if it is one of the known ones.
pub fn normalize_role(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        ROLE_OWNER => Some(ROLE_OWNER),
        ROLE_EDITOR => Some(ROLE_EDITOR),
        ROLE_VIEWER => Some(ROLE_VIEWER),
        _ => None,
    }
}

pub fn normalize_visibility(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "private" => Some("private"),
        "public" => Some("public"),
        _ => None,
    }
}

// --- stored records -------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub login: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub default_language_id: Option<String>,
    pub visibility: String,
    pub required_reviewers_rules: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership row. `CreatedAt` goes out without an offset, as some backend
/// endpoints do.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Member {
    pub project_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub project_id: String,
    pub invited_user_id: String,
    pub invited_by_user_id: String,
    pub role: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// --- responses --------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: Option<String>,
    pub login: Option<String>,
    pub email: String,
}

impl From<&Account> for UserView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            login: account.login.clone(),
            email: account.email.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub login: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenView {
    pub token: String,
}

// --- requests ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginInput {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
}

/// Create/update body. For updates a missing key keeps the stored value and
/// an explicit `null` clears it, hence the nested options.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub default_language_id: Option<Option<String>>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub required_reviewers_rules: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemberInput {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleInput {
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvitationInput {
    pub invited_user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    #[serde(rename = "ownerId")]
    pub owner_id: Option<String>,
}
