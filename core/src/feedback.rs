//! User-facing outcome taxonomy.
//!
//! Screens never show raw `ApiError`s. [`Feedback::from_error`] folds an error
//! plus the resource the screen was addressing into one of a handful of
//! messages.

use crate::error::{ApiError, ValidationError};

/// What a failed call was addressing, used to word a 404 or a 409.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    User,
    Project,
    Invitation,
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    NetworkError,
    /// The credential was rejected; the session is already cleared.
    SessionExpired,
    UserNotFound,
    ProjectNotFound,
    InvitationNotFound,
    MemberNotFound,
    AlreadyExists(Resource),
    Failed { status: Option<u16> },
    Invalid(ValidationError),
}

impl Feedback {
    pub fn from_error(err: &ApiError, addressed: Resource) -> Self {
        match err {
            ApiError::Unauthorized => Feedback::SessionExpired,
            ApiError::Transport(_) => Feedback::NetworkError,
            ApiError::Conflict { .. } => Feedback::AlreadyExists(addressed),
            ApiError::NotFound { body } => Self::not_found(body, addressed),
            ApiError::Validation(invalid) => Feedback::Invalid(invalid.clone()),
            ApiError::Http { status, .. } => Feedback::Failed {
                status: Some(*status),
            },
            ApiError::Deserialization(_) | ApiError::Serialization(_) | ApiError::Session(_) => {
                Feedback::Failed { status: None }
            }
        }
    }

    fn not_found(body: &str, addressed: Resource) -> Self {
        if body.contains("User not found") {
            return Feedback::UserNotFound;
        }
        if body.contains("Project") {
            return Feedback::ProjectNotFound;
        }
        match addressed {
            Resource::User => Feedback::UserNotFound,
            Resource::Project => Feedback::ProjectNotFound,
            Resource::Invitation => Feedback::InvitationNotFound,
            Resource::Member => Feedback::MemberNotFound,
        }
    }

    /// The screen should navigate to the login screen.
    pub fn requires_login(&self) -> bool {
        matches!(self, Feedback::SessionExpired)
    }

    pub fn message(&self) -> String {
        match self {
            Feedback::NetworkError => "Network error. Check your connection and try again.".into(),
            Feedback::SessionExpired => "Your session has expired. Please sign in again.".into(),
            Feedback::UserNotFound => "User not found".into(),
            Feedback::ProjectNotFound => "Project not found".into(),
            Feedback::InvitationNotFound => "Invitation not found".into(),
            Feedback::MemberNotFound => "Member not found".into(),
            Feedback::AlreadyExists(Resource::User) => "An account with this email already exists".into(),
            Feedback::AlreadyExists(Resource::Project) => "A project with this name already exists".into(),
            Feedback::AlreadyExists(Resource::Member) => "User is already a member".into(),
            Feedback::AlreadyExists(Resource::Invitation) => {
                "An invitation for this user already exists".into()
            }
            Feedback::Failed { status: Some(status) } => format!("Request failed ({status})"),
            Feedback::Failed { status: None } => "Request failed".into(),
            Feedback::Invalid(invalid) => capitalize_sentence(&invalid.to_string()),
        }
    }
}

fn capitalize_sentence(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn not_found(body: &str) -> ApiError {
        ApiError::NotFound { body: body.into() }
    }

    #[test]
    fn not_found_body_wins_over_addressed_resource() {
        assert_eq!(
            Feedback::from_error(&not_found("User not found"), Resource::Project),
            Feedback::UserNotFound
        );
        assert_eq!(
            Feedback::from_error(&not_found("Project not found"), Resource::User),
            Feedback::ProjectNotFound
        );
        assert_eq!(
            Feedback::from_error(&not_found(""), Resource::Invitation),
            Feedback::InvitationNotFound
        );
    }

    #[test]
    fn unauthorized_requires_login() {
        let feedback = Feedback::from_error(&ApiError::Unauthorized, Resource::Member);
        assert!(feedback.requires_login());
        assert!(!Feedback::NetworkError.requires_login());
    }

    #[test]
    fn conflicts_are_worded_per_resource() {
        let conflict = ApiError::Conflict {
            body: "Email already registered".into(),
        };
        let message = |resource| Feedback::from_error(&conflict, resource).message();
        assert_eq!(message(Resource::User), "An account with this email already exists");
        assert_eq!(message(Resource::Member), "User is already a member");
        assert_eq!(message(Resource::Invitation), "An invitation for this user already exists");
        assert_eq!(message(Resource::Project), "A project with this name already exists");
    }

    #[test]
    fn messages() {
        let server = ApiError::Http {
            status: 503,
            body: String::new(),
        };
        assert_eq!(Feedback::from_error(&server, Resource::Project).message(), "Request failed (503)");
        let invalid = ApiError::from(ValidationError::PasswordTooShort { min: 6 });
        assert_eq!(
            Feedback::from_error(&invalid, Resource::User).message(),
            "Password must be at least 6 characters"
        );
        assert_eq!(
            Feedback::from_error(&ApiError::Transport("reset".into()), Resource::User),
            Feedback::NetworkError
        );
    }
}
