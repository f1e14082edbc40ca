//! Headless helpers behind the screens: input validation and the multi-step
//! calls a screen controller performs.
//!
//! Everything here is blocking and meant to run as a job on the
//! [`Dispatcher`](crate::dispatch::Dispatcher).

use std::sync::LazyLock;

use regex::Regex;

use crate::api::CollabApi;
use crate::error::{ApiError, ValidationError};
use crate::types::{
    Invitation, InvitationStatus, Project, ProjectMember, ProjectSpec, RegisterRequest, Role,
    Visibility, NO_DESCRIPTION,
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email pattern compiles")
});

/// Trimmed email, or why it is unusable.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !EMAIL.is_match(email) {
        return Err(ValidationError::MalformedEmail(email.to_string()));
    }
    Ok(email.to_string())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

pub fn validate_project_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyProjectName);
    }
    Ok(name.to_string())
}

/// Build a registration payload from raw form input. Blank name and login
/// become `None` and travel as `null`.
pub fn validate_registration(
    email: &str,
    password: &str,
    name: &str,
    login: &str,
) -> Result<RegisterRequest, ValidationError> {
    let email = validate_email(email)?;
    validate_password(password)?;
    let optional = |value: &str| Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string);
    Ok(RegisterRequest {
        email,
        password: password.to_string(),
        name: optional(name),
        login: optional(login),
    })
}

fn ensure_assignable(role: Role) -> Result<(), ValidationError> {
    if role.is_assignable() {
        Ok(())
    } else {
        Err(ValidationError::OwnerRoleNotAssignable)
    }
}

/// Look the invitee up by email and invite them. A 404 from the lookup comes
/// back as `ApiError::NotFound` and no invitation request is made.
pub fn invite_by_email(
    api: &CollabApi,
    project_id: &str,
    email: &str,
    role: Role,
) -> Result<Invitation, ApiError> {
    ensure_assignable(role)?;
    let email = validate_email(email)?;
    let user = api.lookup_user_by_email(&email)?;
    let user_id = user.id.trim();
    if user_id.is_empty() {
        return Err(ValidationError::EmptyIdentifier("invited user id").into());
    }
    tracing::debug!(project_id, user_id, role = %role, "inviting user");
    api.send_invitation(project_id, user_id, role)
}

/// Direct add. The owner role is never handed out.
pub fn add_member(
    api: &CollabApi,
    project_id: &str,
    user_id: &str,
    role: Role,
) -> Result<ProjectMember, ApiError> {
    ensure_assignable(role)?;
    api.add_member(project_id, user_id, role)
}

/// Outcome of a member removal plus whether the member list must be fetched
/// again.
#[derive(Debug)]
pub struct MemberRemoval {
    pub outcome: Result<(), ApiError>,
    pub reload: bool,
}

/// Remove a member. Any server answer other than 401 asks for a reload, even
/// a failure; a 401 goes to login instead and a network failure leaves the
/// list as it is.
pub fn remove_member(api: &CollabApi, project_id: &str, user_id: &str) -> MemberRemoval {
    let outcome = api.remove_member(project_id, user_id);
    let reload = match &outcome {
        Ok(()) => true,
        Err(ApiError::Unauthorized) => false,
        Err(err) => err.is_server_response(),
    };
    if let Err(err) = &outcome {
        tracing::debug!(project_id, user_id, error = %err, reload, "member removal failed");
    }
    MemberRemoval { outcome, reload }
}

/// Local view of one of "my invitations".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationCard {
    pub invitation: Invitation,
}

impl InvitationCard {
    pub fn new(invitation: Invitation) -> Self {
        Self { invitation }
    }

    /// Accept/reject buttons show only while the invitation is pending.
    pub fn actions_visible(&self) -> bool {
        self.invitation.status == InvitationStatus::Pending
    }

    pub fn status_label(&self) -> String {
        self.invitation.status.label()
    }

    pub fn accept(&mut self, api: &CollabApi) -> Result<(), ApiError> {
        self.respond(api, InvitationStatus::Accepted)
    }

    pub fn reject(&mut self, api: &CollabApi) -> Result<(), ApiError> {
        self.respond(api, InvitationStatus::Rejected)
    }

    fn respond(&mut self, api: &CollabApi, answer: InvitationStatus) -> Result<(), ApiError> {
        let id = &self.invitation.id;
        match answer {
            InvitationStatus::Accepted => api.accept_invitation(id)?,
            _ => api.reject_invitation(id)?,
        };
        // The local status flips regardless of what the echo says.
        self.invitation.status = answer;
        Ok(())
    }
}

/// Form state shared by the create and edit project screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectForm {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
}

impl ProjectForm {
    /// Pre-fill from an existing project. The sentinel description shows as
    /// an empty field.
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description_text().unwrap_or_default().to_string(),
            visibility: project.visibility,
        }
    }

    pub fn create_spec(&self, owner_id: &str) -> Result<ProjectSpec, ValidationError> {
        let name = validate_project_name(&self.name)?;
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(ValidationError::EmptyIdentifier("owner id"));
        }
        Ok(ProjectSpec::new(&name, &self.description, owner_id).with_visibility(self.visibility))
    }

    /// Update payload keeping the fields the form does not edit.
    pub fn update_spec(&self, existing: &Project) -> Result<ProjectSpec, ValidationError> {
        let owner_id = existing.owner_id.as_deref().unwrap_or_default();
        let mut spec = self.create_spec(owner_id)?;
        if let Some(language) = existing.default_language_id.as_deref().filter(|l| !l.is_empty()) {
            spec.default_language_id = Some(language.to_string());
        }
        spec.required_reviewers_rules = existing.required_reviewers_rules.clone();
        Ok(spec)
    }
}

/// Decorate `projects` with the role `user_id` holds in each, from one member
/// listing per project. Lookups that fail leave the role unset; a rejected
/// session aborts.
pub fn attach_roles(api: &CollabApi, projects: &mut [Project], user_id: &str) -> Result<(), ApiError> {
    for project in projects.iter_mut() {
        match api.list_members(&project.id) {
            Ok(members) => {
                project.role = members.iter().find(|m| m.user_id == user_id).map(|m| m.role);
            }
            Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
            Err(err) => {
                tracing::debug!(project_id = %project.id, error = %err, "role lookup failed");
            }
        }
        if project.role.is_none() && project.owner_id.as_deref() == Some(user_id) {
            project.role = Some(Role::Owner);
        }
    }
    Ok(())
}

/// Whether `description` is the stored placeholder for "none".
pub fn is_placeholder_description(description: &str) -> bool {
    description.trim() == NO_DESCRIPTION
}
