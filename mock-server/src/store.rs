//! In-memory backend state and the rules the real service enforces.
//!
//! Every operation takes the caller's user id (resolved from the bearer
//! token) and is synchronous; handlers hold the lock for one call.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::error::ServerError;
use crate::model::{
    normalize_role, normalize_visibility, Account, Invitation, InvitationInput, LoginInput, Me,
    Member, MemberInput, Project, ProjectInput, RegisterInput, TokenView, UserView, ROLE_EDITOR,
    ROLE_OWNER, STATUS_ACCEPTED, STATUS_PENDING, STATUS_REJECTED,
};

const INVITATION_TTL_DAYS: i64 = 7;

#[derive(Debug, Default)]
pub struct Store {
    accounts: Vec<Account>,
    tokens: HashMap<String, String>,
    projects: HashMap<String, Project>,
    members: Vec<Member>,
    invitations: Vec<Invitation>,
    next_user: u64,
    next_invitation: u64,
}

fn required(value: &str, what: &str) -> Result<String, ServerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServerError::BadRequest(format!("{what} is required")));
    }
    Ok(value.to_string())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Roles that can be handed out; the owner role never is.
fn grantable_role(raw: &str) -> Result<&'static str, ServerError> {
    match normalize_role(raw) {
        Some(ROLE_OWNER) => Err(ServerError::BadRequest("Owner role cannot be granted".into())),
        Some(role) => Ok(role),
        None => Err(ServerError::BadRequest(format!("Unknown role '{raw}'"))),
    }
}

impl Store {
    // --- auth ---------------------------------------------------------------

    /// User id behind a bearer token.
    pub fn authenticate(&self, token: Option<&str>) -> Result<String, ServerError> {
        token
            .and_then(|t| self.tokens.get(t))
            .cloned()
            .ok_or(ServerError::Unauthorized)
    }

    fn issue_token(&mut self, user_id: &str) -> TokenView {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id.to_string());
        TokenView { token }
    }

    pub fn register(&mut self, input: RegisterInput) -> Result<TokenView, ServerError> {
        let email = required(&input.email, "Email")?;
        if input.password.len() < 6 {
            return Err(ServerError::BadRequest("Password is too short".into()));
        }
        let login = blank_to_none(input.login);
        let taken = self.accounts.iter().any(|a| {
            a.email.eq_ignore_ascii_case(&email)
                || (login.is_some() && a.login.as_deref() == login.as_deref())
        });
        if taken {
            return Err(ServerError::Conflict("User"));
        }
        self.next_user += 1;
        let account = Account {
            id: format!("u-{}", self.next_user),
            email,
            password: input.password,
            name: blank_to_none(input.name),
            login,
        };
        let id = account.id.clone();
        self.accounts.push(account);
        Ok(self.issue_token(&id))
    }

    /// `Login` matches either the login name or the email.
    pub fn login(&mut self, input: LoginInput) -> Result<TokenView, ServerError> {
        let login = input.login.trim();
        let id = self
            .accounts
            .iter()
            .find(|a| {
                (a.login.as_deref() == Some(login) || a.email.eq_ignore_ascii_case(login))
                    && a.password == input.password
            })
            .map(|a| a.id.clone())
            .ok_or(ServerError::Unauthorized)?;
        Ok(self.issue_token(&id))
    }

    pub fn me(&self, caller: &str) -> Result<Me, ServerError> {
        let account = self.account(caller)?;
        Ok(Me {
            sub: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            login: account.login.clone(),
        })
    }

    // --- users --------------------------------------------------------------

    fn account(&self, id: &str) -> Result<&Account, ServerError> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or(ServerError::NotFound("User"))
    }

    pub fn user(&self, id: &str) -> Result<UserView, ServerError> {
        self.account(id).map(UserView::from)
    }

    pub fn user_by_email(&self, email: &str) -> Result<UserView, ServerError> {
        let email = email.trim();
        self.accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .map(UserView::from)
            .ok_or(ServerError::NotFound("User"))
    }

    // --- projects -----------------------------------------------------------

    fn role_of(&self, project_id: &str, user_id: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .map(|m| m.role.as_str())
    }

    /// The project, if `caller` may see it.
    fn visible_project(&self, id: &str, caller: &str) -> Result<&Project, ServerError> {
        let project = self.projects.get(id).ok_or(ServerError::NotFound("Project"))?;
        if project.visibility != "public" && self.role_of(id, caller).is_none() {
            return Err(ServerError::Forbidden);
        }
        Ok(project)
    }

    /// Fails unless `caller` holds one of `roles` in the project.
    fn require_role(&self, project_id: &str, caller: &str, roles: &[&str]) -> Result<(), ServerError> {
        if !self.projects.contains_key(project_id) {
            return Err(ServerError::NotFound("Project"));
        }
        match self.role_of(project_id, caller) {
            Some(role) if roles.contains(&role) => Ok(()),
            _ => Err(ServerError::Forbidden),
        }
    }

    /// Projects `owner_id` belongs to, oldest first.
    pub fn list_projects(&self, owner_id: &str) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id || self.role_of(&p.id, owner_id).is_some())
            .cloned()
            .collect();
        projects.sort_by_key(|p| p.created_at);
        projects
    }

    pub fn create_project(&mut self, caller: &str, input: ProjectInput) -> Result<Project, ServerError> {
        let name = required(input.name.as_deref().unwrap_or_default(), "Name")?;
        let owner_id = blank_to_none(input.owner_id).unwrap_or_else(|| caller.to_string());
        if owner_id != caller {
            return Err(ServerError::Forbidden);
        }
        let visibility = match input.visibility.as_deref() {
            None => "private",
            Some(raw) => normalize_visibility(raw)
                .ok_or_else(|| ServerError::BadRequest(format!("Unknown visibility '{raw}'")))?,
        };
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4().to_string(),
            name,
            description: input.description.flatten(),
            owner_id: owner_id.clone(),
            default_language_id: input.default_language_id.flatten(),
            visibility: visibility.to_string(),
            required_reviewers_rules: input.required_reviewers_rules.flatten(),
            created_at: now,
            updated_at: now,
        };
        self.members.push(Member {
            project_id: project.id.clone(),
            user_id: owner_id,
            role: ROLE_OWNER.to_string(),
            created_at: now.naive_utc(),
        });
        self.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    pub fn get_project(&self, caller: &str, id: &str) -> Result<Project, ServerError> {
        self.visible_project(id, caller).cloned()
    }

    pub fn update_project(&mut self, caller: &str, id: &str, input: ProjectInput) -> Result<(), ServerError> {
        self.require_role(id, caller, &[ROLE_OWNER, ROLE_EDITOR])?;
        let visibility = match input.visibility.as_deref() {
            None => None,
            Some(raw) => Some(
                normalize_visibility(raw)
                    .ok_or_else(|| ServerError::BadRequest(format!("Unknown visibility '{raw}'")))?,
            ),
        };
        let name = match input.name.as_deref() {
            None => None,
            Some(raw) => Some(required(raw, "Name")?),
        };
        let project = self.projects.get_mut(id).ok_or(ServerError::NotFound("Project"))?;
        if let Some(name) = name {
            project.name = name;
        }
        if let Some(description) = input.description {
            project.description = description;
        }
        if let Some(language) = input.default_language_id {
            project.default_language_id = language;
        }
        if let Some(visibility) = visibility {
            project.visibility = visibility.to_string();
        }
        if let Some(rules) = input.required_reviewers_rules {
            project.required_reviewers_rules = rules;
        }
        project.updated_at = Utc::now();
        Ok(())
    }

    pub fn delete_project(&mut self, caller: &str, id: &str) -> Result<(), ServerError> {
        self.require_role(id, caller, &[ROLE_OWNER])?;
        self.projects.remove(id);
        self.members.retain(|m| m.project_id != id);
        self.invitations.retain(|i| i.project_id != id);
        Ok(())
    }

    // --- members ------------------------------------------------------------

    pub fn list_members(&self, caller: &str, project_id: &str) -> Result<Vec<Member>, ServerError> {
        self.visible_project(project_id, caller)?;
        Ok(self
            .members
            .iter()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect())
    }

    pub fn add_member(&mut self, caller: &str, project_id: &str, input: MemberInput) -> Result<Member, ServerError> {
        self.require_role(project_id, caller, &[ROLE_OWNER])?;
        let role = grantable_role(&input.role)?;
        let user_id = input.user_id.trim();
        self.account(user_id)?;
        if self.role_of(project_id, user_id).is_some() {
            return Err(ServerError::Conflict("Member"));
        }
        let member = Member {
            project_id: project_id.to_string(),
            user_id: user_id.to_string(),
            role: role.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        self.members.push(member.clone());
        Ok(member)
    }

    pub fn remove_member(&mut self, caller: &str, project_id: &str, user_id: &str) -> Result<(), ServerError> {
        self.require_role(project_id, caller, &[ROLE_OWNER])?;
        let role = self.role_of(project_id, user_id).map(str::to_string);
        match role.as_deref() {
            None => Err(ServerError::NotFound("Member")),
            Some(ROLE_OWNER) => Err(ServerError::BadRequest("Cannot remove the project owner".into())),
            Some(_) => {
                self.members
                    .retain(|m| !(m.project_id == project_id && m.user_id == user_id));
                Ok(())
            }
        }
    }

    pub fn update_member_role(
        &mut self,
        caller: &str,
        project_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<Member, ServerError> {
        self.require_role(project_id, caller, &[ROLE_OWNER])?;
        let role = grantable_role(role)?;
        let member = self
            .members
            .iter_mut()
            .find(|m| m.project_id == project_id && m.user_id == user_id)
            .ok_or(ServerError::NotFound("Member"))?;
        if member.role == ROLE_OWNER {
            return Err(ServerError::BadRequest("Cannot change the owner's role".into()));
        }
        member.role = role.to_string();
        Ok(member.clone())
    }

    // --- invitations --------------------------------------------------------

    pub fn send_invitation(
        &mut self,
        caller: &str,
        project_id: &str,
        input: InvitationInput,
    ) -> Result<Invitation, ServerError> {
        self.require_role(project_id, caller, &[ROLE_OWNER])?;
        let role = grantable_role(&input.role)?;
        let invitee = input.invited_user_id.trim().to_string();
        self.account(&invitee)?;
        if self.role_of(project_id, &invitee).is_some() {
            return Err(ServerError::Conflict("Member"));
        }
        let pending = self.invitations.iter().any(|i| {
            i.project_id == project_id && i.invited_user_id == invitee && i.status == STATUS_PENDING
        });
        if pending {
            return Err(ServerError::Conflict("Invitation"));
        }
        self.next_invitation += 1;
        let now = Utc::now();
        let invitation = Invitation {
            id: format!("inv-{}", self.next_invitation),
            project_id: project_id.to_string(),
            invited_user_id: invitee,
            invited_by_user_id: caller.to_string(),
            role: role.to_string(),
            status: STATUS_PENDING.to_string(),
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            created_at: now,
        };
        self.invitations.push(invitation.clone());
        Ok(invitation)
    }

    pub fn my_invitations(&self, caller: &str) -> Vec<Invitation> {
        self.invitations
            .iter()
            .filter(|i| i.invited_user_id == caller)
            .cloned()
            .collect()
    }

    pub fn project_invitations(&self, caller: &str, project_id: &str) -> Result<Vec<Invitation>, ServerError> {
        self.require_role(project_id, caller, &[ROLE_OWNER, ROLE_EDITOR])?;
        Ok(self
            .invitations
            .iter()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect())
    }

    /// Accept or reject one of the caller's pending invitations. Accepting
    /// adds the membership.
    pub fn respond(&mut self, caller: &str, invitation_id: &str, accept: bool) -> Result<Invitation, ServerError> {
        let invitation = self
            .invitations
            .iter_mut()
            .find(|i| i.id == invitation_id && i.invited_user_id == caller)
            .ok_or(ServerError::NotFound("Invitation"))?;
        if invitation.status != STATUS_PENDING {
            return Err(ServerError::BadRequest(format!(
                "Invitation is already {}",
                invitation.status
            )));
        }
        invitation.status = (if accept { STATUS_ACCEPTED } else { STATUS_REJECTED }).to_string();
        let invitation = invitation.clone();
        if accept && self.role_of(&invitation.project_id, caller).is_none() {
            self.members.push(Member {
                project_id: invitation.project_id.clone(),
                user_id: caller.to_string(),
                role: invitation.role.clone(),
                created_at: Utc::now().naive_utc(),
            });
        }
        Ok(invitation)
    }

    pub fn cancel_invitation(&mut self, caller: &str, project_id: &str, invitation_id: &str) -> Result<(), ServerError> {
        self.require_role(project_id, caller, &[ROLE_OWNER])?;
        let before = self.invitations.len();
        self.invitations
            .retain(|i| !(i.id == invitation_id && i.project_id == project_id));
        if self.invitations.len() == before {
            return Err(ServerError::NotFound("Invitation"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(store: &mut Store, email: &str, login: &str) -> String {
        let token = store
            .register(RegisterInput {
                email: email.into(),
                password: "secret12".into(),
                name: None,
                login: Some(login.into()),
            })
            .unwrap()
            .token;
        store.authenticate(Some(&token)).unwrap()
    }

    fn project(store: &mut Store, owner: &str) -> String {
        let input: ProjectInput = serde_json::from_str(r#"{"Name":"Atlas"}"#).unwrap();
        store.create_project(owner, input).unwrap().id
    }

    #[test]
    fn user_ids_are_sequential() {
        let mut store = Store::default();
        assert_eq!(register(&mut store, "a@x.io", "alice"), "u-1");
        assert_eq!(register(&mut store, "b@x.io", "bob"), "u-2");
    }

    #[test]
    fn duplicate_email_conflicts() {
        let mut store = Store::default();
        register(&mut store, "a@x.io", "alice");
        let err = store
            .register(RegisterInput {
                email: "A@X.io".into(),
                password: "secret12".into(),
                name: None,
                login: None,
            })
            .unwrap_err();
        assert_eq!(err, ServerError::Conflict("User"));
    }

    #[test]
    fn owner_cannot_be_removed() {
        let mut store = Store::default();
        let alice = register(&mut store, "a@x.io", "alice");
        let id = project(&mut store, &alice);
        assert!(matches!(
            store.remove_member(&alice, &id, &alice),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn accepting_adds_membership_once() {
        let mut store = Store::default();
        let alice = register(&mut store, "a@x.io", "alice");
        let bob = register(&mut store, "b@x.io", "bob");
        let id = project(&mut store, &alice);

        let input = InvitationInput {
            invited_user_id: bob.clone(),
            role: "Editor".into(),
        };
        let invitation = store.send_invitation(&alice, &id, input).unwrap();
        assert_eq!(invitation.id, "inv-1");

        let accepted = store.respond(&bob, "inv-1", true).unwrap();
        assert_eq!(accepted.status, STATUS_ACCEPTED);
        assert_eq!(store.list_members(&bob, &id).unwrap().len(), 2);
        assert!(store.respond(&bob, "inv-1", false).is_err());
    }

    #[test]
    fn second_pending_invitation_conflicts() {
        let mut store = Store::default();
        let alice = register(&mut store, "a@x.io", "alice");
        let bob = register(&mut store, "b@x.io", "bob");
        let id = project(&mut store, &alice);
        let invite = |role: &str| InvitationInput {
            invited_user_id: bob.clone(),
            role: role.into(),
        };
        store.send_invitation(&alice, &id, invite("viewer")).unwrap();
        assert_eq!(
            store.send_invitation(&alice, &id, invite("editor")).unwrap_err(),
            ServerError::Conflict("Invitation")
        );
    }

    #[test]
    fn update_keeps_missing_fields_and_clears_nulls() {
        let mut store = Store::default();
        let alice = register(&mut store, "a@x.io", "alice");
        let input: ProjectInput = serde_json::from_str(
            r#"{"Name":"Atlas","Description":"Maps","RequiredReviewersRules":"2"}"#,
        )
        .unwrap();
        let id = store.create_project(&alice, input).unwrap().id;

        let patch: ProjectInput =
            serde_json::from_str(r#"{"RequiredReviewersRules":null,"Visibility":"Public"}"#).unwrap();
        store.update_project(&alice, &id, patch).unwrap();

        let project = store.get_project(&alice, &id).unwrap();
        assert_eq!(project.name, "Atlas");
        assert_eq!(project.description.as_deref(), Some("Maps"));
        assert_eq!(project.required_reviewers_rules, None);
        assert_eq!(project.visibility, "public");
    }
}
