use super::{parse_empty, parse_json, CollabClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::routes;
use crate::types::{Invitation, Role, SendInvitationRequest, User};

impl CollabClient {
    pub fn build_lookup_user_by_email(&self, email: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::USER_BY_EMAIL, &[email])
    }

    pub fn build_send_invitation(
        &self,
        project_id: &str,
        invited_user_id: &str,
        role: Role,
    ) -> Result<HttpRequest, ApiError> {
        let input = SendInvitationRequest {
            invited_user_id: invited_user_id.trim().to_string(),
            role,
        };
        self.json_request(routes::SEND_INVITATION, &[project_id], &input)
    }

    pub fn build_list_my_invitations(&self) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::MY_INVITATIONS, &[])
    }

    pub fn build_accept_invitation(&self, invitation_id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::ACCEPT_INVITATION, &[invitation_id])
    }

    pub fn build_reject_invitation(&self, invitation_id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::REJECT_INVITATION, &[invitation_id])
    }

    pub fn build_list_project_invitations(&self, project_id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::PROJECT_INVITATIONS, &[project_id])
    }

    pub fn build_cancel_invitation(
        &self,
        project_id: &str,
        invitation_id: &str,
    ) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::CANCEL_INVITATION, &[project_id, invitation_id])
    }

    pub fn parse_lookup_user_by_email(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    pub fn parse_send_invitation(&self, response: HttpResponse) -> Result<Invitation, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_my_invitations(&self, response: HttpResponse) -> Result<Vec<Invitation>, ApiError> {
        parse_json(response)
    }

    pub fn parse_accept_invitation(&self, response: HttpResponse) -> Result<Invitation, ApiError> {
        parse_json(response)
    }

    pub fn parse_reject_invitation(&self, response: HttpResponse) -> Result<Invitation, ApiError> {
        parse_json(response)
    }

    pub fn parse_list_project_invitations(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Invitation>, ApiError> {
        parse_json(response)
    }

    pub fn parse_cancel_invitation(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }
}
