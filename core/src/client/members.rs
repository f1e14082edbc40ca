use super::{parse_empty, parse_json, CollabClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::routes;
use crate::types::{AddMemberRequest, ProjectMember, Role, UpdateRoleRequest};

impl CollabClient {
    pub fn build_list_members(&self, project_id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::LIST_MEMBERS, &[project_id])
    }

    pub fn build_add_member(
        &self,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<HttpRequest, ApiError> {
        let input = AddMemberRequest {
            user_id: user_id.trim().to_string(),
            role,
        };
        self.json_request(routes::ADD_MEMBER, &[project_id], &input)
    }

    pub fn build_remove_member(&self, project_id: &str, user_id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::REMOVE_MEMBER, &[project_id, user_id])
    }

    pub fn build_update_member_role(
        &self,
        project_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(
            routes::UPDATE_MEMBER_ROLE,
            &[project_id, user_id],
            &UpdateRoleRequest { role },
        )
    }

    pub fn parse_list_members(&self, response: HttpResponse) -> Result<Vec<ProjectMember>, ApiError> {
        parse_json(response)
    }

    pub fn parse_add_member(&self, response: HttpResponse) -> Result<ProjectMember, ApiError> {
        parse_json(response)
    }

    pub fn parse_remove_member(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }

    pub fn parse_update_member_role(&self, response: HttpResponse) -> Result<ProjectMember, ApiError> {
        parse_json(response)
    }
}
