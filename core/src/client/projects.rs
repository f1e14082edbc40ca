use super::{parse_empty, parse_json, CollabClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::routes;
use crate::types::{Project, ProjectSpec};

impl CollabClient {
    /// Projects owned by `owner_id`.
    pub fn build_list_projects(&self, owner_id: &str) -> Result<HttpRequest, ApiError> {
        let route = routes::LIST_PROJECTS;
        Ok(HttpRequest {
            method: route.method,
            path: route
                .url_with_query(&self.base_url, &[], &[("ownerId", owner_id)])?
                .into(),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_create_project(&self, input: &ProjectSpec) -> Result<HttpRequest, ApiError> {
        self.json_request(routes::CREATE_PROJECT, &[], input)
    }

    pub fn build_get_project(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::GET_PROJECT, &[id])
    }

    pub fn build_update_project(&self, id: &str, input: &ProjectSpec) -> Result<HttpRequest, ApiError> {
        self.json_request(routes::UPDATE_PROJECT, &[id], input)
    }

    pub fn build_delete_project(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::DELETE_PROJECT, &[id])
    }

    pub fn parse_list_projects(&self, response: HttpResponse) -> Result<Vec<Project>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_project(&self, response: HttpResponse) -> Result<Project, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_project(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }

    pub fn parse_delete_project(&self, response: HttpResponse) -> Result<(), ApiError> {
        parse_empty(response)
    }
}
