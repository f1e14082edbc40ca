use super::{parse_json, CollabClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::routes;
use crate::types::{AuthResponse, CurrentUser, LoginRequest, RegisterRequest};

impl CollabClient {
    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(routes::LOGIN, &[], input)
    }

    pub fn build_register(&self, input: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(routes::REGISTER, &[], input)
    }

    pub fn build_current_user(&self) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::CURRENT_USER, &[])
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_current_user(&self, response: HttpResponse) -> Result<CurrentUser, ApiError> {
        parse_json(response)
    }
}
