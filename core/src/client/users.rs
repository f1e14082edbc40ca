use super::{parse_json, CollabClient};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::routes;
use crate::types::User;

impl CollabClient {
    pub fn build_get_user(&self, id: &str) -> Result<HttpRequest, ApiError> {
        self.empty_request(routes::GET_USER, &[id])
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }
}
