//! Declarative route table for every remote operation.
//!
//! A `Route` pairs an HTTP method with a path template whose `{name}`
//! segments are filled in order by [`Route::url`]. Substituted identifiers are
//! trimmed and percent-encoded as single path segments. `.` and `..` are
//! rejected: URL normalisation would resolve them away instead of encoding.

use url::Url;

use crate::error::{ApiError, ValidationError};
use crate::http::HttpMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub method: HttpMethod,
    pub template: &'static str,
}

impl Route {
    pub const fn new(method: HttpMethod, template: &'static str) -> Self {
        Self { method, template }
    }

    /// Names of the placeholder segments, in order.
    pub fn placeholders(&self) -> impl Iterator<Item = &'static str> {
        self.template
            .split('/')
            .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
    }

    /// Resolve the template against `base`, substituting `args` in order.
    pub fn url(&self, base: &Url, args: &[&str]) -> Result<Url, ApiError> {
        self.url_with_query(base, args, &[])
    }

    pub fn url_with_query(
        &self,
        base: &Url,
        args: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url, ApiError> {
        let mut values = args.iter();
        let mut segments = Vec::new();
        for segment in self.template.split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => {
                    let what = placeholder_label(name);
                    let value = values
                        .next()
                        .map(|v| v.trim())
                        .filter(|v| !v.is_empty())
                        .ok_or(ValidationError::EmptyIdentifier(what))?;
                    if value == "." || value == ".." {
                        return Err(ValidationError::DotSegment {
                            what,
                            value: value.to_string(),
                        }
                        .into());
                    }
                    segments.push(value);
                }
                None => segments.push(segment),
            }
        }

        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Serialization(format!("base url {base} cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value.trim());
            }
        }
        Ok(url)
    }
}

fn placeholder_label(name: &str) -> &'static str {
    match name {
        "id" | "projectId" => "project id",
        "userId" => "user id",
        "invitationId" => "invitation id",
        "email" => "email",
        _ => "identifier",
    }
}

pub mod routes {
    //! Every operation of the collaboration backend.
    use super::Route;
    use crate::http::HttpMethod::{Delete, Get, Post, Put};

    pub const LOGIN: Route = Route::new(Post, "/api/auth/login");
    pub const REGISTER: Route = Route::new(Post, "/api/auth/register");
    pub const CURRENT_USER: Route = Route::new(Get, "/api/auth/me");

    pub const LIST_PROJECTS: Route = Route::new(Get, "/api/projects");
    pub const CREATE_PROJECT: Route = Route::new(Post, "/api/projects");
    pub const GET_PROJECT: Route = Route::new(Get, "/api/projects/{id}");
    pub const UPDATE_PROJECT: Route = Route::new(Put, "/api/projects/{id}");
    pub const DELETE_PROJECT: Route = Route::new(Delete, "/api/projects/{id}");

    pub const LIST_MEMBERS: Route = Route::new(Get, "/api/projects/{projectId}/members");
    pub const ADD_MEMBER: Route = Route::new(Post, "/api/projects/{projectId}/members");
    pub const REMOVE_MEMBER: Route =
        Route::new(Delete, "/api/projects/{projectId}/members/{userId}");
    pub const UPDATE_MEMBER_ROLE: Route =
        Route::new(Put, "/api/projects/{projectId}/members/{userId}");

    pub const USER_BY_EMAIL: Route = Route::new(Get, "/api/users/by-email/{email}");
    pub const SEND_INVITATION: Route = Route::new(Post, "/api/projects/{projectId}/invitations");
    pub const MY_INVITATIONS: Route = Route::new(Get, "/api/invitations");
    pub const ACCEPT_INVITATION: Route = Route::new(Post, "/api/invitations/{invitationId}/accept");
    pub const REJECT_INVITATION: Route = Route::new(Post, "/api/invitations/{invitationId}/reject");
    pub const PROJECT_INVITATIONS: Route = Route::new(Get, "/api/projects/{projectId}/invitations");
    pub const CANCEL_INVITATION: Route =
        Route::new(Delete, "/api/projects/{projectId}/invitations/{invitationId}");

    pub const GET_USER: Route = Route::new(Get, "/api/users/{id}");
}
