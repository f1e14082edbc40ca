use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Failures answered with a status code and a plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerError {
    Unauthorized,
    Forbidden,
    NotFound(&'static str),
    Conflict(&'static str),
    BadRequest(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Conflict(_) => StatusCode::CONFLICT,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn body(self) -> String {
        match self {
            ServerError::Unauthorized => "Unauthorized".into(),
            ServerError::Forbidden => "Forbidden".into(),
            ServerError::NotFound(what) => format!("{what} not found"),
            ServerError::Conflict(what) => format!("{what} already exists"),
            ServerError::BadRequest(reason) => reason,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, "request rejected");
        (status, self.body()).into_response()
    }
}
