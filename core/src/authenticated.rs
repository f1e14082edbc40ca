//! Bearer-injecting wrapper around a `Transport`.
//!
//! # Design
//! Every outbound request passes through [`AuthenticatedClient::send`]. When
//! the session store holds a credential it is attached as
//! `Authorization: Bearer <token>`; otherwise no authorization header leaves
//! the process, even if the caller set one. A 401 answer clears the store
//! before `send` returns, so a request launched afterwards goes out
//! unauthenticated, and the response comes back tagged as
//! [`Exchange::Unauthenticated`] with its content untouched.

use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, AUTHORIZATION, UNAUTHORIZED};
use crate::session::SessionStore;
use crate::transport::Transport;

/// Outcome of one round-trip that produced a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchange {
    /// Any response other than 401.
    Completed(HttpResponse),
    /// A 401 response; the session store has been cleared.
    Unauthenticated(HttpResponse),
}

impl Exchange {
    pub fn response(&self) -> &HttpResponse {
        match self {
            Exchange::Completed(response) | Exchange::Unauthenticated(response) => response,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        match self {
            Exchange::Completed(response) | Exchange::Unauthenticated(response) => response,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Exchange::Unauthenticated(_))
    }
}

#[derive(Clone)]
pub struct AuthenticatedClient {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
}

impl AuthenticatedClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<dyn SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Attach the credential, execute, and observe the status.
    ///
    /// Returns `Err` only when no response was obtained.
    pub fn send(&self, mut request: HttpRequest) -> Result<Exchange, ApiError> {
        let token = self.session.get();
        match &token {
            Some(token) => request.set_header(AUTHORIZATION, format!("Bearer {token}")),
            None => request.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(AUTHORIZATION)),
        }
        tracing::debug!(
            method = %request.method,
            url = %request.path,
            authenticated = token.is_some(),
            "sending request"
        );

        let response = self.transport.execute(request)?;

        if response.status == UNAUTHORIZED {
            tracing::warn!(status = response.status, "credential rejected, clearing session");
            if let Err(err) = self.session.clear() {
                tracing::warn!(error = %err, "failed to clear session after 401");
            }
            return Ok(Exchange::Unauthenticated(response));
        }
        tracing::debug!(status = response.status, "response received");
        Ok(Exchange::Completed(response))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;
    use crate::session::MemorySessionStore;

    /// Records every request and answers with a fixed status.
    struct Recorder {
        status: u16,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Recorder {
        fn answering(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse::new(self.status, "body"))
        }
    }

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost:3000/api/projects".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn attaches_bearer_when_token_present() {
        let transport = Recorder::answering(200);
        let client = AuthenticatedClient::new(
            transport.clone(),
            Arc::new(MemorySessionStore::with_token("abc")),
        );
        let exchange = client.send(request()).unwrap();
        assert!(!exchange.is_unauthenticated());
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].header("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn never_attaches_bearer_without_token() {
        let transport = Recorder::answering(200);
        let client = AuthenticatedClient::new(transport.clone(), Arc::new(MemorySessionStore::new()));
        let mut req = request();
        req.set_header(AUTHORIZATION, "Bearer stale");
        client.send(req).unwrap();
        assert!(transport.seen.lock().unwrap()[0].header(AUTHORIZATION).is_none());
    }

    #[test]
    fn unauthorized_clears_session_and_returns_response_unchanged() {
        let transport = Recorder::answering(401);
        let session = Arc::new(MemorySessionStore::with_token("abc"));
        let client = AuthenticatedClient::new(transport.clone(), session.clone());

        let exchange = client.send(request()).unwrap();
        assert!(exchange.is_unauthenticated());
        assert_eq!(exchange.response(), &HttpResponse::new(401, "body"));
        assert_eq!(session.get(), None);

        // The next request goes out unauthenticated.
        client.send(request()).unwrap();
        assert!(transport.seen.lock().unwrap()[1].header(AUTHORIZATION).is_none());
    }

    #[test]
    fn unauthorized_without_token_is_still_tagged() {
        let client = AuthenticatedClient::new(
            Recorder::answering(401),
            Arc::new(MemorySessionStore::new()),
        );
        assert!(client.send(request()).unwrap().is_unauthenticated());
    }

    #[test]
    fn other_failures_keep_the_session() {
        for status in [403, 404, 409, 500] {
            let session = Arc::new(MemorySessionStore::with_token("abc"));
            let client = AuthenticatedClient::new(Recorder::answering(status), session.clone());
            let exchange = client.send(request()).unwrap();
            assert_eq!(exchange.into_response().status, status);
            assert_eq!(session.get().as_deref(), Some("abc"));
        }
    }

    #[test]
    fn transport_failure_surfaces_as_error() {
        let failing = |_: HttpRequest| -> Result<HttpResponse, TransportError> {
            Err(TransportError::new("connection refused"))
        };
        let client = AuthenticatedClient::new(
            Arc::new(failing),
            Arc::new(MemorySessionStore::with_token("abc")),
        );
        let err = client.send(request()).unwrap_err();
        assert_eq!(err, ApiError::Transport("connection refused".into()));
    }
}
