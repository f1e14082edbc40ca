//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! The core never performs I/O on its own; a `Transport` is injected by the
//! composition root. Non-2xx statuses are returned as data so the core keeps
//! full control over status interpretation. A `TransportError` means no
//! response was obtained.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use super::*;
    use crate::http::{HttpMethod, CONTENT_TYPE};

    /// Blocking transport backed by `ureq`.
    ///
    /// Status-code-as-error is disabled so 4xx/5xx responses come back as
    /// `HttpResponse` values. Timeouts are left at the agent defaults.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = req.path.as_str();
            let headers = req
                .headers
                .iter()
                .filter(|(k, _)| !k.eq_ignore_ascii_case(CONTENT_TYPE));

            let result = match req.method {
                HttpMethod::Get => {
                    let mut builder = self.agent.get(url);
                    for (k, v) in headers {
                        builder = builder.header(k.as_str(), v.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Delete => {
                    let mut builder = self.agent.delete(url);
                    for (k, v) in headers {
                        builder = builder.header(k.as_str(), v.as_str());
                    }
                    builder.call()
                }
                HttpMethod::Post | HttpMethod::Put => {
                    let mut builder = if req.method == HttpMethod::Post {
                        self.agent.post(url)
                    } else {
                        self.agent.put(url)
                    };
                    for (k, v) in headers {
                        builder = builder.header(k.as_str(), v.as_str());
                    }
                    match &req.body {
                        Some(body) => builder
                            .content_type(req.header(CONTENT_TYPE).unwrap_or("application/json"))
                            .send(body.as_bytes()),
                        None => builder.send_empty(),
                    }
                }
            };

            let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError::new(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
