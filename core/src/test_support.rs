//! Scripted transport shared by unit tests.

use std::sync::{Arc, Mutex};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// Answers from a queue, in order, and records every request it sees.
#[derive(Default)]
pub(crate) struct Script {
    answers: Mutex<Vec<HttpResponse>>,
    pub(crate) seen: Mutex<Vec<HttpRequest>>,
}

impl Script {
    pub(crate) fn new(answers: Vec<HttpResponse>) -> Arc<Self> {
        let mut answers = answers;
        answers.reverse();
        Arc::new(Self {
            answers: Mutex::new(answers),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|req| format!("{} {}", req.method, req.path))
            .collect()
    }
}

impl Transport for Script {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| TransportError::new("no scripted answer"))
    }
}
