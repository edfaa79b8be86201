//! In-crate test double for [`Transport`].

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use crate::client::VolleyClient;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

enum Canned {
    Response(HttpResponse),
    Failure(String),
}

/// Records every request and answers with queued responses in order.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    queue: Mutex<VecDeque<Canned>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Canned::Response(HttpResponse::new(status, body)));
    }

    pub(crate) fn fail(&self, message: &str) {
        self.queue
            .lock()
            .unwrap()
            .push_back(Canned::Failure(message.to_string()));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was recorded")
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match self.queue.lock().unwrap().pop_front() {
            Some(Canned::Response(response)) => Ok(response),
            Some(Canned::Failure(message)) => Err(Error::transport(io::Error::new(
                io::ErrorKind::ConnectionReset,
                message,
            ))),
            None => panic!("unexpected request: {} {}", request.method, request.url),
        }
    }
}

/// A client at `http://localhost:3000` whose requests go to `transport`.
pub(crate) fn client_with(transport: &Arc<RecordingTransport>) -> VolleyClient {
    VolleyClient::builder("test-token")
        .base_url("http://localhost:3000")
        .shared_transport(transport.clone())
        .build()
}
