//! HTTP exchange types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `VolleyClient` builds an
//! `HttpRequest`, hands it to a [`Transport`](crate::transport::Transport)
//! for execution, and decodes the returned `HttpResponse`. Keeping the wire
//! exchange as data makes every step of the pipeline testable without a
//! network: tests substitute a transport that records requests and replays
//! canned responses.

use std::fmt;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ORGANIZATION_ID: &str = "X-Organization-ID";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute (base URL, path and encoded query string). `body`, when
/// present, is already serialized JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Set a header, replacing any earlier value with the same
    /// (case-insensitive) name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Transports read the body to completion before constructing this value,
/// so the underlying connection has already been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut req = HttpRequest::new(HttpMethod::Get, "http://localhost/api/org".to_string());
        req.set_header("content-type", "text/plain");
        req.set_header(CONTENT_TYPE, APPLICATION_JSON);
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("CONTENT-TYPE"), Some(APPLICATION_JSON));
    }

    #[test]
    fn error_threshold_is_400() {
        assert!(!HttpResponse::new(399, "").is_error());
        assert!(HttpResponse::new(400, "").is_error());
        assert!(HttpResponse::new(503, "").is_error());
    }

    #[test]
    fn method_display_is_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
