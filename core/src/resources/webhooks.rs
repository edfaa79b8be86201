//! Webhook ingestion through a source's public endpoint.
//!
//! # Design
//! Ingestion is not part of the authenticated API: it skips
//! `authorize`, sends only `Content-Type` plus any [`IngestionAuth`]
//! header, and accepts nothing but `202 Accepted`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::client::{request_for, VolleyClient};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, AUTHORIZATION};
use crate::query::QueryParams;

/// Credentials for a source's ingestion endpoint.
///
/// Ingestion does not use the API token. A source created with
/// `auth_type = basic` expects HTTP basic credentials; one created with
/// `api_key` expects its key in the header named by the source's
/// `auth_key_name`.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum IngestionAuth {
    #[default]
    None,
    Basic { username: String, password: String },
    ApiKey { header: String, key: String },
}

impl IngestionAuth {
    fn apply(&self, request: &mut HttpRequest) {
        match self {
            IngestionAuth::None => {}
            IngestionAuth::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{username}:{password}"));
                request.set_header(AUTHORIZATION, format!("Basic {credentials}"));
            }
            IngestionAuth::ApiKey { header, key } => request.set_header(header, key.clone()),
        }
    }
}

impl fmt::Debug for IngestionAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestionAuth::None => f.write_str("None"),
            IngestionAuth::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            IngestionAuth::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Deserialize)]
struct Accepted {
    event_id: String,
}

impl VolleyClient {
    /// Post `payload` to the source whose ingestion id is `ingestion_id`
    /// and return the event id the server assigned.
    ///
    /// The API token and organization scope are not sent. Anything other
    /// than `202 Accepted` is an error, whatever the body says.
    pub fn send_webhook<P>(&self, ingestion_id: &str, payload: &P) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        self.send_webhook_with_auth(ingestion_id, payload, &IngestionAuth::None)
    }

    /// [`send_webhook`](Self::send_webhook) for sources that require
    /// ingestion credentials.
    pub fn send_webhook_with_auth<P>(
        &self,
        ingestion_id: &str,
        payload: &P,
        auth: &IngestionAuth,
    ) -> Result<String>
    where
        P: Serialize + ?Sized,
    {
        let mut url = self.endpoint("/hook", &QueryParams::new())?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(format!("{}/hook: cannot be a base", self.base_url())))?
            .push(ingestion_id);

        let mut request = request_for(HttpMethod::Post, url, Some(payload))?;
        auth.apply(&mut request);

        let response = self.dispatch(&request)?;
        if response.status != 202 {
            return Err(Error::UnexpectedStatus {
                status: response.status,
                body: response.body,
            });
        }
        let accepted: Accepted =
            serde_json::from_str(&response.body).map_err(|e| Error::Deserialization(e.to_string()))?;
        Ok(accepted.event_id)
    }
}
