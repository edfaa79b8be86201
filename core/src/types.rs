//! Resource representations and request payloads for the Volley API.
//!
//! # Design
//! Entities mirror the server's JSON and decode leniently: any field the
//! server omits falls back to its default instead of failing the whole
//! response. Request payloads are strict in the other direction: optional
//! fields are `Option` and are left out of the JSON entirely when `None`,
//! so an update only touches what the caller set.
//!
//! These types are defined independently from the mock-server crate;
//! integration tests catch schema drift between the two.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` the same as a missing field. The server writes empty
/// collections as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// An organization the authenticated account belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub account_id: u64,
    /// The caller's access level in this organization.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub organization_id: u64,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An inbound webhook endpoint. `ingestion_id` is the public path segment
/// used by [`send_webhook`](crate::VolleyClient::send_webhook).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    pub id: u64,
    pub slug: String,
    pub ingestion_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Events-per-second cap.
    pub eps: u32,
    pub status: String,
    pub connection_count: u64,
    pub auth_type: String,
    pub verify_signature: bool,
    pub webhook_secret_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_key_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An outbound URL events are forwarded to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub eps: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Routing link from one source to one destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connection {
    pub id: u64,
    pub source_id: u64,
    pub destination_id: u64,
    /// `"enabled"` or `"disabled"`.
    pub status: String,
    pub eps: u32,
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One received webhook payload.
///
/// `id` is the numeric database id used by `get_event`; `event_id` is the
/// external string id used for replays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub id: u64,
    pub event_id: String,
    pub source_id: u64,
    pub project_id: u64,
    pub raw_body: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: HashMap<String, serde_json::Value>,
    /// One of `processed`, `pending`, `failed`, `dropped`.
    pub status: String,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub delivery_attempts: Vec<DeliveryAttempt>,
    pub created_at: DateTime<Utc>,
}

/// One try to deliver an event over one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryAttempt {
    pub id: u64,
    pub event_id: String,
    pub connection_id: u64,
    pub status: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Paging information carried by list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requests: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAttemptList {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attempts: Vec<DeliveryAttempt>,
}

/// Outcome of a synchronous replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayEventResult {
    pub success: bool,
    pub status: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub duration_ms: u64,
    pub attempt_id: u64,
}

// ---------------------------------------------------------------------------
// Closed vocabularies
// ---------------------------------------------------------------------------

/// How a source authenticates inbound webhooks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceAuthType {
    #[default]
    None,
    Basic,
    ApiKey,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Enabled,
    Disabled,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionStatus::Enabled => "enabled",
            ConnectionStatus::Disabled => "disabled",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProject {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSource {
    pub name: String,
    pub eps: u32,
    pub auth_type: SourceAuthType,
}

/// Only the fields that are `Some` are sent; the rest stay unchanged on
/// the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<SourceAuthType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDestination {
    pub name: String,
    pub url: String,
    pub eps: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDestination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConnection {
    pub source_id: u64,
    pub destination_id: u64,
    pub status: ConnectionStatus,
    pub eps: u32,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConnection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ConnectionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

/// Replay an event by its external id, optionally narrowed to one
/// destination or connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayEvent {
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<u64>,
}
