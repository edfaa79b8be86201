//! Resource records and the in-memory store behind the mock API.
//!
//! Records carry a few bookkeeping fields the real API does not expose
//! (`project_id` on sources, destinations and connections). Clients ignore
//! unknown fields, so serializing them is harmless.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MockError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Organization {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub account_id: u64,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub organization_id: u64,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Source {
    pub id: u64,
    pub project_id: u64,
    pub slug: String,
    pub ingestion_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub eps: u32,
    pub status: String,
    pub connection_count: u64,
    pub auth_type: String,
    pub verify_signature: bool,
    pub webhook_secret_set: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_key_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Destination {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    pub url: String,
    pub eps: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub id: u64,
    pub project_id: u64,
    pub source_id: u64,
    pub destination_id: u64,
    pub status: String,
    pub eps: u32,
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub event_id: String,
    pub source_id: u64,
    pub project_id: u64,
    pub raw_body: String,
    pub headers: BTreeMap<String, Value>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delivery_attempts: Vec<DeliveryAttempt>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub id: u64,
    pub event_id: String,
    pub connection_id: u64,
    pub status: String,
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateOrganization {
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize)]
pub struct UpdateProject {
    pub name: String,
}

fn default_auth_type() -> String {
    "none".to_string()
}

fn default_connection_status() -> String {
    "enabled".to_string()
}

#[derive(Deserialize)]
pub struct CreateSource {
    pub name: String,
    #[serde(default)]
    pub eps: u32,
    #[serde(default = "default_auth_type")]
    pub auth_type: String,
}

#[derive(Deserialize)]
pub struct UpdateSource {
    pub name: Option<String>,
    pub eps: Option<u32>,
    pub auth_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateDestination {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub eps: u32,
}

#[derive(Deserialize)]
pub struct UpdateDestination {
    pub name: Option<String>,
    pub url: Option<String>,
    pub eps: Option<u32>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateConnection {
    pub source_id: u64,
    pub destination_id: u64,
    #[serde(default = "default_connection_status")]
    pub status: String,
    #[serde(default)]
    pub eps: u32,
    #[serde(default)]
    pub max_retries: u32,
}

#[derive(Deserialize)]
pub struct UpdateConnection {
    pub status: Option<String>,
    pub eps: Option<u32>,
    pub max_retries: Option<u32>,
}

#[derive(Deserialize)]
pub struct ReplayEvent {
    pub event_id: String,
    pub destination_id: Option<u64>,
    pub connection_id: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventQuery {
    pub source_id: Option<u64>,
    pub connection_id: Option<u64>,
    pub destination_id: Option<u64>,
    pub status: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AttemptQuery {
    pub event_id: Option<String>,
    pub source_id: Option<u64>,
    pub destination_id: Option<u64>,
    pub connection_id: Option<u64>,
    pub status: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub sort: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// All resources, keyed by id. Ids come from one counter shared by every
/// resource kind.
#[derive(Debug)]
pub struct Store {
    next_id: u64,
    pub organizations: BTreeMap<u64, Organization>,
    pub projects: BTreeMap<u64, Project>,
    pub sources: BTreeMap<u64, Source>,
    pub destinations: BTreeMap<u64, Destination>,
    pub connections: BTreeMap<u64, Connection>,
    pub events: BTreeMap<u64, Event>,
    pub attempts: BTreeMap<u64, DeliveryAttempt>,
}

impl Default for Store {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Store {
    pub fn empty() -> Self {
        Self {
            next_id: 1,
            organizations: BTreeMap::new(),
            projects: BTreeMap::new(),
            sources: BTreeMap::new(),
            destinations: BTreeMap::new(),
            connections: BTreeMap::new(),
            events: BTreeMap::new(),
            attempts: BTreeMap::new(),
        }
    }

    /// One organization ("Acme", id 1) with its default project (id 2).
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        store.insert_organization("Acme");
        store
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create an organization together with its default project.
    pub fn insert_organization(&mut self, name: &str) -> Organization {
        let now = Utc::now();
        let org = Organization {
            id: self.next_id(),
            name: name.to_string(),
            slug: slugify(name),
            account_id: 1,
            role: "owner".to_string(),
            created_at: now,
        };
        self.organizations.insert(org.id, org.clone());
        self.insert_project(org.id, "Default", true);
        org
    }

    pub fn insert_project(&mut self, organization_id: u64, name: &str, is_default: bool) -> Project {
        if is_default {
            for project in self.projects.values_mut() {
                if project.organization_id == organization_id {
                    project.is_default = false;
                }
            }
        }
        let now = Utc::now();
        let project = Project {
            id: self.next_id(),
            name: name.to_string(),
            organization_id,
            is_default,
            created_at: now,
            updated_at: now,
        };
        self.projects.insert(project.id, project.clone());
        project
    }

    pub fn organization(&self, id: u64) -> Result<&Organization, MockError> {
        self.organizations
            .get(&id)
            .ok_or_else(|| MockError::not_found("organization", id))
    }

    pub fn project(&self, id: u64) -> Result<&Project, MockError> {
        self.projects.get(&id).ok_or_else(|| MockError::not_found("project", id))
    }

    pub fn source(&self, id: u64) -> Result<&Source, MockError> {
        self.sources.get(&id).ok_or_else(|| MockError::not_found("source", id))
    }

    pub fn destination(&self, id: u64) -> Result<&Destination, MockError> {
        self.destinations
            .get(&id)
            .ok_or_else(|| MockError::not_found("destination", id))
    }

    pub fn connection(&self, id: u64) -> Result<&Connection, MockError> {
        self.connections
            .get(&id)
            .ok_or_else(|| MockError::not_found("connection", id))
    }

    /// A source as the API presents it, with its live connection count.
    pub fn source_view(&self, source: &Source) -> Source {
        let mut view = source.clone();
        view.connection_count = self
            .connections
            .values()
            .filter(|c| c.source_id == source.id)
            .count() as u64;
        view
    }

    pub fn attempts_for(&self, event_id: &str) -> Vec<DeliveryAttempt> {
        self.attempts
            .values()
            .filter(|a| a.event_id == event_id)
            .cloned()
            .collect()
    }

    /// Remove a project and everything that hangs off it.
    pub fn remove_project(&mut self, id: u64) -> Result<(), MockError> {
        self.projects
            .remove(&id)
            .ok_or_else(|| MockError::not_found("project", id))?;
        self.sources.retain(|_, s| s.project_id != id);
        self.destinations.retain(|_, d| d.project_id != id);
        self.connections.retain(|_, c| c.project_id != id);
        self.events.retain(|_, e| e.project_id != id);
        Ok(())
    }

    pub fn remove_source(&mut self, id: u64) -> Result<(), MockError> {
        self.sources
            .remove(&id)
            .ok_or_else(|| MockError::not_found("source", id))?;
        self.connections.retain(|_, c| c.source_id != id);
        Ok(())
    }

    pub fn remove_destination(&mut self, id: u64) -> Result<(), MockError> {
        self.destinations
            .remove(&id)
            .ok_or_else(|| MockError::not_found("destination", id))?;
        self.connections.retain(|_, c| c.destination_id != id);
        Ok(())
    }
}

pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Apply `offset`/`limit` to `items`, returning the total before paging.
pub fn paginate<T>(items: Vec<T>, limit: u32, offset: u32) -> (u64, Vec<T>) {
    let total = items.len() as u64;
    let page = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    (total, page)
}

pub fn within(at: DateTime<Utc>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    start.is_none_or(|start| at >= start) && end.is_none_or(|end| at <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_source_defaults_auth_type_to_none() {
        let input: CreateSource = serde_json::from_str(r#"{"name":"stripe"}"#).unwrap();
        assert_eq!(input.auth_type, "none");
        assert_eq!(input.eps, 0);
    }

    #[test]
    fn create_source_rejects_missing_name() {
        let result: Result<CreateSource, _> = serde_json::from_str(r#"{"eps":5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn create_connection_defaults_to_enabled() {
        let input: CreateConnection =
            serde_json::from_str(r#"{"source_id":1,"destination_id":2}"#).unwrap();
        assert_eq!(input.status, "enabled");
        assert_eq!(input.max_retries, 0);
    }

    #[test]
    fn update_source_all_fields_optional() {
        let input: UpdateSource = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.eps.is_none());
        assert!(input.auth_type.is_none());
        assert!(input.status.is_none());
    }

    #[test]
    fn event_query_parses_rfc3339_times() {
        let query: EventQuery = serde_json::from_value(serde_json::json!({
            "start_time": "2024-05-01T00:00:00Z",
            "limit": 5
        }))
        .unwrap();
        assert_eq!(query.limit, Some(5));
        assert_eq!(
            query.start_time.unwrap().to_rfc3339(),
            "2024-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn seeded_store_has_org_and_default_project() {
        let store = Store::seeded();
        let org = store.organization(1).unwrap();
        assert_eq!(org.slug, "acme");
        let project = store.project(2).unwrap();
        assert_eq!(project.organization_id, 1);
        assert!(project.is_default);
    }

    #[test]
    fn new_default_project_demotes_previous() {
        let mut store = Store::seeded();
        let project = store.insert_project(1, "Prod", true);
        assert!(project.is_default);
        assert!(!store.project(2).unwrap().is_default);
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Stripe  Payments!"), "stripe-payments");
        assert_eq!(slugify("  GitHub"), "github");
    }

    #[test]
    fn paginate_reports_total_before_paging() {
        let (total, page) = paginate((0..10).collect(), 3, 8);
        assert_eq!(total, 10);
        assert_eq!(page, vec![8, 9]);
    }

    #[test]
    fn remove_source_drops_its_connections() {
        let mut store = Store::seeded();
        let now = Utc::now();
        store.connections.insert(
            9,
            Connection {
                id: 9,
                project_id: 2,
                source_id: 5,
                destination_id: 6,
                status: "enabled".to_string(),
                eps: 0,
                max_retries: 0,
                created_at: now,
                updated_at: now,
            },
        );
        store.sources.insert(
            5,
            Source {
                id: 5,
                project_id: 2,
                slug: "s".to_string(),
                ingestion_id: "ing_s".to_string(),
                kind: "webhook".to_string(),
                eps: 0,
                status: "active".to_string(),
                connection_count: 0,
                auth_type: "none".to_string(),
                verify_signature: false,
                webhook_secret_set: false,
                auth_username: None,
                auth_key_name: None,
                created_at: now,
                updated_at: now,
            },
        );
        store.remove_source(5).unwrap();
        assert!(store.connections.is_empty());
    }
}
