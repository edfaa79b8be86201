//! Blocking, typed client for the Volley webhook-delivery API.
//!
//! # Overview
//! Every operation runs the same pipeline: build a plain-data `HttpRequest`
//! (URL, query, JSON body), attach credentials, execute it on a pluggable
//! [`Transport`], and decode the `HttpResponse` into a typed value or an
//! [`Error`]. Resource operations (organizations, projects, sources,
//! destinations, connections, events, delivery attempts, webhook ingestion)
//! are thin compositions of that pipeline.
//!
//! # Design
//! - `VolleyClient` holds the base URL, token, organization scope and a
//!   shared transport. Changing scope takes `&mut self`; use
//!   [`VolleyClient::with_organization_id`] for one client per scope.
//! - The default transport is ureq-backed with a 30 second timeout. Tests
//!   substitute their own to record requests and replay responses.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```no_run
//! use volley_core::{ListEventsOptions, EventStatus, VolleyClient};
//!
//! # fn main() -> volley_core::Result<()> {
//! let mut client = VolleyClient::new("my-api-token");
//! let orgs = client.list_organizations()?;
//! client.set_organization_id(orgs[0].id);
//!
//! let project = &client.list_projects()?[0];
//! let failed = client.list_events(
//!     project.id,
//!     &ListEventsOptions {
//!         status: Some(EventStatus::Failed),
//!         limit: Some(50),
//!         ..Default::default()
//!     },
//! )?;
//! println!("{} failed events", failed.pagination.total);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filters;
pub mod http;
pub mod query;
pub mod resources;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{decode, decode_empty, VolleyClient, VolleyClientBuilder};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, Error, Result};
pub use filters::{
    AttemptSort, AttemptStatus, EventStatus, ListDeliveryAttemptsOptions, ListEventsOptions,
};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::QueryParams;
pub use resources::IngestionAuth;
pub use transport::{Transport, UreqTransport, DEFAULT_TIMEOUT};
pub use types::{
    Connection, ConnectionStatus, CreateConnection, CreateDestination, CreateOrganization,
    CreateProject, CreateSource, DeliveryAttempt, DeliveryAttemptList, Destination, Event,
    EventList, Organization, Pagination, Project, ReplayEvent, ReplayEventResult, Source,
    SourceAuthType, UpdateConnection, UpdateDestination, UpdateProject, UpdateSource,
};
