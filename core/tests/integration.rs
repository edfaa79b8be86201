//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives it through
//! the default ureq transport, so request building, authorization and
//! response decoding are exercised over real HTTP.

use std::net::SocketAddr;

use volley_core::{
    ConnectionStatus, CreateConnection, CreateDestination, CreateOrganization, CreateProject,
    CreateSource, Error, EventStatus, ListDeliveryAttemptsOptions, ListEventsOptions, ReplayEvent,
    SourceAuthType, UpdateConnection, UpdateDestination, UpdateProject, UpdateSource,
    VolleyClient,
};

/// Start the mock server on a background thread and return its address.
fn start_server(token: &'static str) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_token(listener, token).await
        })
    });
    addr
}

fn client(addr: SocketAddr, token: &str) -> VolleyClient {
    VolleyClient::builder(token)
        .base_url(format!("http://{addr}/"))
        .build()
}

#[test]
fn full_lifecycle() {
    let addr = start_server("lifecycle-token");
    let mut c = client(addr, "lifecycle-token");

    // Organizations: the seeded one, then scope to it.
    let orgs = c.list_organizations().unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].name, "Acme");
    c.set_organization_id(orgs[0].id);

    let current = c.get_organization(None).unwrap();
    assert_eq!(current.id, orgs[0].id);

    // Projects.
    let projects = c.list_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert!(projects[0].is_default);

    let project = c
        .create_project(&CreateProject {
            name: "Payments".to_string(),
            is_default: None,
        })
        .unwrap();
    assert_eq!(project.organization_id, orgs[0].id);
    assert!(!project.is_default);

    let renamed = c
        .update_project(
            project.id,
            &UpdateProject {
                name: "Billing".to_string(),
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Billing");

    // Source, destination, connection.
    let source = c
        .create_source(
            project.id,
            &CreateSource {
                name: "stripe".to_string(),
                eps: 10,
                auth_type: SourceAuthType::None,
            },
        )
        .unwrap();
    assert!(source.ingestion_id.starts_with("ing_"));
    assert_eq!(source.kind, "webhook");

    let destination = c
        .create_destination(
            project.id,
            &CreateDestination {
                name: "orders".to_string(),
                url: "https://example.com/hooks/orders".to_string(),
                eps: 5,
            },
        )
        .unwrap();

    let connection = c
        .create_connection(
            project.id,
            &CreateConnection {
                source_id: source.id,
                destination_id: destination.id,
                status: ConnectionStatus::Enabled,
                eps: 5,
                max_retries: 3,
            },
        )
        .unwrap();
    assert_eq!(connection.status, "enabled");
    assert_eq!(c.get_source(source.id).unwrap().connection_count, 1);
    assert_eq!(c.list_sources(project.id).unwrap().len(), 1);
    assert_eq!(c.list_destinations(project.id).unwrap().len(), 1);
    assert_eq!(c.list_connections(project.id).unwrap().len(), 1);

    // Ingestion and events.
    let first = c
        .send_webhook(&source.ingestion_id, &serde_json::json!({"type": "order.created"}))
        .unwrap();
    let second = c
        .send_webhook(&source.ingestion_id, &serde_json::json!({"type": "order.paid"}))
        .unwrap();
    assert!(first.starts_with("evt_"));

    let events = c.list_events(project.id, &ListEventsOptions::default()).unwrap();
    assert_eq!(events.pagination.total, 2);
    assert_eq!(events.requests[0].event_id, second);
    assert_eq!(events.requests[0].status, "pending");

    let paid = c
        .list_events(
            project.id,
            &ListEventsOptions {
                search: Some("order.paid".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(paid.pagination.total, 1);
    assert_eq!(paid.requests[0].event_id, second);

    let page = c
        .list_events(
            project.id,
            &ListEventsOptions {
                limit: Some(1),
                offset: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.pagination.limit, 1);
    assert_eq!(page.pagination.offset, 1);
    assert_eq!(page.requests[0].event_id, first);

    // Replay, then inspect the attempt from both sides.
    let result = c
        .replay_event(&ReplayEvent {
            event_id: first.clone(),
            destination_id: Some(destination.id),
            connection_id: None,
        })
        .unwrap();
    assert!(result.success);
    assert_eq!(result.status_code, 200);

    let processed = c
        .list_events(
            project.id,
            &ListEventsOptions {
                status: Some(EventStatus::Processed),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(processed.pagination.total, 1);
    let event = c.get_event(processed.requests[0].id).unwrap();
    assert_eq!(event.event_id, first);
    assert_eq!(event.delivery_attempts.len(), 1);
    assert_eq!(event.delivery_attempts[0].id, result.attempt_id);

    let attempts = c
        .list_delivery_attempts(
            project.id,
            &ListDeliveryAttemptsOptions {
                connection_id: Some(connection.id),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(attempts.pagination.total, 1);
    assert_eq!(attempts.attempts[0].event_id, first);

    // Partial updates.
    let source = c
        .update_source(
            source.id,
            &UpdateSource {
                eps: Some(20),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(source.eps, 20);

    let destination = c
        .update_destination(
            destination.id,
            &UpdateDestination {
                url: Some("https://example.com/v2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(destination.url, "https://example.com/v2");
    assert_eq!(destination.name, "orders");

    let connection = c
        .update_connection(
            connection.id,
            &UpdateConnection {
                status: Some(ConnectionStatus::Disabled),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(connection.status, "disabled");
    assert_eq!(connection.max_retries, 3);

    // Deletes, then 404s.
    c.delete_connection(connection.id).unwrap();
    let err = c.get_connection(connection.id).unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");

    c.delete_destination(destination.id).unwrap();
    assert!(c.get_destination(destination.id).unwrap_err().is_not_found());

    c.delete_source(source.id).unwrap();
    let err = c.get_source(source.id).unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.api_error().map(|e| e.error.as_str()), Some("not_found"));

    c.delete_project(project.id).unwrap();
    assert!(c.delete_project(project.id).unwrap_err().is_not_found());
}

#[test]
fn create_organization_and_switch_scope() {
    let addr = start_server("org-token");
    let c = client(addr, "org-token");

    let org = c
        .create_organization(&CreateOrganization {
            name: "Globex".to_string(),
        })
        .unwrap();
    assert_eq!(org.slug, "globex");

    let fetched = c.get_organization(Some(org.id)).unwrap();
    assert_eq!(fetched.name, "Globex");
    assert_eq!(c.organization_id(), None);

    let scoped = c.with_organization_id(org.id);
    let projects = scoped.list_projects().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].organization_id, org.id);
}

#[test]
fn bad_token_is_unauthorized() {
    let addr = start_server("right-token");
    let c = client(addr, "wrong-token");

    let err = c.list_organizations().unwrap_err();
    match &err {
        Error::Api(api) => {
            assert_eq!(api.status, 401);
            assert_eq!(api.error, "unauthorized");
        }
        other => panic!("expected Error::Api, got {other:?}"),
    }
}

#[test]
fn missing_scope_is_rejected_by_server() {
    let addr = start_server("scope-token");
    let mut c = client(addr, "scope-token");
    c.set_organization_id(1);
    c.clear_organization_id();

    let err = c.list_projects().unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(
        err.api_error().map(|e| e.error.as_str()),
        Some("organization_required")
    );
}

#[test]
fn unknown_ingestion_id_is_an_error() {
    let addr = start_server("hook-token");
    let c = client(addr, "hook-token");

    let err = c.send_webhook("ing_missing", &serde_json::json!({})).unwrap_err();
    assert_eq!(err.status(), Some(404));
}
