use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::MockError;
use crate::models::{
    paginate, slugify, within, AttemptQuery, Connection, CreateConnection, CreateDestination,
    CreateOrganization, CreateProject, CreateSource, DeliveryAttempt, Destination, Event,
    EventQuery, Project, ReplayEvent, Source, Store, UpdateConnection, UpdateDestination,
    UpdateProject, UpdateSource, DEFAULT_PAGE_SIZE,
};
use crate::AppState;

pub const ORGANIZATION_HEADER: &str = "x-organization-id";

type ApiResult<T> = Result<T, MockError>;

/// Reject `/api` requests that lack `Authorization: Bearer <token>`.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(&*state.api_token) {
        debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        return Err(MockError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn organization_scope(headers: &HeaderMap) -> ApiResult<Option<u64>> {
    let Some(value) = headers.get(ORGANIZATION_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| MockError::BadRequest("X-Organization-ID must be a number".to_string()))
}

fn required_scope(store: &Store, headers: &HeaderMap) -> ApiResult<u64> {
    let id = organization_scope(headers)?.ok_or(MockError::OrganizationRequired)?;
    store.organization(id)?;
    Ok(id)
}

fn check_auth_type(auth_type: &str) -> ApiResult<()> {
    match auth_type {
        "none" | "basic" | "api_key" => Ok(()),
        other => Err(MockError::BadRequest(format!("unknown auth_type {other:?}"))),
    }
}

fn check_connection_status(status: &str) -> ApiResult<()> {
    match status {
        "enabled" | "disabled" => Ok(()),
        other => Err(MockError::BadRequest(format!("unknown connection status {other:?}"))),
    }
}

// --- organizations ---

pub async fn list_organizations(State(state): State<AppState>) -> Json<Value> {
    let store = state.store.read().await;
    let organizations: Vec<_> = store.organizations.values().cloned().collect();
    Json(json!({ "organizations": organizations }))
}

pub async fn get_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    let org = match organization_scope(&headers)? {
        Some(id) => store.organization(id)?,
        None => store
            .organizations
            .values()
            .next()
            .ok_or_else(|| MockError::not_found("organization", "current"))?,
    };
    Ok(Json(json!(org)))
}

pub async fn create_organization(
    State(state): State<AppState>,
    Json(input): Json<CreateOrganization>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if input.name.trim().is_empty() {
        return Err(MockError::BadRequest("name is required".to_string()));
    }
    let org = state.store.write().await.insert_organization(&input.name);
    debug!(id = org.id, name = %org.name, "created organization");
    Ok((StatusCode::CREATED, Json(json!(org))))
}

// --- projects ---

pub async fn list_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    let org_id = required_scope(&store, &headers)?;
    let projects: Vec<&Project> = store
        .projects
        .values()
        .filter(|p| p.organization_id == org_id)
        .collect();
    Ok(Json(json!({ "projects": projects })))
}

pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CreateProject>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let org_id = required_scope(&store, &headers)?;
    let project = store.insert_project(org_id, &input.name, input.is_default);
    debug!(id = project.id, org_id, "created project");
    Ok((StatusCode::CREATED, Json(json!({ "project": project }))))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateProject>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.write().await;
    let project = store
        .projects
        .get_mut(&id)
        .ok_or_else(|| MockError::not_found("project", id))?;
    project.name = input.name;
    project.updated_at = Utc::now();
    debug!(id, "updated project");
    Ok(Json(json!({ "project": project })))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    state.store.write().await.remove_project(id)?;
    debug!(id, "deleted project");
    Ok(StatusCode::OK)
}

// --- sources ---

pub async fn list_sources(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    store.project(project_id)?;
    let sources: Vec<Source> = store
        .sources
        .values()
        .filter(|s| s.project_id == project_id)
        .map(|s| store.source_view(s))
        .collect();
    Ok(Json(json!({ "sources": sources })))
}

pub async fn create_source(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    Json(input): Json<CreateSource>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    check_auth_type(&input.auth_type)?;
    let mut store = state.store.write().await;
    store.project(project_id)?;
    let now = Utc::now();
    let source = Source {
        id: store.next_id(),
        project_id,
        slug: slugify(&input.name),
        ingestion_id: format!("ing_{}", Uuid::new_v4().simple()),
        kind: "webhook".to_string(),
        eps: input.eps,
        status: "active".to_string(),
        connection_count: 0,
        auth_type: input.auth_type,
        verify_signature: false,
        webhook_secret_set: false,
        auth_username: None,
        auth_key_name: None,
        created_at: now,
        updated_at: now,
    };
    store.sources.insert(source.id, source.clone());
    debug!(id = source.id, ingestion_id = %source.ingestion_id, "created source");
    Ok((StatusCode::CREATED, Json(json!({ "source": source }))))
}

pub async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    let source = store.source_view(store.source(id)?);
    Ok(Json(json!({ "source": source })))
}

pub async fn update_source(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateSource>,
) -> ApiResult<Json<Value>> {
    if let Some(auth_type) = &input.auth_type {
        check_auth_type(auth_type)?;
    }
    let mut store = state.store.write().await;
    let source = store
        .sources
        .get_mut(&id)
        .ok_or_else(|| MockError::not_found("source", id))?;
    if let Some(name) = input.name {
        source.slug = slugify(&name);
    }
    if let Some(eps) = input.eps {
        source.eps = eps;
    }
    if let Some(auth_type) = input.auth_type {
        source.auth_type = auth_type;
    }
    if let Some(status) = input.status {
        source.status = status;
    }
    source.updated_at = Utc::now();
    debug!(id, "updated source");
    let source = source.clone();
    Ok(Json(json!({ "source": store.source_view(&source) })))
}

pub async fn delete_source(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    state.store.write().await.remove_source(id)?;
    debug!(id, "deleted source");
    Ok(StatusCode::OK)
}

// --- destinations ---

pub async fn list_destinations(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    store.project(project_id)?;
    let destinations: Vec<&Destination> = store
        .destinations
        .values()
        .filter(|d| d.project_id == project_id)
        .collect();
    Ok(Json(json!({ "destinations": destinations })))
}

pub async fn create_destination(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    Json(input): Json<CreateDestination>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if input.url.is_empty() {
        return Err(MockError::BadRequest("url is required".to_string()));
    }
    let mut store = state.store.write().await;
    store.project(project_id)?;
    let now = Utc::now();
    let destination = Destination {
        id: store.next_id(),
        project_id,
        name: input.name,
        url: input.url,
        eps: input.eps,
        status: "active".to_string(),
        created_at: now,
        updated_at: now,
    };
    store.destinations.insert(destination.id, destination.clone());
    debug!(id = destination.id, url = %destination.url, "created destination");
    Ok((StatusCode::CREATED, Json(json!({ "destination": destination }))))
}

pub async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    Ok(Json(json!({ "destination": store.destination(id)? })))
}

pub async fn update_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateDestination>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.write().await;
    let destination = store
        .destinations
        .get_mut(&id)
        .ok_or_else(|| MockError::not_found("destination", id))?;
    if let Some(name) = input.name {
        destination.name = name;
    }
    if let Some(url) = input.url {
        destination.url = url;
    }
    if let Some(eps) = input.eps {
        destination.eps = eps;
    }
    if let Some(status) = input.status {
        destination.status = status;
    }
    destination.updated_at = Utc::now();
    debug!(id, "updated destination");
    Ok(Json(json!({ "destination": destination })))
}

pub async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    state.store.write().await.remove_destination(id)?;
    debug!(id, "deleted destination");
    Ok(StatusCode::OK)
}

// --- connections ---

pub async fn list_connections(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    store.project(project_id)?;
    let connections: Vec<&Connection> = store
        .connections
        .values()
        .filter(|c| c.project_id == project_id)
        .collect();
    Ok(Json(json!({ "connections": connections })))
}

pub async fn create_connection(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    Json(input): Json<CreateConnection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    check_connection_status(&input.status)?;
    let mut store = state.store.write().await;
    store.project(project_id)?;
    if store.source(input.source_id)?.project_id != project_id
        || store.destination(input.destination_id)?.project_id != project_id
    {
        return Err(MockError::BadRequest(
            "source and destination must belong to the project".to_string(),
        ));
    }
    let now = Utc::now();
    let connection = Connection {
        id: store.next_id(),
        project_id,
        source_id: input.source_id,
        destination_id: input.destination_id,
        status: input.status,
        eps: input.eps,
        max_retries: input.max_retries,
        created_at: now,
        updated_at: now,
    };
    store.connections.insert(connection.id, connection.clone());
    debug!(
        id = connection.id,
        source_id = connection.source_id,
        destination_id = connection.destination_id,
        "created connection"
    );
    Ok((StatusCode::CREATED, Json(json!({ "connection": connection }))))
}

pub async fn get_connection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    Ok(Json(json!({ "connection": store.connection(id)? })))
}

pub async fn update_connection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateConnection>,
) -> ApiResult<Json<Value>> {
    if let Some(status) = &input.status {
        check_connection_status(status)?;
    }
    let mut store = state.store.write().await;
    let connection = store
        .connections
        .get_mut(&id)
        .ok_or_else(|| MockError::not_found("connection", id))?;
    if let Some(status) = input.status {
        connection.status = status;
    }
    if let Some(eps) = input.eps {
        connection.eps = eps;
    }
    if let Some(max_retries) = input.max_retries {
        connection.max_retries = max_retries;
    }
    connection.updated_at = Utc::now();
    debug!(id, status = %connection.status, "updated connection");
    Ok(Json(json!({ "connection": connection })))
}

pub async fn delete_connection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    state
        .store
        .write()
        .await
        .connections
        .remove(&id)
        .ok_or_else(|| MockError::not_found("connection", id))?;
    debug!(id, "deleted connection");
    Ok(StatusCode::OK)
}

// --- events ---

/// Whether some connection out of `source_id` matches the connection and
/// destination filters. No filters always matches.
fn routes_through(
    store: &Store,
    source_id: u64,
    connection_id: Option<u64>,
    destination_id: Option<u64>,
) -> bool {
    if connection_id.is_none() && destination_id.is_none() {
        return true;
    }
    store.connections.values().any(|c| {
        c.source_id == source_id
            && connection_id.is_none_or(|id| c.id == id)
            && destination_id.is_none_or(|id| c.destination_id == id)
    })
}

pub async fn list_events(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    Query(query): Query<EventQuery>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    store.project(project_id)?;
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let events: Vec<&Event> = store
        .events
        .values()
        .rev()
        .filter(|e| e.project_id == project_id)
        .filter(|e| query.source_id.is_none_or(|id| e.source_id == id))
        .filter(|e| query.status.as_deref().is_none_or(|s| e.status == s))
        .filter(|e| within(e.created_at, query.start_time, query.end_time))
        .filter(|e| search.is_none_or(|s| e.event_id.contains(s) || e.raw_body.contains(s)))
        .filter(|e| routes_through(&store, e.source_id, query.connection_id, query.destination_id))
        .collect();

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let (total, requests) = paginate(events, limit, offset);
    debug!(project_id, total, "listed events");
    Ok(Json(json!({
        "requests": requests,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    let mut event = store
        .events
        .get(&id)
        .cloned()
        .ok_or_else(|| MockError::not_found("event", id))?;
    event.delivery_attempts = store.attempts_for(&event.event_id);
    Ok(Json(json!({ "request": event })))
}

pub async fn replay_event(
    State(state): State<AppState>,
    Json(input): Json<ReplayEvent>,
) -> ApiResult<Json<Value>> {
    let mut store = state.store.write().await;
    let (key, source_id) = store
        .events
        .iter()
        .find(|(_, e)| e.event_id == input.event_id)
        .map(|(key, e)| (*key, e.source_id))
        .ok_or_else(|| MockError::not_found("event", &input.event_id))?;

    let connection_id = match input.connection_id {
        Some(id) => store.connection(id)?.id,
        None => store
            .connections
            .values()
            .find(|c| {
                c.source_id == source_id
                    && input.destination_id.is_none_or(|id| c.destination_id == id)
            })
            .map(|c| c.id)
            .ok_or_else(|| {
                MockError::BadRequest("no connection routes this event".to_string())
            })?,
    };

    let attempt = DeliveryAttempt {
        id: store.next_id(),
        event_id: input.event_id,
        connection_id,
        status: "success".to_string(),
        status_code: 200,
        error_reason: None,
        duration_ms: 12,
        created_at: Utc::now(),
    };
    store.attempts.insert(attempt.id, attempt.clone());
    if let Some(event) = store.events.get_mut(&key) {
        event.status = "processed".to_string();
    }
    debug!(event_id = %attempt.event_id, connection_id, "replayed event");

    Ok(Json(json!({
        "success": true,
        "status": attempt.status,
        "status_code": attempt.status_code,
        "duration_ms": attempt.duration_ms,
        "attempt_id": attempt.id,
    })))
}

// --- delivery attempts ---

pub async fn list_delivery_attempts(
    State(state): State<AppState>,
    Path(project_id): Path<u64>,
    Query(query): Query<AttemptQuery>,
) -> ApiResult<Json<Value>> {
    let store = state.store.read().await;
    store.project(project_id)?;
    let mut attempts: Vec<&DeliveryAttempt> = store
        .attempts
        .values()
        .filter(|a| {
            store
                .connections
                .get(&a.connection_id)
                .is_some_and(|c| {
                    c.project_id == project_id
                        && query.source_id.is_none_or(|id| c.source_id == id)
                        && query.destination_id.is_none_or(|id| c.destination_id == id)
                })
        })
        .filter(|a| query.connection_id.is_none_or(|id| a.connection_id == id))
        .filter(|a| query.event_id.as_deref().is_none_or(|id| a.event_id == id))
        .filter(|a| query.status.as_deref().is_none_or(|s| a.status == s))
        .filter(|a| within(a.created_at, query.start_time, query.end_time))
        .collect();

    match query.sort.as_deref().unwrap_or("time") {
        "time" => attempts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))),
        "time_oldest" => attempts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))),
        "duration" => attempts.sort_by(|a, b| b.duration_ms.cmp(&a.duration_ms)),
        "status_code" => attempts.sort_by(|a, b| b.status_code.cmp(&a.status_code)),
        other => return Err(MockError::BadRequest(format!("unknown sort {other:?}"))),
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);
    let (total, attempts) = paginate(attempts, limit, offset);
    Ok(Json(json!({
        "attempts": attempts,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}

// --- ingestion ---

pub async fn ingest(
    State(state): State<AppState>,
    Path(ingestion_id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut store = state.store.write().await;
    let (source_id, project_id) = store
        .sources
        .values()
        .find(|s| s.ingestion_id == ingestion_id)
        .map(|s| (s.id, s.project_id))
        .ok_or_else(|| MockError::not_found("source", &ingestion_id))?;

    let recorded: BTreeMap<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();

    let event = Event {
        id: store.next_id(),
        event_id: format!("evt_{}", Uuid::new_v4().simple()),
        source_id,
        project_id,
        raw_body: body,
        headers: recorded,
        status: "pending".to_string(),
        delivery_attempts: Vec::new(),
        created_at: Utc::now(),
    };
    debug!(event_id = %event.event_id, source_id, "ingested webhook");
    let event_id = event.event_id.clone();
    store.events.insert(event.id, event);
    Ok((StatusCode::ACCEPTED, Json(json!({ "event_id": event_id }))))
}
