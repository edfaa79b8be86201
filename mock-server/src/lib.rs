//! In-memory stand-in for the Volley API, used by the client's integration
//! tests and for local experiments.
//!
//! `/api/*` routes require `Authorization: Bearer <token>`; the ingestion
//! route `/hook/{ingestion_id}` is open.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tokio::{net::TcpListener, sync::RwLock};

pub mod error;
mod handlers;
pub mod models;

pub use error::MockError;
pub use models::Store;

pub const DEFAULT_API_TOKEN: &str = "test-token";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Store>>,
    pub api_token: Arc<str>,
}

impl AppState {
    pub fn new(api_token: &str) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::seeded())),
            api_token: Arc::from(api_token),
        }
    }
}

pub fn app() -> Router {
    app_with_token(DEFAULT_API_TOKEN)
}

pub fn app_with_token(api_token: &str) -> Router {
    router(AppState::new(api_token))
}

pub fn router(state: AppState) -> Router {
    use crate::handlers::*;

    let api = Router::new()
        .route("/org/list", get(list_organizations))
        .route("/org", get(get_organization).post(create_organization))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/{id}", put(update_project).delete(delete_project))
        .route("/projects/{id}/sources", get(list_sources).post(create_source))
        .route(
            "/sources/{id}",
            get(get_source).put(update_source).delete(delete_source),
        )
        .route(
            "/projects/{id}/destinations",
            get(list_destinations).post(create_destination),
        )
        .route(
            "/destinations/{id}",
            get(get_destination).put(update_destination).delete(delete_destination),
        )
        .route(
            "/projects/{id}/connections",
            get(list_connections).post(create_connection),
        )
        .route(
            "/connections/{id}",
            get(get_connection).put(update_connection).delete(delete_connection),
        )
        .route("/projects/{id}/requests", get(list_events))
        .route("/requests/{id}", get(get_event))
        .route("/replay-event", post(replay_event))
        .route("/projects/{id}/delivery-attempts", get(list_delivery_attempts))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .nest("/api", api)
        .route("/hook/{ingestion_id}", post(ingest))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_token(listener, DEFAULT_API_TOKEN).await
}

pub async fn run_with_token(listener: TcpListener, api_token: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(api_token)).await
}
