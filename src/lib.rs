//! PatientPilot API: authentication-gated CRUD over providers and their
//! patients, backed by a hierarchical document store.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod signup;
pub mod store;
pub mod validation;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handles behind every request: the document store and the
/// identity-token verifier. Both are constructed exactly once in bootstrap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn store::DocumentStore>,
    pub verifier: Arc<dyn auth::TokenVerifier>,
}

/// Build the full application router: open root and health endpoints,
/// provider and patient routes behind the auth middleware under
/// `api_prefix`, and a JSON not-found fallback.
pub fn app(state: AppState, api_prefix: &str) -> Router {
    let patients = Router::new()
        .route(
            "/",
            get(handlers::patients::list_patients).post(handlers::patients::create_patient),
        )
        .route(
            "/:id",
            get(handlers::patients::get_patient)
                .put(handlers::patients::update_patient)
                .delete(handlers::patients::delete_patient),
        );

    let providers = Router::new().route(
        "/profile",
        get(handlers::providers::get_profile).put(handlers::providers::update_profile),
    );

    let api = Router::new()
        .nest("/providers", providers)
        .nest("/patients", patients)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_provider,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest(api_prefix, api)
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "timestamp": Utc::now().to_rfc3339() }))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
