use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

use homeward::workflows::adoption::adoption_router;
use homeward::workflows::catalog::{catalog_admin_router, catalog_router};

use crate::auth;
use crate::infra::{AdoptionService, AppState, CatalogService, InMemoryAccounts};

/// Assembles the full HTTP surface: adoption and admin catalog routes behind
/// the required-auth gate, public catalog reads behind the optional gate, and
/// the operational endpoints in front of both.
pub(crate) fn app_router(
    adoptions: Arc<AdoptionService>,
    catalog: Arc<CatalogService>,
    accounts: Arc<InMemoryAccounts>,
) -> Router {
    let protected = adoption_router(adoptions)
        .merge(catalog_admin_router(catalog.clone()))
        .route_layer(axum::middleware::from_fn_with_state(
            accounts.clone(),
            auth::require_auth,
        ));
    let public = catalog_router(catalog).route_layer(axum::middleware::from_fn_with_state(
        accounts,
        auth::optional_auth,
    ));

    protected
        .merge(public)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
