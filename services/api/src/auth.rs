//! Bearer-token access gate.
//!
//! Tokens are opaque lookups against the in-memory account directory; the
//! gate attaches the resolved [`CallerIdentity`] as a request extension so
//! the workflow routers never touch credentials.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::infra::InMemoryAccounts;

/// Rejects the request unless a known bearer token is presented.
pub(crate) async fn require_auth(
    State(accounts): State<Arc<InMemoryAccounts>>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = bearer_token(request.headers()).and_then(|token| accounts.resolve(token));
    match caller {
        Some(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        None => unauthorized(),
    }
}

/// Attaches the caller when a known token is presented; anonymous and
/// unrecognized-token requests proceed without an identity.
pub(crate) async fn optional_auth(
    State(accounts): State<Arc<InMemoryAccounts>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(caller) = bearer_token(request.headers()).and_then(|token| accounts.resolve(token))
    {
        request.extensions_mut().insert(caller);
    }
    next.run(request).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Not authorized to access this route" })),
    )
        .into_response()
}
