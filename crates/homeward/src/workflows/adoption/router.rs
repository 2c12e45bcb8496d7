use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AdoptionId, AdoptionListQuery, ApplicationStatus};
use super::repository::AdoptionRepository;
use super::service::{AdoptionWorkflowService, WorkflowError};
use crate::workflows::catalog::domain::PetId;
use crate::workflows::catalog::repository::PetRepository;
use crate::workflows::identity::{forbidden_response, CallerIdentity, UserDirectory};
use crate::workflows::paging::PageRequest;

/// Adoption endpoints; every route expects the required-auth gate in front,
/// admin-only routes additionally check the caller's role.
pub fn adoption_router<R, P, U>(service: Arc<AdoptionWorkflowService<R, P, U>>) -> Router
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/adoptions",
            axum::routing::post(submit_handler::<R, P, U>).get(list_handler::<R, P, U>),
        )
        .route(
            "/api/v1/adoptions/my-applications",
            get(my_applications_handler::<R, P, U>),
        )
        .route(
            "/api/v1/adoptions/:adoption_id/approve",
            put(approve_handler::<R, P, U>),
        )
        .route(
            "/api/v1/adoptions/:adoption_id/reject",
            put(reject_handler::<R, P, U>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmitRequest {
    pub(crate) pet_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListParams {
    pub(crate) status: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
}

pub(crate) async fn submit_handler<R, P, U>(
    State(service): State<Arc<AdoptionWorkflowService<R, P, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Response
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match service.submit(&PetId(request.pet_id), &caller) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn my_applications_handler<R, P, U>(
    State(service): State<Arc<AdoptionWorkflowService<R, P, U>>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Response
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.applications_for_user(&caller.user_id) {
        Ok(applications) => (StatusCode::OK, Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, P, U>(
    State(service): State<Arc<AdoptionWorkflowService<R, P, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Response
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    if !caller.is_admin() {
        return forbidden_response(&caller);
    }

    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    let status = match params.status.as_deref() {
        None | Some("") => None,
        Some(raw) => match ApplicationStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return bad_request(format!(
                    "status '{raw}' must be one of pending, approved, rejected"
                ))
            }
        },
    };

    let page = match PageRequest::new(params.page, params.limit) {
        Ok(page) => page,
        Err(error) => return bad_request(error.to_string()),
    };

    match service.list_all(AdoptionListQuery { status, page }) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<R, P, U>(
    State(service): State<Arc<AdoptionWorkflowService<R, P, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(adoption_id): Path<String>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    if !caller.is_admin() {
        return forbidden_response(&caller);
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match service.approve(&AdoptionId(adoption_id), &caller, request.notes) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<R, P, U>(
    State(service): State<Arc<AdoptionWorkflowService<R, P, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(adoption_id): Path<String>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response
where
    R: AdoptionRepository + 'static,
    P: PetRepository + 'static,
    U: UserDirectory + 'static,
{
    if !caller.is_admin() {
        return forbidden_response(&caller);
    }

    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match service.reject(&AdoptionId(adoption_id), &caller, request.notes) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Boundary mapping from the engine's error taxonomy to HTTP status codes.
pub(crate) fn workflow_status(error: &WorkflowError) -> StatusCode {
    match error {
        WorkflowError::PetNotFound | WorkflowError::ApplicationNotFound => StatusCode::NOT_FOUND,
        WorkflowError::PetUnavailable
        | WorkflowError::AlreadyApplied
        | WorkflowError::AlreadyProcessed => StatusCode::BAD_REQUEST,
        WorkflowError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: WorkflowError) -> Response {
    let status = workflow_status(&error);
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Extractor rejections (malformed JSON bodies, unparsable query strings)
/// carry the same error envelope as workflow failures.
fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
