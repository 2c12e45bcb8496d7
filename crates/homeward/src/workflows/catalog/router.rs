use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CatalogQuery, NewPet, PetId, PetUpdate, Species};
use super::repository::PetRepository;
use super::service::{CatalogError, PetCatalogService};
use crate::workflows::adoption::repository::AdoptionRepository;
use crate::workflows::identity::{forbidden_response, CallerIdentity, UserDirectory};
use crate::workflows::paging::PageRequest;

/// Public catalog reads. Identity is optional here: the gate attaches it when
/// a token is present so admins see non-available pets.
pub fn catalog_router<P, A, U>(service: Arc<PetCatalogService<P, A, U>>) -> Router
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    Router::new()
        .route("/api/v1/pets", get(list_pets_handler::<P, A, U>))
        .route("/api/v1/pets/:pet_id", get(get_pet_handler::<P, A, U>))
        .with_state(service)
}

/// Administrative catalog mutations; expects the required-auth gate in front.
pub fn catalog_admin_router<P, A, U>(service: Arc<PetCatalogService<P, A, U>>) -> Router
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    Router::new()
        .route("/api/v1/pets", post(create_pet_handler::<P, A, U>))
        .route(
            "/api/v1/pets/:pet_id",
            put(update_pet_handler::<P, A, U>).delete(delete_pet_handler::<P, A, U>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogParams {
    pub(crate) species: Option<String>,
    pub(crate) breed: Option<String>,
    pub(crate) age: Option<u8>,
    pub(crate) search: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
}

impl CatalogParams {
    fn into_query(self) -> Result<CatalogQuery, Response> {
        let species = match self.species.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(Species::parse(raw).ok_or_else(|| {
                bad_request(format!(
                    "species '{raw}' must be one of dog, cat, bird, rabbit, other"
                ))
            })?),
        };
        let page = PageRequest::new(self.page, self.limit)
            .map_err(|error| bad_request(error.to_string()))?;

        Ok(CatalogQuery {
            species,
            breed: self.breed.filter(|value| !value.is_empty()),
            age: self.age,
            search: self.search.filter(|value| !value.is_empty()),
            page,
        })
    }
}

pub(crate) async fn list_pets_handler<P, A, U>(
    State(service): State<Arc<PetCatalogService<P, A, U>>>,
    caller: Option<Extension<CallerIdentity>>,
    params: Result<Query<CatalogParams>, QueryRejection>,
) -> Response
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };
    let query = match params.into_query() {
        Ok(query) => query,
        Err(response) => return response,
    };
    let identity = caller.as_ref().map(|Extension(identity)| identity);

    match service.list(query, identity) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_pet_handler<P, A, U>(
    State(service): State<Arc<PetCatalogService<P, A, U>>>,
    Path(pet_id): Path<String>,
) -> Response
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    match service.get(&PetId(pet_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_pet_handler<P, A, U>(
    State(service): State<Arc<PetCatalogService<P, A, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    body: Result<Json<NewPet>, JsonRejection>,
) -> Response
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    if !caller.is_admin() {
        return forbidden_response(&caller);
    }

    let Json(details) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match service.create(details, &caller) {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_pet_handler<P, A, U>(
    State(service): State<Arc<PetCatalogService<P, A, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(pet_id): Path<String>,
    body: Result<Json<PetUpdate>, JsonRejection>,
) -> Response
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    if !caller.is_admin() {
        return forbidden_response(&caller);
    }

    let Json(update) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection.status(), rejection.body_text()),
    };

    match service.update(&PetId(pet_id), update) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_pet_handler<P, A, U>(
    State(service): State<Arc<PetCatalogService<P, A, U>>>,
    Extension(caller): Extension<CallerIdentity>,
    Path(pet_id): Path<String>,
) -> Response
where
    P: PetRepository + 'static,
    A: AdoptionRepository + 'static,
    U: UserDirectory + 'static,
{
    if !caller.is_admin() {
        return forbidden_response(&caller);
    }

    match service.delete(&PetId(pet_id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Pet deleted successfully" })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn catalog_status(error: &CatalogError) -> StatusCode {
    match error {
        CatalogError::NotFound => StatusCode::NOT_FOUND,
        CatalogError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: CatalogError) -> Response {
    let status = catalog_status(&error);
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Extractor rejections (malformed JSON bodies, unparsable query strings)
/// carry the same error envelope as catalog failures.
fn rejection_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
