//! Pet catalog: listings, search, and administrative CRUD.
//!
//! The catalog owns pet records; adoption applications hold references into
//! it but never mutate it directly. Pet status changes arrive either through
//! an administrative edit here or through the adoption workflow's approval
//! side effect.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    CatalogFilter, CatalogQuery, Gender, NewPet, Pet, PetId, PetStatus, PetUpdate, PetView,
    Species,
};
pub use repository::{NewPetRecord, PetRepository};
pub use router::{catalog_admin_router, catalog_router};
pub use service::{CatalogError, PetCatalogService};
