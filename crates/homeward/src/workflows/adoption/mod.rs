//! Adoption application intake and review workflow.
//!
//! The only multi-record invariant in the system lives here: approving one
//! application adopts the pet and closes every other pending application for
//! it. All review mutations go through the repository's conditional
//! pending-only transition so concurrent reviews cannot both win.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdoptionApplication, AdoptionId, AdoptionListQuery, ApplicationStatus, NewApplication,
    ResolvedApplication, ReviewStamp, CASCADE_REJECTION_NOTE,
};
pub use repository::{AdoptionRepository, TransitionOutcome};
pub use router::adoption_router;
pub use service::{AdoptionWorkflowService, WorkflowError};
