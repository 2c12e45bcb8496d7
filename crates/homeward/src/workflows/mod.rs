pub mod adoption;
pub mod catalog;
pub mod identity;
pub mod paging;

/// Error enumeration shared by the storage traits.
///
/// `Conflict` covers storage-level uniqueness violations; the services map it
/// to their own typed failures so callers never see the raw variant.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
