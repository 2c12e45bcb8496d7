use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::domain::{PetId, PetView};
use crate::workflows::identity::{UserId, UserSummary};
use crate::workflows::paging::PageRequest;

/// Identifier wrapper for adoption applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdoptionId(pub String);

/// Note stamped onto sibling applications rejected by an approval cascade.
/// Overwrites any caller-supplied notes on those records.
pub const CASCADE_REJECTION_NOTE: &str = "Pet has been adopted by another applicant";

/// Application state machine: pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Case-insensitive parse used for query-string filters.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Persisted application record; holds references, never embedded aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionApplication {
    pub id: AdoptionId,
    pub pet_id: PetId,
    pub applicant_id: UserId,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    pub reviewed_by: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Fields the engine supplies when asking the repository to create a record.
/// The repository allocates the id and enforces (pet, applicant) uniqueness.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub pet_id: PetId,
    pub applicant_id: UserId,
    pub application_date: DateTime<Utc>,
}

/// Reviewer stamp applied by a conditional pending-only transition.
#[derive(Debug, Clone)]
pub struct ReviewStamp {
    pub status: ApplicationStatus,
    pub reviewed_by: UserId,
    pub reviewed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ReviewStamp {
    pub fn approval(reviewer: UserId, at: DateTime<Utc>, notes: Option<String>) -> Self {
        Self {
            status: ApplicationStatus::Approved,
            reviewed_by: reviewer,
            reviewed_at: at,
            notes,
        }
    }

    pub fn rejection(reviewer: UserId, at: DateTime<Utc>, notes: Option<String>) -> Self {
        Self {
            status: ApplicationStatus::Rejected,
            reviewed_by: reviewer,
            reviewed_at: at,
            notes,
        }
    }

    /// Stamp for siblings closed by an approval on the same pet.
    pub fn cascade(reviewer: UserId, at: DateTime<Utc>) -> Self {
        Self::rejection(reviewer, at, Some(CASCADE_REJECTION_NOTE.to_string()))
    }
}

/// Read-time join of an application with its pet, applicant, and reviewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedApplication {
    pub id: AdoptionId,
    pub pet: PetView,
    pub applicant: UserSummary,
    pub status: ApplicationStatus,
    pub application_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Validated admin listing filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdoptionListQuery {
    pub status: Option<ApplicationStatus>,
    pub page: PageRequest,
}
