//! Caller identity as attached by the access-control gate.
//!
//! The gate authenticates requests before the workflow services run; every
//! service operation receives the caller explicitly and performs no credential
//! checks of its own.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::RepositoryError;

/// Identifier wrapper for directory accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// Authenticated caller passed into every workflow operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.user_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Directory projection safe to embed in resolved views; never carries
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Read-side account lookup used when resolving references into views.
pub trait UserDirectory: Send + Sync {
    fn find(&self, id: &UserId) -> Result<Option<UserSummary>, RepositoryError>;
}

/// 403 payload for a caller whose role does not grant the route.
pub fn forbidden_response(caller: &CallerIdentity) -> Response {
    let payload = json!({
        "error": format!(
            "User role '{}' is not authorized to access this route",
            caller.role.label()
        ),
    });
    (StatusCode::FORBIDDEN, Json(payload)).into_response()
}
