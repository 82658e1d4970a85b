//! Record types crossing the port boundary.

use serde::{Deserialize, Serialize};
use waytrail_domain::UserId;

/// Role resolved by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Player,
    Admin,
}

/// Minimal identity projection used for authorization checks and the admin
/// verification view. Authentication itself is not this engine's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub role: UserRole,
}

impl UserRecord {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
