//! Authentication DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CallerIdentity;

/// Verified identity of the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl From<CallerIdentity> for UserInfo {
    fn from(caller: CallerIdentity) -> Self {
        Self {
            user_id: caller.user_id,
            roles: caller.roles,
        }
    }
}
