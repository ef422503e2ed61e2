//! Caller identity and the identity provider port
//!
//! The HTTP layer asks an [`IdentityProvider`] to verify the bearer
//! credential and attaches the resulting [`CallerIdentity`] to the request.

use async_trait::async_trait;

use crate::domain::DomainResult;

/// Role claim that unlocks catalog administration.
pub const ADMIN_ROLE: &str = "admin";

/// Authenticated principal derived from a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub roles: Vec<String>,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// External collaborator that verifies bearer credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a raw bearer token.
    ///
    /// Rejected credentials (bad signature, expired, revoked) fail with
    /// `AuthInvalid`; an unreachable provider fails with `Dependency`.
    async fn verify(&self, token: &str) -> DomainResult<CallerIdentity>;

    /// Revoke a previously verified token so later calls reject it.
    async fn revoke(&self, token: &str) -> DomainResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles() {
        let plain = CallerIdentity::new("U1");
        assert!(!plain.is_admin());

        let admin = CallerIdentity::new("U2").with_role("user").with_role(ADMIN_ROLE);
        assert!(admin.has_role("user"));
        assert!(admin.is_admin());
    }
}
