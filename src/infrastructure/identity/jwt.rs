//! JWT bearer tokens and the identity provider built on them

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{CallerIdentity, DomainError, DomainResult, IdentityProvider};

/// Development-only signing key. Anyone holding it can mint admin tokens.
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEFAULT_JWT_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "slotkeeper".to_string(),
        }
    }
}

impl JwtConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Role claims, e.g. `["admin"]`
    #[serde(default)]
    pub roles: Vec<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
    /// Token id, used for revocation
    pub jti: String,
}

impl TokenClaims {
    pub fn new(user_id: &str, roles: &[String], config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user_id.to_string(),
            roles: roles.to_vec(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn into_identity(self) -> CallerIdentity {
        CallerIdentity {
            user_id: self.sub,
            roles: self.roles,
        }
    }
}

/// Sign a set of claims
pub fn encode_claims(
    claims: &TokenClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Create a JWT token for a user
pub fn create_token(
    user_id: &str,
    roles: &[String],
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode_claims(&TokenClaims::new(user_id, roles, config), config)
}

/// Verify and decode a JWT token
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// HS256 identity provider with an in-process revocation list.
pub struct JwtIdentityProvider {
    config: JwtConfig,
    /// Revoked token ids mapped to their expiry, pruned on each revoke
    revoked: DashMap<String, i64>,
}

impl JwtIdentityProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            config,
            revoked: DashMap::new(),
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    fn decode(&self, token: &str) -> DomainResult<TokenClaims> {
        verify_token(token, &self.config).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => DomainError::AuthInvalid("Token has expired".into()),
            _ => {
                debug!(error = %e, "Rejected bearer token");
                DomainError::AuthInvalid("Invalid token".into())
            }
        })
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> DomainResult<CallerIdentity> {
        let claims = self.decode(token)?;
        if self.revoked.contains_key(&claims.jti) {
            return Err(DomainError::AuthInvalid("Token has been revoked".into()));
        }
        Ok(claims.into_identity())
    }

    async fn revoke(&self, token: &str) -> DomainResult<()> {
        let claims = self.decode(token)?;
        let now = Utc::now().timestamp();
        self.revoked.retain(|_, exp| *exp > now);
        self.revoked.insert(claims.jti, claims.exp);
        warn!(user_id = %claims.sub, "Token revoked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtIdentityProvider {
        JwtIdentityProvider::new(JwtConfig {
            secret: "test-secret".into(),
            expiration_hours: 1,
            issuer: "slotkeeper-test".into(),
        })
    }

    #[tokio::test]
    async fn verifies_issued_token() {
        let p = provider();
        let token = create_token("U1", &["admin".to_string()], p.config()).unwrap();

        let who = p.verify(&token).await.unwrap();
        assert_eq!(who.user_id, "U1");
        assert!(who.is_admin());
    }

    #[tokio::test]
    async fn rejects_wrong_secret_and_garbage() {
        let p = provider();
        let other = JwtConfig {
            secret: "other-secret".into(),
            ..p.config().clone()
        };
        let forged = create_token("U1", &[], &other).unwrap();

        for token in [forged.as_str(), "not-a-jwt"] {
            let err = p.verify(token).await.unwrap_err();
            assert_eq!(err.kind(), "auth_invalid");
            assert_eq!(err.message(), "Invalid token");
        }
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() {
        let p = provider();
        let other = JwtConfig {
            issuer: "someone-else".into(),
            ..p.config().clone()
        };
        let token = create_token("U1", &[], &other).unwrap();
        assert_eq!(p.verify(&token).await.unwrap_err().message(), "Invalid token");
    }

    #[tokio::test]
    async fn reports_expiry() {
        let p = provider();
        let mut claims = TokenClaims::new("U1", &[], p.config());
        claims.exp = Utc::now().timestamp() - 3600;
        let token = encode_claims(&claims, p.config()).unwrap();

        let err = p.verify(&token).await.unwrap_err();
        assert_eq!(err.message(), "Token has expired");
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let p = provider();
        let token = create_token("U1", &[], p.config()).unwrap();
        let untouched = create_token("U1", &[], p.config()).unwrap();

        p.revoke(&token).await.unwrap();
        let err = p.verify(&token).await.unwrap_err();
        assert_eq!(err.message(), "Token has been revoked");
        assert!(p.verify(&untouched).await.is_ok());
    }
}
