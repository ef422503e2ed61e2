//! Identity provider adapters

pub mod jwt;

pub use jwt::{create_token, JwtConfig, JwtIdentityProvider, TokenClaims, DEFAULT_JWT_SECRET};
