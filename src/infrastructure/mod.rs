//! Infrastructure layer - external concerns

pub mod database;
pub mod identity;
pub mod storage;

pub use database::{init_database, DatabaseConfig};
pub use identity::{JwtConfig, JwtIdentityProvider};
pub use storage::InMemoryRepositoryProvider;
