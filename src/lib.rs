//! # slotkeeper
//!
//! Reservation booking for parking spaces and charger slots. Guarantees that
//! no two active reservations for the same resource overlap in time.
//!
//! ## Architecture
//!
//! - **domain**: reservations, resources, caller identity and repository traits
//! - **application**: the scheduler (conflict detection, cancellation, queries)
//!   and the resource catalog service
//! - **infrastructure**: SeaORM persistence, the in-memory store and JWT identity
//! - **interfaces**: REST API with Swagger documentation
//! - **server**: runtime wiring and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider};

pub use interfaces::http::create_api_router;

pub use server::{init_tracing, ServerHandle, ServerOptions};
