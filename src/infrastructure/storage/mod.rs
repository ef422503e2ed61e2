//! Storage backends that are not SQL-backed

pub mod memory;

pub use memory::InMemoryRepositoryProvider;
