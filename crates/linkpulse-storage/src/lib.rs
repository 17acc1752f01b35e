//! Storage backends for short links and click events.
//!
//! Every backend implements both [`AliasStore`] and [`EventLog`] so a
//! single connection pool serves the resolver and the analytics engine.

pub mod memory;
pub mod mysql;

pub use linkpulse_core::store::{AliasStore, EventLog, Result};
pub use linkpulse_core::StorageError;
pub use memory::InMemoryStore;
pub use mysql::MySqlStore;
