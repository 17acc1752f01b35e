//! Disposable backend containers for integration tests.
//!
//! Tests that use these fixtures need a reachable Docker daemon.

mod endpoint;
pub mod error;
pub mod mysql;
pub mod redis;

pub use endpoint::Endpoint;
pub use error::{Result, TestInfraError};
