//! The alias resolution hot path.

pub mod error;
pub mod service;

pub use error::{ResolverError, Result};
pub use service::{ResolverService, ResolverSettings};
