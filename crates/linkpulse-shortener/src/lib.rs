//! Short link creation: destination validation, alias generation and the
//! atomic alias claim against the store.

pub mod error;
pub mod generator;
pub mod service;

pub use error::{Result, ShortenerError};
pub use generator::{Generator, RandomAliasGenerator};
pub use service::{CreateParams, ShortenerService, DEFAULT_MAX_ATTEMPTS};
