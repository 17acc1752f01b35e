//! Core types and traits for the Linkpulse link shortener.
//!
//! This crate provides the domain model shared by the shortener, resolver
//! and analytics services, together with the storage and cache contracts
//! that backends implement.

pub mod agent;
pub mod alias;
pub mod cache;
pub mod clock;
pub mod error;
pub mod event;
pub mod link;
pub mod store;

pub use agent::{Browser, DeviceType, OsType, UserAgentInfo};
pub use alias::Alias;
pub use cache::DestinationCache;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CacheError, CoreError, StorageError};
pub use event::{ClickEvent, EventId, NewClickEvent, RequestMetadata};
pub use link::{LinkId, NewShortLink, OwnerId, ShortLink, Topic};
pub use store::{AliasStore, ClickCount, EventLog};
