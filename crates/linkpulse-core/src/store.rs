use crate::alias::Alias;
use crate::error::StorageError;
use crate::event::{ClickEvent, NewClickEvent};
use crate::link::{LinkId, NewShortLink, OwnerId, ShortLink, Topic};
use async_trait::async_trait;

/// Result type for store and event log operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// The state of a link's counter right after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickCount {
    pub link_id: LinkId,
    /// Counter value including the increment that produced this.
    pub clicks: u64,
}

/// Durable keyed store of [`ShortLink`] records.
///
/// Implementations own alias uniqueness and the click counters. Both must be
/// enforced by the backend itself: `insert` must reject a taken alias
/// atomically and `increment_click` must be a single atomic increment.
#[async_trait]
pub trait AliasStore: Send + Sync + 'static {
    /// Inserts a new link. Returns `Err(StorageError::Conflict)` if the alias
    /// is already taken.
    async fn insert(&self, link: NewShortLink) -> Result<ShortLink>;

    /// Retrieves the link for a given alias.
    /// Returns `None` if the alias does not exist.
    async fn lookup(&self, alias: &Alias) -> Result<Option<ShortLink>>;

    /// Atomically adds one to the click counter and returns the new value
    /// along with the link id, so callers holding only the alias can attach
    /// events to the link. Returns `None` if the alias does not exist.
    async fn increment_click(&self, alias: &Alias) -> Result<Option<ClickCount>>;

    /// Lists every link owned by `owner`, optionally restricted to one topic.
    async fn links_by_owner(&self, owner: &OwnerId, topic: Option<Topic>)
        -> Result<Vec<ShortLink>>;
}

/// Append-only log of [`ClickEvent`]s.
#[async_trait]
pub trait EventLog: Send + Sync + 'static {
    /// Appends an event. Once this returns, the event is visible to every
    /// subsequent read.
    async fn append(&self, event: NewClickEvent) -> Result<ClickEvent>;

    /// Returns all events recorded for any of `links`, oldest first.
    async fn events_for(&self, links: &[LinkId]) -> Result<Vec<ClickEvent>>;
}
