use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use linkpulse_core::store::{AliasStore, ClickCount, EventLog, Result};
use linkpulse_core::{
    Alias, ClickEvent, EventId, LinkId, NewClickEvent, NewShortLink, OwnerId, ShortLink,
    StorageError, Topic,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// A stored link plus its live counter.
///
/// `link.click_count` is never updated in place; readers take a snapshot that
/// copies the current counter value in.
#[derive(Debug)]
struct LinkSlot {
    link: ShortLink,
    clicks: AtomicU64,
}

impl LinkSlot {
    fn new(link: ShortLink) -> Self {
        let clicks = AtomicU64::new(link.click_count);
        Self { link, clicks }
    }

    fn snapshot(&self) -> ShortLink {
        let mut link = self.link.clone();
        link.click_count = self.clicks.load(Ordering::Acquire);
        link
    }
}

/// In-memory implementation of [`AliasStore`] and [`EventLog`] using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Alias uniqueness goes through the map's entry
/// API, which holds the shard lock across the check and the insert, and
/// counters are plain atomics so increments never take a write lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    links: DashMap<Alias, Arc<LinkSlot>>,
    by_owner: DashMap<OwnerId, Vec<Arc<LinkSlot>>>,
    events: DashMap<LinkId, Vec<ClickEvent>>,
    next_link_id: AtomicU64,
    next_event_id: AtomicU64,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AliasStore for InMemoryStore {
    async fn insert(&self, link: NewShortLink) -> Result<ShortLink> {
        let slot = match self.links.entry(link.alias.clone()) {
            Entry::Occupied(_) => return Err(StorageError::Conflict(link.alias.to_string())),
            Entry::Vacant(vacant) => {
                let id = LinkId(self.next_link_id.fetch_add(1, Ordering::Relaxed) + 1);
                let slot = Arc::new(LinkSlot::new(link.into_link(id)));
                vacant.insert(Arc::clone(&slot));
                slot
            }
        };

        self.by_owner
            .entry(slot.link.owner.clone())
            .or_default()
            .push(Arc::clone(&slot));

        trace!(alias = %slot.link.alias, id = %slot.link.id, "Inserted short link");
        Ok(slot.snapshot())
    }

    async fn lookup(&self, alias: &Alias) -> Result<Option<ShortLink>> {
        Ok(self.links.get(alias).map(|slot| slot.snapshot()))
    }

    async fn increment_click(&self, alias: &Alias) -> Result<Option<ClickCount>> {
        Ok(self.links.get(alias).map(|slot| ClickCount {
            link_id: slot.link.id,
            clicks: slot.clicks.fetch_add(1, Ordering::AcqRel) + 1,
        }))
    }

    async fn links_by_owner(
        &self,
        owner: &OwnerId,
        topic: Option<Topic>,
    ) -> Result<Vec<ShortLink>> {
        let Some(slots) = self.by_owner.get(owner) else {
            return Ok(Vec::new());
        };

        Ok(slots
            .iter()
            .filter(|slot| topic.is_none_or(|topic| slot.link.topic == topic))
            .map(|slot| slot.snapshot())
            .collect())
    }
}

#[async_trait]
impl EventLog for InMemoryStore {
    async fn append(&self, event: NewClickEvent) -> Result<ClickEvent> {
        let id = EventId(self.next_event_id.fetch_add(1, Ordering::Relaxed) + 1);
        let event = event.into_event(id);

        self.events
            .entry(event.short_link_id)
            .or_default()
            .push(event.clone());

        Ok(event)
    }

    async fn events_for(&self, links: &[LinkId]) -> Result<Vec<ClickEvent>> {
        let mut events: Vec<ClickEvent> = links
            .iter()
            .filter_map(|id| self.events.get(id))
            .flat_map(|bucket| bucket.value().clone())
            .collect();

        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;
    use linkpulse_core::RequestMetadata;

    fn alias(s: &str) -> Alias {
        Alias::new_unchecked(s)
    }

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    fn new_link(a: &str, url: &str, o: &str, topic: Topic) -> NewShortLink {
        NewShortLink {
            owner: owner(o),
            destination_url: url.to_string(),
            alias: alias(a),
            topic,
            created_at: Timestamp::now(),
        }
    }

    fn click(link: LinkId, ip: &str, at: Timestamp) -> NewClickEvent {
        let metadata = RequestMetadata {
            forwarded_for: Some(ip.to_string()),
            ..Default::default()
        };
        NewClickEvent::from_request(link, &metadata, at)
    }

    #[tokio::test]
    async fn insert_and_lookup() {
        let store = InMemoryStore::new();

        let created = store
            .insert(new_link("abc123", "https://example.com", "u1", Topic::Untagged))
            .await
            .unwrap();
        assert_eq!(created.click_count, 0);

        let found = store.lookup(&alias("abc123")).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.destination_url, "https://example.com");
    }

    #[tokio::test]
    async fn lookup_nonexistent() {
        let store = InMemoryStore::new();
        assert!(store.lookup(&alias("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let store = InMemoryStore::new();

        store
            .insert(new_link("abc123", "https://example.com", "u1", Topic::Untagged))
            .await
            .unwrap();

        let err = store
            .insert(new_link("abc123", "https://other.com", "u2", Topic::Untagged))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        let kept = store.lookup(&alias("abc123")).await.unwrap().unwrap();
        assert_eq!(kept.destination_url, "https://example.com");
    }

    #[tokio::test]
    async fn aliases_are_case_sensitive() {
        let store = InMemoryStore::new();
        store
            .insert(new_link("abc123", "https://lower.example", "u1", Topic::Untagged))
            .await
            .unwrap();

        assert!(store.lookup(&alias("Abc123")).await.unwrap().is_none());
        assert!(store.increment_click(&alias("ABC123")).await.unwrap().is_none());
        store
            .insert(new_link("Abc123", "https://upper.example", "u1", Topic::Untagged))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_inserts_of_same_alias_yield_one_winner() {
        let store = Arc::new(InMemoryStore::new());
        let mut handles = vec![];

        for i in 0..64u64 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert(new_link(
                        "contested",
                        &format!("https://example{i}.com"),
                        "u1",
                        Topic::Untagged,
                    ))
                    .await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(StorageError::Conflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 63);
        assert_eq!(store.links.len(), 1);
        let owned = store.links_by_owner(&owner("u1"), None).await.unwrap();
        assert_eq!(owned.len(), 1);
    }

    #[tokio::test]
    async fn increment_click_counts_every_call() {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert(new_link("hot", "https://example.com", "u1", Topic::Untagged))
            .await
            .unwrap();

        let mut handles = vec![];
        for _ in 0..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.increment_click(&alias("hot")).await.unwrap().unwrap().clicks
            }));
        }

        let mut seen: Vec<u64> = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();

        // Every caller observed a distinct post-increment value.
        assert_eq!(seen, (1..=100).collect::<Vec<u64>>());
        let link = store.lookup(&alias("hot")).await.unwrap().unwrap();
        assert_eq!(link.click_count, 100);

        let next = store.increment_click(&alias("hot")).await.unwrap().unwrap();
        assert_eq!(next, ClickCount { link_id: link.id, clicks: 101 });
    }

    #[tokio::test]
    async fn increment_click_unknown_alias() {
        let store = InMemoryStore::new();
        assert_eq!(store.increment_click(&alias("nope")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn links_by_owner_filters_owner_and_topic() {
        let store = InMemoryStore::new();
        store
            .insert(new_link("a-acq", "https://a.com", "u1", Topic::Acquisition))
            .await
            .unwrap();
        store
            .insert(new_link("a-ret", "https://b.com", "u1", Topic::Retention))
            .await
            .unwrap();
        store
            .insert(new_link("b-acq", "https://c.com", "u2", Topic::Acquisition))
            .await
            .unwrap();

        let all = store.links_by_owner(&owner("u1"), None).await.unwrap();
        assert_eq!(all.len(), 2);

        let acquisition = store
            .links_by_owner(&owner("u1"), Some(Topic::Acquisition))
            .await
            .unwrap();
        assert_eq!(acquisition.len(), 1);
        assert_eq!(acquisition[0].alias.as_str(), "a-acq");

        assert!(store
            .links_by_owner(&owner("u3"), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn links_by_owner_reports_live_counters() {
        let store = InMemoryStore::new();
        store
            .insert(new_link("live", "https://a.com", "u1", Topic::Untagged))
            .await
            .unwrap();
        store.increment_click(&alias("live")).await.unwrap();
        store.increment_click(&alias("live")).await.unwrap();

        let links = store.links_by_owner(&owner("u1"), None).await.unwrap();
        assert_eq!(links[0].click_count, 2);
    }

    #[tokio::test]
    async fn events_are_scoped_to_requested_links_and_ordered() {
        let store = InMemoryStore::new();
        let t0 = Timestamp::from_second(1_700_000_000).unwrap();
        let t1 = Timestamp::from_second(1_700_000_100).unwrap();

        store.append(click(LinkId(1), "1.1.1.1", t1)).await.unwrap();
        store.append(click(LinkId(2), "2.2.2.2", t0)).await.unwrap();
        store.append(click(LinkId(1), "3.3.3.3", t0)).await.unwrap();

        let events = store.events_for(&[LinkId(1)]).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].source_ip, "3.3.3.3");
        assert_eq!(events[1].source_ip, "1.1.1.1");

        let both = store.events_for(&[LinkId(1), LinkId(2)]).await.unwrap();
        assert_eq!(both.len(), 3);

        assert!(store.events_for(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn appended_events_get_distinct_ids() {
        let store = InMemoryStore::new();
        let now = Timestamp::now();
        let first = store.append(click(LinkId(1), "1.1.1.1", now)).await.unwrap();
        let second = store.append(click(LinkId(1), "1.1.1.1", now)).await.unwrap();
        assert_ne!(first.id, second.id);
    }
}
