use crate::error::{AnalyticsError, Result};
use crate::stats::{
    BrowserStat, DailyClicks, DeviceStat, LinkStats, LinkSummary, OsStat, OverallStats,
    TopicStats,
};
use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::Span;
use linkpulse_core::{
    Alias, AliasStore, Browser, ClickEvent, Clock, DeviceType, EventLog, LinkId, OsType, OwnerId,
    ShortLink, SystemClock, Topic,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Number of UTC calendar days covered by `clicks_by_date`, today included.
const WINDOW_DAYS: i64 = 7;

/// Read-only statistics over the alias store and the click event log.
///
/// Every query is scoped to one owner: links are fetched by owner first and
/// only their events are loaded, so the cost of a query is bounded by that
/// owner's data. Distinct users are counted exactly with an in-memory set of
/// source IPs.
pub struct AggregationEngine<S: ?Sized, L: ?Sized> {
    store: Arc<S>,
    log: Arc<L>,
    clock: Arc<dyn Clock>,
    base_url: String,
}

impl<S: ?Sized, L: ?Sized> Clone for AggregationEngine<S, L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            log: Arc::clone(&self.log),
            clock: Arc::clone(&self.clock),
            base_url: self.base_url.clone(),
        }
    }
}

impl<S, L> AggregationEngine<S, L>
where
    S: AliasStore + ?Sized,
    L: EventLog + ?Sized,
{
    /// `base_url` is the public prefix short URLs are reported under.
    pub fn new(store: Arc<S>, log: Arc<L>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            log,
            clock: Arc::new(SystemClock),
            base_url: base_url.into(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Statistics for one link. A link owned by someone else is reported
    /// exactly like a missing one.
    pub async fn by_short_link(&self, alias: &Alias, owner: &OwnerId) -> Result<LinkStats> {
        let link = self
            .store
            .lookup(alias)
            .await?
            .filter(|link| &link.owner == owner)
            .ok_or_else(|| AnalyticsError::NotFound(alias.to_string()))?;

        let events = self.log.events_for(&[link.id]).await?;
        debug!(alias = %alias, events = events.len(), "Computing link statistics");

        Ok(LinkStats {
            total_clicks: link.click_count,
            unique_users: distinct_ips(&events),
            clicks_by_date: self.clicks_by_date(&events),
            os_type: os_breakdown(&events),
            device_type: device_breakdown(&events),
            browser: browser_breakdown(&events),
        })
    }

    /// Statistics across the owner's links tagged with `topic`.
    pub async fn by_topic(&self, topic: Topic, owner: &OwnerId) -> Result<TopicStats> {
        let links = self.store.links_by_owner(owner, Some(topic)).await?;
        let events = self.events_of(&links).await?;
        debug!(
            owner = %owner,
            topic = %topic,
            links = links.len(),
            events = events.len(),
            "Computing topic statistics"
        );

        Ok(TopicStats {
            topic,
            total_clicks: total_clicks(&links),
            unique_users: distinct_ips(&events),
            clicks_by_date: self.clicks_by_date(&events),
            urls: self.summaries(&links, &events),
        })
    }

    /// Statistics across every link the owner has created.
    pub async fn overall(&self, owner: &OwnerId) -> Result<OverallStats> {
        let links = self.store.links_by_owner(owner, None).await?;
        let events = self.events_of(&links).await?;
        debug!(
            owner = %owner,
            links = links.len(),
            events = events.len(),
            "Computing owner-wide statistics"
        );

        Ok(OverallStats {
            total_urls: links.len() as u64,
            total_clicks: total_clicks(&links),
            unique_users: distinct_ips(&events),
            clicks_by_date: self.clicks_by_date(&events),
            urls: self.summaries(&links, &events),
            os_type: os_breakdown(&events),
            device_type: device_breakdown(&events),
            browser: browser_breakdown(&events),
        })
    }

    async fn events_of(&self, links: &[ShortLink]) -> Result<Vec<ClickEvent>> {
        let ids: Vec<LinkId> = links.iter().map(|link| link.id).collect();
        Ok(self.log.events_for(&ids).await?)
    }

    fn summaries(&self, links: &[ShortLink], events: &[ClickEvent]) -> Vec<LinkSummary> {
        let mut ips_by_link: HashMap<LinkId, HashSet<&str>> = HashMap::new();
        for event in events {
            ips_by_link
                .entry(event.short_link_id)
                .or_default()
                .insert(event.source_ip.as_str());
        }

        links
            .iter()
            .map(|link| LinkSummary {
                short_url: link.short_url(&self.base_url),
                total_clicks: link.click_count,
                unique_users: ips_by_link.get(&link.id).map_or(0, |ips| ips.len() as u64),
            })
            .collect()
    }

    /// Buckets events by UTC day over `[today - 6, today]`.
    fn clicks_by_date(&self, events: &[ClickEvent]) -> Vec<DailyClicks> {
        let utc = TimeZone::UTC;
        let today = utc.to_datetime(self.clock.now()).date();
        let first = today
            .checked_sub(Span::new().days(WINDOW_DAYS - 1))
            .unwrap_or(Date::MIN);

        let mut days: BTreeMap<Date, u64> = BTreeMap::new();
        for event in events {
            let day = utc.to_datetime(event.timestamp).date();
            if (first..=today).contains(&day) {
                *days.entry(day).or_default() += 1;
            }
        }

        days.into_iter()
            .map(|(date, count)| DailyClicks { date, count })
            .collect()
    }
}

fn total_clicks(links: &[ShortLink]) -> u64 {
    links.iter().map(|link| link.click_count).sum()
}

fn distinct_ips<'a>(events: impl IntoIterator<Item = &'a ClickEvent>) -> u64 {
    events
        .into_iter()
        .map(|event| event.source_ip.as_str())
        .collect::<HashSet<_>>()
        .len() as u64
}

/// A classifier dimension that can be broken down by.
trait Category: Copy + Eq + Hash {
    fn label(&self) -> &'static str;
}

impl Category for OsType {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl Category for DeviceType {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl Category for Browser {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

/// Groups `events` by `key` into `(category, clicks, distinct IPs)`, busiest
/// category first and ties broken by label.
fn breakdown<K: Category>(
    events: &[ClickEvent],
    key: impl Fn(&ClickEvent) -> K,
) -> Vec<(K, u64, u64)> {
    let mut groups: HashMap<K, (u64, HashSet<&str>)> = HashMap::new();
    for event in events {
        let (clicks, ips) = groups.entry(key(event)).or_default();
        *clicks += 1;
        ips.insert(event.source_ip.as_str());
    }

    let mut rows: Vec<(K, u64, u64)> = groups
        .into_iter()
        .map(|(category, (clicks, ips))| (category, clicks, ips.len() as u64))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label().cmp(b.0.label())));
    rows
}

fn os_breakdown(events: &[ClickEvent]) -> Vec<OsStat> {
    breakdown(events, |event| event.os_type)
        .into_iter()
        .map(|(os_name, unique_clicks, unique_users)| OsStat {
            os_name,
            unique_clicks,
            unique_users,
        })
        .collect()
}

fn device_breakdown(events: &[ClickEvent]) -> Vec<DeviceStat> {
    breakdown(events, |event| event.device_type)
        .into_iter()
        .map(|(device_name, unique_clicks, unique_users)| DeviceStat {
            device_name,
            unique_clicks,
            unique_users,
        })
        .collect()
}

fn browser_breakdown(events: &[ClickEvent]) -> Vec<BrowserStat> {
    breakdown(events, |event| event.browser)
        .into_iter()
        .map(|(browser_name, unique_clicks, unique_users)| BrowserStat {
            browser_name,
            unique_clicks,
            unique_users,
        })
        .collect()
}
