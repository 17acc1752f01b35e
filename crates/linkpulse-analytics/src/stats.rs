//! Serializable statistics returned by the [`AggregationEngine`](crate::AggregationEngine).

use jiff::civil::Date;
use linkpulse_core::{Browser, DeviceType, OsType, Topic};
use serde::Serialize;

/// Click events recorded on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    pub date: Date,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OsStat {
    pub os_name: OsType,
    pub unique_clicks: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStat {
    pub device_name: DeviceType,
    pub unique_clicks: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserStat {
    pub browser_name: Browser,
    pub unique_clicks: u64,
    pub unique_users: u64,
}

/// Statistics for a single short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    /// The link's authoritative counter.
    pub total_clicks: u64,
    /// Distinct source IPs over every event of the link.
    pub unique_users: u64,
    /// Trailing seven UTC days, ascending, days without clicks omitted.
    pub clicks_by_date: Vec<DailyClicks>,
    pub os_type: Vec<OsStat>,
    pub device_type: Vec<DeviceStat>,
    pub browser: Vec<BrowserStat>,
}

/// Per-link row inside topic and owner-wide statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub short_url: String,
    pub total_clicks: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    pub topic: Topic,
    pub total_clicks: u64,
    pub unique_users: u64,
    pub clicks_by_date: Vec<DailyClicks>,
    pub urls: Vec<LinkSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_urls: u64,
    pub total_clicks: u64,
    pub unique_users: u64,
    pub clicks_by_date: Vec<DailyClicks>,
    pub urls: Vec<LinkSummary>,
    pub os_type: Vec<OsStat>,
    pub device_type: Vec<DeviceStat>,
    pub browser: Vec<BrowserStat>,
}
