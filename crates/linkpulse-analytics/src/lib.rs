//! Click recording and the read-only statistics derived from it.
//!
//! [`EventRecorder`] appends one [`ClickEvent`](linkpulse_core::ClickEvent)
//! per resolution. [`AggregationEngine`] recomputes every statistic from the
//! live counters and event log on each query, so a recorded event is visible
//! to the next query without any cached aggregate in between.

pub mod engine;
pub mod error;
pub mod recorder;
pub mod stats;

pub use engine::AggregationEngine;
pub use error::{AnalyticsError, Result};
pub use recorder::EventRecorder;
pub use stats::{
    BrowserStat, DailyClicks, DeviceStat, LinkStats, LinkSummary, OsStat, OverallStats,
    TopicStats,
};
