mod analytics;
mod health;
mod link;

pub use analytics::{overall_stats_handler, short_link_stats_handler, topic_stats_handler};
pub use health::health_handler;
pub use link::{create_short_link_handler, redirect_handler};
