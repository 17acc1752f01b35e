use crate::error::{AppError, Result};
use crate::extract::Owner;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use linkpulse_analytics::{LinkStats, OverallStats, TopicStats};
use linkpulse_core::{Alias, Topic};

pub async fn short_link_stats_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(alias): Path<String>,
) -> Result<Json<LinkStats>> {
    let alias = Alias::new(alias).map_err(|_| AppError::NotFound("URL not found".to_string()))?;
    Ok(Json(state.analytics.by_short_link(&alias, &owner).await?))
}

pub async fn topic_stats_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Path(topic): Path<String>,
) -> Result<Json<TopicStats>> {
    let topic: Topic = topic.parse()?;
    Ok(Json(state.analytics.by_topic(topic, &owner).await?))
}

pub async fn overall_stats_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<Json<OverallStats>> {
    Ok(Json(state.analytics.overall(&owner).await?))
}
