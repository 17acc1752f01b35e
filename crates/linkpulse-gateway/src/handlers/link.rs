use crate::error::{AppError, Result};
use crate::extract::{ClickMetadata, Owner};
use crate::model::{CreateShortLinkRequest, CreateShortLinkResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use linkpulse_core::Alias;
use linkpulse_shortener::CreateParams;

pub async fn create_short_link_handler(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Json(request): Json<CreateShortLinkRequest>,
) -> Result<(StatusCode, Json<CreateShortLinkResponse>)> {
    let alias = request.custom_alias.map(Alias::new).transpose()?;

    let link = state
        .shortener
        .create(CreateParams {
            owner,
            destination_url: request.long_url,
            alias,
            topic: request.topic,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateShortLinkResponse {
            short_url: link.short_url(&state.base_url),
            alias: link.alias.to_string(),
            created_at: link.created_at,
        }),
    ))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    ClickMetadata(metadata): ClickMetadata,
) -> Result<Response> {
    // a malformed alias can never have been created
    let alias = Alias::new(alias).map_err(|_| AppError::NotFound("URL not found".to_string()))?;
    let destination = state.resolver.resolve(&alias, &metadata).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, destination)]).into_response())
}
