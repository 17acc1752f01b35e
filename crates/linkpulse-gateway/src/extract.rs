use crate::error::AppError;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use linkpulse_core::{OwnerId, RequestMetadata};
use std::convert::Infallible;
use std::net::SocketAddr;

/// Header the identity layer sets to the authenticated owner.
pub const OWNER_HEADER: &str = "x-owner-id";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// The caller's owner identity, taken from [`OWNER_HEADER`].
#[derive(Debug, Clone)]
pub struct Owner(pub OwnerId);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header(&parts.headers, OWNER_HEADER)
            .and_then(|owner| OwnerId::new(owner).ok())
            .map(Owner)
            .ok_or(AppError::Unauthorized)
    }
}

/// Request metadata recorded with every click.
///
/// The peer address is only present when the server runs with connect info.
#[derive(Debug, Clone)]
pub struct ClickMetadata(pub RequestMetadata);

impl<S: Send + Sync> FromRequestParts<S> for ClickMetadata {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let peer_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(ClickMetadata(RequestMetadata {
            forwarded_for: header(headers, "x-forwarded-for"),
            real_ip: header(headers, "x-real-ip"),
            peer_addr,
            user_agent: header(headers, "user-agent"),
            country: header(headers, "cf-ipcountry"),
            city: header(headers, "cf-ipcity"),
        }))
    }
}
