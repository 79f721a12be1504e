use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::Json;
use boomerang_core::{ExpirationPolicy, ShortenParams, UrlId};
use jiff::Timestamp;
use tracing::debug;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = payload?;

    let expire_at: Timestamp = request.expire_at.parse().map_err(|err| {
        AppError::BadRequest(format!("expireAt is not an RFC 3339 timestamp: {err}"))
    })?;

    let id = state
        .shortener()
        .shorten(ShortenParams::new(
            request.url,
            ExpirationPolicy::AtTimestamp(expire_at),
        ))
        .await?;

    Ok(Json(CreateUrlResponse {
        id,
        short_url: id.to_url(state.base_url()),
    }))
}

pub async fn redirect_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    let target = state.redirector().resolve(&id).await?;
    debug!(id = %id, target = %target, "redirecting");
    Ok(Redirect::to(&target))
}

pub async fn delete_url_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let id = UrlId::parse(&id)?;
    state.shortener().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
