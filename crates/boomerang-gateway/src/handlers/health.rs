use crate::error::Result;
use crate::model::HealthResponse;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let stats = state.stats().stats().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        in_use: stats.pool.in_use,
        free: stats.pool.free,
        capacity: stats.pool.capacity,
        records: stats.records,
    }))
}
