use axum::{Json, extract::State};
use serde::Serialize;
use tracing::{debug, info};
use twenty48_core::ScoreRecord;

use crate::app::{ApiError, AppState};

#[derive(Serialize)]
pub struct SubmitResponse {
    success: bool,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    records: u64,
}

pub async fn list_scores(State(state): State<AppState>) -> Result<Json<Vec<ScoreRecord>>, ApiError> {
    let records = state.with_store(|store| store.list()).await?;
    debug!("listing scores" = records.len());
    Ok(Json(records))
}

pub async fn submit_score(
    State(state): State<AppState>,
    Json(record): Json<ScoreRecord>,
) -> Result<Json<SubmitResponse>, ApiError> {
    info!("recording score" = record.score, "name" = %record.name);
    state.with_store(move |store| store.append(&record)).await?;
    Ok(Json(SubmitResponse { success: true }))
}

pub async fn get_health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let records = state.with_store(|store| store.count()).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        records,
    }))
}
