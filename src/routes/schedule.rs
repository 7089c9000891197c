use crate::{
    errors::AppError,
    repositories::{members, schedule},
    services::{aggregator, rotation},
    state::AppState,
    structs::schedule::{
        GenerateScheduleRequest, MonthSchedule, SaveScheduleRequest, SaveScheduleResponse,
    },
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;

pub fn new() -> Router<AppState> {
    Router::new()
        .route("/", post(save_month))
        .route("/generate", post(generate_month))
        .route("/{year}/{month}", get(get_month).delete(delete_month))
}

async fn get_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthSchedule>, AppError> {
    let result = schedule::read_month(&state, year, month).await?;

    Ok(Json(result))
}

/// Run the rotation engine for a month and return the result merged over
/// whatever is already stored. Nothing is persisted here; the client saves
/// explicitly once the operator is happy with the draft.
async fn generate_month(
    State(state): State<AppState>,
    Json(payload): Json<GenerateScheduleRequest>,
) -> Result<Json<MonthSchedule>, AppError> {
    let first = NaiveDate::from_ymd_opt(payload.year, payload.month, 1).ok_or(
        AppError::InvalidMonth {
            year: payload.year,
            month: payload.month,
        },
    )?;

    let roster = members::get_all_member_groups(&state).await?;

    // rotation continuity across the month boundary
    let prior_day = match first.pred_opt() {
        Some(date) => schedule::read_prior_day(&state, date).await?,
        None => None,
    };

    let generated =
        rotation::generate_month(&roster, payload.year, payload.month, prior_day.as_ref())?;

    let existing = schedule::read_month(&state, payload.year, payload.month).await?;
    let merged = aggregator::merge(existing, generated);

    Ok(Json(merged))
}

async fn save_month(
    State(state): State<AppState>,
    Json(payload): Json<SaveScheduleRequest>,
) -> Result<Json<SaveScheduleResponse>, AppError> {
    let normalized = aggregator::normalize_schedule(payload.schedule);

    schedule::write_month(&state, &normalized).await?;

    Ok(Json(SaveScheduleResponse { success: true }))
}

async fn delete_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<SaveScheduleResponse>, AppError> {
    schedule::delete_month(&state, year, month).await?;

    Ok(Json(SaveScheduleResponse { success: true }))
}
