use crate::{errors::AppError, state::AppState};
use axum::extract::State;

// DB 連線健康檢查
pub async fn health_check(State(state): State<AppState>) -> Result<String, AppError> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(state.get_pool())
        .await
        .map_err(AppError::from)?;

    Ok("ok".to_string())
}
