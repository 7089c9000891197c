use crate::{
    errors::AppError,
    repositories::members,
    state::AppState,
    structs::members::{Member, MemberGroup, UpdateGroupRequest, UpdateGroupResponse},
};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

pub fn new() -> Router<AppState> {
    Router::new()
        .route("/", get(get_all_member_groups))
        .route("/by-email/{email}", get(get_member_by_email))
        .route("/group", post(update_group))
}

/// 取成員名冊（含組別）
async fn get_all_member_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberGroup>>, AppError> {
    let result = members::get_all_member_groups(&state).await?;

    Ok(Json(result))
}

async fn get_member_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Member>, AppError> {
    let result = members::get_member_by_email(&state, &email).await?;

    Ok(Json(result))
}

async fn update_group(
    State(state): State<AppState>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<Json<UpdateGroupResponse>, AppError> {
    if payload.name.trim().is_empty() || payload.group.trim().is_empty() {
        return Err(AppError::MissingNameOrGroup);
    }

    let member = members::update_group(&state, &payload.name, &payload.group).await?;

    Ok(Json(UpdateGroupResponse {
        success: true,
        member,
    }))
}
