use crate::{
    errors::AppError,
    state::AppState,
    structs::members::{Member, MemberGroup},
};

// 取得所有成員與組別，當作排班引擎的名冊
pub async fn get_all_member_groups(state: &AppState) -> Result<Vec<MemberGroup>, AppError> {
    sqlx::query_as(r#"SELECT name, "group" FROM members ORDER BY name ASC;"#)
        .fetch_all(state.get_pool())
        .await
        .map_err(AppError::from)
}

pub async fn get_member_by_email(state: &AppState, email: &str) -> Result<Member, AppError> {
    sqlx::query_as(
        r#"
            SELECT
                id,
                name,
                email,
                "group"
            FROM
                members
            WHERE
                email = $1
            LIMIT
                1;
        "#,
    )
    .bind(email)
    .fetch_optional(state.get_pool())
    .await
    .map_err(AppError::from)?
    .ok_or(AppError::MemberNotFound)
}

// 依名稱更新成員組別
pub async fn update_group(state: &AppState, name: &str, group: &str) -> Result<Member, AppError> {
    sqlx::query_as(
        r#"
            UPDATE members
            SET "group" = $1
            WHERE name = $2
            RETURNING id, name, email, "group";
        "#,
    )
    .bind(group)
    .bind(name)
    .fetch_optional(state.get_pool())
    .await
    .map_err(AppError::from)?
    .ok_or(AppError::MemberNotFound)
}
