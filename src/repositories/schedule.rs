use crate::{
    errors::AppError,
    state::AppState,
    structs::schedule::{DayAssignment, MonthSchedule, ShiftSlot},
};
use chrono::NaiveDate;

#[derive(sqlx::FromRow)]
struct AssignmentRow {
    shift_date: NaiveDate,
    name: String,
    shift_type: String,
}

fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(AppError::InvalidMonth { year, month })?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or(AppError::InvalidMonth { year, month })?;
    Ok((first, last))
}

fn rows_into_schedule(rows: Vec<AssignmentRow>) -> MonthSchedule {
    let mut schedule = MonthSchedule::new();
    for row in rows {
        // 資料庫裡壞掉的 shift_type 不視為致命錯誤，略過並記 log
        let Some(slot) = ShiftSlot::parse_loose(&row.shift_type) else {
            tracing::warn!(
                "skipping unrecognized shift_type {:?} for {} on {}",
                row.shift_type,
                row.name,
                row.shift_date
            );
            continue;
        };
        schedule
            .entry(row.shift_date.format("%Y-%m-%d").to_string())
            .or_default()
            .insert(row.name, slot);
    }
    schedule
}

/// Stored assignments for one month, keyed by ISO date. Days with no rows
/// are absent from the map ("never generated", distinct from explicit off).
pub async fn read_month(
    state: &AppState,
    year: i32,
    month: u32,
) -> Result<MonthSchedule, AppError> {
    let (first, last) = month_range(year, month)?;

    let rows: Vec<AssignmentRow> = sqlx::query_as(
        r#"
            SELECT s.shift_date, m.name, s.shift_type
            FROM shifts s
            JOIN shift_assignments sa ON sa.shift_id = s.id
            JOIN members m ON m.id = sa.member_id
            WHERE s.shift_date BETWEEN $1 AND $2
            ORDER BY s.shift_date ASC;
        "#,
    )
    .bind(first)
    .bind(last)
    .fetch_all(state.get_pool())
    .await
    .map_err(AppError::from)?;

    Ok(rows_into_schedule(rows))
}

/// Assignment of a single day, used to seed rotation continuity across a
/// month boundary. None when nothing is recorded for that date.
pub async fn read_prior_day(
    state: &AppState,
    date: NaiveDate,
) -> Result<Option<DayAssignment>, AppError> {
    let rows: Vec<AssignmentRow> = sqlx::query_as(
        r#"
            SELECT s.shift_date, m.name, s.shift_type
            FROM shifts s
            JOIN shift_assignments sa ON sa.shift_id = s.id
            JOIN members m ON m.id = sa.member_id
            WHERE s.shift_date = $1;
        "#,
    )
    .bind(date)
    .fetch_all(state.get_pool())
    .await
    .map_err(AppError::from)?;

    let mut schedule = rows_into_schedule(rows);
    Ok(schedule.remove(&date.format("%Y-%m-%d").to_string()))
}

/// Persist a schedule as idempotent per member-day upserts inside one
/// transaction: resolve the shift row, drop any assignment the member
/// already has on that date, insert the new one.
pub async fn write_month(state: &AppState, schedule: &MonthSchedule) -> Result<(), AppError> {
    let mut tx = state.get_pool().begin().await?;

    for (date_key, day) in schedule {
        let Ok(date) = NaiveDate::parse_from_str(date_key, "%Y-%m-%d") else {
            tracing::warn!("skipping unrecognized date key {:?}", date_key);
            continue;
        };

        for (name, slot) in day {
            let member_id: Option<i32> = sqlx::query_scalar("SELECT id FROM members WHERE name = $1")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await?;
            let Some(member_id) = member_id else {
                tracing::warn!("member not found, skipping assignment: {}", name);
                continue;
            };

            let existing: Option<i32> = sqlx::query_scalar(
                "SELECT id FROM shifts WHERE shift_date = $1 AND shift_type = $2",
            )
            .bind(date)
            .bind(slot.as_db_value())
            .fetch_optional(&mut *tx)
            .await?;
            let shift_id: i32 = match existing {
                Some(id) => id,
                None => {
                    sqlx::query_scalar(
                        "INSERT INTO shifts (shift_date, shift_type) VALUES ($1, $2) RETURNING id",
                    )
                    .bind(date)
                    .bind(slot.as_db_value())
                    .fetch_one(&mut *tx)
                    .await?
                }
            };

            // 一人一天只能有一個班，先刪同日舊資料再寫入
            sqlx::query(
                r#"
                    DELETE FROM shift_assignments
                    WHERE member_id = $1
                    AND shift_id IN (
                        SELECT id FROM shifts WHERE shift_date = $2
                    );
                "#,
            )
            .bind(member_id)
            .bind(date)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO shift_assignments (shift_id, member_id) VALUES ($1, $2)")
                .bind(shift_id)
                .bind(member_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Delete every assignment and shift row inside the month.
pub async fn delete_month(state: &AppState, year: i32, month: u32) -> Result<(), AppError> {
    let (first, last) = month_range(year, month)?;

    let mut tx = state.get_pool().begin().await?;

    sqlx::query(
        r#"
            DELETE FROM shift_assignments
            WHERE shift_id IN (
                SELECT id FROM shifts WHERE shift_date BETWEEN $1 AND $2
            );
        "#,
    )
    .bind(first)
    .bind(last)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM shifts WHERE shift_date BETWEEN $1 AND $2")
        .bind(first)
        .bind(last)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
