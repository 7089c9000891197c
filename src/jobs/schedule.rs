use crate::{
    repositories::{members, schedule},
    services::rotation,
    state::AppState,
    structs::jobs::AppJob,
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDate};

#[derive(Clone)]
pub struct PregenerateScheduleJob;

#[async_trait]
impl AppJob for PregenerateScheduleJob {
    fn enabled(&self) -> bool {
        std::env::var("ENABLE_PREGENERATE_JOB").unwrap_or_else(|_| "true".to_string()) == "true"
    }

    fn cron_expression(&self) -> &str {
        "0 0 6 25 * *" // 每月 25 號早上六點
    }

    async fn run(&self, state: AppState) {
        if let Err(err) = pregenerate_next_month(&state).await {
            tracing::error!("pregenerate schedule job failed: {:?}", err);
        }
    }
}

// 下個月還沒有班表的話先排好存進資料庫
async fn pregenerate_next_month(state: &AppState) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };

    let existing = schedule::read_month(state, year, month)
        .await
        .context("read existing month")?;
    if !existing.is_empty() {
        tracing::info!("schedule for {}-{:02} already exists, skipping", year, month);
        return Ok(());
    }

    let roster = members::get_all_member_groups(state)
        .await
        .context("load roster")?;

    let first = NaiveDate::from_ymd_opt(year, month, 1).context("first day of next month")?;
    let prior_day = match first.pred_opt() {
        Some(date) => schedule::read_prior_day(state, date)
            .await
            .context("read prior day")?,
        None => None,
    };

    let generated = rotation::generate_month(&roster, year, month, prior_day.as_ref())?;

    schedule::write_month(state, &generated)
        .await
        .context("persist generated month")?;

    tracing::info!("pregenerated schedule for {}-{:02}", year, month);
    Ok(())
}
