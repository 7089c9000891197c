use crate::{jobs::schedule::PregenerateScheduleJob, state::AppState, structs::jobs::AppJob};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

pub async fn initialize_scheduler(state: AppState) {
    let jobs: Vec<Arc<dyn AppJob>> = vec![Arc::new(PregenerateScheduleJob)];

    tokio::spawn(async move {
        let scheduler = match JobScheduler::new().await {
            Ok(scheduler) => scheduler,
            Err(err) => {
                tracing::error!("failed to create job scheduler: {:?}", err);
                return;
            }
        };

        for job in jobs {
            if !job.enabled() {
                continue;
            }

            let job_state = state.clone();
            let job_clone = job.clone();
            let scheduled = Job::new_async(job.cron_expression(), move |_uuid, _l| {
                let job_state = job_state.clone();
                let job = job_clone.clone();
                Box::pin(async move {
                    job.run(job_state).await;
                })
            });

            match scheduled {
                Ok(scheduled) => {
                    if let Err(err) = scheduler.add(scheduled).await {
                        tracing::error!("failed to add job: {:?}", err);
                    }
                }
                Err(err) => tracing::error!("invalid cron expression: {:?}", err),
            }
        }

        if let Err(err) = scheduler.start().await {
            tracing::error!("failed to start job scheduler: {:?}", err);
        }
    });
}
