use super::{history_path, load_config, load_credentials};
use crate::output::Output;
use chrono::Utc;
use color_eyre::Result;
use moviepicks_config::PathManager;
use moviepicks_core::PicksOrchestrator;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

/// Runs are serialized through the mutex; a fire that arrives while a run is
/// still going waits for it instead of overlapping.
async fn run_once(orchestrator: &Mutex<PicksOrchestrator>, trigger: &'static str) {
    let orchestrator = orchestrator.lock().await;
    info!(operation = "scheduled_run_start", trigger, "Starting picks run");

    let result = orchestrator.run(Utc::now()).await;
    info!(
        operation = "scheduled_run_complete",
        trigger,
        theme = %result.theme,
        picks = result.items.len(),
        delivered = result.delivered,
        history_persisted = result.history_persisted,
        duration_ms = result.duration_ms,
        "Picks run finished"
    );
}

pub async fn run_daemon(schedule_override: Option<String>, no_startup_run: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create application directories: {}", e))?;

    let config = load_config(&path_manager)?;
    let credentials = load_credentials(&path_manager)?;
    let history_file = history_path(&config, &path_manager);

    let orchestrator = PicksOrchestrator::from_config(&config, &credentials, history_file, false)
        .map_err(|e| color_eyre::eyre::eyre!("Configuration check failed: {}", e))?;
    let orchestrator = Arc::new(Mutex::new(orchestrator));

    let schedule = schedule_override.unwrap_or_else(|| config.schedule.cron.clone());

    if !no_startup_run {
        info!(operation = "scheduler_startup", "Running picks on startup");
        run_once(&orchestrator, "startup").await;
    }

    let mut scheduler = JobScheduler::new()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create scheduler: {:?}", e))?;

    let job_orchestrator = orchestrator.clone();
    let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
        let orchestrator = job_orchestrator.clone();
        Box::pin(async move {
            run_once(&orchestrator, "cron").await;
        })
    })
    .map_err(|e| color_eyre::eyre::eyre!("Invalid cron schedule '{}': {:?}", schedule, e))?;

    scheduler
        .add(job)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to add scheduled job: {:?}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to start scheduler: {:?}", e))?;

    info!(
        operation = "scheduler_started",
        schedule = %schedule,
        utc_offset_minutes = config.schedule.utc_offset_minutes,
        "Scheduler started"
    );
    output.info(format!(
        "Daemon running with schedule '{}' (UTC). Logs: {}. Press Ctrl-C to stop.",
        schedule,
        path_manager.daemon_log_file().display()
    ));

    tokio::signal::ctrl_c().await?;

    info!(operation = "scheduler_stopping", "Shutdown signal received");
    scheduler
        .shutdown()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to stop scheduler: {:?}", e))?;
    output.success("Daemon stopped");

    Ok(())
}
