use super::{connect, load_config};
use crate::output::Output;
use color_eyre::Result;
use rollover_config::{container_base_path, PathManager, SchedulerConfig};
use rollover_core::RolloverOrchestrator;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// Runs rollover passes on a cron schedule. Passes never overlap: a tick that fires while
/// the previous pass is still running waits for it.
pub struct Scheduler {
    scheduler: JobScheduler,
    orchestrator: Arc<Mutex<RolloverOrchestrator>>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(orchestrator: RolloverOrchestrator, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            config,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        // Listen before the first pass so an early SIGTERM is not lost
        let mut shutdown = ShutdownSignal::listen()?;

        if self.config.run_on_startup {
            info!(operation = "scheduler_startup", "Running initial rollover on startup");
            // Lock before spawning so stop() cannot slip in ahead of the startup pass
            let guard = Arc::clone(&self.orchestrator).lock_owned().await;
            tokio::spawn(async move {
                run_locked(&guard).await;
            });
        }

        let orchestrator = Arc::clone(&self.orchestrator);
        let job = Job::new_async(self.config.schedule.as_str(), move |_uuid, _lock| {
            let orchestrator = Arc::clone(&orchestrator);
            Box::pin(async move {
                info!(operation = "scheduled_rollover_start", "Starting scheduled rollover");
                run_pass(&orchestrator).await;
            })
        })
        .map_err(|e| color_eyre::eyre::eyre!("Invalid cron schedule '{}': {}", self.config.schedule, e))?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;

        info!(
            operation = "scheduler_started",
            schedule = %self.config.schedule,
            "Scheduler started"
        );

        let signal = shutdown.recv().await;
        info!(operation = "scheduler_stopping", signal, "Shutdown requested, stopping scheduler");
        self.stop().await
    }

    /// Waits for a running pass to finish writing, then shuts the scheduler down.
    /// The pass lock stays held so no new tick can start a pass in between.
    async fn stop(&mut self) -> Result<()> {
        let _idle = wait_for_idle(&self.orchestrator).await;
        self.scheduler.shutdown().await?;
        info!(operation = "scheduler_stopped", "Scheduler stopped");
        Ok(())
    }
}

async fn wait_for_idle<T>(pass: &Mutex<T>) -> MutexGuard<'_, T> {
    if let Ok(guard) = pass.try_lock() {
        return guard;
    }
    info!(operation = "scheduler_draining", "Waiting for the running rollover to finish");
    pass.lock().await
}

/// SIGINT or SIGTERM, whichever arrives first.
#[cfg(unix)]
struct ShutdownSignal {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    fn listen() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignal;

#[cfg(not(unix))]
impl ShutdownSignal {
    fn listen() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
        }
        "ctrl-c"
    }
}

async fn run_pass(orchestrator: &Mutex<RolloverOrchestrator>) {
    let orchestrator = orchestrator.lock().await;
    run_locked(&orchestrator).await;
}

async fn run_locked(orchestrator: &RolloverOrchestrator) {
    match orchestrator.run().await {
        Ok(result) if result.is_success() => {
            info!(
                operation = "scheduled_rollover_complete",
                playlists = result.playlists.len(),
                rolled_over = result.rolled_over(),
                duration_ms = result.duration.as_millis() as u64,
                "Rollover completed successfully"
            );
        }
        Ok(result) => {
            warn!(
                operation = "scheduled_rollover_partial",
                playlists = result.playlists.len(),
                failed = result.failed(),
                "Rollover completed with failed playlists"
            );
        }
        Err(e) => {
            error!(
                operation = "scheduled_rollover_error",
                error = %e,
                "Rollover failed"
            );
        }
    }
}

fn is_container() -> bool {
    std::path::Path::new("/.dockerenv").exists() || container_base_path().exists()
}

pub async fn run_daemon(schedule_override: Option<String>, no_startup_run: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config = load_config(&path_manager, output)?;
    let scheduler_config_from_file = config.scheduler.clone()
        .unwrap_or_else(rollover_config::default_scheduler_config);

    let scheduler_config = SchedulerConfig {
        schedule: schedule_override.unwrap_or(scheduler_config_from_file.schedule),
        run_on_startup: !no_startup_run && scheduler_config_from_file.run_on_startup,
    };

    let orchestrator = connect(&config, &path_manager).await?;

    output.info(format!(
        "Daemon running with schedule '{}'. Logs are written to {}",
        scheduler_config.schedule,
        path_manager.daemon_log_file().display()
    ));
    if !is_container() {
        output.info("Press Ctrl-C to stop. A running rollover finishes before exit.");
    }

    let mut scheduler = Scheduler::new(orchestrator, scheduler_config).await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create scheduler: {}", e))?;
    scheduler.start().await
        .map_err(|e| color_eyre::eyre::eyre!("Scheduler stopped with an error: {}", e))?;

    output.success("Daemon stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_stop_waits_for_running_pass() {
        let pass = Arc::new(Mutex::new(Vec::<&str>::new()));
        let (started_tx, started_rx) = oneshot::channel();

        let running = Arc::clone(&pass);
        let handle = tokio::spawn(async move {
            let mut log = running.lock().await;
            let _ = started_tx.send(());
            tokio::time::sleep(Duration::from_millis(50)).await;
            log.push("pass finished");
        });

        started_rx.await.unwrap();
        let idle = wait_for_idle(&pass).await;
        assert_eq!(*idle, vec!["pass finished"]);

        drop(idle);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_idle_returns_immediately_when_no_pass_runs() {
        let pass = Mutex::new(0u32);
        let idle = tokio::time::timeout(Duration::from_millis(10), wait_for_idle(&pass)).await;
        assert!(idle.is_ok());
    }
}
