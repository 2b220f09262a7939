use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::application::flows::SessionStore;
use crate::application::services::{ReconciliationService, TickReport};
use crate::domain::ports::TaskSpawner;

/// Drives the reconciliation passes on a fixed interval. Ticks are
/// single-flight: a tick that finds the previous one still running is skipped.
#[derive(Clone)]
pub struct ReconciliationWorker {
    service: ReconciliationService,
    sessions: SessionStore,
    spawner: Arc<dyn TaskSpawner>,
    in_flight: Arc<Mutex<()>>,
}

impl ReconciliationWorker {
    pub fn new(
        service: ReconciliationService,
        sessions: SessionStore,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        Self {
            service,
            sessions,
            spawner,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Spawns the timer loop in the background.
    pub fn start(&self) {
        let worker = self.clone();
        self.spawner.spawn(Box::pin(async move { worker.run().await }));
    }

    async fn run(self) {
        let period = self.service.settings().tick;
        info!("Starting reconciliation worker, tick every {:?}", period);

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let worker = self.clone();
            self.spawner.spawn(Box::pin(async move {
                worker.tick().await;
            }));
        }
    }

    /// Runs one tick unless another is still in progress, in which case `None`.
    pub async fn tick(&self) -> Option<TickReport> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Previous reconciliation tick still running, skipping");
            metrics::counter!("scheduler_ticks_total", "outcome" => "skipped").increment(1);
            return None;
        };

        let report = self.service.run_tick().await;

        let swept = self.sessions.sweep().await;
        if swept > 0 {
            tracing::debug!(swept, "Evicted idle chat sessions");
        }

        let outcome = if report.is_clean() { "ok" } else { "partial" };
        metrics::counter!("scheduler_ticks_total", "outcome" => outcome).increment(1);
        tracing::debug!(
            expired = report.expired,
            pruned = report.regeneration.pruned,
            created = report.regeneration.created,
            reminders = report.reminders,
            outcome,
            "Reconciliation tick finished"
        );

        Some(report)
    }
}
