use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{error, info};

use crate::calendar::Clock;
use crate::cleanup::{due_cleanups, CleanupKind};
use crate::error::Result;
use crate::service::BookingService;

/// Runs each due sweep at most once per calendar day.
#[derive(Debug, Default)]
pub struct CleanupTracker {
    last_run: HashMap<CleanupKind, NaiveDate>,
}

impl CleanupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every sweep due at `now` that has not already run today.
    pub async fn run_due(
        &mut self,
        service: &BookingService,
        now: NaiveDateTime,
    ) -> Result<Vec<(CleanupKind, Vec<String>)>> {
        let today = now.date();
        let mut results = Vec::new();

        for kind in due_cleanups(now, &service.config().system) {
            if self.last_run.get(&kind) == Some(&today) {
                continue;
            }
            let cancelled = service.run_cleanup(kind, today).await?;
            self.last_run.insert(kind, today);
            results.push((kind, cancelled));
        }
        Ok(results)
    }
}

/// Run the cleanup loop, checking once a minute
pub async fn run_scheduler(service: BookingService, clock: Arc<dyn Clock>) -> Result<()> {
    let mut tracker = CleanupTracker::new();

    loop {
        let now = clock.now();
        info!("Checking for due cleanups at {}", now.format("%Y-%m-%d %H:%M:%S"));

        match tracker.run_due(&service, now).await {
            Ok(results) => {
                for (kind, cancelled) in results {
                    info!("{} cleanup done: {} reservations cancelled", kind, cancelled.len());
                }
            }
            Err(e) => error!("Cleanup failed: {}", e),
        }

        sleep(std::time::Duration::from_secs(60)).await;
    }
}
