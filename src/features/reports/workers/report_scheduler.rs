use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::features::reports::services::ReportDispatcher;

/// Background worker that sends summary reports on a fixed interval
pub struct ReportScheduler {
    dispatcher: Arc<ReportDispatcher>,
    every: Duration,
}

impl ReportScheduler {
    pub fn new(dispatcher: Arc<ReportDispatcher>, every: Duration) -> Self {
        Self { dispatcher, every }
    }

    /// Run the scheduler in a background loop.
    ///
    /// The first round fires one full interval after startup.
    pub async fn run(&self) {
        tracing::info!(
            "Starting report scheduler: {} reports every {}s",
            self.dispatcher.default_period(),
            self.every.as_secs()
        );

        let mut ticker = interval_at(Instant::now() + self.every, self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let period = self.dispatcher.default_period();
            if let Err(e) = self.dispatcher.run(period).await {
                tracing::error!("Error dispatching summary reports: {:?}", e);
            }
        }
    }
}
