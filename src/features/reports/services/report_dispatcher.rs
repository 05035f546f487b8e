use std::sync::Arc;

use crate::core::error::Result;
use crate::features::reports::services::fan_out::{dispatch_all, FanOutSummary};
use crate::features::reports::services::summary_report_service::{
    SummaryReportJob, SummaryReportService,
};
use crate::features::users::services::UserService;

/// Fans summary reports out to every active user
pub struct ReportDispatcher {
    users: Arc<UserService>,
    reports: Arc<SummaryReportService>,
    concurrency: usize,
    default_period: String,
}

impl ReportDispatcher {
    pub fn new(
        users: Arc<UserService>,
        reports: Arc<SummaryReportService>,
        concurrency: usize,
        default_period: String,
    ) -> Self {
        Self {
            users,
            reports,
            concurrency,
            default_period,
        }
    }

    /// Period used when a run does not name one
    pub fn default_period(&self) -> &str {
        &self.default_period
    }

    /// Send `period` reports to all active users and wait for every job
    pub async fn run(&self, period: &str) -> Result<FanOutSummary> {
        let user_ids = self.users.list_active_ids().await?;
        tracing::info!(
            "Dispatching {} summary reports to {} active users",
            period,
            user_ids.len()
        );

        let job = Arc::new(SummaryReportJob::new(Arc::clone(&self.reports), period));
        let summary = dispatch_all(job, user_ids, self.concurrency).await;

        tracing::info!(
            "Finished {} summary reports: {}/{} sent, {} failed",
            period,
            summary.succeeded,
            summary.total,
            summary.failed
        );
        Ok(summary)
    }

    /// Start the fan-out in the background; returns the number of users queued
    pub async fn spawn(&self, period: &str) -> Result<usize> {
        let user_ids = self.users.list_active_ids().await?;
        let queued = user_ids.len();

        let job = Arc::new(SummaryReportJob::new(Arc::clone(&self.reports), period));
        let concurrency = self.concurrency;
        let period = period.to_string();
        tokio::spawn(async move {
            let summary = dispatch_all(job, user_ids, concurrency).await;
            tracing::info!(
                "Finished on-demand {} summary reports: {} sent, {} failed",
                period,
                summary.succeeded,
                summary.failed
            );
        });

        Ok(queued)
    }
}
