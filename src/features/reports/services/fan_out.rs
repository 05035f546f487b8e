use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::core::error::Result;

/// Unit of work run once per user during a report fan-out
#[async_trait]
pub trait UserReportJob: Send + Sync {
    async fn run(&self, user_id: Uuid) -> Result<()>;
}

/// Outcome counts of one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Run `job` for every user, at most `concurrency` at a time.
///
/// Each job runs in its own task, so an error or a panic is logged and
/// counted without affecting the rest.
pub async fn dispatch_all(
    job: Arc<dyn UserReportJob>,
    user_ids: Vec<Uuid>,
    concurrency: usize,
) -> FanOutSummary {
    let total = user_ids.len();

    let outcomes: Vec<bool> = stream::iter(user_ids)
        .map(|user_id| {
            let job = Arc::clone(&job);
            async move {
                match tokio::spawn(async move { job.run(user_id).await }).await {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        tracing::error!("Report job failed for user {}: {:?}", user_id, e);
                        false
                    }
                    Err(e) => {
                        tracing::error!("Report job for user {} aborted: {}", user_id, e);
                        false
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let succeeded = outcomes.iter().filter(|ok| **ok).count();
    FanOutSummary {
        total,
        succeeded,
        failed: total - succeeded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct FlakyJob {
        failing: Uuid,
        panicking: Uuid,
        completed: Mutex<HashSet<Uuid>>,
    }

    #[async_trait]
    impl UserReportJob for FlakyJob {
        async fn run(&self, user_id: Uuid) -> Result<()> {
            if user_id == self.failing {
                return Err(AppError::ExternalServiceError("mail down".to_string()));
            }
            if user_id == self.panicking {
                panic!("boom");
            }
            self.completed.lock().unwrap().insert(user_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_other_users() {
        let failing = Uuid::new_v4();
        let panicking = Uuid::new_v4();
        let healthy: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

        let job = Arc::new(FlakyJob {
            failing,
            panicking,
            completed: Mutex::new(HashSet::new()),
        });

        let mut user_ids = vec![panicking, failing];
        user_ids.extend(healthy.iter().copied());

        let summary = dispatch_all(job.clone(), user_ids, 2).await;

        assert_eq!(
            summary,
            FanOutSummary {
                total: 7,
                succeeded: 5,
                failed: 2
            }
        );
        let completed = job.completed.lock().unwrap();
        assert!(healthy.iter().all(|id| completed.contains(id)));
    }

    struct CountingJob {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl UserReportJob for CountingJob {
        async fn run(&self, _user_id: Uuid) -> Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let job = Arc::new(CountingJob {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let user_ids = (0..12).map(|_| Uuid::new_v4()).collect();

        let summary = dispatch_all(job.clone(), user_ids, 3).await;

        assert_eq!(summary.succeeded, 12);
        assert!(job.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_no_users_is_a_no_op() {
        let job = Arc::new(CountingJob {
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });

        let summary = dispatch_all(job, Vec::new(), 4).await;

        assert_eq!(summary, FanOutSummary::default());
    }
}
