//! Concurrent fan-out across dashboards with per-task isolation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{info, warn};
use utm_connectors::DashboardFetcher;
use utm_core::config::BulkConfig;
use utm_core::types::{Dashboard, ErrorCountPolicy, Session};
use utm_core::AuditError;
use utm_engine::filter::FilterOptions;
use uuid::Uuid;

use crate::report::{BulkReport, DashboardAudit, DashboardOutcome, DashboardReport};

/// Requests cancellation of an in-flight bulk run. Completed dashboard
/// reports are retained; in-flight fetches are abandoned.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn new() -> (Self, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, CancelToken { rx })
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that never fires, for runs without a cancel handle.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    async fn cancelled(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                // sender dropped without cancelling; never resolve
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Runs every requested dashboard through fetch + engine pipeline
/// concurrently. One dashboard's failure, timeout, or panic is recorded on
/// that dashboard's report only; all outcomes are gathered, never aborted
/// as a batch.
pub struct BulkValidator<F> {
    fetcher: Arc<F>,
    config: BulkConfig,
    policy: ErrorCountPolicy,
}

impl<F> BulkValidator<F>
where
    F: DashboardFetcher + 'static,
{
    pub fn new(fetcher: Arc<F>, config: BulkConfig, policy: ErrorCountPolicy) -> Self {
        Self {
            fetcher,
            config,
            policy,
        }
    }

    /// Validate all dashboards without external cancellation.
    pub async fn validate_all(
        &self,
        session: &Session,
        dashboards: &[Dashboard],
        options: &FilterOptions,
    ) -> BulkReport {
        self.validate_all_with_cancel(session, dashboards, options, CancelToken::never())
            .await
    }

    /// Validate all dashboards, stopping early when `cancel` fires.
    pub async fn validate_all_with_cancel(
        &self,
        session: &Session,
        dashboards: &[Dashboard],
        options: &FilterOptions,
        cancel: CancelToken,
    ) -> BulkReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_fetches.max(1)));
        let fetch_timeout = Duration::from_millis(self.config.fetch_timeout_ms);

        info!(
            run_id = %run_id,
            dashboards = dashboards.len(),
            max_concurrent = self.config.max_concurrent_fetches,
            "bulk validation started"
        );

        let mut tasks: JoinSet<(usize, DashboardReport)> = JoinSet::new();
        for (index, dashboard) in dashboards.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let session = session.clone();
            let dashboard = dashboard.clone();
            let options = options.clone();
            let policy = self.policy;
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let outcome = run_dashboard(
                    fetcher.as_ref(),
                    &session,
                    &dashboard,
                    &options,
                    policy,
                    fetch_timeout,
                    semaphore,
                    cancel,
                )
                .await;
                (index, DashboardReport { dashboard, outcome })
            });
        }

        let mut slots: Vec<Option<DashboardReport>> = vec![None; dashboards.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => warn!(error = %e, "bulk validation task aborted"),
            }
        }

        // a panicked task left its slot empty; report it as that
        // dashboard's isolated failure
        let reports: Vec<DashboardReport> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| DashboardReport {
                    dashboard: dashboards[index].clone(),
                    outcome: DashboardOutcome::Failed {
                        error: "validation task aborted unexpectedly".to_string(),
                    },
                })
            })
            .collect();

        let report = BulkReport {
            run_id,
            reports,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            run_id = %run_id,
            completed = report.completed_count(),
            failed = report.failed_count(),
            cancelled = report.cancelled_count(),
            "bulk validation finished"
        );
        report
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_dashboard<F: DashboardFetcher>(
    fetcher: &F,
    session: &Session,
    dashboard: &Dashboard,
    options: &FilterOptions,
    policy: ErrorCountPolicy,
    fetch_timeout: Duration,
    semaphore: Arc<Semaphore>,
    mut cancel: CancelToken,
) -> DashboardOutcome {
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return DashboardOutcome::Cancelled,
    };
    if cancel.is_cancelled() {
        metrics::counter!("bulk.dashboards", "outcome" => "cancelled").increment(1);
        return DashboardOutcome::Cancelled;
    }

    let started = std::time::Instant::now();
    let fetched = tokio::select! {
        _ = cancel.cancelled() => {
            metrics::counter!("bulk.dashboards", "outcome" => "cancelled").increment(1);
            return DashboardOutcome::Cancelled;
        }
        result = timeout(fetch_timeout, fetcher.fetch_creatives(session, dashboard.id)) => {
            match result {
                Ok(Ok(fetched)) => fetched,
                Ok(Err(e)) => {
                    warn!(
                        dashboard_id = dashboard.id,
                        dashboard = %dashboard.name,
                        error = %e,
                        "dashboard fetch failed"
                    );
                    metrics::counter!("bulk.dashboards", "outcome" => "failed").increment(1);
                    return DashboardOutcome::Failed {
                        error: e.to_string(),
                    };
                }
                Err(_) => {
                    let e = AuditError::Timeout {
                        dashboard_id: dashboard.id,
                        elapsed_ms: fetch_timeout.as_millis() as u64,
                    };
                    warn!(dashboard_id = dashboard.id, error = %e, "dashboard fetch timed out");
                    metrics::counter!("bulk.dashboards", "outcome" => "timeout").increment(1);
                    return DashboardOutcome::Failed {
                        error: e.to_string(),
                    };
                }
            }
        }
    };
    metrics::histogram!("bulk.fetch_latency_ms").record(started.elapsed().as_millis() as f64);

    let audit = DashboardAudit::build(fetched.configs, fetched.recommended_utms, options, policy);
    metrics::counter!("bulk.dashboards", "outcome" => "completed").increment(1);
    DashboardOutcome::Completed(audit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_token_is_not_cancelled() {
        let token = CancelToken::never();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_handle_flips_token() {
        let (handle, token) = CancelHandle::new();
        assert!(!token.is_cancelled());
        handle.cancel();
        assert!(token.is_cancelled());
    }
}
