use std::future::Future;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{RetryPolicy, StopFlag, WorkerKind};
use crate::models::{AuditLogRow, OrderRow, Payload, Row, UserRow};

/// Destination for synthetic rows
pub trait RowSink {
    /// Insert one row, returning the number of rows affected
    fn insert(&self, row: &Row) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

impl RowSink for PgPool {
    async fn insert(&self, row: &Row) -> Result<u64, sqlx::Error> {
        let result = match row {
            Row::Audit(audit) => {
                sqlx::query(AuditLogRow::INSERT_SQL)
                    .bind(audit.action)
                    .bind(audit.metadata.as_ref())
                    .execute(self)
                    .await?
            }
            Row::Order(order) => {
                sqlx::query(OrderRow::INSERT_SQL)
                    .bind(order.user_id)
                    .bind(order.price)
                    .bind(Json(order.raw_data.as_ref()))
                    .execute(self)
                    .await?
            }
            Row::User(user) => {
                sqlx::query(UserRow::INSERT_SQL)
                    .bind(&user.username)
                    .bind(user.bio.as_ref())
                    .execute(self)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }
}

/// Per-worker totals returned when the worker loop ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker: usize,
    pub kind: WorkerKind,
    pub inserted: u64,
    pub failed: u64,
}

/// Outcome of a single insert attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Inserted,
    /// The insert failed; `retry_in` is `None` when the retry policy gave up
    Failed { retry_in: Option<Duration> },
}

/// Unbounded insert loop for one worker kind
pub struct InsertWorker<S> {
    sink: S,
    payload: Payload,
    retry: RetryPolicy,
    stop: StopFlag,
    rng: StdRng,
    consecutive_failures: u32,
    report: WorkerReport,
}

impl<S: RowSink> InsertWorker<S> {
    pub fn new(id: usize, kind: WorkerKind, sink: S, retry: RetryPolicy, stop: StopFlag) -> Self {
        Self {
            sink,
            payload: Payload::for_kind(kind),
            retry,
            stop,
            rng: StdRng::from_os_rng(),
            consecutive_failures: 0,
            report: WorkerReport {
                worker: id,
                kind,
                inserted: 0,
                failed: 0,
            },
        }
    }

    /// Replace the entropy source, for reproducible rows
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn report(&self) -> &WorkerReport {
        &self.report
    }

    /// Build and insert one row without sleeping
    pub async fn step(&mut self) -> Step {
        let row = self.payload.draw(&mut self.rng);

        match self.sink.insert(&row).await {
            Ok(_) => {
                self.consecutive_failures = 0;
                self.report.inserted += 1;
                Step::Inserted
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.report.failed += 1;
                tracing::debug!(
                    worker = self.report.worker,
                    kind = %self.report.kind,
                    error = %e,
                    "Insert failed"
                );
                Step::Failed {
                    retry_in: self.retry.delay_after(self.consecutive_failures),
                }
            }
        }
    }

    /// Run until the stop flag is set or the retry policy gives up
    pub async fn run(mut self) -> WorkerReport {
        let pause = self.report.kind.pause();
        tracing::debug!(worker = self.report.worker, kind = %self.report.kind, "Worker started");

        while !self.stop.is_set() {
            match self.step().await {
                Step::Inserted if pause.is_zero() => tokio::task::yield_now().await,
                Step::Inserted => tokio::time::sleep(pause).await,
                Step::Failed {
                    retry_in: Some(delay),
                } => tokio::time::sleep(delay).await,
                Step::Failed { retry_in: None } => {
                    tracing::warn!(
                        worker = self.report.worker,
                        kind = %self.report.kind,
                        failures = self.consecutive_failures,
                        "Retry limit reached, worker stopping"
                    );
                    break;
                }
            }
        }

        tracing::debug!(
            worker = self.report.worker,
            kind = %self.report.kind,
            inserted = self.report.inserted,
            "Worker stopped"
        );

        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::testing::MemorySink;
    use std::time::Instant;
    use tokio_test::assert_ok;

    fn worker(kind: WorkerKind, sink: MemorySink, retry: RetryPolicy) -> InsertWorker<MemorySink> {
        InsertWorker::new(0, kind, sink, retry, StopFlag::new()).with_rng(StdRng::seed_from_u64(42))
    }

    #[tokio::test]
    async fn test_step_inserts_into_own_table_only() {
        for kind in WorkerKind::ALL {
            let sink = MemorySink::default();
            let mut worker = worker(kind, sink.clone(), RetryPolicy::fixed(Duration::ZERO));

            assert_eq!(worker.step().await, Step::Inserted);

            for other in WorkerKind::ALL {
                let expected = if other == kind { 1 } else { 0 };
                assert_eq!(sink.count(other.table()), expected, "{kind} wrote to {other}");
            }
            assert_eq!(worker.report().inserted, 1);
        }
    }

    #[tokio::test]
    async fn test_failure_reports_retry_delay() {
        let sink = MemorySink::failing(1);
        let mut worker = worker(
            WorkerKind::Order,
            sink.clone(),
            RetryPolicy::fixed(Duration::from_millis(100)),
        );

        assert_eq!(
            worker.step().await,
            Step::Failed {
                retry_in: Some(Duration::from_millis(100))
            }
        );
        assert_eq!(sink.count("orders"), 0);

        assert_eq!(worker.step().await, Step::Inserted);
        assert_eq!(sink.count("orders"), 1);
        assert_eq!(worker.report().failed, 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_flag_set() {
        let sink = MemorySink::default();
        let stop = StopFlag::new();
        let worker = InsertWorker::new(
            3,
            WorkerKind::User,
            sink.clone(),
            RetryPolicy::fixed(Duration::ZERO),
            stop.clone(),
        );

        let handle = tokio::spawn(worker.run());
        tokio::time::sleep(Duration::from_millis(120)).await;
        stop.trigger();

        let report = assert_ok!(handle.await);
        assert_eq!(report.worker, 3);
        assert_eq!(report.kind, WorkerKind::User);
        assert!(report.inserted >= 1);
        assert_eq!(report.inserted, sink.count("users"));
    }

    #[tokio::test]
    async fn test_run_with_stop_already_set_does_nothing() {
        let sink = MemorySink::default();
        let stop = StopFlag::new();
        stop.trigger();

        let report =
            InsertWorker::new(0, WorkerKind::Audit, sink.clone(), RetryPolicy::fixed(Duration::ZERO), stop)
                .run()
                .await;

        assert_eq!(report.inserted, 0);
        assert_eq!(sink.count("audit_logs"), 0);
    }

    #[tokio::test]
    async fn test_run_sleeps_retry_delay_then_continues() {
        let sink = MemorySink::failing(2);
        let stop = StopFlag::new();
        let worker = InsertWorker::new(
            0,
            WorkerKind::Audit,
            sink.clone(),
            RetryPolicy::fixed(Duration::from_millis(30)),
            stop.clone(),
        );

        let started = Instant::now();
        let handle = tokio::spawn(worker.run());
        while sink.count("audit_logs") == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        stop.trigger();

        assert!(started.elapsed() >= Duration::from_millis(60));
        let report = assert_ok!(handle.await);
        assert_eq!(report.failed, 2);
        assert!(report.inserted >= 1);
    }

    #[tokio::test]
    async fn test_run_gives_up_with_bounded_policy() {
        let sink = MemorySink::failing(u32::MAX);
        let report = InsertWorker::new(
            0,
            WorkerKind::Order,
            sink,
            RetryPolicy::fixed(Duration::from_millis(1)).with_limit(3),
            StopFlag::new(),
        )
        .run()
        .await;

        assert_eq!(report.failed, 3);
        assert_eq!(report.inserted, 0);
    }
}
