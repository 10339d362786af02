use std::future::Future;
use std::io::Write;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::constants::SHUTDOWN_GRACE;
use crate::db::{create_pool, init_schema, PgSizeProbe, SizeProbe};
use crate::error::{Result, SeederError};
use crate::monitor::{MonitorReport, SizeMonitor};
use crate::workers::{spawn_workers, RetryPolicy, RowSink, StopFlag, WorkerKind, WorkerReport};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    TargetReached,
    Interrupted,
}

/// Totals for a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub target_size_bytes: u64,
    /// Size on the final monitor tick; `None` when interrupted
    pub final_size_bytes: Option<u64>,
    pub workers: Vec<WorkerReport>,
}

impl RunSummary {
    /// Inserted and failed totals for one worker kind
    pub fn totals(&self, kind: WorkerKind) -> (u64, u64) {
        self.workers
            .iter()
            .filter(|r| r.kind == kind)
            .fold((0, 0), |(ins, fail), r| (ins + r.inserted, fail + r.failed))
    }
}

/// Run orchestrator: schema, workers and size monitor
pub struct Seeder {
    config: Config,
}

impl Seeder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Connect, prepare the schema and fill the database until the target size
    ///
    /// Connection and schema failures are returned before any worker starts.
    /// Ctrl-C ends the run early.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut out = std::io::stdout();

        writeln!(out, "🔍 Connecting to PostgreSQL...")?;
        let pool = create_pool(&self.config.database_url, self.config.pool_size())
            .await
            .map_err(SeederError::Connect)?;

        writeln!(out, "🏗️  Setting up database schema...")?;
        init_schema(&pool).await?;

        let probe = PgSizeProbe::new(pool.clone(), self.config.database_name.clone());
        let summary = self
            .run_with(pool.clone(), probe, shutdown_signal(), &mut out)
            .await;

        pool.close().await;
        summary
    }

    /// Start workers against `sink` and monitor `probe` until the target or `interrupt`
    pub async fn run_with<S, P, F, W>(
        &self,
        sink: S,
        probe: P,
        interrupt: F,
        out: &mut W,
    ) -> Result<RunSummary>
    where
        S: RowSink + Clone + Send + Sync + 'static,
        P: SizeProbe,
        F: Future<Output = ()>,
        W: Write,
    {
        write_banner(out, &self.config)?;

        let started_at = Utc::now();
        let started = Instant::now();
        let stop = StopFlag::new();
        let retry = RetryPolicy::fixed(self.config.retry_delay);

        tracing::info!(
            audit = self.config.workers.audit,
            order = self.config.workers.order,
            user = self.config.workers.user,
            target_size_bytes = self.config.target_size_bytes,
            "Starting workers"
        );
        let handles = spawn_workers(sink, &self.config.workers, retry, &stop);

        let mut monitor = SizeMonitor::new(
            probe,
            self.config.target_size_bytes,
            self.config.poll_interval,
        );

        let monitored: Option<Result<MonitorReport>> = tokio::select! {
            report = monitor.run(&mut *out, started) => Some(report),
            _ = interrupt => None,
        };

        if monitored.is_none() {
            writeln!(out)?;
            tracing::warn!("Interrupted, stopping workers");
        }

        stop.trigger();
        let workers = join_workers(handles).await;

        let outcome = match monitored.transpose()? {
            Some(report) => (RunOutcome::TargetReached, Some(report.final_size_bytes)),
            None => (RunOutcome::Interrupted, None),
        };

        let summary = RunSummary {
            outcome: outcome.0,
            started_at,
            finished_at: Utc::now(),
            target_size_bytes: self.config.target_size_bytes,
            final_size_bytes: outcome.1,
            workers,
        };

        for kind in WorkerKind::ALL {
            let (inserted, failed) = summary.totals(kind);
            tracing::info!(kind = %kind, table = kind.table(), inserted, failed, "Worker totals");
        }

        Ok(summary)
    }
}

fn write_banner<W: Write>(out: &mut W, config: &Config) -> std::io::Result<()> {
    writeln!(
        out,
        "🚀 Real-Time Simulation Started! Target: {:.1} GB",
        config.target_gb()
    )?;
    writeln!(
        out,
        "📊 Target Distribution: Audit({}%) | Orders({}%) | Users({}%)",
        WorkerKind::Audit.target_share(),
        WorkerKind::Order.target_share(),
        WorkerKind::User.target_share()
    )?;
    writeln!(out, "-------------------------------------------")?;
    out.flush()
}

/// Wait for workers to notice the stop flag, aborting any that miss the grace period
async fn join_workers(handles: Vec<JoinHandle<WorkerReport>>) -> Vec<WorkerReport> {
    let deadline = tokio::time::Instant::now() + SHUTDOWN_GRACE;
    let mut reports = Vec::with_capacity(handles.len());

    for mut handle in handles {
        match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => tracing::error!("Worker task failed: {}", e),
            Err(_) => {
                tracing::warn!("Worker did not stop in time, aborting");
                handle.abort();
            }
        }
    }

    reports
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
