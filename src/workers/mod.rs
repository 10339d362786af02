pub mod insert;
pub mod retry;
pub mod stop;

pub use insert::{InsertWorker, RowSink, Step, WorkerReport};
pub use retry::RetryPolicy;
pub use stop::StopFlag;

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::constants::{
    AUDIT_PAUSE, DEFAULT_AUDIT_WORKERS, DEFAULT_ORDER_WORKERS, DEFAULT_USER_WORKERS, ORDER_PAUSE,
    USER_PAUSE,
};

/// Kind of synthetic row a worker produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// Heavy rows, ~50% of target volume
    Audit,
    /// Medium rows, ~40% of target volume
    Order,
    /// Light rows, ~10% of target volume
    User,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 3] = [WorkerKind::Audit, WorkerKind::Order, WorkerKind::User];

    pub fn table(self) -> &'static str {
        match self {
            WorkerKind::Audit => "audit_logs",
            WorkerKind::Order => "orders",
            WorkerKind::User => "users",
        }
    }

    /// Delay after each successful insert
    pub fn pause(self) -> Duration {
        match self {
            WorkerKind::Audit => AUDIT_PAUSE,
            WorkerKind::Order => ORDER_PAUSE,
            WorkerKind::User => USER_PAUSE,
        }
    }

    /// Intended share of total volume, in percent
    pub fn target_share(self) -> u8 {
        match self {
            WorkerKind::Audit => 50,
            WorkerKind::Order => 40,
            WorkerKind::User => 10,
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerKind::Audit => "audit",
            WorkerKind::Order => "order",
            WorkerKind::User => "user",
        };
        f.write_str(name)
    }
}

/// Number of concurrent workers per kind
///
/// Worker counts and pauses are the only thing shaping the volume split.
/// Nothing corrects drift at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerMix {
    pub audit: usize,
    pub order: usize,
    pub user: usize,
}

impl Default for WorkerMix {
    fn default() -> Self {
        Self {
            audit: DEFAULT_AUDIT_WORKERS,
            order: DEFAULT_ORDER_WORKERS,
            user: DEFAULT_USER_WORKERS,
        }
    }
}

impl WorkerMix {
    pub fn count(&self, kind: WorkerKind) -> usize {
        match kind {
            WorkerKind::Audit => self.audit,
            WorkerKind::Order => self.order,
            WorkerKind::User => self.user,
        }
    }

    pub fn total(&self) -> usize {
        self.audit
            .saturating_add(self.order)
            .saturating_add(self.user)
    }

    /// One entry per worker to start, grouped by kind
    pub fn assignments(&self) -> impl Iterator<Item = WorkerKind> + '_ {
        WorkerKind::ALL
            .into_iter()
            .flat_map(move |kind| std::iter::repeat(kind).take(self.count(kind)))
    }
}

/// Start every worker in `mix` as its own task
///
/// Workers run until `stop` is triggered. The returned handles resolve to
/// each worker's totals.
pub fn spawn_workers<S>(
    sink: S,
    mix: &WorkerMix,
    retry: RetryPolicy,
    stop: &StopFlag,
) -> Vec<JoinHandle<WorkerReport>>
where
    S: RowSink + Clone + Send + Sync + 'static,
{
    mix.assignments()
        .enumerate()
        .map(|(id, kind)| {
            let worker = InsertWorker::new(id, kind, sink.clone(), retry, stop.clone());
            tokio::spawn(worker.run())
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::MemorySink;
    use super::*;

    #[test]
    fn test_default_mix() {
        let mix = WorkerMix::default();
        assert_eq!(mix.total(), 6);

        let kinds: Vec<_> = mix.assignments().collect();
        assert_eq!(
            kinds,
            [
                WorkerKind::Audit,
                WorkerKind::Audit,
                WorkerKind::Audit,
                WorkerKind::Order,
                WorkerKind::Order,
                WorkerKind::User,
            ]
        );
    }

    #[test]
    fn test_total_saturates() {
        let mix = WorkerMix {
            audit: usize::MAX,
            order: 1,
            user: 1,
        };
        assert_eq!(mix.total(), usize::MAX);
    }

    #[test]
    fn test_pauses() {
        assert_eq!(WorkerKind::Audit.pause(), Duration::ZERO);
        assert_eq!(WorkerKind::Order.pause(), Duration::from_millis(5));
        assert_eq!(WorkerKind::User.pause(), Duration::from_millis(50));
    }

    #[test]
    fn test_target_shares_sum_to_100() {
        let total: u32 = WorkerKind::ALL.iter().map(|k| k.target_share() as u32).sum();
        assert_eq!(total, 100);
    }

    #[tokio::test]
    async fn test_spawn_workers_fills_every_table() {
        let sink = MemorySink::default();
        let stop = StopFlag::new();
        let handles = spawn_workers(
            sink.clone(),
            &WorkerMix::default(),
            RetryPolicy::fixed(Duration::from_millis(1)),
            &stop,
        );
        assert_eq!(handles.len(), 6);

        tokio::time::sleep(Duration::from_millis(150)).await;
        stop.trigger();

        let mut reports = Vec::new();
        for handle in handles {
            reports.push(handle.await.unwrap());
        }

        for kind in WorkerKind::ALL {
            let inserted: u64 = reports
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| r.inserted)
                .sum();
            assert!(inserted > 0, "{kind} inserted nothing");
            assert_eq!(inserted, sink.count(kind.table()));
        }
        // worker ids are unique
        let mut ids: Vec<_> = reports.iter().map(|r| r.worker).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
