pub mod audit_log;
pub mod order;
pub mod user;

pub use audit_log::AuditLogRow;
pub use order::OrderRow;
pub use user::UserRow;

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::constants::{ORDER_USER_ID_BOUND, USERNAME_SUFFIX_BOUND};
use crate::workers::WorkerKind;

/// One synthetic row ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Audit(AuditLogRow),
    Order(OrderRow),
    User(UserRow),
}

impl Row {
    pub fn kind(&self) -> WorkerKind {
        match self {
            Row::Audit(_) => WorkerKind::Audit,
            Row::Order(_) => WorkerKind::Order,
            Row::User(_) => WorkerKind::User,
        }
    }
}

/// Fixed-content blob for a worker kind, computed once per worker
#[derive(Debug, Clone)]
pub enum Payload {
    Audit(Arc<str>),
    Order(Arc<Value>),
    User(Arc<str>),
}

impl Payload {
    pub fn for_kind(kind: WorkerKind) -> Self {
        match kind {
            WorkerKind::Audit => Payload::Audit(AuditLogRow::metadata()),
            WorkerKind::Order => Payload::Order(OrderRow::raw_data()),
            WorkerKind::User => Payload::User(UserRow::bio()),
        }
    }

    /// Build the next row, drawing the per-row random fields from `rng`
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Row {
        match self {
            Payload::Audit(metadata) => Row::Audit(AuditLogRow::new(metadata)),
            Payload::Order(raw_data) => Row::Order(OrderRow::from_draw(
                raw_data,
                rng.random_range(0..ORDER_USER_ID_BOUND),
                rng.random::<f64>(),
            )),
            Payload::User(bio) => Row::User(UserRow::from_draw(
                bio,
                rng.random_range(0..USERNAME_SUFFIX_BOUND),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_draw_matches_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in WorkerKind::ALL {
            let row = Payload::for_kind(kind).draw(&mut rng);
            assert_eq!(row.kind(), kind);
        }
    }

    #[test]
    fn test_draw_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let orders = Payload::for_kind(WorkerKind::Order);
        let users = Payload::for_kind(WorkerKind::User);

        for _ in 0..1000 {
            match orders.draw(&mut rng) {
                Row::Order(row) => {
                    assert!((0..10_000).contains(&row.user_id));
                    assert!((0.0..500.0).contains(&row.price));
                }
                other => panic!("unexpected row {other:?}"),
            }
            match users.draw(&mut rng) {
                Row::User(row) => {
                    let suffix: u32 = row.username["user_".len()..].parse().unwrap();
                    assert!(suffix < 1_000_000);
                }
                other => panic!("unexpected row {other:?}"),
            }
        }
    }

    #[test]
    fn test_same_seed_same_rows() {
        let payload = Payload::for_kind(WorkerKind::Order);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);

        for _ in 0..10 {
            assert_eq!(payload.draw(&mut a), payload.draw(&mut b));
        }
    }
}
