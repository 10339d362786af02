use std::sync::Arc;

use crate::constants::{AUDIT_ACTION, AUDIT_METADATA_FRAGMENT, AUDIT_METADATA_REPEAT};

/// Heavy row for the `audit_logs` table
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogRow {
    pub action: &'static str,
    pub metadata: Arc<str>,
}

impl AuditLogRow {
    pub const INSERT_SQL: &'static str =
        "INSERT INTO audit_logs (action, metadata) VALUES ($1, $2)";

    /// Metadata text shared by every audit row (~4KB)
    pub fn metadata() -> Arc<str> {
        Arc::from(AUDIT_METADATA_FRAGMENT.repeat(AUDIT_METADATA_REPEAT))
    }

    pub fn new(metadata: &Arc<str>) -> Self {
        Self {
            action: AUDIT_ACTION,
            metadata: Arc::clone(metadata),
        }
    }
}
