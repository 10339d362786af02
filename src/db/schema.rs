use sqlx::PgPool;

use crate::error::{Result, SeederError};

/// Idempotent DDL for the three seeded tables, in creation order
pub const TABLES: [(&str, &str); 3] = [
    (
        "users",
        "CREATE TABLE IF NOT EXISTS users (id SERIAL PRIMARY KEY, username TEXT, bio TEXT, created_at TIMESTAMP DEFAULT NOW())",
    ),
    (
        "orders",
        "CREATE TABLE IF NOT EXISTS orders (id SERIAL PRIMARY KEY, user_id INT, price DECIMAL, raw_data JSONB)",
    ),
    (
        "audit_logs",
        "CREATE TABLE IF NOT EXISTS audit_logs (id SERIAL PRIMARY KEY, action TEXT, metadata TEXT, timestamp TIMESTAMP DEFAULT NOW())",
    ),
];

/// Create the seeded tables if they don't exist
///
/// Statements run one at a time and the first failure aborts the rest.
/// Safe to run against a database that already holds compatible tables.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for (table, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|source| SeederError::Schema { table, source })?;
        tracing::debug!(table, "Table ready");
    }

    tracing::info!("Database schema initialized");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_idempotent_ddl() {
        for (table, ddl) in TABLES {
            assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS "));
            assert!(ddl.contains(&format!("EXISTS {table} (")));
            assert!(ddl.contains("id SERIAL PRIMARY KEY"));
        }
    }

    #[test]
    fn test_table_order() {
        let names: Vec<_> = TABLES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["users", "orders", "audit_logs"]);
    }
}
