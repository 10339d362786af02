use std::future::Future;

use sqlx::PgPool;

/// Source of the current on-disk database size
pub trait SizeProbe {
    fn database_size(&self) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

/// Size probe backed by `pg_database_size`
///
/// The polled database name is an operator setting and is not checked
/// against the connection string. Without one, the connection's own
/// database is measured.
#[derive(Debug, Clone)]
pub struct PgSizeProbe {
    pool: PgPool,
    database: Option<String>,
}

impl PgSizeProbe {
    pub fn new(pool: PgPool, database: Option<String>) -> Self {
        Self { pool, database }
    }
}

impl SizeProbe for PgSizeProbe {
    async fn database_size(&self) -> Result<u64, sqlx::Error> {
        let bytes: i64 = match &self.database {
            Some(name) => {
                sqlx::query_scalar("SELECT pg_database_size($1::name)")
                    .bind(name)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT pg_database_size(current_database())")
                    .fetch_one(&self.pool)
                    .await?
            }
        };

        Ok(u64::try_from(bytes).unwrap_or(0))
    }
}
