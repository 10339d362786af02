use thiserror::Error;

/// Seeder error type
///
/// Every variant is fatal and only produced during startup or console
/// output. Steady-state insert and size-query failures never surface here.
#[derive(Error, Debug)]
pub enum SeederError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to connect: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Schema error on table {table}: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Console error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for seeder results
pub type Result<T> = std::result::Result<T, SeederError>;
