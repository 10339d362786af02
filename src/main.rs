use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use volume_seeder::{Config, RunOutcome, Seeder, SeederError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't break the live progress line on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "volume_seeder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env().map_err(SeederError::Config)?;

    tracing::info!(
        target_size_bytes = config.target_size_bytes,
        pool_size = config.pool_size(),
        database = config.database_name.as_deref().unwrap_or("<current>"),
        "Starting volume seeder"
    );

    let summary = Seeder::new(config).run().await?;

    if summary.outcome == RunOutcome::Interrupted {
        println!("⏹️  Stopped before reaching the target.");
    }

    tracing::info!(summary = %serde_json::to_string(&summary)?, "Run finished");

    Ok(())
}
