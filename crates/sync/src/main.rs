use anyhow::Context;
use clap::Parser;
use rulebook_db::PgValidationSource;
use rulebook_sync::{execute, Cli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rulebook_sync=info,rulebook_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let Cli { config, command } = Cli::parse();

    let pool = rulebook_db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    rulebook_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    if config.run_migrations {
        rulebook_db::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    let store = PgValidationSource::new(pool);
    let mut stdout = std::io::stdout().lock();
    execute(&command, &store, &mut stdout).await?;
    Ok(())
}
