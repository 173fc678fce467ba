use clap::builder::{BoolishValueParser, NonEmptyStringValueParser};
use clap::{ArgAction, Args};
use rulebook_db::DEFAULT_MAX_CONNECTIONS;

/// Sync tool configuration, read from flags or environment variables.
///
/// | Flag                | Env Var              | Default  |
/// |---------------------|----------------------|----------|
/// | `--database-url`    | `DATABASE_URL`       | required |
/// | `--max-connections` | `DB_MAX_CONNECTIONS` | `20`     |
/// | `--run-migrations`  | `RUN_MIGRATIONS`     | `true`   |
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Postgres connection string.
    #[arg(long, env = "DATABASE_URL", value_parser = NonEmptyStringValueParser::new())]
    pub database_url: String,

    /// Pool size.
    #[arg(
        long,
        env = "DB_MAX_CONNECTIONS",
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_connections: u32,

    /// Apply embedded migrations before running.
    #[arg(
        long,
        env = "RUN_MIGRATIONS",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub run_migrations: bool,
}
