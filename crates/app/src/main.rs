use std::time::Duration;

use clap::Parser;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, DatabaseConnection};

mod settings;

#[derive(Parser, Debug)]
#[command(name = "centavo")]
#[command(about = "Personal finance tracker server")]
struct Cli {
    /// Settings file to read (TOML; the extension may be omitted).
    #[arg(long, env = "APP_CONFIG", default_value = "settings")]
    config: String,

    /// Overrides the configured database connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut settings = settings::Settings::new(&cli.config)?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "centavo={level},server={level},ledger={level}",
            level = settings.app.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let database = connect_database(&settings.database).await?;

    let ledger = ledger::Ledger::builder()
        .database(database.clone())
        .session_ttl(chrono::TimeDelta::minutes(
            settings.auth.session_ttl_minutes,
        ))
        .build()
        .await?;

    let mailer = server::Mailer::new(
        &settings.smtp.host,
        settings.smtp.port,
        settings.smtp.username.clone(),
        settings.smtp.password.clone(),
        &settings.smtp.from,
    )?;

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let mut tasks = tokio::task::JoinSet::new();

    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(ledger, mailer, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    if settings.database.keepalive_secs > 0 {
        let interval = Duration::from_secs(settings.database.keepalive_secs);
        tasks.spawn(async move {
            keepalive(database, interval).await;
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .test_before_acquire(true)
        .sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

/// Pings the database on a fixed interval so an idle pool does not sit on
/// a dead connection.
async fn keepalive(database: DatabaseConnection, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = database.ping().await {
            tracing::warn!("database keepalive ping failed: {err}");
        }
    }
}
