//! Tunevault API server binary.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use tunevault_api::config::ApiConfig;
use tunevault_api::services::email::{EmailOutbox, Mailer};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "tunevault_server", about = "Tunevault API server")]
struct Args {
    /// Address to bind, e.g. "127.0.0.1:8080". Overrides BIND_ADDR.
    #[arg(long)]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/tunevault"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,tunevault_api=debug,tunevault_core=debug".parse().unwrap()
            }),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    config.database_url = args.database_url.clone();
    if let Some(bind_addr) = args.bind_addr {
        config.bind_addr = bind_addr;
    }

    info!(database_url = %config.database_url, addr = %config.bind_addr, "starting tunevault_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.database_url)
        .await?;

    info!("running database migrations");
    tunevault_api::migrate(&pool).await?;
    tunevault_core::seed::ensure_default_accounts(&pool).await?;

    let purged = tunevault_core::auth::queries::purge_expired_denylist(&pool).await?;
    if purged > 0 {
        info!(purged, "garbage-collected expired denylist entries");
    }

    let mailer = Mailer::from_config(&config)?;
    let outbox = EmailOutbox::spawn(mailer);

    let state = tunevault_api::AppState {
        pool,
        config: config.clone(),
        outbox,
    };

    let app = tunevault_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
