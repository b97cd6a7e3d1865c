use anyhow::{Context, Result};
use roomhub::{auth, config::Config, db, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("opening database {}", config.database_url);
    let db_pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("failed to open database")?;

    tracing::info!("running migrations");
    db::run_migrations(&db_pool)
        .await
        .context("failed to run migrations")?;

    let app_state = AppState {
        db_pool,
        hasher: auth::Hasher::new(config.bcrypt_cost),
    };
    let app = roomhub::app(app_state, config.session_inactivity);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
