use finance_tracker::{
    build_router,
    config::Config,
    state::AppState,
    store::{MemoryStore, PgStore, Stores},
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ─── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("finance_tracker=debug,tower_http=info")),
        )
        .init();

    // ─── Config ───────────────────────────────────────────────────────────────
    let config = Config::from_env()?;
    let addr = config.server_addr();

    // ─── Storage ──────────────────────────────────────────────────────────────
    let stores = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(url)
                .await?;

            sqlx::migrate!("./migrations").run(&db).await?;
            info!("Database connected and migrations applied ✓");
            Stores::from_backend(Arc::new(PgStore::new(db)))
        }
        None => {
            warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
            Stores::from_backend(Arc::new(MemoryStore::new()))
        }
    };

    // ─── App State & Router ───────────────────────────────────────────────────
    let idle_limit = config.live_summary_idle();
    let state = AppState::new(stores, config);
    match idle_limit {
        Some(limit) => {
            state.live.spawn_idle_sweeper(limit);
            info!("Live summaries are released after {}s unread", limit.as_secs());
        }
        None => warn!("LIVE_SUMMARY_IDLE_SECS is 0; live summaries stay mounted until deleted"),
    }
    let app = build_router(state);

    // ─── Start Server ─────────────────────────────────────────────────────────
    info!("🚀 Finance Tracker API listening on http://{}", addr);
    info!("📖 Swagger UI:  http://{}/docs", addr);
    info!("❤️  Health:      http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
