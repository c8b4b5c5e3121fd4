/// Gallery Service - HTTP Server
///
/// Serves image uploads, image retrieval, post listing/export and the page
/// view counter.
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use gallery_service::db::{self, PgPostStore};
use gallery_service::middleware::ServerErrors;
use gallery_service::{handlers, AppState, Config, PostStore, ViewCounter};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long shutdown waits for queued view bumps to be written
const VIEW_COUNTER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        env = %config.app.app_env,
        database = ?config.database,
        upload_limits = ?config.upload,
        "Configuration loaded"
    );

    let pool = db::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    db::MIGRATOR
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store: Arc<dyn PostStore> = Arc::new(PgPostStore::new(pool.clone()));
    let (view_counter, view_worker) =
        ViewCounter::spawn(store.clone(), config.view_counter.queue_capacity);

    let bind_address = config.app.bind_address();
    let state = AppState::new(store, view_counter, config);

    tracing::info!("Gallery service starting HTTP server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(ServerErrors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    // The server (and every AppState clone with it) is gone, so the
    // counter channel is closed and the worker flushes what is left.
    match tokio::time::timeout(VIEW_COUNTER_DRAIN_TIMEOUT, view_worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("View counter worker failed: {}", e),
        Err(_) => tracing::warn!("Timed out waiting for view counter worker to drain"),
    }

    pool.close().await;
    tracing::info!("Gallery service shutting down");

    Ok(())
}
