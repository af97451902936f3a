use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tme_risk_service::config::Config;
use tme_risk_service::model::TmePipeline;
use tme_risk_service::store::SqliteReportStore;
use tme_risk_service::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "tme_risk_service=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let pool = SqlitePoolOptions::new()
        .connect(&config.database_url)
        .await
        .context("failed to open reports database")?;
    let store = SqliteReportStore::new(pool);
    store
        .init_schema()
        .await
        .context("failed to initialize reports schema")?;

    // A missing or corrupt artifact is not fatal: the service starts
    // degraded and reports 503 from /health and /predict.
    let model = match TmePipeline::load(&config.model_path) {
        Ok(pipeline) => {
            info!(path = %config.model_path.display(), "model loaded");
            Some(Arc::new(pipeline))
        }
        Err(err) => {
            error!(
                path = %config.model_path.display(),
                error = %err,
                "model failed to load; serving degraded"
            );
            None
        }
    };

    let state = AppState {
        model,
        store: Arc::new(store),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
