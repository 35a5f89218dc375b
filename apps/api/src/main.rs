mod config;
mod db;
mod errors;
mod evaluation;
mod llm_client;
mod models;
mod queue;
mod results;
mod routes;
mod state;
mod store;
mod submissions;

#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::judge::LlmAssessor;
use crate::evaluation::worker::{run_worker, Pipeline};
use crate::llm_client::LlmClient;
use crate::queue::{JobQueue, RedisJobQueue};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{HiringStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hiring API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store: Arc<dyn HiringStore> = Arc::new(PgStore::new(db));

    // Initialize Redis job queue; recover jobs a previous run left in flight
    let redis = redis::Client::open(config.redis_url.clone())?;
    let redis_queue = RedisJobQueue::new(redis, config.evaluation_queue.clone());
    redis_queue.requeue_stale().await?;
    let queue: Arc<dyn JobQueue> = Arc::new(redis_queue);
    info!("Evaluation queue '{}' ready", config.evaluation_queue);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let assessor = Arc::new(LlmAssessor::new(llm));

    // Evaluation workers
    let pipeline = Arc::new(Pipeline {
        store: store.clone(),
        judge: assessor.clone(),
        insights: assessor,
        timeout: config.evaluation_timeout,
    });
    for worker_id in 0..config.evaluation_workers {
        tokio::spawn(run_worker(
            worker_id,
            pipeline.clone(),
            queue.clone(),
            config.queue_poll,
        ));
    }
    info!(
        "Spawned {} evaluation workers (job timeout {:?})",
        config.evaluation_workers, config.evaluation_timeout
    );

    // Build router
    let app = build_router(AppState { store, queue })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
