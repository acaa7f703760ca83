/*
 * Responsibility
 * - Config読み込み → 依存生成 (Postgres or in-memory) → Router 組み立て
 * - Middleware の適用 (認証 gate / security headers / CORS / request-id / trace)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::repos::contact_repo::{ContactStore, PgContactRepo};
use crate::repos::memory::{MemoryContactRepo, MemoryUserRepo};
use crate::repos::user_repo::{PgUserRepo, UserStore};
use crate::services::{auth::build_auth_service, contacts::ContactService, id_codec::IdCodec};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,contact_book=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing (stderr can be hidden depending on how the process is launched).
        tracing::error!(?info, "panic");

        // Development: fail fast. Production: default behavior, the server keeps running.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL is not set; using in-memory stores (data is lost on restart)");
        return build_memory_state(config);
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("failed to connect to Postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let users: Arc<dyn UserStore> = Arc::new(PgUserRepo::new(pool.clone()));
    let contacts: Arc<dyn ContactStore> = Arc::new(PgContactRepo::new(pool));
    assemble(config, users, contacts)
}

pub(crate) fn build_memory_state(config: &Config) -> Result<AppState> {
    assemble(
        config,
        Arc::new(MemoryUserRepo::new()),
        Arc::new(MemoryContactRepo::new()),
    )
}

pub(crate) fn assemble(
    config: &Config,
    users: Arc<dyn UserStore>,
    contacts: Arc<dyn ContactStore>,
) -> Result<AppState> {
    let auth = build_auth_service(config, users).context("invalid auth configuration")?;
    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)
        .context("invalid SQIDS configuration")?;

    Ok(AppState::new(
        auth,
        Arc::new(ContactService::new(contacts)),
        id_codec,
    ))
}

pub(crate) fn build_router(state: AppState, config: &Config) -> Router {
    let app = Router::new()
        .merge(api::v1::health_routes())
        .nest("/api/v1", api::v1::routes());

    // The gate wraps every route once; public paths are decided inside it.
    let app = middleware::auth::access::apply(app, state.clone()).with_state(state);

    let app = middleware::security_headers::apply(app);
    let app = middleware::cors::apply(app, config);
    middleware::http::apply(app)
}
