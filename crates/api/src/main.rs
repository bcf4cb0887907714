//! CRM GraphQL API server.
//!
//! Run `crm-cli migrate` before pointing this at a fresh database; the server
//! never migrates on startup.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crm_api::config::{ApiConfig, LogFormat, StoreConfig};
use crm_api::db::{self, MemoryStore, PgStore, RepositoryError, Store};
use crm_api::error::AppError;
use crm_api::routes;
use crm_api::state::AppState;

/// Initialize Sentry error tracking.
///
/// Returns a guard that must be kept alive for the duration of the program.
fn init_sentry(config: &ApiConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Route tracing events to Sentry by level.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        tracing::Level::TRACE => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crm_api=info,tower_http=debug".into());

    let json = format == LogFormat::Json;
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

async fn open_store(config: &StoreConfig) -> Result<Arc<dyn Store>, AppError> {
    match config {
        StoreConfig::Postgres(url) => {
            let pool = db::create_pool(url).await.map_err(RepositoryError::from)?;
            tracing::info!("Database pool created");
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = ApiConfig::from_env()?;

    // Sentry before tracing so the tracing layer has a client
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let store = open_store(&config.store).await?;
    let addr = config.socket_addr();
    if config.graphiql {
        tracing::info!("GraphiQL available at http://{}/graphiql", addr);
    }

    let app = routes::app(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("crm-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
