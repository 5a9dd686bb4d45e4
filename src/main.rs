//! Matchday Back binary entrypoint wiring REST, SSE, the lifecycle ticker and storage.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matchday_back::{
    build_router,
    config::AppConfig,
    dao::event_store::MemoryEventStore,
    services::{lifecycle_service, notification_service::NotificationDispatcher, sse_service},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let tick_interval = config.ticker_period();
    let notifier = build_notifier(&config);
    let app_state = AppState::new(config, notifier);

    sse_service::spawn_status_forwarder(app_state.clone());
    start_storage(app_state.clone()).await;

    if let Some(period) = tick_interval {
        tokio::spawn(lifecycle_service::run_ticker(app_state.clone(), period));
    }

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Push delivery is enabled only when the gateway credentials are present.
#[cfg(feature = "http-push")]
fn build_notifier(config: &AppConfig) -> NotificationDispatcher {
    use matchday_back::services::push::http::{HttpPushGateway, PushGatewayConfig};

    let gateway = PushGatewayConfig::from_env().and_then(HttpPushGateway::new);
    match gateway {
        Ok(gateway) => {
            info!("push gateway configured");
            NotificationDispatcher::new(Arc::new(gateway), config.push_timeout)
        }
        Err(err) => {
            info!(reason = %err, "push gateway not configured; notifications disabled");
            NotificationDispatcher::disabled()
        }
    }
}

#[cfg(not(feature = "http-push"))]
fn build_notifier(_config: &AppConfig) -> NotificationDispatcher {
    info!("built without http-push; notifications disabled");
    NotificationDispatcher::disabled()
}

/// Install the event store: MongoDB under supervision when `MONGO_URI` is set,
/// the in-memory store otherwise.
async fn start_storage(state: SharedState) {
    match env::var("MONGO_URI") {
        Ok(uri) => spawn_mongo_supervisor(state, uri),
        Err(_) => {
            warn!("MONGO_URI not set; using the in-memory event store");
            state.set_event_store(Arc::new(MemoryEventStore::new())).await;
        }
    }
}

#[cfg(feature = "mongo-store")]
fn spawn_mongo_supervisor(state: SharedState, uri: String) {
    use matchday_back::{
        dao::{
            event_store::{
                EventStore,
                mongodb::{MongoConfig, MongoEventStore},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    let db_name = env::var("MONGO_DB").ok();
    tokio::spawn(storage_supervisor::run(state, move || {
        let uri = uri.clone();
        let db_name = db_name.clone();
        async move {
            let config = MongoConfig::from_uri(&uri, db_name.as_deref()).await?;
            let store = MongoEventStore::connect(config).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn EventStore>)
        }
    }));
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_mongo_supervisor(state: SharedState, _uri: String) {
    warn!("MONGO_URI set but built without mongo-store; staying in degraded mode");
    drop(state);
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
