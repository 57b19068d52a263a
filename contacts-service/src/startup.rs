use crate::config::{ContactsConfig, DatastoreBackend};
use crate::handlers;
use crate::repository::{ContactStore, ContactsRepository, InMemoryContactStore, MongoContactStore};
use crate::services::HealthProbes;
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{metrics_middleware, request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub const CONTACTS_PATH: &str = "/reference/contacts";
pub const CONTACT_PATH: &str = "/reference/contacts/:contact_id";

#[derive(Clone)]
pub struct AppState {
    pub config: ContactsConfig,
    pub repository: ContactsRepository,
    pub probes: HealthProbes,
}

impl AppState {
    pub fn new(config: ContactsConfig, store: Arc<dyn ContactStore>) -> Self {
        let repository = ContactsRepository::new(store);
        let probes = HealthProbes::new(repository.clone());
        Self {
            config,
            repository,
            probes,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.common.request_timeout();

    Router::new()
        .route(
            CONTACTS_PATH,
            get(handlers::list_contacts).post(handlers::create_contact),
        )
        .route(
            CONTACT_PATH,
            get(handlers::get_contact)
                .patch(handlers::update_contact)
                .put(handlers::replace_contact)
                .delete(handlers::delete_contact),
        )
        .route("/healthz/liveness", get(handlers::liveness))
        .route("/healthz/readiness", get(handlers::readiness))
        .route("/healthz/ping", get(handlers::ping))
        .route("/metrics", get(handlers::metrics_endpoint))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Pick the datastore named by the configuration.
pub async fn connect_store(config: &ContactsConfig) -> Result<Arc<dyn ContactStore>, AppError> {
    match config.datastore {
        DatastoreBackend::Mongodb => {
            let store = MongoContactStore::connect(&config.mongodb).await?;
            Ok(Arc::new(store))
        }
        DatastoreBackend::Memory => {
            tracing::warn!("Using in-memory contact store; data will not survive a restart");
            Ok(Arc::new(InMemoryContactStore::new("memory://contacts")))
        }
    }
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    state: AppState,
}

impl Application {
    pub async fn build(config: ContactsConfig) -> Result<Self, AppError> {
        let store = connect_store(&config).await?;
        Self::build_with_store(config, store).await
    }

    /// Build around an existing store, e.g. a substitute datastore in tests.
    pub async fn build_with_store(
        config: ContactsConfig,
        store: Arc<dyn ContactStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), store);
        let router = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl-C or SIGTERM, then release the datastore client.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let store = self.state.repository.store().clone();
        let result = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        store.shutdown().await;
        result
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
