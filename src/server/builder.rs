//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::EntityRegistry;
use super::middleware::{request_timeout, route_not_found};
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::payment::PaidDatePolicy;
use crate::core::store::Store;
use crate::entities::{CompanyDescriptor, IndustryDescriptor, InvoiceDescriptor};
use anyhow::{Result, anyhow};
use axum::{Json, Router, middleware, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for the BizTime HTTP application
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_paid_date_policy(PaidDatePolicy::Refresh)
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn Store>>,
    paid_date_policy: PaidDatePolicy,
    request_timeout: Duration,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            paid_date_policy: PaidDatePolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            custom_routes: Vec::new(),
        }
    }

    /// Create a builder carrying the policy and timeout from configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new()
            .with_paid_date_policy(config.paid_date_policy)
            .with_request_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    /// Set the store (required)
    pub fn with_store(self, store: impl Store + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a store that is already shared
    pub fn with_shared_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Choose what re-marking a paid invoice as paid does to `paid_date`
    pub fn with_paid_date_policy(mut self, policy: PaidDatePolicy) -> Self {
        self.paid_date_policy = policy;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Add routes outside the company/invoice/industry resources
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the router with every resource, health routes and layers
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("Store is required. Call .with_store() before building."))?;

        tracing::debug!(
            backend = store.backend(),
            paid_date_policy = ?self.paid_date_policy,
            "Building router"
        );

        let state = AppState::new(store, self.paid_date_policy);

        let mut registry = EntityRegistry::new();
        registry.register(Box::new(CompanyDescriptor::new(state.clone())));
        registry.register(Box::new(InvoiceDescriptor::new(state.clone())));
        registry.register(Box::new(IndustryDescriptor::new(state)));

        let mut app = health_routes().merge(registry.build_routes());
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .fallback(route_not_found)
            .layer(middleware::from_fn_with_state(
                self.request_timeout,
                request_timeout,
            ))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::from_config(&config)
    ///     .with_store(store)
    ///     .serve(&config.bind).await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "biztime"
    }))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
