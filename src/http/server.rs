//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one route per protected endpoint
//! - Wire up middleware (tracing, timeout, request ID)
//! - Mount the admin API
//! - Bind server to listener and shut down gracefully

use axum::{response::Response, routing::get, Router};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::config::GatewayConfig;
use crate::http::response;
use crate::observability::metrics;
use crate::resilience::{BreakerRegistry, Clock, MonotonicClock};
use crate::upstream::{Endpoint, UpstreamClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<BreakerRegistry>,
    pub endpoints: Arc<Vec<Arc<Endpoint>>>,
    pub client: UpstreamClient,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        Self::with_clock(config, Arc::new(MonotonicClock))
    }

    /// Create a server whose breakers read time from `clock`.
    pub fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self, UpstreamError> {
        let mut registry = BreakerRegistry::new(clock);
        let endpoints = Arc::new(Endpoint::register_all(&config, &mut registry));
        let registry = Arc::new(registry);
        let client = UpstreamClient::new(Duration::from_secs(config.timeouts.upstream_secs))?;

        let state = AppState {
            registry,
            endpoints,
            client,
        };

        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        for endpoint in state.endpoints.iter() {
            let path = endpoint.path().to_string();
            let endpoint = endpoint.clone();
            let client = state.client.clone();
            router = router.route(
                &path,
                get(move || endpoint_handler(endpoint.clone(), client.clone())),
            );
        }

        if config.admin.enabled {
            router = router.merge(setup_admin_router(state));
        }

        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.state.endpoints.len(),
            "HTTP server starting"
        );
        for endpoint in self.state.endpoints.iter() {
            tracing::info!(endpoint = %endpoint.name(), path = %endpoint.path(), "Route registered");
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn registry(&self) -> &Arc<BreakerRegistry> {
        &self.state.registry
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Calls one endpoint through its breaker.
async fn endpoint_handler(endpoint: Arc<Endpoint>, client: UpstreamClient) -> Response {
    let start_time = Instant::now();

    let response = match endpoint.call(&client).await {
        Ok(payload) => response::success(payload),
        Err(e) => response::failure(endpoint.name(), &e),
    };

    metrics::record_request(endpoint.name(), response.status().as_u16(), start_time);
    response
}
