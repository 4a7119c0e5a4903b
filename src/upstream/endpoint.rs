//! A protected endpoint: an upstream target bound to its breaker.

use serde_json::Value;
use std::sync::Arc;

use crate::config::{EndpointConfig, GatewayConfig, ResponseMode};
use crate::resilience::{BreakerError, BreakerRegistry, CircuitBreaker};
use crate::upstream::client::{UpstreamClient, UpstreamError};

#[derive(Debug)]
pub struct Endpoint {
    name: String,
    path: String,
    url: String,
    mode: ResponseMode,
    breaker: Arc<CircuitBreaker>,
}

impl Endpoint {
    pub fn new(config: &EndpointConfig, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            name: config.name.clone(),
            path: config.path.clone(),
            url: config.url.clone(),
            mode: config.response,
            breaker,
        }
    }

    /// Register a breaker for every configured endpoint and bind the two.
    pub fn register_all(config: &GatewayConfig, registry: &mut BreakerRegistry) -> Vec<Arc<Endpoint>> {
        config
            .endpoints
            .iter()
            .map(|endpoint| {
                let breaker = registry.register(&endpoint.name, &config.breaker_for(endpoint));
                Arc::new(Endpoint::new(endpoint, breaker))
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Call the upstream through the breaker.
    pub async fn call(&self, client: &UpstreamClient) -> Result<Value, BreakerError<UpstreamError>> {
        self.breaker
            .execute(|| client.fetch(&self.url, self.mode))
            .await
    }
}
