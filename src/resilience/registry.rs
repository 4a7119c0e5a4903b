//! Named circuit breakers owned by the application.
//!
//! # Responsibilities
//! - Hold one breaker per protected endpoint
//! - Share a single clock between all breakers
//! - Expose snapshots for the admin API
//!
//! # Design Decisions
//! - Built once at startup, then shared read-only via `Arc`
//! - Explicit value passed to whoever needs it; tests build their own

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::BreakerConfig;
use crate::resilience::circuit_breaker::{BreakerSnapshot, CircuitBreaker};
use crate::resilience::clock::{Clock, MonotonicClock};

#[derive(Debug)]
pub struct BreakerRegistry {
    clock: Arc<dyn Clock>,
    breakers: HashMap<String, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            breakers: HashMap::new(),
        }
    }

    /// Register a breaker. A name that is already present keeps its
    /// existing breaker and configuration.
    pub fn register(&mut self, name: &str, config: &BreakerConfig) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(name) {
            tracing::warn!(breaker = %name, "Breaker already registered, keeping existing instance");
            return existing.clone();
        }

        tracing::debug!(
            breaker = %name,
            failure_threshold = config.failure_threshold,
            success_threshold = config.success_threshold,
            open_duration_ms = config.open_duration_ms,
            "Registering circuit breaker"
        );
        let breaker = Arc::new(CircuitBreaker::with_clock(name, config, self.clock.clone()));
        self.breakers.insert(name.to_string(), breaker.clone());
        breaker
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Snapshots of every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<_> = self.breakers.values().map(|b| b.snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }
}

impl Default for BreakerRegistry {
    fn default() -> Self {
        Self::new(Arc::new(MonotonicClock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::circuit_breaker::CircuitState;
    use crate::resilience::clock::ManualClock;
    use std::time::Duration;

    #[test]
    fn test_register_twice_returns_same_breaker() {
        let mut registry = BreakerRegistry::default();
        let first = registry.register("api", &BreakerConfig::default());
        let second = registry.register(
            "api",
            &BreakerConfig {
                failure_threshold: 9,
                ..Default::default()
            },
        );
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(second.snapshot().failure_threshold, 3);
    }

    #[tokio::test]
    async fn test_breakers_share_clock_but_not_state() {
        let clock = Arc::new(ManualClock::new());
        let mut registry = BreakerRegistry::new(clock.clone());
        let config = BreakerConfig {
            failure_threshold: 1,
            success_threshold: 1,
            open_duration_ms: 100,
        };
        let a = registry.register("a", &config);
        let b = registry.register("b", &config);

        let _ = a.execute(|| async { Err::<(), _>("down") }).await;
        assert_eq!(a.state(), CircuitState::Open);
        assert_eq!(b.state(), CircuitState::Closed);

        clock.advance(Duration::from_millis(100));
        assert!(a.execute(|| async { Ok::<_, &str>(()) }).await.is_ok());
        assert_eq!(a.state(), CircuitState::Closed);
        assert!(registry.get("missing").is_none());
    }
}
