//! Circuit-breaking HTTP gateway library.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{BreakerError, BreakerRegistry, CircuitBreaker, CircuitOpenError, CircuitState};
