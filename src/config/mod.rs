//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → breakers and routes built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; breakers keep their settings for the process lifetime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::TimeoutConfig;
pub use schema::BreakerConfig;
pub use schema::EndpointConfig;
pub use schema::ResponseMode;
pub use schema::ObservabilityConfig;
pub use schema::AdminConfig;
