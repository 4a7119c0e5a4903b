//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to an upstream endpoint:
//!     → registry.rs (look up the endpoint's breaker)
//!     → circuit_breaker.rs (admit, reject, or probe; record outcome)
//!     → clock.rs (time source for the open-state cooldown)
//! ```
//!
//! # Design Decisions
//! - One breaker per endpoint, created at startup, never persisted
//! - The breaker never retries; each call is exactly one attempt
//! - Upstream errors are always passed through after bookkeeping

pub mod circuit_breaker;
pub mod clock;
pub mod registry;

pub use circuit_breaker::{BreakerError, BreakerSnapshot, CircuitBreaker, CircuitOpenError, CircuitState};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use registry::BreakerRegistry;
