//! Upstream call subsystem.
//!
//! # Data Flow
//! ```text
//! Route handler
//!     → endpoint.rs (endpoint's breaker decides: call or reject)
//!     → client.rs (GET upstream URL with timeout)
//!     → payload (status code or JSON body) or UpstreamError
//! ```
//!
//! # Design Decisions
//! - One shared HTTP client; connection pooling handled by reqwest
//! - Non-2xx responses are failures, same as transport errors and timeouts
//! - The breaker only sees success or failure, never the error kind

pub mod client;
pub mod endpoint;

pub use client::{UpstreamClient, UpstreamError};
pub use endpoint::Endpoint;
