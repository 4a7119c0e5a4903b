//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, calls pass through, failures are counted
//! - Open: upstream assumed down, calls fail fast without being invoked
//! - Half-Open: testing if upstream recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: call attempted and now >= next_probe_at
//! Half-Open → Closed: success_count >= success_threshold
//! Half-Open → Open: probe call fails
//! ```
//!
//! # Design Decisions
//! - Per-endpoint circuit breaker (not global)
//! - Fail fast in Open state (no waiting for timeout)
//! - Single probe in Half-Open; concurrent callers are rejected until it settles
//! - Every transition resets both counters
//! - Reactive only: time is checked when a call is attempted, never polled
//! - Outcomes from calls admitted before the latest transition are ignored

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::BreakerConfig;
use crate::observability::metrics;
use crate::resilience::clock::{Clock, MonotonicClock};

/// Circuit state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned instead of invoking the operation while the circuit is open.
#[derive(Debug, Clone, Error)]
#[error("Circuit is OPEN. Try later.")]
pub struct CircuitOpenError {
    /// Breaker that rejected the call.
    pub breaker: String,
}

/// Outcome of [`CircuitBreaker::execute`] when it does not succeed.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The call was rejected without invoking the operation.
    #[error(transparent)]
    Open(#[from] CircuitOpenError),

    /// The operation ran and failed; its error is passed through untouched.
    #[error(transparent)]
    Upstream(E),
}

impl<E> BreakerError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open(_))
    }

    /// The upstream error, if the operation was actually invoked.
    pub fn into_upstream(self) -> Option<E> {
        match self {
            BreakerError::Upstream(e) => Some(e),
            BreakerError::Open(_) => None,
        }
    }
}

/// Point-in-time view of a breaker, for diagnostics and the admin API.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub failure_threshold: u32,
    pub success_threshold: u32,
    pub open_duration_ms: u64,
    /// Time left before a probe is allowed; only set while OPEN.
    pub retry_after_ms: Option<u64>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    next_probe_at: Option<Instant>,
    probe_in_flight: bool,
    /// Bumped on every transition.
    epoch: u64,
}

/// Guards one protected endpoint.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    success_threshold: u32,
    open_duration: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker driven by the monotonic clock.
    pub fn new(name: impl Into<String>, config: &BreakerConfig) -> Self {
        Self::with_clock(name, config, Arc::new(MonotonicClock))
    }

    /// Create a breaker with an injected clock.
    pub fn with_clock(name: impl Into<String>, config: &BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        let breaker = Self {
            name: name.into(),
            failure_threshold: config.failure_threshold.max(1),
            success_threshold: config.success_threshold.max(1),
            open_duration: config.open_duration(),
            clock,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                next_probe_at: None,
                probe_in_flight: false,
                epoch: 0,
            }),
        };
        metrics::record_breaker_state(&breaker.name, CircuitState::Closed);
        breaker
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn success_count(&self) -> u32 {
        self.lock().success_count
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = self.clock.now();
        let inner = self.lock();
        let retry_after_ms = match (inner.state, inner.next_probe_at) {
            (CircuitState::Open, Some(at)) => {
                Some(at.saturating_duration_since(now).as_millis() as u64)
            }
            _ => None,
        };
        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            open_duration_ms: self.open_duration.as_millis() as u64,
            retry_after_ms,
        }
    }

    /// Run `operation` under the breaker.
    ///
    /// The operation is invoked at most once. If the circuit rejects the
    /// attempt the operation is never called and [`BreakerError::Open`] is
    /// returned; otherwise its result is returned unchanged after the outcome
    /// has been recorded.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.acquire()?;

        match operation().await {
            Ok(value) => {
                permit.succeed();
                Ok(value)
            }
            Err(e) => {
                permit.fail();
                Err(BreakerError::Upstream(e))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        // Nothing panics while the lock is held; poisoning carries no torn state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide whether a call may proceed. Atomic with the OPEN → HALF_OPEN check.
    fn acquire(&self) -> Result<CallPermit<'_>, CircuitOpenError> {
        let now = self.clock.now();
        let mut inner = self.lock();

        if inner.state == CircuitState::Open {
            match inner.next_probe_at {
                Some(at) if now >= at => {
                    self.transition(&mut inner, CircuitState::HalfOpen, now);
                }
                _ => return Err(self.reject(&inner)),
            }
        }

        let probe = inner.state == CircuitState::HalfOpen;
        if probe {
            if inner.probe_in_flight {
                return Err(self.reject(&inner));
            }
            inner.probe_in_flight = true;
        }

        tracing::trace!(
            breaker = %self.name,
            state = %inner.state,
            failure_count = inner.failure_count,
            success_count = inner.success_count,
            "Call admitted"
        );

        Ok(CallPermit {
            breaker: self,
            epoch: inner.epoch,
            probe,
            settled: false,
        })
    }

    fn reject(&self, inner: &BreakerInner) -> CircuitOpenError {
        tracing::debug!(
            breaker = %self.name,
            state = %inner.state,
            failure_count = inner.failure_count,
            success_count = inner.success_count,
            "Call rejected, circuit is open"
        );
        metrics::record_rejection(&self.name);
        CircuitOpenError {
            breaker: self.name.clone(),
        }
    }

    fn on_success(&self, epoch: u64) {
        metrics::record_call(&self.name, "success");
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(breaker = %self.name, state = %inner.state, "Ignoring stale success");
            return;
        }

        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                tracing::info!(
                    breaker = %self.name,
                    state = %inner.state,
                    failure_count = inner.failure_count,
                    success_count = inner.success_count,
                    success_threshold = self.success_threshold,
                    "Half-open probe succeeded"
                );
                if inner.success_count >= self.success_threshold {
                    let now = self.clock.now();
                    self.transition(&mut inner, CircuitState::Closed, now);
                } else {
                    inner.probe_in_flight = false;
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self, epoch: u64) {
        metrics::record_call(&self.name, "failure");
        let mut inner = self.lock();
        if inner.epoch != epoch {
            tracing::debug!(breaker = %self.name, state = %inner.state, "Ignoring stale failure");
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.failure_threshold {
                    let now = self.clock.now();
                    self.transition(&mut inner, CircuitState::Open, now);
                } else {
                    tracing::info!(
                        breaker = %self.name,
                        state = %inner.state,
                        failure_count = inner.failure_count,
                        success_count = inner.success_count,
                        failure_threshold = self.failure_threshold,
                        "Call failed"
                    );
                }
            }
            CircuitState::HalfOpen => {
                let now = self.clock.now();
                self.transition(&mut inner, CircuitState::Open, now);
            }
            CircuitState::Open => {}
        }
    }

    /// Release a probe slot whose call never reported an outcome.
    fn release_probe(&self, epoch: u64) {
        let mut inner = self.lock();
        if inner.epoch == epoch {
            inner.probe_in_flight = false;
            tracing::debug!(breaker = %self.name, "Probe abandoned, slot released");
        }
    }

    fn transition(&self, inner: &mut BreakerInner, to: CircuitState, now: Instant) {
        let from = inner.state;
        inner.state = to;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.probe_in_flight = false;
        inner.epoch += 1;
        inner.next_probe_at = match to {
            CircuitState::Open => Some(now + self.open_duration),
            _ => None,
        };

        match to {
            CircuitState::Open => tracing::warn!(
                breaker = %self.name,
                from = %from,
                state = %to,
                failure_count = inner.failure_count,
                success_count = inner.success_count,
                open_duration_ms = self.open_duration.as_millis() as u64,
                "Circuit opened"
            ),
            _ => tracing::info!(
                breaker = %self.name,
                from = %from,
                state = %to,
                failure_count = inner.failure_count,
                success_count = inner.success_count,
                "Circuit state changed"
            ),
        }
        metrics::record_transition(&self.name, from, to);
    }
}

/// Admission ticket for one call. Dropping an unsettled probe frees the
/// half-open slot without counting an outcome.
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    epoch: u64,
    probe: bool,
    settled: bool,
}

impl CallPermit<'_> {
    fn succeed(mut self) {
        self.settled = true;
        self.breaker.on_success(self.epoch);
    }

    fn fail(mut self) {
        self.settled = true;
        self.breaker.on_failure(self.epoch);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.probe && !self.settled {
            self.breaker.release_probe(self.epoch);
        }
    }
}
