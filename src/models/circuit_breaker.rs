use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Trips after a run of consecutive provider failures and rejects calls
/// until the recovery timeout elapses, then allows a single probe.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    name: String,
    state: Arc<RwLock<CircuitState>>,
    failure_count: Arc<AtomicU32>,
    failure_threshold: u32,
    recovery_timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum CircuitState {
    Closed,
    Open { opened_at: Instant },
    HalfOpen,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(CircuitState::Closed)),
            failure_count: Arc::new(AtomicU32::new(0)),
            failure_threshold,
            recovery_timeout,
        }
    }

    pub async fn call<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        {
            let state = self.state.read();
            if let CircuitState::Open { opened_at } = *state {
                if opened_at.elapsed() < self.recovery_timeout {
                    debug!("Circuit breaker '{}' is open, rejecting call", self.name);
                    return Err(Error::CircuitBreakerOpen);
                }
                drop(state);
                *self.state.write() = CircuitState::HalfOpen;
                info!("Circuit breaker '{}' transitioning to half-open", self.name);
            }
        }

        match operation().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(error) => {
                self.on_failure();
                Err(error)
            }
        }
    }

    fn on_success(&self) {
        self.failure_count.store(0, Ordering::SeqCst);

        let mut state = self.state.write();
        if !matches!(*state, CircuitState::Closed) {
            info!("Circuit breaker '{}' recovered, closing", self.name);
            *state = CircuitState::Closed;
        }
    }

    fn on_failure(&self) {
        let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;

        if failures >= self.failure_threshold {
            let mut state = self.state.write();
            if !matches!(*state, CircuitState::Open { .. }) {
                warn!(
                    "Circuit breaker '{}' opened after {} consecutive failures",
                    self.name, failures
                );
            }
            *state = CircuitState::Open {
                opened_at: Instant::now(),
            };
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(*self.state.read(), CircuitState::Open { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(*self.state.read(), CircuitState::Closed)
    }
}
