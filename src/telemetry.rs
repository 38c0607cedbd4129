//! Telemetry utilities for operation timing and log setup.

use crate::error::ApiResult;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}

/// Guard for timing an API operation and recording metrics.
///
/// Records latency when dropped. Call [`OperationTimer::fail`] to also count
/// the error under its code.
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    /// Start timing an operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Record an error for this operation.
    pub fn fail(&self, error_code: &str) {
        crate::metrics::record_operation_error(self.operation, error_code);
    }

    /// Pass a handler result through, counting it if it is an error.
    pub fn observe<T>(&self, result: ApiResult<T>) -> ApiResult<T> {
        if let Err(ref e) = result {
            self.fail(e.error_code());
        }
        result
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_operation(self.operation, duration);
    }
}
