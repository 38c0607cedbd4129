//! Prometheus metrics collection for the activity registry.
//!
//! - `activity_operations_total{operation}` - API operations handled
//! - `activity_operation_duration_seconds{operation}` - Operation latency histogram
//! - `activity_operation_errors_total{operation,error}` - Failed operations by error code
//! - `activity_requests_submitted_total` - Requests stored
//! - `activity_reviews_total{status}` - Status updates applied
//! - `activity_admin_login_failures_total` - Rejected admin logins

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Once, OnceLock};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Total requests stored by the submission endpoint.
pub static REQUESTS_SUBMITTED: OnceLock<IntCounter> = OnceLock::new();

/// Total rejected admin logins.
pub static LOGIN_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Status updates applied, by new status.
pub static REVIEWS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Per-operation metrics
// ========================================================================

/// Operations handled, by operation name.
pub static OPERATION_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Operation latency by operation name.
pub static OPERATION_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Operation errors by operation name and error code.
pub static OPERATION_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

static INIT: Once = Once::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers anything.
pub fn init() {
    INIT.call_once(register_all);
}

fn register_all() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(REQUESTS_SUBMITTED, IntCounter::new("activity_requests_submitted_total", "Activity requests stored"));
    register!(LOGIN_FAILURES, IntCounter::new("activity_admin_login_failures_total", "Rejected admin logins"));
    register!(REVIEWS, IntCounterVec::new(Opts::new("activity_reviews_total", "Status updates applied by new status"), &["status"]));
    register!(OPERATION_COUNTER, IntCounterVec::new(Opts::new("activity_operations_total", "API operations handled"), &["operation"]));
    register!(OPERATION_LATENCY, HistogramVec::new(
        HistogramOpts::new("activity_operation_duration_seconds", "API operation latency")
            .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        &["operation"]));
    register!(OPERATION_ERRORS, IntCounterVec::new(Opts::new("activity_operation_errors_total", "API operation errors"), &["operation", "error"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Record an operation with latency.
#[inline]
pub fn record_operation(operation: &str, duration_secs: f64) {
    if let Some(c) = OPERATION_COUNTER.get() {
        c.with_label_values(&[operation]).inc();
    }
    if let Some(h) = OPERATION_LATENCY.get() {
        h.with_label_values(&[operation]).observe(duration_secs);
    }
}

/// Record an operation error.
#[inline]
pub fn record_operation_error(operation: &str, error: &str) {
    if let Some(c) = OPERATION_ERRORS.get() {
        c.with_label_values(&[operation, error]).inc();
    }
}

#[inline]
pub fn record_submission() {
    if let Some(c) = REQUESTS_SUBMITTED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_review(status: &str) {
    if let Some(c) = REVIEWS.get() {
        c.with_label_values(&[status]).inc();
    }
}

#[inline]
pub fn record_login_failure() {
    if let Some(c) = LOGIN_FAILURES.get() {
        c.inc();
    }
}
