//! Metrics for facade lifecycle operations
//!
//! Counters and histograms are emitted through the `metrics` facade; the
//! host binary decides which recorder (if any) is installed.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all acts-as metrics
pub const METRICS_PREFIX: &str = "acts_as";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_saves_total", METRICS_PREFIX),
        Unit::Count,
        "Facade saves committed together with their supermodel"
    );

    describe_counter!(
        format!("{}_destroys_total", METRICS_PREFIX),
        Unit::Count,
        "Facades destroyed together with their supermodel"
    );

    describe_counter!(
        format!("{}_rollbacks_total", METRICS_PREFIX),
        Unit::Count,
        "Facade transactions rolled back"
    );

    describe_counter!(
        format!("{}_validation_failures_total", METRICS_PREFIX),
        Unit::Count,
        "Saves rejected by facade or supermodel validation"
    );

    describe_histogram!(
        format!("{}_transaction_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Duration of facade save/destroy transactions"
    );
}

pub fn record_save(model: &'static str) {
    counter!(format!("{}_saves_total", METRICS_PREFIX), "model" => model).increment(1);
}

pub fn record_destroy(model: &'static str) {
    counter!(format!("{}_destroys_total", METRICS_PREFIX), "model" => model).increment(1);
}

pub fn record_rollback(model: &'static str) {
    counter!(format!("{}_rollbacks_total", METRICS_PREFIX), "model" => model).increment(1);
}

pub fn record_validation_failure(model: &'static str) {
    counter!(
        format!("{}_validation_failures_total", METRICS_PREFIX),
        "model" => model
    )
    .increment(1);
}

/// Measures one transaction; records on drop
pub struct TransactionTimer {
    model: &'static str,
    operation: &'static str,
    start: Instant,
}

impl TransactionTimer {
    pub fn start(model: &'static str, operation: &'static str) -> Self {
        Self {
            model,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for TransactionTimer {
    fn drop(&mut self) {
        histogram!(
            format!("{}_transaction_duration_seconds", METRICS_PREFIX),
            "model" => self.model,
            "operation" => self.operation
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        register_metrics();
        record_save("pen");
        record_rollback("pen");
        let timer = TransactionTimer::start("pen", "save");
        drop(timer);
    }
}
