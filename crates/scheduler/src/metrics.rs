use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    core::Collector, histogram_opts, opts, Histogram, IntCounter, IntCounterVec, IntGauge,
    Registry,
};
use tracing::error;

lazy_static! {
    static ref REQUESTS_RECEIVED: IntCounter = IntCounter::new(
        "zerowaste_requests_received_total",
        "Request frames enqueued by the listener",
    )
    .unwrap();
    static ref REQUESTS_COMPLETED: IntCounter = IntCounter::new(
        "zerowaste_requests_completed_total",
        "Requests answered on their reply handle",
    )
    .unwrap();
    static ref REQUESTS_FAILED: IntCounterVec = IntCounterVec::new(
        opts!(
            "zerowaste_requests_failed_total",
            "Requests dropped at the per-request boundary grouped by reason"
        ),
        &["reason"]
    )
    .unwrap();
    static ref QUEUE_DEPTH: IntGauge =
        IntGauge::new("zerowaste_queue_depth", "Jobs waiting for a worker").unwrap();
    static ref REQUEST_DURATION: Histogram = Histogram::with_opts(histogram_opts!(
        "zerowaste_request_duration_seconds",
        "Time from dequeue to reply",
        vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    ))
    .unwrap();
}

fn register<C>(registry: &Registry, collector: C)
where
    C: Collector + Clone + Send + Sync + 'static,
{
    if let Err(err) = registry.register(Box::new(collector.clone())) {
        if !matches!(err, prometheus::Error::AlreadyReg) {
            error!(?err, "failed to register scheduler metric");
        }
    }
}

pub fn register_metrics(registry: &Registry) {
    register(registry, REQUESTS_RECEIVED.clone());
    register(registry, REQUESTS_COMPLETED.clone());
    register(registry, REQUESTS_FAILED.clone());
    register(registry, QUEUE_DEPTH.clone());
    register(registry, REQUEST_DURATION.clone());
}

pub fn record_received() {
    REQUESTS_RECEIVED.inc();
}

pub fn record_completed(elapsed: Duration) {
    REQUESTS_COMPLETED.inc();
    REQUEST_DURATION.observe(elapsed.as_secs_f64());
}

pub fn record_failed(reason: &str) {
    REQUESTS_FAILED.with_label_values(&[reason]).inc();
}

pub fn set_queue_depth(depth: usize) {
    QUEUE_DEPTH.set(depth as i64);
}
