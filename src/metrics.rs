//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Gauge, HistogramOpts, IntCounterVec, IntGaugeVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Publish Metrics
    pub static ref PUBLISH_CYCLES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rustpresence_publish_cycles_total", "Total number of presence publish cycles"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref PUBLISH_DURATION_SECONDS: prometheus::Histogram = prometheus::Histogram::with_opts(
        HistogramOpts::new(
            "rustpresence_publish_duration_seconds",
            "Presence publish cycle duration in seconds"
        ).buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0])
    ).expect("metric can be created");

    // Platform Metrics
    pub static ref PLATFORM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rustpresence_platform_requests_total", "Total number of platform API requests"),
        &["operation", "status"]
    ).expect("metric can be created");
    pub static ref EXTERNAL_RESOLUTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rustpresence_external_resolutions_total", "Total number of external asset resolution calls"),
        &["status"]
    ).expect("metric can be created");

    // Cache Metrics
    pub static ref CACHE_HITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rustpresence_cache_hits_total", "Total number of cache hits"),
        &["cache_name"]
    ).expect("metric can be created");
    pub static ref CACHE_MISSES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rustpresence_cache_misses_total", "Total number of cache misses"),
        &["cache_name"]
    ).expect("metric can be created");
    pub static ref CACHE_SIZE: IntGaugeVec = IntGaugeVec::new(
        Opts::new("rustpresence_cache_size", "Current number of items in cache"),
        &["cache_name"]
    ).expect("metric can be created");

    // Application Metrics
    pub static ref APP_UPTIME_SECONDS: Gauge = Gauge::new(
        "rustpresence_app_uptime_seconds",
        "Application uptime in seconds"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("rustpresence_errors_total", "Total number of errors"),
        &["error_type", "operation"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(PUBLISH_CYCLES_TOTAL.clone()))
        .expect("PUBLISH_CYCLES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(PUBLISH_DURATION_SECONDS.clone()))
        .expect("PUBLISH_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(PLATFORM_REQUESTS_TOTAL.clone()))
        .expect("PLATFORM_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(EXTERNAL_RESOLUTIONS_TOTAL.clone()))
        .expect("EXTERNAL_RESOLUTIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_HITS_TOTAL.clone()))
        .expect("CACHE_HITS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_MISSES_TOTAL.clone()))
        .expect("CACHE_MISSES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(CACHE_SIZE.clone()))
        .expect("CACHE_SIZE can be registered");
    REGISTRY
        .register(Box::new(APP_UPTIME_SECONDS.clone()))
        .expect("APP_UPTIME_SECONDS can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
