// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::DEFAULT_LOG_FILTER;
use crate::errors::{NodeError, NodeResult};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry(filter: &str) {
    // 1. Initialize Tracing (Logs) behind a reloadable filter
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?} ({}), using {}", filter, e, DEFAULT_LOG_FILTER);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });
    let (filter_layer, handle) = reload::Layer::new(env_filter);

    if tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
    {
        let _ = FILTER_HANDLE.set(handle);
    } else {
        tracing::warn!("Tracing subscriber already installed. Telemetry re-initialized?");
    }

    // 2. Initialize Metrics (Prometheus)
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROM_HANDLE.set(handle).is_err() {
                tracing::warn!("Prometheus handle already set. Telemetry re-initialized?");
            }
        }
        Err(e) => tracing::warn!("Prometheus recorder not installed: {}", e),
    }

    metrics::describe_counter!("upload_submissions_total", "Submissions committed, by outcome");
    metrics::describe_counter!("upload_archives_written_total", "Archives written to ledger state");
    metrics::describe_counter!("upload_preload_total", "Background preload attempts, by result");

    metrics::gauge!("upload_node_up", 1.0);
}

/// Swap the active log filter at runtime.
///
/// An invalid directive is logged and the current filter stays in place.
pub fn set_log_level(directive: &str) -> NodeResult<()> {
    let filter = match EnvFilter::try_new(directive) {
        Ok(filter) => filter,
        Err(e) => {
            tracing::warn!(
                "Invalid log filter {:?}, keeping {}",
                directive,
                current_log_filter().unwrap_or_else(|| "<uninitialized>".to_string())
            );
            return Err(NodeError::Config(format!("invalid log filter {:?}: {}", directive, e)));
        }
    };

    let handle = FILTER_HANDLE
        .get()
        .ok_or_else(|| NodeError::Config("telemetry not initialized".to_string()))?;
    handle
        .reload(filter)
        .map_err(|e| NodeError::Config(e.to_string()))?;

    tracing::info!("Log filter set to {}", directive);
    Ok(())
}

/// Currently active filter, if telemetry owns the global subscriber.
pub fn current_log_filter() -> Option<String> {
    FILTER_HANDLE.get()?.with_current(|f| f.to_string()).ok()
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}
