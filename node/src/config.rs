// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "upload_node=info,upload_kernel=info";

/// Environment variable naming the durable log-entry file.
pub const LOG_PATH_ENV: &str = "UPLOAD_LOG_PATH";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeConfig {
    /// Append-only log-entry file. `None` keeps entries in memory only.
    pub log_path: Option<PathBuf>,
    /// `tracing` filter directive, `RUST_LOG` syntax.
    pub log_filter: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(path) = lookup(LOG_PATH_ENV).filter(|v| !v.is_empty()) {
            cfg.log_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = lookup("RUST_LOG").filter(|v| !v.is_empty()) {
            cfg.log_filter = filter;
        }
        cfg
    }
}
