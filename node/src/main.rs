// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! `upload-node`: reads JSON-line requests on stdin, writes one JSON
//! response per line on stdout.
//!
//! ```text
//! {"op":"submit","authenticated":"p1","record_time":100,"submission":{...}}
//! {"op":"set_log_level","directive":"upload_kernel=debug"}
//! {"op":"metrics"}
//! ```
//!
//! Ledger state lives in memory only, so with `UPLOAD_LOG_PATH` set the node
//! refuses to reopen a log that already holds accepted entries.
use std::io::{BufRead, Write};
use std::sync::Arc;

use serde::Deserialize;
use upload_kernel::state::MemoryLedgerState;
use upload_kernel::types::{ParticipantId, RecordTime, Submission};
use upload_node::config::NodeConfig;
use upload_node::engine::MemoryEngine;
use upload_node::telemetry::{get_metrics, init_telemetry, set_log_level};
use upload_node::Committer;

#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Submit {
        authenticated: ParticipantId,
        record_time: RecordTime,
        submission: Submission,
    },
    SetLogLevel {
        directive: String,
    },
    Metrics,
}

fn main() {
    let cfg = NodeConfig::from_env();
    init_telemetry(&cfg.log_filter);
    tracing::info!("Initializing upload node with config: {:?}", cfg);

    let engine = Arc::new(MemoryEngine::new());
    let mut committer = match Committer::new(MemoryLedgerState::new(), engine, &cfg) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to start committer: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!("stdin read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Err(e) => {
                tracing::warn!("Malformed request: {}", e);
                serde_json::json!({ "error": e.to_string() }).to_string()
            }
            Ok(Request::Submit {
                authenticated,
                record_time,
                submission,
            }) => match committer.submit(&authenticated, submission, record_time) {
                Ok(receipt) => match receipt.to_json() {
                    Ok(json) => json,
                    Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
                },
                // Kernel and log failures are fatal: the replica must stop.
                Err(e) => {
                    tracing::error!("Commit failed, halting: {}", e);
                    std::process::exit(1);
                }
            },
            Ok(Request::SetLogLevel { directive }) => match set_log_level(&directive) {
                Ok(()) => serde_json::json!({ "log_filter": directive }).to_string(),
                Err(e) => serde_json::json!({ "error": e.to_string() }).to_string(),
            },
            Ok(Request::Metrics) => serde_json::json!({ "metrics": get_metrics() }).to_string(),
        };

        if writeln!(stdout, "{}", response).is_err() {
            break;
        }
    }

    tracing::info!(
        "Shutting down at height {} ({:?})",
        committer.journal().committed_height(),
        committer.preloader_stats()
    );
}
