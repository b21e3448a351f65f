//! Controller runtime configuration
//!
//! Every setting can come from a flag or an environment variable, so the same
//! binary works under `cargo run` and inside a Deployment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::telemetry::LogFormat;
use crate::Error;

/// Default delay before a failed reconciliation is retried
pub const DEFAULT_ERROR_REQUEUE_SECS: u64 = 30;

/// Settings for the `controller` command
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Only watch MySql resources and dependents in this namespace (default: all namespaces)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Path to a kubeconfig file (default: in-cluster config, then KUBECONFIG)
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Seconds to wait before retrying a failed reconciliation
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = DEFAULT_ERROR_REQUEUE_SECS)]
    pub error_requeue_secs: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            kubeconfig: None,
            error_requeue_secs: DEFAULT_ERROR_REQUEUE_SECS,
            log_format: LogFormat::Text,
        }
    }
}

impl ControllerConfig {
    /// Retry delay after a failed reconciliation
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }

    /// Reject settings the controller cannot run with
    pub fn validate(&self) -> Result<(), Error> {
        if self.error_requeue_secs == 0 {
            return Err(Error::config("error requeue interval must be at least 1 second"));
        }
        if let Some(ns) = &self.namespace {
            if ns.trim().is_empty() {
                return Err(Error::config("watch namespace must not be empty"));
            }
        }
        Ok(())
    }
}
