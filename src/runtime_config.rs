//! # Runtime Configuration Module
//!
//! Coroutine runtime settings read from the environment and applied to
//! `may::config()` when a [`Server`](crate::server::Server) starts listening.
//!
//! ## Environment Variables
//!
//! ### `SCHEMAROUTE_STACK_SIZE`
//!
//! Stack size for connection coroutines, in decimal (`32768`) or hex
//! (`0x8000`). Default: `0x8000` (32 KB). Validation runs on this stack, and
//! deeply nested JSON bodies validated against large schemas need the extra
//! headroom over the runtime's default.
//!
//! ### `SCHEMAROUTE_WORKERS`
//!
//! Number of runtime worker threads. Unset keeps the runtime's default. Only
//! takes effect if set before the first coroutine is spawned in the process.
//!
//! ```bash
//! export SCHEMAROUTE_STACK_SIZE=0x10000
//! export SCHEMAROUTE_WORKERS=4
//! ```

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Worker thread count; `None` keeps the runtime default
    pub workers: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: None,
        }
    }
}

fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything missing or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup("SCHEMAROUTE_STACK_SIZE")
            .and_then(|v| parse_size(&v))
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = lookup("SCHEMAROUTE_WORKERS")
            .and_then(|v| v.trim().parse().ok())
            .filter(|n: &usize| *n > 0);
        Self { stack_size, workers }
    }

    /// Push the settings into the `may` runtime.
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            may::config().set_workers(workers);
        }
    }
}
