//! Validation statistics
//!
//! Four monotonically increasing counters, safe to bump from concurrent
//! calls. They reset only when the owning validator is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters for validator outcomes
#[derive(Debug, Default)]
pub struct ValidatorStats {
    /// Invocations that went through validation
    validated: AtomicU64,
    /// Invocations whose arguments were repaired
    repaired: AtomicU64,
    /// Invocations that were blocked
    blocked: AtomicU64,
    /// Invocations that failed schema validation (repaired or not)
    errors: AtomicU64,
}

impl ValidatorStats {
    /// Create zeroed counters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validated invocation
    pub fn record_validated(&self) {
        self.validated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful repair
    pub fn record_repaired(&self) {
        self.repaired.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a blocked invocation
    pub fn record_blocked(&self) {
        self.blocked.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a schema validation failure
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current statistics
    pub fn snapshot(&self, known_tools: usize) -> StatsSnapshot {
        StatsSnapshot {
            validated: self.validated.load(Ordering::Relaxed),
            repaired: self.repaired.load(Ordering::Relaxed),
            blocked: self.blocked.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            known_tools,
        }
    }
}

/// Snapshot of validator statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Invocations validated
    pub validated: u64,
    /// Invocations repaired
    pub repaired: u64,
    /// Invocations blocked
    pub blocked: u64,
    /// Invocations with schema errors
    pub errors: u64,
    /// Tool names observed completing successfully
    pub known_tools: usize,
}

impl StatsSnapshot {
    /// Fraction of schema failures that were repaired (0.0-1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn repair_rate(&self) -> f64 {
        if self.errors == 0 {
            0.0
        } else {
            self.repaired as f64 / self.errors as f64
        }
    }
}
