//! Trait definitions for `LedgerLens`.
//!
//! The only seam defined here is the wall clock. Credential expiry checks and
//! refresh bookkeeping read the time through [`Clock`] so they can be driven
//! deterministically in tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current instant as epoch seconds.
    fn now_epoch(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock, frozen at a given epoch second.
#[derive(Debug, Default)]
pub struct FixedClock {
    epoch: AtomicI64,
}

impl FixedClock {
    /// Creates a clock frozen at `epoch` seconds.
    pub fn at(epoch: i64) -> Self {
        Self {
            epoch: AtomicI64::new(epoch),
        }
    }

    /// Moves the clock to `epoch` seconds.
    pub fn set(&self, epoch: i64) {
        self.epoch.store(epoch, Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs`.
    pub fn advance(&self, secs: i64) {
        self.epoch.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.epoch.load(Ordering::SeqCst), 0)
            .single()
            .unwrap_or_default()
    }

    fn now_epoch(&self) -> i64 {
        self.epoch.load(Ordering::SeqCst)
    }
}
