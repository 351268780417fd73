//! Cross-platform time utilities.
//!
//! This module provides time utilities that work on both native and WASM
//! targets, plus the [`Clock`] abstraction that assignment expiry is evaluated
//! against.

use std::sync::atomic::{AtomicI64, Ordering};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::ConditionalSync;

/// Returns the current system time.
///
/// Uses `std::time::SystemTime::now()` on native and `web_time::SystemTime::now().to_std()`
/// on WASM.
#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> SystemTime {
    SystemTime::now()
}

/// Returns the current system time.
///
/// Uses `std::time::SystemTime::now()` on native and `web_time::SystemTime::now().to_std()`
/// on WASM.
#[cfg(target_arch = "wasm32")]
pub fn now() -> SystemTime {
    use web_time::web::SystemTimeExt;
    web_time::SystemTime::now().to_std()
}

/// Converts a [`SystemTime`] to signed Unix seconds. Times before the epoch
/// produce negative values; times past `i64::MAX` seconds saturate.
pub fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
        Err(error) => i64::try_from(error.duration().as_secs())
            .map(|seconds| -seconds)
            .unwrap_or(i64::MIN),
    }
}

/// A source of "current time" in Unix seconds.
pub trait Clock: ConditionalSync {
    /// The current time as signed Unix seconds.
    fn unix_timestamp(&self) -> i64;
}

/// The wall clock of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        unix_seconds(now())
    }
}

/// A manually driven clock, for tests and simulations.
#[derive(Debug, Default)]
pub struct FixedClock(AtomicI64);

impl FixedClock {
    /// A clock frozen at `unix_timestamp`.
    pub fn new(unix_timestamp: i64) -> Self {
        Self(AtomicI64::new(unix_timestamp))
    }

    /// Moves the clock to `unix_timestamp`.
    pub fn set(&self, unix_timestamp: i64) {
        self.0.store(unix_timestamp, Ordering::SeqCst);
    }

    /// Moves the clock forward (or backward, for negative values) by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

impl<C: Clock> Clock for std::sync::Arc<C> {
    fn unix_timestamp(&self) -> i64 {
        self.as_ref().unix_timestamp()
    }
}
