//! Timestamp source for record construction.
//!
//! The timestamp is a hash input, so it is captured exactly once per record
//! and stored verbatim. Verification never consults a clock.

use chrono::{DateTime, Utc};

/// Format of record timestamps: UTC ISO-8601 with microseconds, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Supplies record timestamps.
pub trait Clock: Send + Sync {
    /// Current time, already rendered in [`TIMESTAMP_FORMAT`].
    fn timestamp(&self) -> String;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn timestamp(&self) -> String {
        format_timestamp(Utc::now())
    }
}

/// A clock that always reports the same instant. For tests and replay.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(format_timestamp(at))
    }
}

impl Clock for FixedClock {
    fn timestamp(&self) -> String {
        self.0.clone()
    }
}

/// Render an instant in the record timestamp format.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
