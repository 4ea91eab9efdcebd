//! Time types for CLAIMCHECK.
//!
//! Instants are kept in unix milliseconds. Timelocks are whole unix seconds,
//! obtained by flooring an instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_SEC: u64 = 1_000;

/// Unix instant with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    /// Create from unix milliseconds
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Create from unix seconds, `None` if the instant is not representable
    #[must_use]
    pub const fn from_unix_seconds(seconds: u64) -> Option<Self> {
        match seconds.checked_mul(MILLIS_PER_SEC) {
            Some(millis) => Some(Self { millis }),
            None => None,
        }
    }

    /// Get unix milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Floor to whole unix seconds
    #[must_use]
    pub const fn as_unix_seconds(&self) -> u64 {
        self.millis / MILLIS_PER_SEC
    }

    /// Add a duration, `None` on overflow
    #[must_use]
    pub fn checked_add(&self, duration: &Duration) -> Option<Self> {
        self.millis.checked_add(duration.millis).map(Self::from_millis)
    }

    /// Render as RFC 3339 in UTC
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        i64::try_from(self.as_unix_seconds())
            .ok()
            .and_then(|secs| {
                let nanos = (self.millis % MILLIS_PER_SEC) as u32 * 1_000_000;
                DateTime::<Utc>::from_timestamp(secs, nanos)
            })
            .map_or_else(|| format!("@{}ms", self.millis), |dt| dt.to_rfc3339())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_rfc3339())
    }
}

/// A span of time with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration {
    millis: u64,
}

impl Duration {
    /// Zero duration
    #[must_use]
    pub const fn zero() -> Self {
        Self { millis: 0 }
    }

    /// Duration from seconds, `None` if not representable
    #[must_use]
    pub const fn from_secs(seconds: u64) -> Option<Self> {
        match seconds.checked_mul(MILLIS_PER_SEC) {
            Some(millis) => Some(Self { millis }),
            None => None,
        }
    }

    /// Get total milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.millis
    }

    /// Checked addition
    #[must_use]
    pub fn checked_add(&self, other: &Duration) -> Option<Duration> {
        self.millis
            .checked_add(other.millis)
            .map(|millis| Duration { millis })
    }

    /// Checked multiplication by a step count
    #[must_use]
    pub fn checked_mul(&self, n: u64) -> Option<Duration> {
        self.millis.checked_mul(n).map(|millis| Duration { millis })
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.millis % MILLIS_PER_SEC == 0 {
            write!(f, "{}s", self.millis / MILLIS_PER_SEC)
        } else {
            write!(f, "{}ms", self.millis)
        }
    }
}
