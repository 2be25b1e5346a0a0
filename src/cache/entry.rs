//! Store Entry Module
//!
//! Defines the record held for each key: payload, creation time and TTL policy.

use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};

// == Entry ==
/// A single stored value with its expiration policy.
///
/// The creation timestamp is owned by the store: it is restamped whenever the
/// entry is inserted, so expiry is always measured from the actual write.
/// Expiry is tracked on the monotonic clock; `created_at` is for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    value: Bytes,
    created_at: DateTime<Utc>,
    inserted: Instant,
    ttl: Duration,
    never_expire: bool,
}

impl Entry {
    // == Constructors ==
    /// Creates an entry that expires `ttl` after insertion.
    ///
    /// A zero `ttl` means the entry never expires.
    pub fn new(value: impl Into<Bytes>, ttl: Duration) -> Self {
        Self {
            value: value.into(),
            created_at: Utc::now(),
            inserted: Instant::now(),
            ttl,
            never_expire: false,
        }
    }

    /// Creates an entry that is never removed by the purge loop.
    pub fn never_expiring(value: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            created_at: Utc::now(),
            inserted: Instant::now(),
            ttl: Duration::ZERO,
            never_expire: true,
        }
    }

    /// Marks (or unmarks) the entry as exempt from expiry.
    pub fn with_never_expire(mut self, never_expire: bool) -> Self {
        self.never_expire = never_expire;
        self
    }

    // == Accessors ==
    /// The stored payload.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// Consumes the entry and returns the payload.
    pub fn into_value(self) -> Bytes {
        self.value
    }

    /// When the entry was written into the store.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time-to-live; zero when the entry does not expire.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the entry is exempt from expiry.
    pub fn never_expire(&self) -> bool {
        self.never_expire || self.ttl.is_zero()
    }

    // == Normalization ==
    /// Prepares the entry for insertion: folds never-expire and zero TTL into
    /// one representation and stamps the creation time.
    pub(crate) fn stamped(mut self) -> Self {
        if self.never_expire || self.ttl.is_zero() {
            self.ttl = Duration::ZERO;
            self.never_expire = true;
        }
        self.created_at = Utc::now();
        self.inserted = Instant::now();
        self
    }

    // == Expiry ==
    /// Checks if the entry has outlived its TTL.
    ///
    /// An entry is expired once the time since creation strictly exceeds the TTL.
    /// Entries without a TTL never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        !self.never_expire() && now.saturating_duration_since(self.inserted) > self.ttl
    }

    /// The wall-clock time after which the entry becomes a purge candidate,
    /// or None if it never expires.
    ///
    /// A deadline past what `DateTime` can represent saturates to
    /// `DateTime::<Utc>::MAX_UTC`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.never_expire() {
            return None;
        }
        let deadline = TimeDelta::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Some(deadline)
    }

    /// Returns the remaining TTL, `Some(Duration::ZERO)` once expired, or None
    /// if the entry never expires.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        if self.never_expire() {
            return None;
        }
        Some(self.ttl.saturating_sub(self.inserted.elapsed()))
    }
}
