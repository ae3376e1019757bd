//! The shared emission cooldown gate.
//!
//! One gate covers every emission regardless of category or requester.
//! After an allowed emission nothing else is allowed until the cooldown
//! period has elapsed. The last emission time lives in memory only, so a
//! restart clears the gate.

use chrono::{DateTime, TimeDelta, Utc};

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// The emission may proceed; the gate has recorded it.
    Allowed,
    /// The emission is refused.
    Denied {
        /// Time left until the gate opens.
        remaining: TimeDelta,
    },
}

/// Minimum-interval gate between emissions.
///
/// [`Engine`](crate::engine::Engine) peeks with [`remaining_at`] and calls
/// [`record`] only after the emission has been composed, so a request that
/// fails to compose leaves the gate open.
/// [`check_and_record_at`] does both in one step for callers with nothing
/// fallible in between.
///
/// [`remaining_at`]: Cooldown::remaining_at
/// [`record`]: Cooldown::record
/// [`check_and_record_at`]: Cooldown::check_and_record_at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    /// Required spacing between two emissions.
    period: TimeDelta,
    /// When the last allowed emission was recorded.
    last_emission_at: Option<DateTime<Utc>>,
}

impl Cooldown {
    /// Create an open gate with the given period.
    pub const fn new(period: TimeDelta) -> Self {
        Self {
            period,
            last_emission_at: None,
        }
    }

    /// Create an open gate from a [`std::time::Duration`] period.
    ///
    /// Periods beyond what [`TimeDelta`] can hold saturate to its maximum.
    pub fn from_std(period: std::time::Duration) -> Self {
        Self::new(TimeDelta::from_std(period).unwrap_or(TimeDelta::MAX))
    }

    /// The configured period.
    pub const fn period(&self) -> TimeDelta {
        self.period
    }

    /// When the last allowed emission happened, if any.
    pub const fn last_emission_at(&self) -> Option<DateTime<Utc>> {
        self.last_emission_at
    }

    /// Time left before the gate opens at `now`, or `None` if it is open.
    ///
    /// A clock that went backwards counts as zero elapsed time.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        let last = self.last_emission_at?;
        let elapsed = now.signed_duration_since(last).max(TimeDelta::zero());
        if elapsed >= self.period {
            return None;
        }
        self.period.checked_sub(&elapsed)
    }

    /// Record an emission at `now`.
    pub const fn record(&mut self, now: DateTime<Utc>) {
        self.last_emission_at = Some(now);
    }

    /// Check the gate at `now` and record the emission if it is open.
    pub fn check_and_record_at(&mut self, now: DateTime<Utc>) -> CooldownDecision {
        match self.remaining_at(now) {
            Some(remaining) => CooldownDecision::Denied { remaining },
            None => {
                self.record(now);
                CooldownDecision::Allowed
            }
        }
    }

    /// Check the gate against the wall clock and record if open.
    pub fn check_and_record(&mut self) -> CooldownDecision {
        self.check_and_record_at(Utc::now())
    }
}

/// Remaining wait split into whole minutes and seconds, rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTime {
    /// Whole minutes.
    pub minutes: i64,
    /// Seconds past the last whole minute.
    pub seconds: i64,
}

impl WaitTime {
    /// Split a remaining duration. Partial seconds round up so a denied
    /// caller never reads "0 seconds".
    pub fn from_remaining(remaining: TimeDelta) -> Self {
        let mut total = remaining.num_seconds().max(0);
        if remaining.subsec_nanos() > 0 {
            total = total.saturating_add(1);
        }
        Self {
            minutes: total.checked_div(60).unwrap_or(0),
            seconds: total.checked_rem(60).unwrap_or(0),
        }
    }
}
