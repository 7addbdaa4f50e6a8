// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar-day arithmetic for enrollment timelines.
//!
//! Timestamps are stored as UTC instants with microsecond resolution.
//! Transition rules compare calendar days in the organization's declared
//! timezone, so two instants on the same local day are equal for rule
//! purposes while both are preserved exactly in storage.

use crate::error::DomainError;
use chrono::{Offset, TimeZone};
use chrono_tz::Tz;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// The organization calendar used to truncate instants to days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    tz: Tz,
}

impl Calendar {
    /// Creates a calendar for an IANA timezone name (e.g. `Asia/Tokyo`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` if the name is not a known zone.
    pub fn new(timezone: &str) -> Result<Self, DomainError> {
        timezone
            .parse::<Tz>()
            .map(|tz| Self { tz })
            .map_err(|_| DomainError::InvalidTimezone {
                timezone: timezone.to_string(),
            })
    }

    /// Creates a calendar for an already-resolved timezone.
    #[must_use]
    pub const fn from_tz(tz: Tz) -> Self {
        Self { tz }
    }

    /// A calendar whose days start at midnight UTC.
    #[must_use]
    pub const fn utc() -> Self {
        Self { tz: Tz::UTC }
    }

    /// Returns the declared timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Returns the local calendar day containing `instant`.
    #[must_use]
    pub fn day_of(&self, instant: OffsetDateTime) -> Date {
        instant.to_offset(self.offset_at(instant)).date()
    }

    /// Returns true if both instants fall on the same local calendar day.
    #[must_use]
    pub fn same_day(&self, a: OffsetDateTime, b: OffsetDateTime) -> bool {
        self.day_of(a) == self.day_of(b)
    }

    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        let Some(utc) = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0) else {
            return UtcOffset::UTC;
        };
        let seconds: i32 = self
            .tz
            .offset_from_utc_datetime(&utc.naive_utc())
            .fix()
            .local_minus_utc();
        UtcOffset::from_whole_seconds(seconds).unwrap_or(UtcOffset::UTC)
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Drops sub-microsecond precision so an instant matches what storage keeps.
#[must_use]
pub fn truncate_to_storage(instant: OffsetDateTime) -> OffsetDateTime {
    let excess: i64 = i64::from(instant.nanosecond() % 1_000);
    instant.to_offset(UtcOffset::UTC) - Duration::nanoseconds(excess)
}

/// Drops sub-second precision.
#[must_use]
pub fn truncate_to_second(instant: OffsetDateTime) -> OffsetDateTime {
    instant - Duration::nanoseconds(i64::from(instant.nanosecond()))
}

/// The smallest addressable storage unit.
pub const STORAGE_RESOLUTION: Duration = Duration::microseconds(1);

/// End date applied to a record closed by a successor starting at `start`.
#[must_use]
pub fn end_before(start: OffsetDateTime) -> OffsetDateTime {
    start - Duration::seconds(1)
}
