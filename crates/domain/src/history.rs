// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment status history records.
//!
//! A record is one contiguous interval during which a student held a
//! status at a location. Records are identified by
//! (`student_id`, `location_id`, `status`, `start_date`) and are closed by
//! setting an end date, never by deleting them.

use crate::calendar::{Calendar, truncate_to_storage};
use crate::error::DomainError;
use crate::field::HistoryField;
use crate::status::EnrollmentStatus;
use serde::Serialize;
use time::OffsetDateTime;

/// The (student, location) pair a timeline belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimelineKey {
    pub student_id: String,
    pub location_id: String,
}

impl TimelineKey {
    #[must_use]
    pub fn new(student_id: impl Into<String>, location_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            location_id: location_id.into(),
        }
    }
}

/// One interval of a student's enrollment status at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrollmentStatusHistory {
    student_id: String,
    location_id: String,
    organization_id: String,
    status: EnrollmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    end_date: Option<OffsetDateTime>,
    order_id: Option<String>,
    order_sequence_number: Option<i32>,
}

impl EnrollmentStatusHistory {
    /// Starts assembling a record for a student at a location.
    #[must_use]
    pub fn builder(
        student_id: impl Into<String>,
        location_id: impl Into<String>,
        status: EnrollmentStatus,
    ) -> EnrollmentStatusHistoryBuilder {
        EnrollmentStatusHistoryBuilder {
            student_id: student_id.into(),
            location_id: location_id.into(),
            status,
            organization_id: None,
            start_date: None,
            end_date: None,
            order_id: None,
            order_sequence_number: None,
        }
    }

    #[must_use]
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    #[must_use]
    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    #[must_use]
    pub const fn status(&self) -> EnrollmentStatus {
        self.status
    }

    #[must_use]
    pub const fn start_date(&self) -> OffsetDateTime {
        self.start_date
    }

    /// `None` means open-ended.
    #[must_use]
    pub const fn end_date(&self) -> Option<OffsetDateTime> {
        self.end_date
    }

    #[must_use]
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    #[must_use]
    pub const fn order_sequence_number(&self) -> Option<i32> {
        self.order_sequence_number
    }

    #[must_use]
    pub fn timeline_key(&self) -> TimelineKey {
        TimelineKey::new(self.student_id.clone(), self.location_id.clone())
    }

    /// Returns true if this record belongs to the given timeline.
    #[must_use]
    pub fn belongs_to(&self, student_id: &str, location_id: &str) -> bool {
        self.student_id == student_id && self.location_id == location_id
    }

    /// Returns true if the record's interval contains `now`.
    #[must_use]
    pub fn is_active_at(&self, now: OffsetDateTime) -> bool {
        self.start_date <= now && self.end_date.is_none_or(|end| end > now)
    }

    /// Returns true if the record has not started yet at `now`.
    #[must_use]
    pub fn is_future_at(&self, now: OffsetDateTime) -> bool {
        self.start_date > now
    }

    /// Returns true if both records share the primary-key prefix
    /// (student, location, status).
    #[must_use]
    pub fn shares_key_prefix(&self, other: &Self) -> bool {
        self.student_id == other.student_id
            && self.location_id == other.location_id
            && self.status == other.status
    }

    /// Returns true if `other` describes the same interval at day
    /// granularity: same key prefix, same start day and same end day.
    #[must_use]
    pub fn matches_by_day(&self, other: &Self, calendar: &Calendar) -> bool {
        let same_end: bool = match (self.end_date, other.end_date) {
            (None, None) => true,
            (Some(a), Some(b)) => calendar.same_day(a, b),
            _ => false,
        };
        self.shares_key_prefix(other)
            && calendar.same_day(self.start_date, other.start_date)
            && same_end
    }

    /// Returns a copy of this record starting at `start_date`.
    #[must_use]
    pub fn with_start_date(&self, start_date: OffsetDateTime) -> Self {
        Self {
            start_date: truncate_to_storage(start_date),
            ..self.clone()
        }
    }

    /// Returns a copy of this record ending at `end_date`.
    #[must_use]
    pub fn with_end_date(&self, end_date: Option<OffsetDateTime>) -> Self {
        Self {
            end_date: end_date.map(truncate_to_storage),
            ..self.clone()
        }
    }
}

/// Assembles a fully-populated [`EnrollmentStatusHistory`].
///
/// Computed attributes (organization, order linkage, default start) are
/// supplied here, before the record enters the reconciler.
#[derive(Debug, Clone)]
pub struct EnrollmentStatusHistoryBuilder {
    student_id: String,
    location_id: String,
    status: EnrollmentStatus,
    organization_id: Option<String>,
    start_date: Option<OffsetDateTime>,
    end_date: Option<OffsetDateTime>,
    order_id: Option<String>,
    order_sequence_number: Option<i32>,
}

impl EnrollmentStatusHistoryBuilder {
    #[must_use]
    pub fn organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    #[must_use]
    pub const fn start_date(mut self, start_date: OffsetDateTime) -> Self {
        self.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub const fn end_date(mut self, end_date: Option<OffsetDateTime>) -> Self {
        self.end_date = end_date;
        self
    }

    #[must_use]
    pub fn order(mut self, order_id: impl Into<String>, sequence_number: i32) -> Self {
        self.order_id = Some(order_id.into());
        self.order_sequence_number = Some(sequence_number);
        self
    }

    /// Builds the record, defaulting a missing start date to `now`.
    ///
    /// Date ordering is not checked here; requests are validated as a
    /// batch so failures can be reported with their field path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` if the student, location or
    /// organization identifier is empty.
    pub fn build(self, now: OffsetDateTime) -> Result<EnrollmentStatusHistory, DomainError> {
        if self.student_id.trim().is_empty() {
            return Err(DomainError::MissingField(HistoryField::StudentId));
        }
        if self.location_id.trim().is_empty() {
            return Err(DomainError::MissingField(HistoryField::LocationId));
        }
        let organization_id: String = self
            .organization_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(DomainError::MissingField(HistoryField::OrganizationId))?;

        Ok(EnrollmentStatusHistory {
            student_id: self.student_id,
            location_id: self.location_id,
            organization_id,
            status: self.status,
            start_date: truncate_to_storage(self.start_date.unwrap_or(now)),
            end_date: self.end_date.map(truncate_to_storage),
            order_id: self.order_id.filter(|id| !id.is_empty()),
            order_sequence_number: self.order_sequence_number,
        })
    }
}
