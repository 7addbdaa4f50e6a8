// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::field::HistoryField;
use crate::transition::RejectReason;
use time::{Date, OffsetDateTime};

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Enrollment status string is not part of the catalog.
    InvalidEnrollmentStatus {
        /// The rejected value.
        status: String,
    },
    /// Order type string is not recognized.
    InvalidOrderType(String),
    /// Order status string is not recognized.
    InvalidOrderStatus(String),
    /// Timezone name is not a known IANA zone.
    InvalidTimezone {
        /// The rejected timezone name.
        timezone: String,
    },
    /// A mandatory field was not supplied to a builder.
    MissingField(HistoryField),
    /// End date is not strictly after start date.
    InvalidDateRange {
        /// The record start.
        start_date: OffsetDateTime,
        /// The rejected end.
        end_date: OffsetDateTime,
    },
    /// An order-flow status starts on a day after today.
    StartDateInFuture {
        /// The requested start day.
        start_day: Date,
        /// Today in the organization calendar.
        today: Date,
    },
    /// A requested status change violates the transition rules.
    TransitionRejected(RejectReason),
}

impl DomainError {
    /// Returns the history field this error should be reported against.
    #[must_use]
    pub const fn field(&self) -> HistoryField {
        match self {
            Self::InvalidEnrollmentStatus { .. } => HistoryField::EnrollmentStatus,
            Self::MissingField(field) => *field,
            Self::InvalidDateRange { .. } => HistoryField::EndDate,
            Self::StartDateInFuture { .. } => HistoryField::StartDate,
            Self::TransitionRejected(reason) => reason.field(),
            Self::InvalidOrderType(_) | Self::InvalidOrderStatus(_) => HistoryField::OrderId,
            Self::InvalidTimezone { .. } => HistoryField::LocationId,
        }
    }
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEnrollmentStatus { status } => {
                write!(f, "Invalid enrollment status: '{status}'")
            }
            Self::InvalidOrderType(value) => write!(f, "Invalid order type: '{value}'"),
            Self::InvalidOrderStatus(value) => write!(f, "Invalid order status: '{value}'"),
            Self::InvalidTimezone { timezone } => write!(f, "Invalid timezone: '{timezone}'"),
            Self::MissingField(field) => write!(f, "Missing mandatory field: {}", field.as_str()),
            Self::InvalidDateRange {
                start_date,
                end_date,
            } => write!(
                f,
                "End date {end_date} must be after start date {start_date}"
            ),
            Self::StartDateInFuture { start_day, today } => write!(
                f,
                "Start date {start_day} cannot be after the current date {today}"
            ),
            Self::TransitionRejected(reason) => {
                write!(f, "Enrollment status transition rejected: {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}

impl From<RejectReason> for DomainError {
    fn from(reason: RejectReason) -> Self {
        Self::TransitionRejected(reason)
    }
}
