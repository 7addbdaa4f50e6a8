// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::calendar::Calendar;
use crate::error::DomainError;
use crate::field::HistoryField;
use crate::history::EnrollmentStatusHistory;
use crate::status::EnrollmentStatus;
use time::OffsetDateTime;

/// Validates the dates of a single requested history entry.
///
/// This function checks the entry in isolation. It does NOT compare it
/// against stored records (that requires the reconciler).
///
/// # Arguments
///
/// * `history` - The requested entry
/// * `order_flow_statuses` - Statuses that may not be scheduled ahead of today
/// * `calendar` - The organization calendar
/// * `now` - The request time
///
/// # Errors
///
/// Returns an error if:
/// - The end date is present and not strictly after the start date
/// - An order-flow status starts on a day after today
pub fn validate_history_dates(
    history: &EnrollmentStatusHistory,
    order_flow_statuses: &[EnrollmentStatus],
    calendar: &Calendar,
    now: OffsetDateTime,
) -> Result<(), DomainError> {
    // Rule: intervals are non-empty
    if let Some(end_date) = history.end_date()
        && end_date <= history.start_date()
    {
        return Err(DomainError::InvalidDateRange {
            start_date: history.start_date(),
            end_date,
        });
    }

    // Rule: order-flow statuses cannot be scheduled for a later day
    if order_flow_statuses.contains(&history.status()) {
        let start_day = calendar.day_of(history.start_date());
        let today = calendar.day_of(now);
        if start_day > today {
            return Err(DomainError::StartDateInFuture { start_day, today });
        }
    }

    Ok(())
}

/// Validates that a student will end up attached to at least one location.
///
/// A student submitted without any history entries must name the
/// locations they belong to, since no location can be derived.
///
/// # Errors
///
/// Returns `DomainError::MissingField` for the location if both are empty.
pub fn validate_student_placement(
    history_count: usize,
    location_count: usize,
) -> Result<(), DomainError> {
    if history_count == 0 && location_count == 0 {
        return Err(DomainError::MissingField(HistoryField::LocationId));
    }
    Ok(())
}
