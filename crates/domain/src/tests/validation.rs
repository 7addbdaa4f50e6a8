// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{NOW, hours, record};
use crate::{
    Calendar, DomainError, EnrollmentStatus, HistoryField, ORDER_FLOW_STATUSES,
    validate_history_dates, validate_student_placement,
};

#[test]
fn test_end_before_start_is_rejected() {
    let history = record(EnrollmentStatus::Enrolled, NOW, Some(NOW - hours(1)));
    let result = validate_history_dates(&history, &ORDER_FLOW_STATUSES, &Calendar::utc(), NOW);
    assert!(matches!(result, Err(DomainError::InvalidDateRange { .. })));
    assert_eq!(result.unwrap_err().field(), HistoryField::EndDate);
}

#[test]
fn test_end_equal_to_start_is_rejected() {
    let history = record(EnrollmentStatus::Enrolled, NOW, Some(NOW));
    let result = validate_history_dates(&history, &ORDER_FLOW_STATUSES, &Calendar::utc(), NOW);
    assert!(matches!(result, Err(DomainError::InvalidDateRange { .. })));
}

#[test]
fn test_order_flow_status_cannot_start_tomorrow() {
    let history = record(EnrollmentStatus::Potential, NOW + hours(24), None);
    let result = validate_history_dates(&history, &ORDER_FLOW_STATUSES, &Calendar::utc(), NOW);
    assert!(matches!(result, Err(DomainError::StartDateInFuture { .. })));
    assert_eq!(result.unwrap_err().field(), HistoryField::StartDate);
}

#[test]
fn test_order_flow_status_may_start_later_today() {
    let history = record(EnrollmentStatus::Potential, NOW + hours(2), None);
    let result = validate_history_dates(&history, &ORDER_FLOW_STATUSES, &Calendar::utc(), NOW);
    assert!(result.is_ok());
}

#[test]
fn test_order_managed_status_may_be_scheduled() {
    let history = record(EnrollmentStatus::Enrolled, NOW + hours(72), None);
    let result = validate_history_dates(&history, &ORDER_FLOW_STATUSES, &Calendar::utc(), NOW);
    assert!(result.is_ok());
}

#[test]
fn test_student_needs_history_or_location() {
    assert_eq!(
        validate_student_placement(0, 0),
        Err(DomainError::MissingField(HistoryField::LocationId))
    );
    assert!(validate_student_placement(0, 1).is_ok());
    assert!(validate_student_placement(2, 0).is_ok());
}
