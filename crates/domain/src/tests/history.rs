// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{NOW, hours, record};
use crate::{Calendar, DomainError, EnrollmentStatus, EnrollmentStatusHistory, HistoryField};

#[test]
fn test_builder_defaults_start_to_now() {
    let history = EnrollmentStatusHistory::builder("s", "l", EnrollmentStatus::Potential)
        .organization("org")
        .build(NOW)
        .unwrap();
    assert_eq!(history.start_date(), NOW);
    assert_eq!(history.end_date(), None);
    assert_eq!(history.order_id(), None);
}

#[test]
fn test_builder_requires_organization() {
    let result = EnrollmentStatusHistory::builder("s", "l", EnrollmentStatus::Potential).build(NOW);
    assert_eq!(
        result,
        Err(DomainError::MissingField(HistoryField::OrganizationId))
    );
}

#[test]
fn test_builder_requires_location() {
    let result = EnrollmentStatusHistory::builder("s", " ", EnrollmentStatus::Potential)
        .organization("org")
        .build(NOW);
    assert_eq!(result, Err(DomainError::MissingField(HistoryField::LocationId)));
}

#[test]
fn test_builder_drops_empty_order_id() {
    let history = EnrollmentStatusHistory::builder("s", "l", EnrollmentStatus::Enrolled)
        .organization("org")
        .order("", 3)
        .build(NOW)
        .unwrap();
    assert_eq!(history.order_id(), None);
}

#[test]
fn test_open_ended_record_is_active() {
    let history = record(EnrollmentStatus::Enrolled, NOW - hours(1), None);
    assert!(history.is_active_at(NOW));
    assert!(!history.is_future_at(NOW));
}

#[test]
fn test_closed_record_is_not_active_at_its_end() {
    let history = record(EnrollmentStatus::Enrolled, NOW - hours(5), Some(NOW));
    assert!(!history.is_active_at(NOW));
}

#[test]
fn test_future_record_is_not_active() {
    let history = record(EnrollmentStatus::Enrolled, NOW + hours(5), None);
    assert!(!history.is_active_at(NOW));
    assert!(history.is_future_at(NOW));
}

#[test]
fn test_matches_by_day_ignores_time_of_day() {
    let calendar = Calendar::utc();
    let stored = record(EnrollmentStatus::Temporary, NOW - hours(3), Some(NOW + hours(24)));
    let requested = record(EnrollmentStatus::Temporary, NOW - hours(1), Some(NOW + hours(25)));
    let other_end = record(EnrollmentStatus::Temporary, NOW - hours(1), Some(NOW + hours(48)));

    assert!(stored.matches_by_day(&requested, &calendar));
    assert!(!stored.matches_by_day(&other_end, &calendar));
}

#[test]
fn test_matches_by_day_requires_same_status() {
    let calendar = Calendar::utc();
    let stored = record(EnrollmentStatus::Potential, NOW, None);
    let requested = record(EnrollmentStatus::Enrolled, NOW, None);
    assert!(!stored.matches_by_day(&requested, &calendar));
}

#[test]
fn test_with_end_date_keeps_identity() {
    let stored = record(EnrollmentStatus::Enrolled, NOW - hours(3), None);
    let closed = stored.with_end_date(Some(NOW));
    assert_eq!(closed.start_date(), stored.start_date());
    assert_eq!(closed.end_date(), Some(NOW));
    assert!(closed.shares_key_prefix(&stored));
}
