// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::NOW;
use crate::{EnrollmentStatus, OrderEventLog, OrderStatus, OrderType};
use time::macros::datetime;

fn sample_event() -> OrderEventLog {
    serde_json::from_str(
        r#"{
            "order_status": "ORDER_STATUS_SUBMITTED",
            "order_type": "ORDER_TYPE_WITHDRAWAL",
            "student_id": "student-1",
            "location_id": "location-1",
            "additional_location_ids": ["location-2", "location-1"],
            "enrollment_status": "STUDENT_ENROLLMENT_STATUS_ENROLLED",
            "start_date": "2026-03-12T00:00:00Z",
            "order_id": "order-1",
            "order_sequence_number": 4
        }"#,
    )
    .unwrap()
}

#[test]
fn test_order_event_decodes_wire_names() {
    let event = sample_event();
    assert_eq!(event.order_status, OrderStatus::Submitted);
    assert_eq!(event.order_type, OrderType::Withdrawal);
    assert_eq!(event.enrollment_status, Some(EnrollmentStatus::Enrolled));
    assert_eq!(event.start_date, Some(datetime!(2026-03-12 00:00 UTC)));
    assert_eq!(event.end_date, None);
}

#[test]
fn test_unknown_wire_values_are_tolerated() {
    let event: OrderEventLog = serde_json::from_str(
        r#"{
            "order_status": "ORDER_STATUS_SOMETHING_NEW",
            "order_type": "ORDER_TYPE_TRANSFER",
            "student_id": "student-1",
            "location_id": "location-1",
            "enrollment_status": "STUDENT_ENROLLMENT_STATUS_NONE",
            "order_id": "order-1"
        }"#,
    )
    .unwrap();
    assert_eq!(event.order_status, OrderStatus::Unknown);
    assert_eq!(event.order_type, OrderType::Unknown);
    assert_eq!(event.enrollment_status, None);
}

#[test]
fn test_target_status_map() {
    assert_eq!(
        OrderType::Enrollment.target_status(),
        Some(EnrollmentStatus::Enrolled)
    );
    assert_eq!(
        OrderType::Resume.target_status(),
        Some(EnrollmentStatus::Enrolled)
    );
    assert_eq!(
        OrderType::Withdrawal.target_status(),
        Some(EnrollmentStatus::Withdrawn)
    );
    assert_eq!(
        OrderType::Graduate.target_status(),
        Some(EnrollmentStatus::Graduated)
    );
    assert_eq!(OrderType::Loa.target_status(), Some(EnrollmentStatus::Loa));
    assert_eq!(OrderType::New.target_status(), None);
}

#[test]
fn test_touched_locations_are_deduplicated() {
    let event = sample_event();
    assert_eq!(event.touched_locations(), vec!["location-1", "location-2"]);
}

#[test]
fn test_to_history_carries_order_linkage() {
    let event = sample_event();
    let history = event
        .to_history(EnrollmentStatus::Withdrawn, "org-1", NOW)
        .unwrap();
    assert_eq!(history.status(), EnrollmentStatus::Withdrawn);
    assert_eq!(history.start_date(), datetime!(2026-03-12 00:00 UTC));
    assert_eq!(history.order_id(), Some("order-1"));
    assert_eq!(history.order_sequence_number(), Some(4));
    assert_eq!(history.organization_id(), "org-1");
}

#[test]
fn test_inverted_dates_are_detected() {
    let mut event = sample_event();
    event.end_date = Some(datetime!(2026-03-11 00:00 UTC));
    assert!(event.has_inverted_dates());
}
