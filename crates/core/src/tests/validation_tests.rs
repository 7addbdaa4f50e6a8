// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{MemoryStore, NOW, STUDENT, ctx, hours, reconciler, record, record_at};
use crate::{
    BatchUpsertOrchestrator, BatchValidationManager, CoreError, StudentEnrollmentRequest,
    ValidatedBatch,
};
use enrollment_domain::{EnrollmentMode, EnrollmentStatus, EnrollmentStatusHistory, ORDER_FLOW_STATUSES};

fn manager(mode: EnrollmentMode) -> BatchValidationManager {
    BatchValidationManager::new(reconciler(mode), &ORDER_FLOW_STATUSES)
}

fn student(index: usize, histories: Vec<EnrollmentStatusHistory>) -> StudentEnrollmentRequest {
    StudentEnrollmentRequest {
        index,
        student_id: String::from(STUDENT),
        location_ids: Vec::new(),
        histories,
    }
}

fn validate(
    mode: EnrollmentMode,
    store: &mut MemoryStore,
    students: Vec<StudentEnrollmentRequest>,
) -> ValidatedBatch {
    manager(mode).validate(&ctx(), store, students).unwrap()
}

fn only_error(batch: &ValidatedBatch) -> (String, Option<String>) {
    assert_eq!(batch.errors.len(), 1, "{:?}", batch.errors);
    let err = &batch.errors[0];
    let reason = match err {
        CoreError::InvalidData { reason, .. } => Some(reason.clone()),
        _ => None,
    };
    (err.field().unwrap().as_str().to_string(), reason)
}

#[test]
fn test_end_before_start_is_reported_at_entry() {
    let mut store = MemoryStore::default();
    let histories = vec![
        record(EnrollmentStatus::Enrolled, NOW - hours(2), None),
        record(EnrollmentStatus::Potential, NOW, Some(NOW - hours(1))),
    ];
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![student(0, histories)]);

    let (field, _) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories[1].end_date");
    assert!(batch.accepted.is_empty());
}

#[test]
fn test_order_flow_status_cannot_start_on_later_day() {
    let mut store = MemoryStore::default();
    let histories = vec![record(EnrollmentStatus::Potential, NOW + hours(48), None)];
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![student(2, histories)]);

    let (field, _) = only_error(&batch);
    assert_eq!(field, "students[2].enrollment_status_histories[0].start_date");
}

#[test]
fn test_new_student_needs_a_location() {
    let mut store = MemoryStore::default();
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![student(0, Vec::new())]);

    assert!(matches!(
        &batch.errors[..],
        [CoreError::MissingMandatory { field }] if field.as_str() == "students[0].locations"
    ));

    let mut placed = student(0, Vec::new());
    placed.location_ids = vec![String::from("location-1")];
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![placed]);
    assert!(batch.is_valid());
    assert_eq!(batch.accepted.len(), 1);
}

#[test]
fn test_order_flow_rejects_new_order_managed_status() {
    let mut store = MemoryStore::default();
    let histories = vec![record(EnrollmentStatus::Enrolled, NOW, None)];
    let batch = validate(EnrollmentMode::OrderFlow, &mut store, vec![student(0, histories)]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.enrollment_status");
    assert_eq!(reason.as_deref(), Some("StatusNotAllowedAtOrderFlow"));
}

#[test]
fn test_order_flow_rejects_order_managed_status_over_existing_timeline() {
    let mut store = MemoryStore::with_records(vec![record(
        EnrollmentStatus::Potential,
        NOW - hours(72),
        None,
    )]);
    let histories = vec![record(EnrollmentStatus::Enrolled, NOW - hours(1), None)];
    let batch = validate(EnrollmentMode::OrderFlow, &mut store, vec![student(0, histories)]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.enrollment_status");
    assert_eq!(reason.as_deref(), Some("StatusNotAllowedAtOrderFlow"));
    assert!(batch.accepted.is_empty());
}

#[test]
fn test_temporary_only_student_is_rejected() {
    let mut store = MemoryStore::default();
    let histories = vec![record(
        EnrollmentStatus::Temporary,
        NOW,
        Some(NOW + hours(72)),
    )];
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![student(0, histories)]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.enrollment_status");
    assert_eq!(reason.as_deref(), Some("MissingActivatedEnrollmentStatus"));
}

#[test]
fn test_restated_record_skips_order_flow_rules() {
    let mut store = MemoryStore::with_records(vec![record(
        EnrollmentStatus::Enrolled,
        NOW - hours(40),
        None,
    )]);
    let histories = vec![record(EnrollmentStatus::Enrolled, NOW - hours(40), None)];
    let batch = validate(EnrollmentMode::OrderFlow, &mut store, vec![student(0, histories)]);

    assert!(batch.is_valid());
    assert_eq!(batch.accepted.len(), 1);
}

#[test]
fn test_order_flow_protects_active_order_managed_status() {
    let mut store = MemoryStore::with_records(vec![record(
        EnrollmentStatus::Enrolled,
        NOW - hours(40),
        None,
    )]);
    let histories = vec![record(EnrollmentStatus::Potential, NOW, None)];
    let batch = validate(EnrollmentMode::OrderFlow, &mut store, vec![student(0, histories)]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.enrollment_status");
    assert_eq!(
        reason.as_deref(),
        Some("ChangingNonERPStatusToOtherStatusAtOrderFlow")
    );
}

#[test]
fn test_latest_record_is_used_when_none_is_active() {
    let mut store = MemoryStore::with_records(vec![record(
        EnrollmentStatus::Potential,
        NOW - hours(100),
        Some(NOW - hours(50)),
    )]);
    let histories = vec![record(EnrollmentStatus::Potential, NOW - hours(120), None)];
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![student(0, histories)]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.start_date");
    assert_eq!(
        reason.as_deref(),
        Some("ChangingStartDateWithoutChangingStatus")
    );
}

#[test]
fn test_invalid_student_does_not_block_others() {
    let mut store = MemoryStore::default();
    let invalid = student(
        0,
        vec![record(EnrollmentStatus::Potential, NOW, Some(NOW - hours(1)))],
    );
    let mut valid = student(
        1,
        vec![record_at(
            "student-2",
            "location-1",
            EnrollmentStatus::Potential,
            NOW,
            None,
        )],
    );
    valid.student_id = String::from("student-2");

    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![invalid, valid]);

    assert_eq!(batch.errors.len(), 1);
    assert_eq!(batch.accepted.len(), 1);
    assert_eq!(batch.accepted[0].index, 1);
}

#[test]
fn test_storage_failure_aborts_validation() {
    let mut store = MemoryStore {
        fail_on: Some("get_by_student_ids"),
        ..MemoryStore::default()
    };
    let students = vec![student(0, vec![record(EnrollmentStatus::Potential, NOW, None)])];
    let err = manager(EnrollmentMode::DirectEdit)
        .validate(&ctx(), &mut store, students)
        .unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn test_conflicting_entries_of_one_student_do_not_block_others() {
    let mut store = MemoryStore::with_records(vec![record(
        EnrollmentStatus::Potential,
        NOW - hours(240),
        None,
    )]);
    let conflicting = student(
        0,
        vec![
            record(EnrollmentStatus::Enrolled, NOW - hours(120), None),
            record(EnrollmentStatus::Withdrawn, NOW - hours(168), None),
        ],
    );
    let mut valid = student(
        1,
        vec![record_at(
            "student-2",
            "location-1",
            EnrollmentStatus::Potential,
            NOW,
            None,
        )],
    );
    valid.student_id = String::from("student-2");

    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![conflicting, valid]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.start_date");
    assert_eq!(
        reason.as_deref(),
        Some("ActivatedStartDateAfterReqStartDate")
    );
    assert_eq!(batch.accepted.len(), 1);

    BatchUpsertOrchestrator::new(reconciler(EnrollmentMode::DirectEdit))
        .upsert_many(&ctx(), &mut store, &batch.accepted)
        .unwrap();
    assert_eq!(store.timeline("student-2", "location-1").len(), 1);
    assert_eq!(store.timeline(STUDENT, "location-1").len(), 1);
}

#[test]
fn test_entry_overlapping_scheduled_status_is_rejected() {
    let mut store = MemoryStore::with_records(vec![
        record(
            EnrollmentStatus::Potential,
            NOW - hours(40),
            Some(NOW - hours(1) - time::Duration::seconds(1)),
        ),
        record(EnrollmentStatus::Enrolled, NOW - hours(1), Some(NOW + hours(10))),
        record(EnrollmentStatus::Withdrawn, NOW + hours(10) + time::Duration::seconds(1), None),
    ]);
    let histories = vec![record(
        EnrollmentStatus::Loa,
        NOW,
        Some(NOW + hours(48)),
    )];
    let batch = validate(EnrollmentMode::DirectEdit, &mut store, vec![student(0, histories)]);

    let (field, reason) = only_error(&batch);
    assert_eq!(field, "students[0].enrollment_status_histories.end_date");
    assert_eq!(reason.as_deref(), Some("EndDateBeforeFutureStatus"));
}
