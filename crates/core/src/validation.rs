// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Batch validation ahead of persistence.
//!
//! Every student of a request is checked against the stored timelines
//! before anything is written. Rule violations are collected per student,
//! so one invalid student does not block the others. Repository failures
//! abort the whole batch.

use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::EnrollmentHistoryReader;
use crate::reconcile::{Action, TimelineReconciler};
use crate::upsert::{StudentEnrollmentRequest, absorb};
use enrollment_domain::{
    Calendar, EnrollmentStatus, EnrollmentStatusHistory, FieldPath, HistoryField, RejectReason,
    check_activated_status, validate_history_dates, validate_student_placement,
};
use time::OffsetDateTime;
use tracing::{debug, info};

/// The outcome of validating a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedBatch {
    /// Students that may be handed to the upsert orchestrator.
    pub accepted: Vec<StudentEnrollmentRequest>,
    /// One error per rejected student, in request order.
    pub errors: Vec<CoreError>,
}

impl ValidatedBatch {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks the dates of every history entry of `student` in isolation.
///
/// # Arguments
///
/// * `student` - The student being submitted
/// * `order_flow_statuses` - Statuses that may not start on a later day
/// * `calendar` - The organization calendar
/// * `now` - The request time
///
/// # Errors
///
/// Returns `CoreError::InvalidData` at
/// `students[i].enrollment_status_histories[j].<field>` for the first entry
/// whose end is not after its start or that is scheduled ahead of today.
pub fn validate_histories_before_creating(
    student: &StudentEnrollmentRequest,
    order_flow_statuses: &[EnrollmentStatus],
    calendar: &Calendar,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    for (entry, history) in student.histories.iter().enumerate() {
        validate_history_dates(history, order_flow_statuses, calendar, now).map_err(|err| {
            CoreError::domain(
                FieldPath::history_entry(student.index, entry, err.field()),
                &err,
            )
        })?;
    }
    Ok(())
}

/// Validates whole request batches against the enrollment rules.
#[derive(Debug, Clone)]
pub struct BatchValidationManager {
    reconciler: TimelineReconciler,
    order_flow_statuses: Vec<EnrollmentStatus>,
}

impl BatchValidationManager {
    #[must_use]
    pub fn new(reconciler: TimelineReconciler, order_flow_statuses: &[EnrollmentStatus]) -> Self {
        Self {
            reconciler,
            order_flow_statuses: order_flow_statuses.to_vec(),
        }
    }

    /// Splits `students` into accepted students and per-student errors.
    ///
    /// Stored records of every student are fetched in one call.
    ///
    /// # Errors
    ///
    /// Returns the repository failure; rule violations are reported in the
    /// returned batch instead.
    pub fn validate<S>(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        students: Vec<StudentEnrollmentRequest>,
    ) -> Result<ValidatedBatch, CoreError>
    where
        S: EnrollmentHistoryReader + ?Sized,
    {
        let mut student_ids: Vec<String> = Vec::with_capacity(students.len());
        for student in &students {
            if !student_ids.contains(&student.student_id) {
                student_ids.push(student.student_id.clone());
            }
        }
        let stored: Vec<EnrollmentStatusHistory> = if student_ids.is_empty() {
            Vec::new()
        } else {
            ctx.call("get_by_student_ids", || store.get_by_student_ids(&student_ids))?
        };

        let mut batch: ValidatedBatch = ValidatedBatch::default();
        for student in students {
            match self.validate_student(ctx.now(), &stored, &student) {
                Ok(()) => batch.accepted.push(student),
                Err(err) => {
                    debug!(
                        student_id = %student.student_id,
                        index = student.index,
                        error = %err,
                        "student rejected"
                    );
                    batch.errors.push(err);
                }
            }
        }

        info!(
            accepted = batch.accepted.len(),
            rejected = batch.errors.len(),
            "enrollment batch validated"
        );
        Ok(batch)
    }

    fn validate_student(
        &self,
        now: OffsetDateTime,
        stored: &[EnrollmentStatusHistory],
        student: &StudentEnrollmentRequest,
    ) -> Result<(), CoreError> {
        let calendar: &Calendar = self.reconciler.calendar();
        validate_histories_before_creating(student, &self.order_flow_statuses, calendar, now)?;

        let own: Vec<&EnrollmentStatusHistory> = stored
            .iter()
            .filter(|record| record.student_id() == student.student_id)
            .collect();
        if own.is_empty() {
            validate_student_placement(student.histories.len(), student.location_ids.len())
                .map_err(|err| {
                    CoreError::domain(FieldPath::student(student.index, "locations"), &err)
                })?;
        }

        let reject = |reason: RejectReason| {
            CoreError::rejected(FieldPath::history(student.index, reason.field()), reason)
        };

        // Entries are replayed in request order, as the orchestrator applies them.
        let mut working: Vec<EnrollmentStatusHistory> =
            own.iter().map(|record| (*record).clone()).collect();
        for requested in &student.histories {
            self.check_against_timeline(now, &working, requested)
                .map_err(reject)?;
            let action: Action = self
                .reconciler
                .plan(now, &working, requested)
                .map_err(reject)?;
            absorb(&mut working, &action);
        }

        let known = own
            .iter()
            .filter(|record| record.is_active_at(now))
            .map(|record| record.status());
        let requested = student.histories.iter().map(EnrollmentStatusHistory::status);
        check_activated_status(known, requested).map_err(reject)?;

        Ok(())
    }

    /// Checks one requested record against the student's timeline.
    fn check_against_timeline(
        &self,
        now: OffsetDateTime,
        own: &[EnrollmentStatusHistory],
        requested: &EnrollmentStatusHistory,
    ) -> Result<(), RejectReason> {
        let calendar: &Calendar = self.reconciler.calendar();
        let timeline: Vec<&EnrollmentStatusHistory> = own
            .iter()
            .filter(|record| record.location_id() == requested.location_id())
            .collect();

        if timeline
            .iter()
            .any(|record| record.matches_by_day(requested, calendar))
        {
            return Ok(());
        }

        self.reconciler
            .policy()
            .check_create_status(requested.status())?;

        let Some(current) = timeline
            .iter()
            .copied()
            .find(|record| record.is_active_at(now))
            .or_else(|| timeline.iter().copied().max_by_key(|r| r.start_date()))
        else {
            return Ok(());
        };

        self.reconciler
            .policy()
            .decide(Some(current), requested, calendar, now)
            .map(|_| ())
    }
}
