// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::activation::ActivationFlags;
use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::EnrollmentStore;
use crate::reconcile::{Action, TimelineReconciler};
use enrollment_domain::{EnrollmentStatus, EnrollmentStatusHistory, FieldPath};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, info};

/// One student's enrollment changes within a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentEnrollmentRequest {
    /// Position of the student in the client's request, for error paths.
    pub index: usize,
    pub student_id: String,
    /// Locations the student is attached to without a status change.
    pub location_ids: Vec<String>,
    pub histories: Vec<EnrollmentStatusHistory>,
}

/// Wire form of one requested history entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryPayload {
    pub location_id: String,
    pub enrollment_status: EnrollmentStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

/// Wire form of one student in a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StudentPayload {
    pub student_id: String,
    #[serde(default)]
    pub location_ids: Vec<String>,
    #[serde(default)]
    pub enrollment_status_histories: Vec<HistoryPayload>,
}

impl StudentPayload {
    /// Assembles the request for the student at `index`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingMandatory` at the entry's field path if an
    /// identifier is missing.
    pub fn into_request(
        self,
        index: usize,
        ctx: &RequestContext,
    ) -> Result<StudentEnrollmentRequest, CoreError> {
        let mut histories: Vec<EnrollmentStatusHistory> =
            Vec::with_capacity(self.enrollment_status_histories.len());
        for (entry, payload) in self.enrollment_status_histories.into_iter().enumerate() {
            let mut builder = EnrollmentStatusHistory::builder(
                self.student_id.clone(),
                payload.location_id,
                payload.enrollment_status,
            )
            .organization(ctx.organization_id())
            .end_date(payload.end_date);
            if let Some(start_date) = payload.start_date {
                builder = builder.start_date(start_date);
            }
            let history: EnrollmentStatusHistory = builder.build(ctx.now()).map_err(|err| {
                CoreError::domain(FieldPath::history_entry(index, entry, err.field()), &err)
            })?;
            histories.push(history);
        }
        Ok(StudentEnrollmentRequest {
            index,
            student_id: self.student_id,
            location_ids: self.location_ids,
            histories,
        })
    }
}

/// Applies validated batches of enrollment changes.
#[derive(Debug, Clone)]
pub struct BatchUpsertOrchestrator {
    reconciler: TimelineReconciler,
}

impl BatchUpsertOrchestrator {
    #[must_use]
    pub const fn new(reconciler: TimelineReconciler) -> Self {
        Self { reconciler }
    }

    /// Reconciles every requested record of the batch into the store.
    ///
    /// Existing records of all students are fetched in one call. Records
    /// are processed in request order against a working copy that absorbs
    /// each applied change, so later records see earlier ones.
    ///
    /// # Returns
    ///
    /// The students whose activation state the batch changed. Pass them to
    /// the activation manager once the structural changes are written.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` for a record that violates a rule,
    /// or the first repository failure. Either aborts the batch.
    pub fn upsert_many<S>(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        students: &[StudentEnrollmentRequest],
    ) -> Result<ActivationFlags, CoreError>
    where
        S: EnrollmentStore + ?Sized,
    {
        let changing: Vec<&StudentEnrollmentRequest> = students
            .iter()
            .filter(|student| !student.histories.is_empty())
            .collect();
        if changing.is_empty() {
            debug!("batch carries no enrollment changes");
            return Ok(ActivationFlags::default());
        }

        let mut student_ids: Vec<String> = Vec::with_capacity(changing.len());
        for student in &changing {
            if !student_ids.contains(&student.student_id) {
                student_ids.push(student.student_id.clone());
            }
        }

        let mut working: Vec<EnrollmentStatusHistory> =
            ctx.call("get_by_student_ids", || store.get_by_student_ids(&student_ids))?;

        let before: Vec<bool> = student_ids
            .iter()
            .map(|id| has_activated_status(&working, id, ctx.now()))
            .collect();

        let mut applied: usize = 0;
        for student in &changing {
            for requested in &student.histories {
                let action: Action = self
                    .reconciler
                    .plan(ctx.now(), &working, requested)
                    .map_err(|reason| {
                        CoreError::rejected(FieldPath::history(student.index, reason.field()), reason)
                    })?;
                if action == Action::NoOp {
                    continue;
                }
                let action: Action = self.reconciler.apply(ctx, store, action)?;
                absorb(&mut working, &action);
                applied += 1;
            }
        }

        let mut flags: ActivationFlags = ActivationFlags::default();
        for (id, had_activated) in student_ids.iter().zip(before) {
            let has_activated: bool = has_activated_status(&working, id, ctx.now());
            if had_activated && !has_activated {
                flags.deactivate.push(id.clone());
            } else if !had_activated && has_activated {
                flags.reactivate.push(id.clone());
            }
        }

        info!(
            students = changing.len(),
            applied,
            deactivate = flags.deactivate.len(),
            reactivate = flags.reactivate.len(),
            "enrollment batch upserted"
        );
        Ok(flags)
    }
}

/// Returns true if the student holds a non-TEMPORARY status active at `now`.
fn has_activated_status(
    records: &[EnrollmentStatusHistory],
    student_id: &str,
    now: OffsetDateTime,
) -> bool {
    records.iter().any(|record| {
        record.student_id() == student_id
            && record.is_active_at(now)
            && record.status().is_activated()
    })
}

/// Mirrors an applied action into the working copy.
pub(crate) fn absorb(working: &mut Vec<EnrollmentStatusHistory>, action: &Action) {
    match action {
        Action::NoOp => {}
        Action::Create(created) => working.push(created.clone()),
        Action::Update {
            existing,
            new_end_date,
        } => replace(working, existing, existing.with_end_date(*new_end_date)),
        Action::DeactivateAndCreate {
            existing,
            end_date,
            created,
        } => {
            replace(working, existing, existing.with_end_date(Some(*end_date)));
            working.push(created.clone());
        }
    }
}

fn replace(
    working: &mut [EnrollmentStatusHistory],
    existing: &EnrollmentStatusHistory,
    updated: EnrollmentStatusHistory,
) {
    if let Some(slot) = working.iter_mut().find(|record| **record == *existing) {
        *slot = updated;
    }
}
