// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timeline reconciliation.
//!
//! Merges one requested record into the stored timeline of a
//! (student, location) so that at most one record is active at any
//! instant. Planning is pure; applying the plan goes through the store.

use crate::collision::resolve_for_store;
use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{EnrollmentHistoryReader, EnrollmentHistoryWriter};
use enrollment_domain::{
    Calendar, EnrollmentStatus, EnrollmentStatusHistory, FieldPath, RejectReason, Transition,
    TransitionPolicy, end_before,
};
use time::OffsetDateTime;
use tracing::{debug, info};

/// The persistence instruction a reconciliation produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The timeline already holds the requested record.
    NoOp,
    /// Store the requested record without touching existing ones.
    Create(EnrollmentStatusHistory),
    /// Move the end of an existing TEMPORARY window in place.
    Update {
        existing: EnrollmentStatusHistory,
        new_end_date: Option<OffsetDateTime>,
    },
    /// Close the active record at `end_date`, then store `created`.
    DeactivateAndCreate {
        existing: EnrollmentStatusHistory,
        end_date: OffsetDateTime,
        created: EnrollmentStatusHistory,
    },
}

/// Plans and applies timeline changes under one transition policy.
#[derive(Debug, Clone)]
pub struct TimelineReconciler {
    policy: TransitionPolicy,
    calendar: Calendar,
}

impl TimelineReconciler {
    #[must_use]
    pub const fn new(policy: TransitionPolicy, calendar: Calendar) -> Self {
        Self { policy, calendar }
    }

    #[must_use]
    pub const fn policy(&self) -> &TransitionPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Decides how `requested` merges into `existing`.
    ///
    /// `existing` may hold records of other timelines; only those of the
    /// requested (student, location) are considered.
    ///
    /// # Errors
    ///
    /// Returns the `RejectReason` if the change violates a transition rule
    /// or would engulf a scheduled future status.
    pub fn plan(
        &self,
        now: OffsetDateTime,
        existing: &[EnrollmentStatusHistory],
        requested: &EnrollmentStatusHistory,
    ) -> Result<Action, RejectReason> {
        let timeline: Vec<&EnrollmentStatusHistory> = existing
            .iter()
            .filter(|record| record.belongs_to(requested.student_id(), requested.location_id()))
            .collect();

        if timeline.is_empty() {
            return Ok(Action::Create(requested.clone()));
        }

        if timeline
            .iter()
            .any(|record| record.matches_by_day(requested, &self.calendar))
        {
            return Ok(Action::NoOp);
        }

        // Backfills and requests landing in a gap create without closing anything.
        let Some(active) = timeline.iter().copied().find(|record| record.is_active_at(now)) else {
            return fit_before_later(&timeline, None, requested).map(Action::Create);
        };

        if active.status() == EnrollmentStatus::Temporary
            && requested.status() == EnrollmentStatus::Temporary
            && self
                .calendar
                .same_day(active.start_date(), requested.start_date())
        {
            let new_end_date: Option<OffsetDateTime> = requested.end_date();
            let engulfs_future: bool = timeline.iter().any(|record| {
                record.is_future_at(now)
                    && new_end_date.is_none_or(|end| record.start_date() < end)
            });
            if engulfs_future {
                return Err(RejectReason::EndDateBeforeFutureStatus);
            }
            return Ok(Action::Update {
                existing: active.clone(),
                new_end_date,
            });
        }

        match self
            .policy
            .decide(Some(active), requested, &self.calendar, now)?
        {
            Transition::Unchanged => Ok(Action::NoOp),
            Transition::Allowed => {
                let end_date: OffsetDateTime = end_before(requested.start_date());
                // A same-day swap may not close the active record before it started.
                if end_date < active.start_date() {
                    return Err(RejectReason::ActivatedStartDateAfterReqStartDate);
                }
                Ok(Action::DeactivateAndCreate {
                    existing: active.clone(),
                    end_date,
                    created: fit_before_later(&timeline, Some(active), requested)?,
                })
            }
        }
    }

    /// Fetches the requested timeline and plans against it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` on a rejected change, or the
    /// repository failure.
    pub fn reconcile<S>(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        requested: &EnrollmentStatusHistory,
    ) -> Result<Action, CoreError>
    where
        S: EnrollmentHistoryReader + ?Sized,
    {
        let existing: Vec<EnrollmentStatusHistory> =
            ctx.call("get_by_student_and_location", || {
                store.get_by_student_and_location(
                    requested.student_id(),
                    requested.location_id(),
                    None,
                )
            })?;
        self.plan(ctx.now(), &existing, requested)
            .map_err(|reason| CoreError::rejected(FieldPath::bare(reason.field()), reason))
    }

    /// Executes `action`, resolving start-date collisions for new records.
    ///
    /// Returns the action as actually persisted: a created record carries
    /// its final start date.
    ///
    /// # Errors
    ///
    /// Returns the first repository failure; earlier writes are left for
    /// the caller's transaction to roll back.
    pub fn apply<S>(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        action: Action,
    ) -> Result<Action, CoreError>
    where
        S: EnrollmentHistoryReader + EnrollmentHistoryWriter + ?Sized,
    {
        match action {
            Action::NoOp => {
                debug!("timeline already up to date");
                Ok(Action::NoOp)
            }
            Action::Create(record) => {
                let created: EnrollmentStatusHistory = create_record(ctx, store, &record)?;
                Ok(Action::Create(created))
            }
            Action::Update {
                existing,
                new_end_date,
            } => {
                ctx.call("update", || store.update(&existing, new_end_date))?;
                info!(
                    student_id = existing.student_id(),
                    location_id = existing.location_id(),
                    status = %existing.status(),
                    "temporary window end date updated"
                );
                Ok(Action::Update {
                    existing,
                    new_end_date,
                })
            }
            Action::DeactivateAndCreate {
                existing,
                end_date,
                created,
            } => {
                ctx.call("deactivate", || store.deactivate(&existing, end_date))?;
                info!(
                    student_id = existing.student_id(),
                    location_id = existing.location_id(),
                    status = %existing.status(),
                    end_date = %end_date,
                    "enrollment status deactivated"
                );
                let created: EnrollmentStatusHistory = create_record(ctx, store, &created)?;
                Ok(Action::DeactivateAndCreate {
                    existing,
                    end_date,
                    created,
                })
            }
        }
    }
}

/// Keeps `requested` clear of the earliest record scheduled after it.
///
/// An open end is capped one second before that record starts; an explicit
/// end reaching into it is rejected. `replaced` is the record being closed
/// by the same change and is not considered.
fn fit_before_later(
    timeline: &[&EnrollmentStatusHistory],
    replaced: Option<&EnrollmentStatusHistory>,
    requested: &EnrollmentStatusHistory,
) -> Result<EnrollmentStatusHistory, RejectReason> {
    let next: Option<&EnrollmentStatusHistory> = timeline
        .iter()
        .copied()
        .filter(|record| replaced != Some(*record) && record.start_date() > requested.start_date())
        .min_by_key(|record| record.start_date());
    let Some(next) = next else {
        return Ok(requested.clone());
    };

    let limit: OffsetDateTime = end_before(next.start_date());
    match requested.end_date() {
        Some(end) if end < next.start_date() => Ok(requested.clone()),
        None if limit > requested.start_date() => Ok(requested.with_end_date(Some(limit))),
        _ => Err(RejectReason::EndDateBeforeFutureStatus),
    }
}

/// Stores `record` after resolving its start-date collisions.
pub(crate) fn create_record<S>(
    ctx: &RequestContext,
    store: &mut S,
    record: &EnrollmentStatusHistory,
) -> Result<EnrollmentStatusHistory, CoreError>
where
    S: EnrollmentHistoryReader + EnrollmentHistoryWriter + ?Sized,
{
    let record: EnrollmentStatusHistory = resolve_for_store(ctx, store, record)?;
    ctx.call("create", || store.create(&record))?;
    info!(
        student_id = record.student_id(),
        location_id = record.location_id(),
        status = %record.status(),
        order_id = record.order_id().unwrap_or_default(),
        "enrollment status created"
    );
    Ok(record)
}
