// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order-driven enrollment status changes.
//!
//! Each entry point translates one order event into timeline changes at
//! the locations it touched. Recording the resulting status and
//! re-evaluating student activation are injected strategies, so the
//! control flow here does not depend on how either is carried out.

use crate::activation::StudentActivationManager;
use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{EnrollmentStore, UserAccessPath};
use crate::reconcile::{Action, TimelineReconciler, create_record};
use enrollment_domain::{
    EnrollmentStatus, EnrollmentStatusHistory, OrderEventLog, end_before,
};
use tracing::{debug, info, warn};

/// Records `status` for the order at its primary location.
pub type SyncFn<'a, S> = Box<
    dyn Fn(&RequestContext, &mut S, &OrderEventLog, EnrollmentStatus) -> Result<(), CoreError>
        + 'a,
>;

/// Re-evaluates activation of the given students.
pub type ReactivateFn<'a, S> =
    Box<dyn Fn(&RequestContext, &mut S, &[String]) -> Result<(), CoreError> + 'a>;

/// Statuses an order may record.
const SYNCABLE_STATUSES: [EnrollmentStatus; 6] = [
    EnrollmentStatus::Enrolled,
    EnrollmentStatus::Withdrawn,
    EnrollmentStatus::Graduated,
    EnrollmentStatus::Temporary,
    EnrollmentStatus::Potential,
    EnrollmentStatus::Loa,
];

/// What handling an order event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The event changed stored state.
    Applied,
    /// The event was acknowledged without changes.
    Skipped(&'static str),
}

/// Default strategy for recording an order's status.
///
/// Orders whose start is after their end, and statuses an order cannot
/// set, are logged and ignored. Otherwise the record is created with a
/// collision-free start, the student's access to the location is ensured,
/// and activation is re-evaluated.
///
/// # Errors
///
/// Returns `CoreError::ExistingData` if the same order already produced
/// the record, or the first repository failure.
pub fn sync_enrollment_status_history<S>(
    ctx: &RequestContext,
    store: &mut S,
    event: &OrderEventLog,
    status: EnrollmentStatus,
    activation: &StudentActivationManager,
) -> Result<(), CoreError>
where
    S: EnrollmentStore + ?Sized,
{
    if event.has_inverted_dates() {
        warn!(
            order_id = %event.order_id,
            start_date = ?event.start_date,
            end_date = ?event.end_date,
            "order starts after it ends, ignoring"
        );
        return Ok(());
    }
    if !SYNCABLE_STATUSES.contains(&status) {
        warn!(order_id = %event.order_id, %status, "status cannot be set by an order, ignoring");
        return Ok(());
    }

    let record: EnrollmentStatusHistory =
        event.to_history(status, ctx.organization_id(), ctx.now())?;
    create_record(ctx, store, &record)?;

    let path: UserAccessPath = UserAccessPath {
        user_id: event.student_id.clone(),
        location_id: event.location_id.clone(),
        organization_id: ctx.organization_id().to_string(),
    };
    ctx.call("upsert_multiple", || store.upsert_multiple(&[path]))?;

    activation.deactivate_and_reactivate(ctx, store, std::slice::from_ref(&event.student_id))
}

/// Applies order events to enrollment timelines.
pub struct OrderFlowHandler<'a, S> {
    reconciler: TimelineReconciler,
    sync: SyncFn<'a, S>,
    reactivate: ReactivateFn<'a, S>,
}

impl<'a, S> OrderFlowHandler<'a, S>
where
    S: EnrollmentStore + 'a,
{
    #[must_use]
    pub fn new(
        reconciler: TimelineReconciler,
        sync: SyncFn<'a, S>,
        reactivate: ReactivateFn<'a, S>,
    ) -> Self {
        Self {
            reconciler,
            sync,
            reactivate,
        }
    }

    /// Builds a handler using the default sync and activation strategies.
    #[must_use]
    pub fn with_activation(
        reconciler: TimelineReconciler,
        activation: &StudentActivationManager,
    ) -> Self {
        let for_sync: StudentActivationManager = activation.clone();
        let for_reactivate: StudentActivationManager = activation.clone();
        Self::new(
            reconciler,
            Box::new(
                move |ctx: &RequestContext,
                      store: &mut S,
                      event: &OrderEventLog,
                      status: EnrollmentStatus| {
                    sync_enrollment_status_history(ctx, store, event, status, &for_sync)
                },
            ),
            Box::new(
                move |ctx: &RequestContext, store: &mut S, student_ids: &[String]| {
                    for_reactivate.deactivate_and_reactivate(ctx, store, student_ids)
                },
            ),
        )
    }

    /// Records the default POTENTIAL status at a location the student has
    /// no history at.
    ///
    /// # Errors
    ///
    /// Returns the sync strategy's failure.
    pub fn handle_for_new_location(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        event: &OrderEventLog,
    ) -> Result<OrderOutcome, CoreError> {
        (self.sync)(ctx, store, event, EnrollmentStatus::Potential)?;
        Ok(OrderOutcome::Applied)
    }

    /// Replaces an active TEMPORARY window with POTENTIAL at a location the
    /// student already has history at.
    ///
    /// The order's end date is clamped so it never extends past the end
    /// already scheduled for the window.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidData` if the replacement is rejected, or
    /// the first repository or sync failure.
    pub fn handle_existed_locations(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        event: &OrderEventLog,
    ) -> Result<OrderOutcome, CoreError> {
        let current: Vec<EnrollmentStatusHistory> =
            ctx.call("get_by_student_and_location", || {
                store.get_by_student_and_location(
                    &event.student_id,
                    &event.location_id,
                    Some(ctx.now()),
                )
            })?;
        let Some(active) = current.first() else {
            return Ok(OrderOutcome::Skipped("no active status at location"));
        };
        if active.status() != EnrollmentStatus::Temporary {
            return Ok(OrderOutcome::Skipped("active status is not temporary"));
        }

        let mut event: OrderEventLog = event.clone();
        if let Some(active_end) = active.end_date()
            && event.end_date.is_none_or(|end| active_end < end)
        {
            event.end_date = Some(active_end);
        }

        let requested: EnrollmentStatusHistory =
            event.to_history(EnrollmentStatus::Potential, ctx.organization_id(), ctx.now())?;
        let action: Action = self
            .reconciler
            .reconcile(ctx, store, &requested)?;
        let Action::DeactivateAndCreate {
            existing, end_date, ..
        } = action
        else {
            return Ok(OrderOutcome::Skipped("temporary window already replaced"));
        };

        ctx.call("deactivate", || store.deactivate(&existing, end_date))?;
        info!(
            student_id = %event.student_id,
            location_id = %event.location_id,
            order_id = %event.order_id,
            "temporary status closed by order"
        );
        (self.sync)(ctx, store, &event, EnrollmentStatus::Potential)?;
        Ok(OrderOutcome::Applied)
    }

    /// Moves the student to the status an enrollment, withdrawal,
    /// graduation, leave or resume order targets.
    ///
    /// Duplicate deliveries are idempotent: if the active status already
    /// equals the target, nothing changes.
    ///
    /// # Errors
    ///
    /// Returns the first repository or sync failure.
    pub fn handle_enrollment_status_update(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        event: &OrderEventLog,
    ) -> Result<OrderOutcome, CoreError> {
        let Some(target) = event.order_type.target_status() else {
            return Ok(OrderOutcome::Skipped("order type has no target status"));
        };

        let current: Vec<EnrollmentStatusHistory> =
            ctx.call("get_by_student_and_location", || {
                store.get_by_student_and_location(
                    &event.student_id,
                    &event.location_id,
                    Some(ctx.now()),
                )
            })?;
        if let Some(active) = current.first() {
            if active.status() == target {
                debug!(
                    order_id = %event.order_id,
                    status = %target,
                    "order already applied"
                );
                return Ok(OrderOutcome::Skipped("status already applied"));
            }
            let end_date = end_before(event.start_date.unwrap_or_else(|| ctx.now()));
            ctx.call("deactivate", || store.deactivate(active, end_date))?;
            info!(
                student_id = %event.student_id,
                location_id = %event.location_id,
                status = %active.status(),
                order_id = %event.order_id,
                "enrollment status closed by order"
            );
        }

        (self.sync)(ctx, store, event, target)?;
        Ok(OrderOutcome::Applied)
    }

    /// Reverts the records a voided order produced.
    ///
    /// At each touched location the latest record is removed if the voided
    /// order produced it. Its predecessor is reopened; without one, the
    /// student's access to the location is removed too.
    ///
    /// # Errors
    ///
    /// Returns the first repository or activation failure.
    pub fn handle_void_enrollment_status(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        event: &OrderEventLog,
    ) -> Result<OrderOutcome, CoreError> {
        let mut voided: usize = 0;
        for location_id in event.touched_locations() {
            let locations: [String; 1] = [location_id.to_string()];
            let latest: Vec<EnrollmentStatusHistory> =
                ctx.call("get_latest_of_locations", || {
                    store.get_latest_of_locations(&event.student_id, &locations, 2)
                })?;
            let Some(newest) = latest.first() else {
                continue;
            };
            if newest.order_id() != Some(event.order_id.as_str()) {
                debug!(
                    location_id,
                    order_id = %event.order_id,
                    "latest status not produced by voided order"
                );
                continue;
            }

            ctx.call("soft_delete", || {
                store.soft_delete(std::slice::from_ref(newest), ctx.now())
            })?;
            match latest.get(1) {
                Some(previous) => {
                    ctx.call("update", || store.update(previous, None))?;
                }
                None => {
                    ctx.call("soft_delete_by_user_and_locations", || {
                        store.soft_delete_by_user_and_locations(
                            &event.student_id,
                            &locations,
                            ctx.now(),
                        )
                    })?;
                }
            }
            info!(
                student_id = %event.student_id,
                location_id,
                order_id = %event.order_id,
                status = %newest.status(),
                "enrollment status voided"
            );
            voided += 1;
        }

        if voided == 0 {
            return Ok(OrderOutcome::Skipped("nothing produced by voided order"));
        }
        (self.reactivate)(ctx, store, std::slice::from_ref(&event.student_id))?;
        Ok(OrderOutcome::Applied)
    }
}
