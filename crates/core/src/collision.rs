// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Start-date collision resolution.
//!
//! Stored records are keyed by (student, location, status, start date).
//! Repeated imports of future-dated orders routinely target the same
//! nominal start, so a future candidate is nudged forward one storage
//! unit past the latest conflicting start.

use crate::context::RequestContext;
use crate::error::{CoreError, ENROLLMENT_STATUS_HISTORIES};
use crate::ports::EnrollmentHistoryReader;
use enrollment_domain::{EnrollmentStatusHistory, FieldPath, HistoryField, STORAGE_RESOLUTION};
use time::OffsetDateTime;
use tracing::debug;

/// Computes a collision-free start for `candidate`.
///
/// `conflicts` are existing records sharing the candidate's key prefix.
/// Past-dated candidates pass through unchanged.
#[must_use]
pub fn resolve_start_date(
    candidate: OffsetDateTime,
    conflicts: &[EnrollmentStatusHistory],
    now: OffsetDateTime,
) -> OffsetDateTime {
    if candidate <= now {
        return candidate;
    }
    conflicts
        .iter()
        .map(EnrollmentStatusHistory::start_date)
        .max()
        .filter(|latest| *latest >= candidate)
        .map_or(candidate, |latest| latest + STORAGE_RESOLUTION)
}

/// Looks up same-start records for `candidate` and returns it with a
/// collision-free start date.
///
/// # Errors
///
/// Returns `CoreError::ExistingData` on the order id if a conflicting
/// record was produced by the same order, or the repository failure.
pub fn resolve_for_store<S>(
    ctx: &RequestContext,
    store: &mut S,
    candidate: &EnrollmentStatusHistory,
) -> Result<EnrollmentStatusHistory, CoreError>
where
    S: EnrollmentHistoryReader + ?Sized,
{
    if !candidate.is_future_at(ctx.now()) {
        return Ok(candidate.clone());
    }

    let conflicts: Vec<EnrollmentStatusHistory> =
        ctx.call("get_same_start_date", || store.get_same_start_date(candidate))?;
    if conflicts.is_empty() {
        return Ok(candidate.clone());
    }

    if let Some(order_id) = candidate.order_id()
        && conflicts
            .iter()
            .any(|existing| existing.order_id() == Some(order_id))
    {
        return Err(CoreError::ExistingData {
            field: FieldPath::bare(HistoryField::OrderId),
            entity: ENROLLMENT_STATUS_HISTORIES.to_string(),
        });
    }

    let start_date: OffsetDateTime =
        resolve_start_date(candidate.start_date(), &conflicts, ctx.now());
    debug!(
        student_id = candidate.student_id(),
        location_id = candidate.location_id(),
        status = %candidate.status(),
        from = %candidate.start_date(),
        to = %start_date,
        "start date nudged past existing records"
    );
    Ok(candidate.with_start_date(start_date))
}
