// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment status transition rules.
//!
//! Given the record currently active at a (student, location) and a
//! requested record, decide whether the requested change is legal. The
//! rules are pure: "now" and the organization calendar are passed in.
//!
//! Start dates are always compared at calendar-day granularity.

use crate::calendar::Calendar;
use crate::field::HistoryField;
use crate::history::EnrollmentStatusHistory;
use crate::settings::{EnrollmentMode, EnrollmentSettings};
use crate::status::EnrollmentStatus;
use time::OffsetDateTime;

/// Why a requested enrollment status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// An active NON_POTENTIAL record can only be followed by NON_POTENTIAL.
    ChangingNonPotentialToOtherStatus,
    /// Same status requested with a different start day.
    ChangingStartDateWithoutChangingStatus,
    /// Requested start day is before the active record's start day.
    ActivatedStartDateAfterReqStartDate,
    /// Different status requested on the active record's start day.
    ChangingStatusWithoutChangingStartDate,
    /// In order flow, only order-flow statuses may be changed directly.
    ChangingNonErpStatusToOtherStatusAtOrderFlow,
    /// The student would be left with TEMPORARY statuses only.
    MissingActivatedEnrollmentStatus,
    /// A TEMPORARY window would extend over a scheduled future status.
    EndDateBeforeFutureStatus,
    /// In order flow, new records must carry an order-flow status.
    StatusNotAllowedAtOrderFlow,
}

impl RejectReason {
    /// The field the rejection is reported against.
    #[must_use]
    pub const fn field(&self) -> HistoryField {
        match self {
            Self::ChangingNonPotentialToOtherStatus
            | Self::ChangingNonErpStatusToOtherStatusAtOrderFlow
            | Self::MissingActivatedEnrollmentStatus
            | Self::StatusNotAllowedAtOrderFlow => HistoryField::EnrollmentStatus,
            Self::ChangingStartDateWithoutChangingStatus
            | Self::ActivatedStartDateAfterReqStartDate
            | Self::ChangingStatusWithoutChangingStartDate => HistoryField::StartDate,
            Self::EndDateBeforeFutureStatus => HistoryField::EndDate,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ChangingNonPotentialToOtherStatus => "ChangingNonPotentialToOtherStatus",
            Self::ChangingStartDateWithoutChangingStatus => {
                "ChangingStartDateWithoutChangingStatus"
            }
            Self::ActivatedStartDateAfterReqStartDate => "ActivatedStartDateAfterReqStartDate",
            Self::ChangingStatusWithoutChangingStartDate => {
                "ChangingStatusWithoutChangingStartDate"
            }
            Self::ChangingNonErpStatusToOtherStatusAtOrderFlow => {
                "ChangingNonERPStatusToOtherStatusAtOrderFlow"
            }
            Self::MissingActivatedEnrollmentStatus => "MissingActivatedEnrollmentStatus",
            Self::EndDateBeforeFutureStatus => "EndDateBeforeFutureStatus",
            Self::StatusNotAllowedAtOrderFlow => "StatusNotAllowedAtOrderFlow",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let description: &str = match self {
            Self::ChangingNonPotentialToOtherStatus => {
                "non-potential status cannot change to another status"
            }
            Self::ChangingStartDateWithoutChangingStatus => {
                "start date cannot change without changing status"
            }
            Self::ActivatedStartDateAfterReqStartDate => {
                "requested start date is before the active status started"
            }
            Self::ChangingStatusWithoutChangingStartDate => {
                "status cannot change without changing start date"
            }
            Self::ChangingNonErpStatusToOtherStatusAtOrderFlow => {
                "status managed by orders cannot be changed directly"
            }
            Self::MissingActivatedEnrollmentStatus => {
                "student must keep at least one non-temporary status"
            }
            Self::EndDateBeforeFutureStatus => {
                "end date overlaps a scheduled future status"
            }
            Self::StatusNotAllowedAtOrderFlow => "status cannot be set directly in order flow",
        };
        write!(f, "{} ({description})", self.as_str())
    }
}

/// Outcome of an accepted transition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The requested record may replace the active one.
    Allowed,
    /// The request restates the active record; nothing changes.
    Unchanged,
}

/// Transition rules bound to an enrollment mode and its allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPolicy {
    mode: EnrollmentMode,
    order_flow_statuses: Vec<EnrollmentStatus>,
}

impl TransitionPolicy {
    #[must_use]
    pub fn new(mode: EnrollmentMode, order_flow_statuses: &[EnrollmentStatus]) -> Self {
        Self {
            mode,
            order_flow_statuses: order_flow_statuses.to_vec(),
        }
    }

    /// Builds the policy from organization settings.
    #[must_use]
    pub fn from_settings(settings: &EnrollmentSettings, mode: EnrollmentMode) -> Self {
        Self::new(mode, settings.order_flow_statuses())
    }

    #[must_use]
    pub const fn mode(&self) -> EnrollmentMode {
        self.mode
    }

    /// Returns true if `status` may be set freely while in order flow.
    #[must_use]
    pub fn is_order_flow_status(&self, status: EnrollmentStatus) -> bool {
        self.order_flow_statuses.contains(&status)
    }

    /// Decides whether `requested` may replace `active`.
    ///
    /// # Errors
    ///
    /// Returns the `RejectReason` of the first rule the request violates.
    pub fn decide(
        &self,
        active: Option<&EnrollmentStatusHistory>,
        requested: &EnrollmentStatusHistory,
        calendar: &Calendar,
        now: OffsetDateTime,
    ) -> Result<Transition, RejectReason> {
        let Some(active) = active else {
            return Ok(Transition::Allowed);
        };

        let active_day = calendar.day_of(active.start_date());
        let requested_day = calendar.day_of(requested.start_date());

        if active.status() == requested.status() && active_day == requested_day {
            return Ok(Transition::Unchanged);
        }

        if self.mode.is_order_flow() && !self.is_order_flow_status(active.status()) {
            return Err(RejectReason::ChangingNonErpStatusToOtherStatusAtOrderFlow);
        }

        if active.status().is_locked_terminal()
            && requested.status() != EnrollmentStatus::NonPotential
        {
            return Err(RejectReason::ChangingNonPotentialToOtherStatus);
        }

        if active.status() == requested.status() {
            return Err(RejectReason::ChangingStartDateWithoutChangingStatus);
        }

        let today = calendar.day_of(now);
        if active_day == today && requested_day == today {
            return Ok(Transition::Allowed);
        }
        if active_day > requested_day {
            return Err(RejectReason::ActivatedStartDateAfterReqStartDate);
        }
        if active_day == requested_day {
            return Err(RejectReason::ChangingStatusWithoutChangingStartDate);
        }

        Ok(Transition::Allowed)
    }

    /// Checks that a record created while in order flow carries an
    /// order-flow status. Always passes in direct-edit mode.
    ///
    /// # Errors
    ///
    /// Returns `RejectReason::StatusNotAllowedAtOrderFlow` otherwise.
    pub fn check_create_status(&self, status: EnrollmentStatus) -> Result<(), RejectReason> {
        if self.mode.is_order_flow() && !self.is_order_flow_status(status) {
            return Err(RejectReason::StatusNotAllowedAtOrderFlow);
        }
        Ok(())
    }
}

/// Checks that a student keeps at least one activated status.
///
/// `known` are the student's currently active statuses across all
/// locations, `requested` the statuses being submitted. Only a request that
/// introduces a TEMPORARY status can trip this rule.
///
/// # Errors
///
/// Returns `RejectReason::MissingActivatedEnrollmentStatus` if every known
/// and requested status is TEMPORARY.
pub fn check_activated_status<K, R>(known: K, requested: R) -> Result<(), RejectReason>
where
    K: IntoIterator<Item = EnrollmentStatus>,
    R: IntoIterator<Item = EnrollmentStatus> + Clone,
{
    let requests_temporary: bool = requested
        .clone()
        .into_iter()
        .any(|status| status == EnrollmentStatus::Temporary);
    if !requests_temporary {
        return Ok(());
    }
    let has_activated: bool = known
        .into_iter()
        .chain(requested)
        .any(|status| status.is_activated());
    if has_activated {
        Ok(())
    } else {
        Err(RejectReason::MissingActivatedEnrollmentStatus)
    }
}
