// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{EnrollmentMode, EnrollmentStatus, EnrollmentStatusHistory, ORDER_FLOW_STATUSES, TransitionPolicy};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

/// Fixed request time used across domain tests.
pub const NOW: OffsetDateTime = datetime!(2026-03-10 15:30 UTC);

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

pub fn record(
    status: EnrollmentStatus,
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
) -> EnrollmentStatusHistory {
    EnrollmentStatusHistory::builder("student-1", "location-1", status)
        .organization("org-1")
        .start_date(start)
        .end_date(end)
        .build(NOW)
        .unwrap()
}

pub fn direct_edit() -> TransitionPolicy {
    TransitionPolicy::new(EnrollmentMode::DirectEdit, &ORDER_FLOW_STATUSES)
}

pub fn order_flow() -> TransitionPolicy {
    TransitionPolicy::new(EnrollmentMode::OrderFlow, &ORDER_FLOW_STATUSES)
}
