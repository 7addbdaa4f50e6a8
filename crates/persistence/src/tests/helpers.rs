// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use enrollment::RequestContext;
use enrollment_domain::{EnrollmentStatus, EnrollmentStatusHistory};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

pub const NOW: OffsetDateTime = datetime!(2026-03-10 15:30 UTC);

pub const ORG: &str = "org-1";
pub const STUDENT: &str = "student-1";
pub const LOCATION: &str = "location-1";

pub type TestResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn hours(n: i64) -> Duration {
    Duration::hours(n)
}

pub fn ctx() -> RequestContext {
    RequestContext::new(ORG, NOW)
}

pub fn record_at(
    student_id: &str,
    location_id: &str,
    status: EnrollmentStatus,
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
) -> EnrollmentStatusHistory {
    EnrollmentStatusHistory::builder(student_id, location_id, status)
        .organization(ORG)
        .start_date(start)
        .end_date(end)
        .build(NOW)
        .unwrap()
}

pub fn record(
    status: EnrollmentStatus,
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
) -> EnrollmentStatusHistory {
    record_at(STUDENT, LOCATION, status, start, end)
}

/// Stores `records` in one transaction.
pub fn seed(persistence: &mut Persistence, records: &[EnrollmentStatusHistory]) {
    use enrollment::EnrollmentHistoryWriter;

    persistence
        .transaction(|store| -> Result<(), enrollment::RepositoryError> {
            for record in records {
                store.create(record)?;
            }
            Ok(())
        })
        .unwrap();
}
