// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use enrollment_domain::{EnrollmentStatusHistory, truncate_to_second};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::data_models::{EnrollmentStatusHistoryRow, encode_timestamp, rows_into_domain};
use crate::diesel_schema::enrollment_status_histories as esh;
use crate::error::PersistenceError;

/// Records at one (student, location), oldest first.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `student_id` - The student
/// * `location_id` - The location
/// * `active_at` - When set, only the record active at this instant
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_by_student_and_location(
    conn: &mut SqliteConnection,
    student_id: &str,
    location_id: &str,
    active_at: Option<OffsetDateTime>,
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    debug!(student_id, location_id, ?active_at, "Loading timeline");

    let mut query = esh::table
        .filter(esh::student_id.eq(student_id))
        .filter(esh::location_id.eq(location_id))
        .filter(esh::deleted_at.is_null())
        .into_boxed();

    if let Some(instant) = active_at {
        let at: String = encode_timestamp(instant)?;
        query = query
            .filter(esh::start_date.le(at.clone()))
            .filter(esh::end_date.is_null().or(esh::end_date.gt(at)));
    }

    let rows: Vec<EnrollmentStatusHistoryRow> = query
        .order(esh::start_date.asc())
        .select(EnrollmentStatusHistoryRow::as_select())
        .load(conn)?;

    rows_into_domain(rows)
}

/// Every record of a student across locations, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_by_student_id(
    conn: &mut SqliteConnection,
    student_id: &str,
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    let rows: Vec<EnrollmentStatusHistoryRow> = esh::table
        .filter(esh::student_id.eq(student_id))
        .filter(esh::deleted_at.is_null())
        .order((esh::start_date.asc(), esh::location_id.asc()))
        .select(EnrollmentStatusHistoryRow::as_select())
        .load(conn)?;

    rows_into_domain(rows)
}

/// Every record of the given students, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_by_student_ids(
    conn: &mut SqliteConnection,
    student_ids: &[String],
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<EnrollmentStatusHistoryRow> = esh::table
        .filter(esh::student_id.eq_any(student_ids))
        .filter(esh::deleted_at.is_null())
        .order((esh::start_date.asc(), esh::student_id.asc()))
        .select(EnrollmentStatusHistoryRow::as_select())
        .load(conn)?;

    rows_into_domain(rows)
}

/// The `limit` most recent records of a student at the given locations,
/// newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_latest_of_locations(
    conn: &mut SqliteConnection,
    student_id: &str,
    location_ids: &[String],
    limit: usize,
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    if location_ids.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let rows: Vec<EnrollmentStatusHistoryRow> = esh::table
        .filter(esh::student_id.eq(student_id))
        .filter(esh::location_id.eq_any(location_ids))
        .filter(esh::deleted_at.is_null())
        .order(esh::start_date.desc())
        .limit(i64::try_from(limit).unwrap_or(i64::MAX))
        .select(EnrollmentStatusHistoryRow::as_select())
        .load(conn)?;

    rows_into_domain(rows)
}

/// Records of the given students active at `now`, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_active_by_student_ids(
    conn: &mut SqliteConnection,
    student_ids: &[String],
    now: OffsetDateTime,
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    if student_ids.is_empty() {
        return Ok(Vec::new());
    }
    let at: String = encode_timestamp(now)?;

    let rows: Vec<EnrollmentStatusHistoryRow> = esh::table
        .filter(esh::student_id.eq_any(student_ids))
        .filter(esh::deleted_at.is_null())
        .filter(esh::start_date.le(at.clone()))
        .filter(esh::end_date.is_null().or(esh::end_date.gt(at)))
        .order(esh::start_date.asc())
        .select(EnrollmentStatusHistoryRow::as_select())
        .load(conn)?;

    rows_into_domain(rows)
}

/// Records sharing `candidate`'s (student, location, status) that start
/// within the same second as the candidate.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn get_same_start_date(
    conn: &mut SqliteConnection,
    candidate: &EnrollmentStatusHistory,
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    let second: OffsetDateTime = truncate_to_second(candidate.start_date());
    let from: String = encode_timestamp(second)?;
    let until: String = encode_timestamp(second + Duration::SECOND)?;

    let rows: Vec<EnrollmentStatusHistoryRow> = esh::table
        .filter(esh::student_id.eq(candidate.student_id()))
        .filter(esh::location_id.eq(candidate.location_id()))
        .filter(esh::enrollment_status.eq(candidate.status().as_str()))
        .filter(esh::start_date.ge(from))
        .filter(esh::start_date.lt(until))
        .filter(esh::deleted_at.is_null())
        .order(esh::start_date.asc())
        .select(EnrollmentStatusHistoryRow::as_select())
        .load(conn)?;

    rows_into_domain(rows)
}
