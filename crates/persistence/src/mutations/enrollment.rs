// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment status history mutations.
//!
//! Rows are addressed by (student, location, status, start date). Deleting
//! only stamps `deleted_at`, so a later create with the same key revives
//! the row instead of inserting a second one.

use diesel::SqliteConnection;
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Text;
use enrollment_domain::EnrollmentStatusHistory;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::data_models::encode_timestamp;
use crate::diesel_schema::enrollment_status_histories as esh;
use crate::error::PersistenceError;

fn describe(record: &EnrollmentStatusHistory, start: &str) -> String {
    format!(
        "{}/{}/{}/{start}",
        record.student_id(),
        record.location_id(),
        record.status()
    )
}

/// Stores a new record.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `record` - The record to store
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if a live record already
/// holds the key, or another error if the write fails.
pub fn create(
    conn: &mut SqliteConnection,
    record: &EnrollmentStatusHistory,
) -> Result<(), PersistenceError> {
    let start: String = encode_timestamp(record.start_date())?;
    let end: Option<String> = record.end_date().map(encode_timestamp).transpose()?;

    let revived: usize = diesel::update(esh::table)
        .filter(esh::student_id.eq(record.student_id()))
        .filter(esh::location_id.eq(record.location_id()))
        .filter(esh::enrollment_status.eq(record.status().as_str()))
        .filter(esh::start_date.eq(&start))
        .filter(esh::deleted_at.is_not_null())
        .set((
            esh::end_date.eq(end.as_deref()),
            esh::organization_id.eq(record.organization_id()),
            esh::order_id.eq(record.order_id()),
            esh::order_sequence_number.eq(record.order_sequence_number()),
            esh::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
            esh::deleted_at.eq(None::<String>),
        ))
        .execute(conn)?;

    if revived > 0 {
        debug!(key = %describe(record, &start), "Revived soft-deleted record");
        return Ok(());
    }

    diesel::insert_into(esh::table)
        .values((
            esh::student_id.eq(record.student_id()),
            esh::location_id.eq(record.location_id()),
            esh::enrollment_status.eq(record.status().as_str()),
            esh::start_date.eq(&start),
            esh::end_date.eq(end.as_deref()),
            esh::organization_id.eq(record.organization_id()),
            esh::order_id.eq(record.order_id()),
            esh::order_sequence_number.eq(record.order_sequence_number()),
        ))
        .execute(conn)?;

    debug!(key = %describe(record, &start), "Created record");
    Ok(())
}

/// Replaces the end date of a live record. `None` reopens it.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no live record holds the key.
pub fn set_end_date(
    conn: &mut SqliteConnection,
    record: &EnrollmentStatusHistory,
    end_date: Option<OffsetDateTime>,
) -> Result<(), PersistenceError> {
    let start: String = encode_timestamp(record.start_date())?;
    let end: Option<String> = end_date.map(encode_timestamp).transpose()?;

    let updated: usize = diesel::update(esh::table)
        .filter(esh::student_id.eq(record.student_id()))
        .filter(esh::location_id.eq(record.location_id()))
        .filter(esh::enrollment_status.eq(record.status().as_str()))
        .filter(esh::start_date.eq(&start))
        .filter(esh::deleted_at.is_null())
        .set((
            esh::end_date.eq(end.as_deref()),
            esh::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(describe(record, &start)));
    }

    debug!(key = %describe(record, &start), end = ?end, "Updated end date");
    Ok(())
}

/// Marks records deleted at `deleted_at`. Missing records are ignored.
///
/// # Errors
///
/// Returns an error if a write fails.
pub fn soft_delete(
    conn: &mut SqliteConnection,
    records: &[EnrollmentStatusHistory],
    deleted_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let at: String = encode_timestamp(deleted_at)?;
    let mut deleted: usize = 0;

    for record in records {
        let start: String = encode_timestamp(record.start_date())?;
        deleted += diesel::update(esh::table)
            .filter(esh::student_id.eq(record.student_id()))
            .filter(esh::location_id.eq(record.location_id()))
            .filter(esh::enrollment_status.eq(record.status().as_str()))
            .filter(esh::start_date.eq(&start))
            .filter(esh::deleted_at.is_null())
            .set((
                esh::deleted_at.eq(&at),
                esh::updated_at.eq(sql::<Text>("CURRENT_TIMESTAMP")),
            ))
            .execute(conn)?;
    }

    info!(requested = records.len(), deleted, "Soft-deleted enrollment records");
    Ok(())
}
