// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and the text encoding used for stored timestamps.
//!
//! Instants are stored as fixed-width UTC text with microsecond precision,
//! so comparing two stored values as strings orders them in time.

use crate::diesel_schema::{enrollment_status_histories, student_activations, user_access_paths};
use crate::error::PersistenceError;
use diesel::prelude::*;
use enrollment::{StudentActivation, UserAccessPath};
use enrollment_domain::{EnrollmentStatus, EnrollmentStatusHistory, truncate_to_storage};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Encodes an instant in the stored timestamp format.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidTimestamp` if the instant cannot be
/// formatted (for example a year outside 0..=9999).
pub fn encode_timestamp(instant: OffsetDateTime) -> Result<String, PersistenceError> {
    let utc: OffsetDateTime = truncate_to_storage(instant).to_offset(UtcOffset::UTC);
    Ok(utc.format(TIMESTAMP_FORMAT)?)
}

/// Decodes a stored timestamp.
///
/// # Errors
///
/// Returns `PersistenceError::InvalidTimestamp` if the text is malformed.
pub fn decode_timestamp(text: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)?.assume_utc())
}

fn decode_optional(text: Option<&str>) -> Result<Option<OffsetDateTime>, PersistenceError> {
    text.map(decode_timestamp).transpose()
}

/// Diesel row for an enrollment status history.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = enrollment_status_histories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EnrollmentStatusHistoryRow {
    pub student_id: String,
    pub location_id: String,
    pub enrollment_status: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub organization_id: String,
    pub order_id: Option<String>,
    pub order_sequence_number: Option<i32>,
}

impl EnrollmentStatusHistoryRow {
    /// Rebuilds the domain record.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored status or timestamp cannot be decoded,
    /// or if an identifier is empty.
    pub fn into_domain(self) -> Result<EnrollmentStatusHistory, PersistenceError> {
        let status: EnrollmentStatus = self
            .enrollment_status
            .parse()
            .map_err(|e: enrollment_domain::DomainError| PersistenceError::InvalidRow(e.to_string()))?;
        let start_date: OffsetDateTime = decode_timestamp(&self.start_date)?;
        let end_date: Option<OffsetDateTime> = decode_optional(self.end_date.as_deref())?;

        let mut builder = EnrollmentStatusHistory::builder(self.student_id, self.location_id, status)
            .organization(self.organization_id)
            .start_date(start_date)
            .end_date(end_date);
        if let Some(order_id) = self.order_id {
            builder = builder.order(order_id, self.order_sequence_number.unwrap_or_default());
        }
        builder
            .build(start_date)
            .map_err(|e| PersistenceError::InvalidRow(e.to_string()))
    }
}

/// Decodes a list of rows, failing on the first malformed one.
///
/// # Errors
///
/// Returns the first decoding failure.
pub fn rows_into_domain(
    rows: Vec<EnrollmentStatusHistoryRow>,
) -> Result<Vec<EnrollmentStatusHistory>, PersistenceError> {
    rows.into_iter()
        .map(EnrollmentStatusHistoryRow::into_domain)
        .collect()
}

/// Diesel row for a user access path.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = user_access_paths)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserAccessPathRow {
    pub user_id: String,
    pub location_id: String,
    pub organization_id: String,
}

impl From<UserAccessPathRow> for UserAccessPath {
    fn from(row: UserAccessPathRow) -> Self {
        Self {
            user_id: row.user_id,
            location_id: row.location_id,
            organization_id: row.organization_id,
        }
    }
}

/// Diesel row for a student's activation state.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = student_activations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StudentActivationRow {
    pub student_id: String,
    pub deactivated_at: Option<String>,
}

impl StudentActivationRow {
    /// # Errors
    ///
    /// Returns an error if the stored deactivation instant is malformed.
    pub fn into_domain(self) -> Result<StudentActivation, PersistenceError> {
        Ok(StudentActivation {
            deactivated_at: decode_optional(self.deactivated_at.as_deref())?,
            student_id: self.student_id,
        })
    }
}
