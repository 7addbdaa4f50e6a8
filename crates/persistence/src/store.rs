// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The enrollment store backed by one open `SQLite` connection.

use diesel::SqliteConnection;
use ::enrollment::{
    ActivationWriter, EnrollmentHistoryReader, EnrollmentHistoryWriter, RepositoryError,
    StudentActivation, UserAccessPath, UserAccessPathWriter,
};
use enrollment_domain::{EnrollmentStatus, EnrollmentStatusHistory};
use time::OffsetDateTime;

use crate::mutations::{access_paths, activation, enrollment};
use crate::queries::enrollment as history;

/// Implements every enrollment capability on a borrowed connection.
///
/// Obtained from [`crate::Persistence::transaction`], where every call
/// made through it shares one database transaction.
pub struct SqliteStore<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteStore<'c> {
    pub(crate) const fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

impl EnrollmentHistoryReader for SqliteStore<'_> {
    fn get_by_student_and_location(
        &mut self,
        student_id: &str,
        location_id: &str,
        active_at: Option<OffsetDateTime>,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        Ok(history::get_by_student_and_location(
            self.conn,
            student_id,
            location_id,
            active_at,
        )?)
    }

    fn get_by_student_id(
        &mut self,
        student_id: &str,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        Ok(history::get_by_student_id(self.conn, student_id)?)
    }

    fn get_by_student_ids(
        &mut self,
        student_ids: &[String],
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        Ok(history::get_by_student_ids(self.conn, student_ids)?)
    }

    fn get_latest_of_locations(
        &mut self,
        student_id: &str,
        location_ids: &[String],
        limit: usize,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        Ok(history::get_latest_of_locations(
            self.conn,
            student_id,
            location_ids,
            limit,
        )?)
    }

    fn get_inactive_and_active_students(
        &mut self,
        student_ids: &[String],
        excluded: &[EnrollmentStatus],
        now: OffsetDateTime,
    ) -> Result<Vec<StudentActivation>, RepositoryError> {
        let active: Vec<EnrollmentStatusHistory> =
            history::get_active_by_student_ids(self.conn, student_ids, now)?;

        Ok(student_ids
            .iter()
            .map(|student_id| {
                let held: Vec<&EnrollmentStatusHistory> = active
                    .iter()
                    .filter(|r| r.student_id() == student_id)
                    .collect();
                let deactivated_at: Option<OffsetDateTime> =
                    if held.iter().all(|r| excluded.contains(&r.status())) {
                        held.iter().map(|r| r.start_date()).max()
                    } else {
                        None
                    };
                StudentActivation {
                    student_id: student_id.clone(),
                    deactivated_at,
                }
            })
            .collect())
    }

    fn get_same_start_date(
        &mut self,
        candidate: &EnrollmentStatusHistory,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        Ok(history::get_same_start_date(self.conn, candidate)?)
    }
}

impl EnrollmentHistoryWriter for SqliteStore<'_> {
    fn create(&mut self, record: &EnrollmentStatusHistory) -> Result<(), RepositoryError> {
        Ok(enrollment::create(self.conn, record)?)
    }

    fn update(
        &mut self,
        record: &EnrollmentStatusHistory,
        new_end_date: Option<OffsetDateTime>,
    ) -> Result<(), RepositoryError> {
        Ok(enrollment::set_end_date(self.conn, record, new_end_date)?)
    }

    fn deactivate(
        &mut self,
        record: &EnrollmentStatusHistory,
        end_date: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        Ok(enrollment::set_end_date(self.conn, record, Some(end_date))?)
    }

    fn soft_delete(
        &mut self,
        records: &[EnrollmentStatusHistory],
        deleted_at: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        Ok(enrollment::soft_delete(self.conn, records, deleted_at)?)
    }
}

impl UserAccessPathWriter for SqliteStore<'_> {
    fn soft_delete_by_user_and_locations(
        &mut self,
        user_id: &str,
        location_ids: &[String],
        deleted_at: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        Ok(access_paths::soft_delete_by_user_and_locations(
            self.conn,
            user_id,
            location_ids,
            deleted_at,
        )?)
    }

    fn upsert_multiple(&mut self, paths: &[UserAccessPath]) -> Result<(), RepositoryError> {
        Ok(access_paths::upsert_multiple(self.conn, paths)?)
    }
}

impl ActivationWriter for SqliteStore<'_> {
    fn update_activation(
        &mut self,
        activations: &[StudentActivation],
    ) -> Result<(), RepositoryError> {
        Ok(activation::update_activation(self.conn, activations)?)
    }
}
