// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability interfaces the enrollment core depends on.
//!
//! Each trait is a narrow slice of what a storage adapter offers, so tests
//! can supply in-memory fakes implementing only what they exercise. A value
//! implementing these traits represents one ambient transaction: the core
//! never begins, commits or rolls back anything itself.

use enrollment_domain::{EnrollmentStatus, EnrollmentStatusHistory};
use time::OffsetDateTime;

/// Failure reported by a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The addressed row does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// The resource kind.
        resource: String,
        /// The identifier that was looked up.
        id: String,
    },
    /// A uniqueness constraint rejected the write.
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    /// Any other storage failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Failure reported by a configuration or feature-toggle collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The caller's credentials were refused.
    #[error("wrong token: {0}")]
    Unauthenticated(String),
    /// The collaborator could not be reached or failed.
    #[error("configuration unavailable: {0}")]
    Unavailable(String),
}

/// Activation state computed for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentActivation {
    pub student_id: String,
    /// `None` means the student is active.
    pub deactivated_at: Option<OffsetDateTime>,
}

/// A student's membership of a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccessPath {
    pub user_id: String,
    pub location_id: String,
    pub organization_id: String,
}

/// Read access to stored enrollment status histories.
///
/// Soft-deleted records are never returned.
pub trait EnrollmentHistoryReader {
    /// Records at one (student, location), oldest first. With `active_at`
    /// set, only the record active at that instant is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_student_and_location(
        &mut self,
        student_id: &str,
        location_id: &str,
        active_at: Option<OffsetDateTime>,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError>;

    /// Every record of a student across locations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_student_id(
        &mut self,
        student_id: &str,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError>;

    /// Every record of the given students, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_student_ids(
        &mut self,
        student_ids: &[String],
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError>;

    /// The `limit` most recent records of a student at the given locations,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_latest_of_locations(
        &mut self,
        student_id: &str,
        location_ids: &[String],
        limit: usize,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError>;

    /// For every given student, the activation state implied by the records
    /// active at `now`: deactivated at the latest active start when every
    /// active record carries one of `excluded`, active otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_inactive_and_active_students(
        &mut self,
        student_ids: &[String],
        excluded: &[EnrollmentStatus],
        now: OffsetDateTime,
    ) -> Result<Vec<StudentActivation>, RepositoryError>;

    /// Records sharing `candidate`'s (student, location, status) whose start
    /// falls within the same second as the candidate's start.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_same_start_date(
        &mut self,
        candidate: &EnrollmentStatusHistory,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError>;
}

/// Write access to stored enrollment status histories.
///
/// Records are addressed by (student, location, status, start date).
pub trait EnrollmentHistoryWriter {
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the primary key is taken.
    fn create(&mut self, record: &EnrollmentStatusHistory) -> Result<(), RepositoryError>;

    /// Replaces the end date of `record`; `None` reopens it.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the write fails.
    fn update(
        &mut self,
        record: &EnrollmentStatusHistory,
        new_end_date: Option<OffsetDateTime>,
    ) -> Result<(), RepositoryError>;

    /// Closes `record` at `end_date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the write fails.
    fn deactivate(
        &mut self,
        record: &EnrollmentStatusHistory,
        end_date: OffsetDateTime,
    ) -> Result<(), RepositoryError>;

    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn soft_delete(
        &mut self,
        records: &[EnrollmentStatusHistory],
        deleted_at: OffsetDateTime,
    ) -> Result<(), RepositoryError>;
}

/// Write access to student location memberships.
pub trait UserAccessPathWriter {
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn soft_delete_by_user_and_locations(
        &mut self,
        user_id: &str,
        location_ids: &[String],
        deleted_at: OffsetDateTime,
    ) -> Result<(), RepositoryError>;

    /// Inserts the paths, reviving soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn upsert_multiple(&mut self, paths: &[UserAccessPath]) -> Result<(), RepositoryError>;
}

/// Write access to student activation state.
pub trait ActivationWriter {
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_activation(&mut self, activations: &[StudentActivation])
    -> Result<(), RepositoryError>;
}

/// Per-organization configuration lookups.
pub trait ConfigurationSource {
    /// Looks `key` up through the legacy configuration service.
    ///
    /// # Errors
    ///
    /// Returns an error if the service refuses or fails the lookup.
    fn configuration_by_key(&mut self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Looks `key` up in the organization's own configuration table.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be read.
    fn internal_configuration_by_key(&mut self, key: &str) -> Result<Option<String>, ConfigError>;
}

/// Feature-toggle lookups.
pub trait FeatureToggle {
    /// # Errors
    ///
    /// Returns an error if the toggle service cannot be reached.
    fn is_feature_enabled(&self, feature: &str, organization_id: &str) -> Result<bool, ConfigError>;
}

/// Everything the enrollment operations need from one transaction.
pub trait EnrollmentStore:
    EnrollmentHistoryReader + EnrollmentHistoryWriter + UserAccessPathWriter + ActivationWriter
{
}

impl<T> EnrollmentStore for T where
    T: EnrollmentHistoryReader + EnrollmentHistoryWriter + UserAccessPathWriter + ActivationWriter
{
}
