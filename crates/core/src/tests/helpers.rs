// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ActivationWriter, ConfigError, ConfigurationSource, EnrollmentHistoryReader,
    EnrollmentHistoryWriter, FeatureToggle, RepositoryError, RequestContext, StudentActivation,
    TimelineReconciler, UserAccessPath, UserAccessPathWriter,
};
use enrollment_domain::{
    Calendar, EnrollmentMode, EnrollmentSettings, EnrollmentStatus, EnrollmentStatusHistory,
    OrderEventLog, OrderStatus, OrderType, TransitionPolicy, truncate_to_second,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

/// Fixed request time used across core tests.
pub const NOW: OffsetDateTime = datetime!(2026-03-10 15:30 UTC);

pub const ORG: &str = "org-1";
pub const STUDENT: &str = "student-1";
pub const LOCATION: &str = "location-1";

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

pub fn ordered_record(
    status: EnrollmentStatus,
    start: OffsetDateTime,
    end: Option<OffsetDateTime>,
    order_id: &str,
) -> EnrollmentStatusHistory {
    EnrollmentStatusHistory::builder(STUDENT, LOCATION, status)
        .organization(ORG)
        .start_date(start)
        .end_date(end)
        .order(order_id, 1)
        .build(NOW)
        .unwrap()
}

pub fn reconciler(mode: EnrollmentMode) -> TimelineReconciler {
    let settings: EnrollmentSettings = EnrollmentSettings::new(Calendar::utc());
    TimelineReconciler::new(
        TransitionPolicy::from_settings(&settings, mode),
        *settings.calendar(),
    )
}

pub fn event(order_status: OrderStatus, order_type: OrderType, order_id: &str) -> OrderEventLog {
    OrderEventLog {
        order_status,
        order_type,
        student_id: String::from(STUDENT),
        location_id: String::from(LOCATION),
        additional_location_ids: Vec::new(),
        enrollment_status: None,
        start_date: Some(NOW),
        end_date: None,
        order_id: String::from(order_id),
        order_sequence_number: 1,
    }
}

fn same_key(a: &EnrollmentStatusHistory, b: &EnrollmentStatusHistory) -> bool {
    a.shares_key_prefix(b) && a.start_date() == b.start_date()
}

/// An in-memory store implementing every capability the core uses.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub records: Vec<EnrollmentStatusHistory>,
    pub deleted: Vec<EnrollmentStatusHistory>,
    pub access_paths: Vec<UserAccessPath>,
    pub deleted_paths: Vec<UserAccessPath>,
    pub activations: Vec<StudentActivation>,
    /// Operation name that fails with a storage error.
    pub fail_on: Option<&'static str>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<EnrollmentStatusHistory>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn timeline(&self, student_id: &str, location_id: &str) -> Vec<EnrollmentStatusHistory> {
        let mut timeline: Vec<EnrollmentStatusHistory> = self
            .records
            .iter()
            .filter(|r| r.belongs_to(student_id, location_id))
            .cloned()
            .collect();
        timeline.sort_by_key(EnrollmentStatusHistory::start_date);
        timeline
    }

    pub fn activation_of(&self, student_id: &str) -> Option<&StudentActivation> {
        self.activations.iter().find(|a| a.student_id == student_id)
    }

    fn check(&self, operation: &str) -> Result<(), RepositoryError> {
        if self.fail_on == Some(operation) {
            return Err(RepositoryError::Storage(format!("{operation} unavailable")));
        }
        Ok(())
    }

    fn sorted(&self, keep: impl Fn(&EnrollmentStatusHistory) -> bool) -> Vec<EnrollmentStatusHistory> {
        let mut found: Vec<EnrollmentStatusHistory> =
            self.records.iter().filter(|&r| keep(r)).cloned().collect();
        found.sort_by_key(EnrollmentStatusHistory::start_date);
        found
    }

    fn set_end(
        &mut self,
        record: &EnrollmentStatusHistory,
        end_date: Option<OffsetDateTime>,
    ) -> Result<(), RepositoryError> {
        let slot = self
            .records
            .iter_mut()
            .find(|r| same_key(r, record))
            .ok_or_else(|| RepositoryError::NotFound {
                resource: String::from("enrollment_status_history"),
                id: record.student_id().to_string(),
            })?;
        *slot = slot.with_end_date(end_date);
        Ok(())
    }
}

impl EnrollmentHistoryReader for MemoryStore {
    fn get_by_student_and_location(
        &mut self,
        student_id: &str,
        location_id: &str,
        active_at: Option<OffsetDateTime>,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        self.check("get_by_student_and_location")?;
        Ok(self.sorted(|r| {
            r.belongs_to(student_id, location_id) && active_at.is_none_or(|at| r.is_active_at(at))
        }))
    }

    fn get_by_student_id(
        &mut self,
        student_id: &str,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        self.check("get_by_student_id")?;
        Ok(self.sorted(|r| r.student_id() == student_id))
    }

    fn get_by_student_ids(
        &mut self,
        student_ids: &[String],
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        self.check("get_by_student_ids")?;
        Ok(self.sorted(|r| student_ids.iter().any(|id| id == r.student_id())))
    }

    fn get_latest_of_locations(
        &mut self,
        student_id: &str,
        location_ids: &[String],
        limit: usize,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        self.check("get_latest_of_locations")?;
        let mut found: Vec<EnrollmentStatusHistory> = self.sorted(|r| {
            r.student_id() == student_id && location_ids.iter().any(|l| l == r.location_id())
        });
        found.reverse();
        found.truncate(limit);
        Ok(found)
    }

    fn get_inactive_and_active_students(
        &mut self,
        student_ids: &[String],
        excluded: &[EnrollmentStatus],
        now: OffsetDateTime,
    ) -> Result<Vec<StudentActivation>, RepositoryError> {
        self.check("get_inactive_and_active_students")?;
        Ok(student_ids
            .iter()
            .map(|id| {
                let active: Vec<&EnrollmentStatusHistory> = self
                    .records
                    .iter()
                    .filter(|r| r.student_id() == id && r.is_active_at(now))
                    .collect();
                let all_excluded: bool = active.iter().all(|r| excluded.contains(&r.status()));
                StudentActivation {
                    student_id: id.clone(),
                    deactivated_at: if all_excluded {
                        active.iter().map(|r| r.start_date()).max()
                    } else {
                        None
                    },
                }
            })
            .collect())
    }

    fn get_same_start_date(
        &mut self,
        candidate: &EnrollmentStatusHistory,
    ) -> Result<Vec<EnrollmentStatusHistory>, RepositoryError> {
        self.check("get_same_start_date")?;
        let second: OffsetDateTime = truncate_to_second(candidate.start_date());
        Ok(self.sorted(|r| {
            r.shares_key_prefix(candidate) && truncate_to_second(r.start_date()) == second
        }))
    }
}

impl EnrollmentHistoryWriter for MemoryStore {
    fn create(&mut self, record: &EnrollmentStatusHistory) -> Result<(), RepositoryError> {
        self.check("create")?;
        if self.records.iter().any(|r| same_key(r, record)) {
            return Err(RepositoryError::Conflict(String::from(
                "enrollment_status_history primary key",
            )));
        }
        self.records.push(record.clone());
        Ok(())
    }

    fn update(
        &mut self,
        record: &EnrollmentStatusHistory,
        new_end_date: Option<OffsetDateTime>,
    ) -> Result<(), RepositoryError> {
        self.check("update")?;
        self.set_end(record, new_end_date)
    }

    fn deactivate(
        &mut self,
        record: &EnrollmentStatusHistory,
        end_date: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        self.check("deactivate")?;
        self.set_end(record, Some(end_date))
    }

    fn soft_delete(
        &mut self,
        records: &[EnrollmentStatusHistory],
        _deleted_at: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        self.check("soft_delete")?;
        for record in records {
            if let Some(position) = self.records.iter().position(|r| same_key(r, record)) {
                let removed: EnrollmentStatusHistory = self.records.remove(position);
                self.deleted.push(removed);
            }
        }
        Ok(())
    }
}

impl UserAccessPathWriter for MemoryStore {
    fn soft_delete_by_user_and_locations(
        &mut self,
        user_id: &str,
        location_ids: &[String],
        _deleted_at: OffsetDateTime,
    ) -> Result<(), RepositoryError> {
        self.check("soft_delete_by_user_and_locations")?;
        let (gone, kept): (Vec<UserAccessPath>, Vec<UserAccessPath>) =
            std::mem::take(&mut self.access_paths)
                .into_iter()
                .partition(|p| p.user_id == user_id && location_ids.contains(&p.location_id));
        self.access_paths = kept;
        self.deleted_paths.extend(gone);
        Ok(())
    }

    fn upsert_multiple(&mut self, paths: &[UserAccessPath]) -> Result<(), RepositoryError> {
        self.check("upsert_multiple")?;
        for path in paths {
            self.deleted_paths.retain(|p| p != path);
            if !self.access_paths.contains(path) {
                self.access_paths.push(path.clone());
            }
        }
        Ok(())
    }
}

impl ActivationWriter for MemoryStore {
    fn update_activation(
        &mut self,
        activations: &[StudentActivation],
    ) -> Result<(), RepositoryError> {
        self.check("update_activation")?;
        for activation in activations {
            self.activations
                .retain(|a| a.student_id != activation.student_id);
            self.activations.push(activation.clone());
        }
        Ok(())
    }
}

/// Configuration fake answering both lookups with fixed results.
#[derive(Debug, Clone)]
pub struct FakeConfig {
    pub legacy: Result<Option<String>, ConfigError>,
    pub internal: Result<Option<String>, ConfigError>,
}

impl FakeConfig {
    pub fn legacy(value: Result<Option<String>, ConfigError>) -> Self {
        Self {
            legacy: value,
            internal: Err(ConfigError::Unavailable(String::from("not consulted"))),
        }
    }
}

impl ConfigurationSource for FakeConfig {
    fn configuration_by_key(&mut self, _key: &str) -> Result<Option<String>, ConfigError> {
        self.legacy.clone()
    }

    fn internal_configuration_by_key(&mut self, _key: &str) -> Result<Option<String>, ConfigError> {
        self.internal.clone()
    }
}

/// Feature-toggle fake enabling a fixed set of features.
#[derive(Debug, Clone, Default)]
pub struct FakeToggles {
    pub enabled: Vec<&'static str>,
    pub unreachable: bool,
}

impl FeatureToggle for FakeToggles {
    fn is_feature_enabled(&self, feature: &str, _organization_id: &str) -> Result<bool, ConfigError> {
        if self.unreachable {
            return Err(ConfigError::Unavailable(String::from("toggle service down")));
        }
        Ok(self.enabled.contains(&feature))
    }
}
