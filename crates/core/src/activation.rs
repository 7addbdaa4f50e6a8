// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{
    ActivationWriter, EnrollmentHistoryReader, FeatureToggle, StudentActivation,
};
use enrollment_domain::{
    EnrollmentSettings, EnrollmentStatus, FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2,
};
use tracing::{info, warn};

/// Students whose activation state a batch may have changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivationFlags {
    /// Students left without any activated status.
    pub deactivate: Vec<String>,
    /// Students who gained an activated status.
    pub reactivate: Vec<String>,
}

impl ActivationFlags {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deactivate.is_empty() && self.reactivate.is_empty()
    }

    /// Every flagged student, deactivations first, without duplicates.
    #[must_use]
    pub fn student_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self.deactivate.iter().chain(&self.reactivate) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

/// Derives student activation from enrollment status histories.
#[derive(Debug, Clone)]
pub struct StudentActivationManager {
    deactivating_statuses: Vec<EnrollmentStatus>,
}

impl StudentActivationManager {
    #[must_use]
    pub fn new(settings: &EnrollmentSettings, extended: bool) -> Self {
        Self {
            deactivating_statuses: settings.deactivating_statuses(extended).to_vec(),
        }
    }

    /// Selects the deactivating set from the organization's feature toggle.
    /// A toggle lookup failure falls back to the legacy set.
    #[must_use]
    pub fn from_toggle<T>(settings: &EnrollmentSettings, toggles: &T, organization_id: &str) -> Self
    where
        T: FeatureToggle + ?Sized,
    {
        let extended: bool = toggles
            .is_feature_enabled(
                FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2,
                organization_id,
            )
            .unwrap_or_else(|err| {
                warn!(error = %err, "feature toggle lookup failed, using legacy statuses");
                false
            });
        Self::new(settings, extended)
    }

    #[must_use]
    pub fn deactivating_statuses(&self) -> &[EnrollmentStatus] {
        &self.deactivating_statuses
    }

    /// Recomputes and stores the activation state of `student_ids`.
    ///
    /// # Errors
    ///
    /// Returns the repository failure.
    pub fn deactivate_and_reactivate<S>(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        student_ids: &[String],
    ) -> Result<(), CoreError>
    where
        S: EnrollmentHistoryReader + ActivationWriter + ?Sized,
    {
        if student_ids.is_empty() {
            return Ok(());
        }
        let activations: Vec<StudentActivation> =
            ctx.call("get_inactive_and_active_students", || {
                store.get_inactive_and_active_students(
                    student_ids,
                    &self.deactivating_statuses,
                    ctx.now(),
                )
            })?;
        ctx.call("update_activation", || store.update_activation(&activations))?;
        info!(
            students = activations.len(),
            deactivated = activations
                .iter()
                .filter(|a| a.deactivated_at.is_some())
                .count(),
            "student activation updated"
        );
        Ok(())
    }

    /// Writes the side-channel flags produced by a batch upsert.
    ///
    /// Must run after the batch's structural changes so the stored
    /// timelines reflect the reconciled state.
    ///
    /// # Errors
    ///
    /// Returns the repository failure.
    pub fn apply_flags<S>(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        flags: &ActivationFlags,
    ) -> Result<(), CoreError>
    where
        S: EnrollmentHistoryReader + ActivationWriter + ?Sized,
    {
        self.deactivate_and_reactivate(ctx, store, &flags.student_ids())
    }
}
