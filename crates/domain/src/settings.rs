// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Static enrollment configuration.
//!
//! Classification sets live here as plain data handed to the rule
//! components, never as process-wide mutable state.

use crate::calendar::Calendar;
use crate::status::EnrollmentStatus;
use serde::{Deserialize, Serialize};

/// Configuration key that toggles manual enrollment status updates.
pub const CONFIG_KEY_MANUAL_STATUS_UPDATE: &str = "user.enrollment.update_status_manual";

/// Configuration value meaning "manual updates disabled", i.e. order flow.
pub const CONFIG_VALUE_OFF: &str = "off";

/// Feature toggle selecting the per-organization configuration table.
pub const FEATURE_CONFIGURATION_FROM_REPLICATED_TABLE: &str =
    "configuration_from_replicated_table";

/// Feature toggle widening the set of statuses that deactivate a student.
pub const FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2: &str =
    "auto_deactivate_and_reactivate_students_v2";

/// Statuses a request may set freely while the organization is in order flow.
pub const ORDER_FLOW_STATUSES: [EnrollmentStatus; 3] = [
    EnrollmentStatus::Potential,
    EnrollmentStatus::Temporary,
    EnrollmentStatus::NonPotential,
];

/// Which caller path drives enrollment changes for an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentMode {
    /// Status changes are driven by an external order system.
    OrderFlow,
    /// Status changes are edited directly on the student profile.
    DirectEdit,
}

impl EnrollmentMode {
    /// Interprets the manual-update configuration value.
    #[must_use]
    pub fn from_config_value(value: &str) -> Self {
        if value == CONFIG_VALUE_OFF {
            Self::OrderFlow
        } else {
            Self::DirectEdit
        }
    }

    #[must_use]
    pub const fn is_order_flow(&self) -> bool {
        matches!(self, Self::OrderFlow)
    }
}

/// Organization-level enrollment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSettings {
    calendar: Calendar,
    order_flow_statuses: Vec<EnrollmentStatus>,
    deactivating_statuses: Vec<EnrollmentStatus>,
    deactivating_statuses_v2: Vec<EnrollmentStatus>,
}

impl EnrollmentSettings {
    #[must_use]
    pub fn new(calendar: Calendar) -> Self {
        Self {
            calendar,
            order_flow_statuses: ORDER_FLOW_STATUSES.to_vec(),
            deactivating_statuses: vec![EnrollmentStatus::Withdrawn],
            deactivating_statuses_v2: vec![
                EnrollmentStatus::Withdrawn,
                EnrollmentStatus::Graduated,
                EnrollmentStatus::NonPotential,
            ],
        }
    }

    #[must_use]
    pub const fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    #[must_use]
    pub fn order_flow_statuses(&self) -> &[EnrollmentStatus] {
        &self.order_flow_statuses
    }

    /// Statuses that, when they are all a student holds, deactivate the
    /// student. `extended` selects the wider v2 set.
    #[must_use]
    pub fn deactivating_statuses(&self, extended: bool) -> &[EnrollmentStatus] {
        if extended {
            &self.deactivating_statuses_v2
        } else {
            &self.deactivating_statuses
        }
    }
}

impl Default for EnrollmentSettings {
    fn default() -> Self {
        Self::new(Calendar::from_tz(chrono_tz::Asia::Tokyo))
    }
}
