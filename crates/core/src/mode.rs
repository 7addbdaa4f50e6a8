// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{ConfigError, ConfigurationSource, FeatureToggle};
use enrollment_domain::{
    CONFIG_KEY_MANUAL_STATUS_UPDATE, CONFIG_VALUE_OFF, EnrollmentMode,
    FEATURE_CONFIGURATION_FROM_REPLICATED_TABLE,
};
use tracing::{debug, error, warn};

/// Resolves whether an organization runs in order flow or direct edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrollmentModeResolver;

impl EnrollmentModeResolver {
    /// Reads the manual-update configuration for the request's organization.
    ///
    /// The feature toggle selects the organization's own configuration
    /// table over the legacy configuration service. A legacy lookup refused
    /// for bad credentials counts as "off".
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Internal` if the configuration is missing or the
    /// lookup fails.
    pub fn resolve<C, T>(
        &self,
        ctx: &RequestContext,
        config: &mut C,
        toggles: &T,
    ) -> Result<EnrollmentMode, CoreError>
    where
        C: ConfigurationSource + ?Sized,
        T: FeatureToggle + ?Sized,
    {
        ctx.check_deadline("resolve_enrollment_mode")?;
        let use_internal_table: bool = toggles
            .is_feature_enabled(
                FEATURE_CONFIGURATION_FROM_REPLICATED_TABLE,
                ctx.organization_id(),
            )
            .unwrap_or(false);

        let value: Option<String> = if use_internal_table {
            config
                .internal_configuration_by_key(CONFIG_KEY_MANUAL_STATUS_UPDATE)
                .map_err(|err| {
                    error!(error = %err, "internal configuration lookup failed");
                    CoreError::internal("internal_configuration_by_key", err)
                })?
        } else {
            match config.configuration_by_key(CONFIG_KEY_MANUAL_STATUS_UPDATE) {
                Ok(value) => value,
                Err(ConfigError::Unauthenticated(reason)) => {
                    warn!(reason, "configuration lookup refused, assuming order flow");
                    Some(CONFIG_VALUE_OFF.to_string())
                }
                Err(err) => {
                    error!(error = %err, "configuration lookup failed");
                    return Err(CoreError::internal("configuration_by_key", err));
                }
            }
        };

        let value: String = value.ok_or_else(|| {
            CoreError::internal(
                "resolve_enrollment_mode",
                format!("configuration {CONFIG_KEY_MANUAL_STATUS_UPDATE} not found"),
            )
        })?;
        let mode: EnrollmentMode = EnrollmentMode::from_config_value(&value);
        debug!(organization_id = ctx.organization_id(), ?mode, "enrollment mode resolved");
        Ok(mode)
    }
}
