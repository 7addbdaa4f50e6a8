// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Configuration and feature toggles supplied on the command line.

use enrollment::{ConfigError, ConfigurationSource, FeatureToggle};
use enrollment_domain::{CONFIG_KEY_MANUAL_STATUS_UPDATE, CONFIG_VALUE_OFF};

/// Answers configuration lookups from the `--order-flow` flag.
///
/// Both the legacy service and the internal table report the same value,
/// so the resolver's choice between them does not change the outcome.
#[derive(Debug, Clone)]
pub struct FlagConfiguration {
    manual_status_update: String,
}

impl FlagConfiguration {
    pub fn new(order_flow: bool) -> Self {
        let value: &str = if order_flow { CONFIG_VALUE_OFF } else { "on" };
        Self {
            manual_status_update: value.to_string(),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        (key == CONFIG_KEY_MANUAL_STATUS_UPDATE).then(|| self.manual_status_update.clone())
    }
}

impl ConfigurationSource for FlagConfiguration {
    fn configuration_by_key(&mut self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.lookup(key))
    }

    fn internal_configuration_by_key(&mut self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.lookup(key))
    }
}

/// Feature toggles enabled with `--feature`, for every organization.
#[derive(Debug, Clone, Default)]
pub struct FlagToggles {
    enabled: Vec<String>,
}

impl FlagToggles {
    pub const fn new(enabled: Vec<String>) -> Self {
        Self { enabled }
    }
}

impl FeatureToggle for FlagToggles {
    fn is_feature_enabled(&self, feature: &str, _organization_id: &str) -> Result<bool, ConfigError> {
        Ok(self.enabled.iter().any(|name| name == feature))
    }
}
