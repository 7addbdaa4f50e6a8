// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod commands;
mod settings;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::Result;
use enrollment::RequestContext;
use enrollment_domain::{Calendar, EnrollmentSettings};
use enrollment_persistence::Persistence;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;

use crate::commands::Environment;
use crate::settings::{FlagConfiguration, FlagToggles};

/// Enrollment timeline operator tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Organization the request acts for
    #[arg(short, long)]
    organization: String,

    /// IANA timezone of the organization calendar
    #[arg(short, long, default_value = "Asia/Tokyo")]
    timezone: String,

    /// Statuses change through orders only; direct edits are restricted
    #[arg(long)]
    order_flow: bool,

    /// Enable a feature toggle (repeatable)
    #[arg(long = "feature", value_name = "NAME")]
    features: Vec<String>,

    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Apply an order event JSON file
    SyncOrder {
        /// Path to the order event
        event: PathBuf,
    },

    /// Validate and apply a JSON array of student enrollment changes
    Upsert {
        /// Path to the batch
        batch: PathBuf,
    },

    /// Print a student's enrollment timeline as JSON
    Timeline {
        #[arg(long)]
        student: String,

        #[arg(long)]
        location: Option<String>,
    },
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }

    fn environment(&self) -> Result<Environment> {
        let calendar: Calendar = Calendar::new(&self.timezone)?;
        Ok(Environment {
            settings: EnrollmentSettings::new(calendar),
            configuration: FlagConfiguration::new(self.order_flow),
            toggles: FlagToggles::new(self.features.clone()),
        })
    }

    fn run(self) -> Result<()> {
        let mut env: Environment = self.environment()?;

        let mut persistence: Persistence = if let Some(db_path) = &self.database {
            info!("Using file-based database at: {}", db_path.display());
            Persistence::new_with_file(db_path)?
        } else {
            info!("Using in-memory database");
            Persistence::new_in_memory()?
        };

        let ctx: RequestContext = RequestContext::new(&self.organization, OffsetDateTime::now_utc());

        match &self.command {
            Command::SyncOrder { event } => {
                commands::sync_order(&mut persistence, &mut env, &ctx, event)
            }
            Command::Upsert { batch } => commands::upsert(&mut persistence, &mut env, &ctx, batch),
            Command::Timeline { student, location } => {
                commands::timeline(&mut persistence, student, location.as_deref())
            }
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(args.log_level().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    args.run()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use enrollment::{ConfigurationSource, EnrollmentModeResolver, FeatureToggle};
    use enrollment_domain::{
        CONFIG_KEY_MANUAL_STATUS_UPDATE, EnrollmentMode,
        FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2,
    };

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn ctx() -> RequestContext {
        RequestContext::new("org-1", OffsetDateTime::UNIX_EPOCH)
    }

    #[test]
    fn test_defaults_to_tokyo_and_direct_edit() {
        let args = parse(&["enrollment", "-o", "org-1", "timeline", "--student", "s-1"]);
        let mut env = args.environment().unwrap();

        assert_eq!(args.timezone, "Asia/Tokyo");
        assert_eq!(
            EnrollmentModeResolver
                .resolve(&ctx(), &mut env.configuration, &env.toggles)
                .unwrap(),
            EnrollmentMode::DirectEdit
        );
    }

    #[test]
    fn test_order_flow_flag_resolves_order_flow() {
        let args = parse(&[
            "enrollment",
            "-o",
            "org-1",
            "--order-flow",
            "sync-order",
            "event.json",
        ]);
        let mut env = args.environment().unwrap();

        assert_eq!(
            EnrollmentModeResolver
                .resolve(&ctx(), &mut env.configuration, &env.toggles)
                .unwrap(),
            EnrollmentMode::OrderFlow
        );
        assert!(matches!(args.command, Command::SyncOrder { .. }));
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let args = parse(&[
            "enrollment",
            "-o",
            "org-1",
            "--timezone",
            "Mars/Olympus",
            "upsert",
            "batch.json",
        ]);
        assert!(args.environment().is_err());
    }

    #[test]
    fn test_features_are_enabled_by_name() {
        let args = parse(&[
            "enrollment",
            "-o",
            "org-1",
            "--feature",
            FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2,
            "timeline",
            "--student",
            "s-1",
        ]);
        let mut env = args.environment().unwrap();

        assert!(env
            .toggles
            .is_feature_enabled(FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2, "org-1")
            .unwrap());
        assert_eq!(
            env.configuration.configuration_by_key("some.other.key").unwrap(),
            None
        );
        assert_eq!(
            env.configuration
                .internal_configuration_by_key(CONFIG_KEY_MANUAL_STATUS_UPDATE)
                .unwrap()
                .as_deref(),
            Some("on")
        );
    }

    #[test]
    fn test_organization_is_required() {
        assert!(Args::try_parse_from(["enrollment", "timeline", "--student", "s-1"]).is_err());
    }
}
