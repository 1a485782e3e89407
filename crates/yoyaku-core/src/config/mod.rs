use std::path::{Path, PathBuf};

use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_STEM, DEFAULT_DURATION_MINUTES, DEFAULT_STORE_FILE, ENV_PREFIX,
};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageConfig,
    pub scheduling: SchedulingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

/// How monthly and yearly steps treat a day that the target month lacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthOverflow {
    /// Use the last day of the target month (Jan 31 -> Feb 29 -> Mar 31).
    #[default]
    Clamp,
    /// Drop the occurrence entirely (RFC 5545; Jan 31 -> Mar 31).
    Skip,
}

/// Which occurrences of a new booking are checked for conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Every occurrence of the candidate series, up to its `until`.
    #[default]
    EveryOccurrence,
    /// Only the candidate's own interval, against existing bookings expanded
    /// up to the candidate's `until`.
    FirstOccurrence,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulingConfig {
    pub month_overflow: MonthOverflow,
    pub conflict_scope: ConflictScope,
    pub default_duration_minutes: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: PathBuf::from(DEFAULT_STORE_FILE),
            },
            scheduling: SchedulingConfig {
                month_overflow: MonthOverflow::default(),
                conflict_scope: ConflictScope::default(),
                default_duration_minutes: DEFAULT_DURATION_MINUTES,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
        }
    }
}

impl Settings {
    /// ## Summary
    /// Configuration builder pre-populated with every default.
    ///
    /// ## Errors
    /// Returns an error if a default value cannot be recorded.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("storage.path", DEFAULT_STORE_FILE)?
            .set_default("scheduling.month_overflow", "clamp")?
            .set_default("scheduling.conflict_scope", "every_occurrence")?
            .set_default(
                "scheduling.default_duration_minutes",
                i64::from(DEFAULT_DURATION_MINUTES),
            )?
            .set_default("logging.level", "warn")?)
    }

    /// ## Summary
    /// Loads configuration from defaults, a TOML file and environment variables into a `Settings`.
    /// Environment variables (`YOYAKU_STORAGE__PATH`, ...) take precedence over the file.
    ///
    /// When `file` is `None`, `yoyaku.toml` in the working directory is used if present.
    ///
    /// ## Errors
    /// Returns an error if an explicitly named file is missing, or if building the
    /// configuration or deserializing it fails.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(CONFIG_FILE_STEM).required(false),
        };

        let settings = Self::defaults()?
            // TOML file
            .add_source(file_source)
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    /// ## Summary
    /// Rejects values that deserialize but cannot be used.
    ///
    /// ## Errors
    /// Returns `ConfigError` for an empty storage path or a zero default duration.
    pub fn validate(&self) -> CoreResult<()> {
        if self.storage.path.as_os_str().is_empty() {
            return Err(CoreError::ConfigError("storage.path must not be empty".into()));
        }
        if self.scheduling.default_duration_minutes == 0 {
            return Err(CoreError::ConfigError(
                "scheduling.default_duration_minutes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from `.env`, the optional config file and the environment.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config(file: Option<&Path>) -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load(file)?;
    tracing::debug!(settings = ?settings, "Configuration loaded");
    Ok(settings)
}
