//! Configuration loading and representation.
//!
//! Values come from the environment:
//! - `BORDERTALLY_TARGET_DAYS`: residency threshold in days (default 730)
//! - `BORDERTALLY_UTC_OFFSET`: reference offset for local days, e.g. `-05:00` (default UTC)
//! - `BORDERTALLY_REPEATED_ENTRY`: `keep_latest` (default) or `keep_first`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bordertally_core::DomainError;
use bordertally_presence::{DEFAULT_TARGET_DAYS, DayAccountant, ReferenceZone, RepeatedEntryPolicy};

pub const TARGET_DAYS_VAR: &str = "BORDERTALLY_TARGET_DAYS";
pub const UTC_OFFSET_VAR: &str = "BORDERTALLY_UTC_OFFSET";
pub const REPEATED_ENTRY_VAR: &str = "BORDERTALLY_REPEATED_ENTRY";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a whole number of days")]
    InvalidTargetDays { var: &'static str, value: String },

    #[error("{var}: {source}")]
    InvalidOffset {
        var: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("{var}: '{value}' is not one of keep_latest, keep_first")]
    InvalidPolicy { var: &'static str, value: String },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidencyConfig {
    pub target_days: u32,
    pub zone: ReferenceZone,
    pub repeated_entry: RepeatedEntryPolicy,
}

impl Default for ResidencyConfig {
    fn default() -> Self {
        Self {
            target_days: DEFAULT_TARGET_DAYS,
            zone: ReferenceZone::utc(),
            repeated_entry: RepeatedEntryPolicy::default(),
        }
    }
}

impl ResidencyConfig {
    /// Read the process environment. Unset variables fall back to defaults;
    /// set-but-invalid ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ResidencyConfig::from_env`] over an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match lookup(TARGET_DAYS_VAR) {
            Some(value) => {
                config.target_days =
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidTargetDays {
                            var: TARGET_DAYS_VAR,
                            value,
                        })?;
            }
            None => tracing::warn!("{TARGET_DAYS_VAR} not set; using {DEFAULT_TARGET_DAYS} days"),
        }

        match lookup(UTC_OFFSET_VAR) {
            Some(value) => {
                config.zone = value.parse().map_err(|source| ConfigError::InvalidOffset {
                    var: UTC_OFFSET_VAR,
                    source,
                })?;
            }
            None => tracing::warn!("{UTC_OFFSET_VAR} not set; counting local days in UTC"),
        }

        match lookup(REPEATED_ENTRY_VAR) {
            Some(value) => {
                config.repeated_entry = match value.trim() {
                    "keep_latest" => RepeatedEntryPolicy::KeepLatest,
                    "keep_first" => RepeatedEntryPolicy::KeepFirst,
                    _ => {
                        return Err(ConfigError::InvalidPolicy {
                            var: REPEATED_ENTRY_VAR,
                            value,
                        });
                    }
                };
            }
            None => tracing::warn!("{REPEATED_ENTRY_VAR} not set; a later entry replaces a pending one"),
        }

        Ok(config)
    }

    /// Engine configured with this zone and policy.
    pub fn accountant(&self) -> DayAccountant {
        DayAccountant::new(self.zone).with_repeated_entry_policy(self.repeated_entry)
    }
}
