// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Engine configuration.
//!
//! Loaded from TOML, with every key optional:
//!
//! ```toml
//! [ephemeris]
//! mode = "tabulated"        # tabulated | analytic | disabled
//! table_start_year = 1900
//! table_end_year = 2100
//! segment_days = 16.0
//! coefficients = 13
//!
//! [search]
//! wide_step_minutes = 60
//! day_step_minutes = 20
//! bisection_iterations = 32
//! dedup_seconds = 60
//! junggi_lookback_days = 40
//!
//! [locale]
//! supported_timezone = "Asia/Seoul"
//! label = "KST"
//! utc_offset_hours = 9
//! ```

use std::env;
use std::path::Path;
use std::str::FromStr;

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Which longitude source backs the shared ephemeris.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EphemerisMode {
    /// Chebyshev table fitted once over the configured years.
    #[default]
    Tabulated,
    /// Series evaluated on every call.
    Analytic,
    /// No engine; every month falls back to the calendar rule.
    Disabled,
}

impl FromStr for EphemerisMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tabulated" | "table" => Ok(EphemerisMode::Tabulated),
            "analytic" | "series" => Ok(EphemerisMode::Analytic),
            "disabled" | "off" | "none" => Ok(EphemerisMode::Disabled),
            other => Err(ConfigError::Invalid(format!(
                "unsupported ephemeris mode '{other}', use tabulated, analytic or disabled"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EphemerisConfig {
    pub mode: EphemerisMode,
    pub table_start_year: i32,
    /// Exclusive.
    pub table_end_year: i32,
    pub segment_days: f64,
    pub coefficients: usize,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            mode: EphemerisMode::Tabulated,
            table_start_year: 1900,
            table_end_year: 2100,
            segment_days: 16.0,
            coefficients: 13,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Sampling step for multi-day windows.
    pub wide_step_minutes: i64,
    /// Sampling step for single-day windows.
    pub day_step_minutes: i64,
    pub bisection_iterations: u32,
    /// Crossings closer than this to the previous one are dropped.
    pub dedup_seconds: i64,
    pub junggi_lookback_days: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wide_step_minutes: 60,
            day_step_minutes: 20,
            bisection_iterations: 32,
            dedup_seconds: 60,
            junggi_lookback_days: 40,
        }
    }
}

impl SearchConfig {
    pub fn wide_step(&self) -> Duration {
        Duration::minutes(self.wide_step_minutes)
    }

    pub fn day_step(&self) -> Duration {
        Duration::minutes(self.day_step_minutes)
    }

    pub fn dedup(&self) -> Duration {
        Duration::seconds(self.dedup_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocaleConfig {
    /// The one timezone identifier computed without a degradation note.
    pub supported_timezone: String,
    /// Short name used in degradation notes.
    pub label: String,
    pub utc_offset_hours: i32,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            supported_timezone: "Asia/Seoul".to_string(),
            label: "KST".to_string(),
            utc_offset_hours: 9,
        }
    }
}

impl LocaleConfig {
    /// The fixed offset every local computation runs in.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    /// `KST(Asia/Seoul), UTC+09:00` for the defaults.
    pub fn convention(&self) -> String {
        format!(
            "{}({}), UTC{}",
            self.label,
            self.supported_timezone,
            self.offset()
        )
    }

    pub fn is_supported(&self, timezone: &str) -> bool {
        timezone.trim() == self.supported_timezone
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ephemeris: EphemerisConfig,
    pub search: SearchConfig,
    pub locale: LocaleConfig,
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Configuration from the environment.
    ///
    /// # Environment Variables
    /// - `SAJU_CONFIG` (optional): path to a TOML file; defaults otherwise
    /// - `SAJU_EPHEMERIS_MODE` (optional): overrides `ephemeris.mode`
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = match env::var("SAJU_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        if let Ok(mode) = env::var("SAJU_EPHEMERIS_MODE") {
            if !mode.trim().is_empty() {
                config.ephemeris.mode = mode.parse()?;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let eph = &self.ephemeris;
        if eph.table_end_year <= eph.table_start_year {
            return Err(ConfigError::Invalid(format!(
                "ephemeris.table_end_year ({}) must be after table_start_year ({})",
                eph.table_end_year, eph.table_start_year
            )));
        }
        if !(eph.segment_days > 0.0 && eph.segment_days <= 64.0) {
            return Err(ConfigError::Invalid(format!(
                "ephemeris.segment_days must be in (0, 64], got {}",
                eph.segment_days
            )));
        }
        if !(2..=32).contains(&eph.coefficients) {
            return Err(ConfigError::Invalid(format!(
                "ephemeris.coefficients must be in 2..=32, got {}",
                eph.coefficients
            )));
        }

        let search = &self.search;
        for (name, minutes) in [
            ("wide_step_minutes", search.wide_step_minutes),
            ("day_step_minutes", search.day_step_minutes),
        ] {
            // at most one sample per day
            if !(1..=24 * 60).contains(&minutes) {
                return Err(ConfigError::Invalid(format!(
                    "search.{name} must be in 1..=1440, got {minutes}"
                )));
            }
        }
        if !(1..=64).contains(&search.bisection_iterations) {
            return Err(ConfigError::Invalid(format!(
                "search.bisection_iterations must be in 1..=64, got {}",
                search.bisection_iterations
            )));
        }
        if search.dedup_seconds < 0 {
            return Err(ConfigError::Invalid(
                "search.dedup_seconds must not be negative".into(),
            ));
        }
        // junggi are at most ~31.5 days apart
        if search.junggi_lookback_days < 32 {
            return Err(ConfigError::Invalid(format!(
                "search.junggi_lookback_days must be at least 32, got {}",
                search.junggi_lookback_days
            )));
        }

        let locale = &self.locale;
        if locale.supported_timezone.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "locale.supported_timezone must not be empty".into(),
            ));
        }
        if !(-12..=14).contains(&locale.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "locale.utc_offset_hours must be in -12..=14, got {}",
                locale.utc_offset_hours
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.ephemeris.mode, EphemerisMode::Tabulated);
        assert_eq!(config.search.day_step(), Duration::minutes(20));
        assert_eq!(config.search.wide_step(), Duration::minutes(60));
        assert_eq!(config.locale.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(config.locale.convention(), "KST(Asia/Seoul), UTC+09:00");
        assert!(config.locale.is_supported("Asia/Seoul"));
        assert!(!config.locale.is_supported("UTC"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [ephemeris]
            mode = "analytic"

            [search]
            day_step_minutes = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.ephemeris.mode, EphemerisMode::Analytic);
        assert_eq!(config.ephemeris.table_start_year, 1900);
        assert_eq!(config.search.day_step_minutes, 10);
        assert_eq!(config.search.bisection_iterations, 32);
        assert_eq!(config.locale.supported_timezone, "Asia/Seoul");
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = Config::from_toml_str("[ephemeris]\nmode = \"jpl\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
    }

    #[test]
    fn rejects_inverted_table_span() {
        let err =
            Config::from_toml_str("[ephemeris]\ntable_start_year = 2000\ntable_end_year = 1990\n")
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("table_end_year"));
    }

    #[test]
    fn rejects_short_lookback_and_zero_step() {
        let err = Config::from_toml_str("[search]\njunggi_lookback_days = 10\n").unwrap_err();
        assert!(err.to_string().contains("junggi_lookback_days"));

        let err = Config::from_toml_str("[search]\nwide_step_minutes = 0\n").unwrap_err();
        assert!(err.to_string().contains("wide_step_minutes"));
    }

    #[test]
    fn mode_from_str_aliases() {
        assert_eq!("Table".parse::<EphemerisMode>().unwrap(), EphemerisMode::Tabulated);
        assert_eq!(" off ".parse::<EphemerisMode>().unwrap(), EphemerisMode::Disabled);
        assert!("moon".parse::<EphemerisMode>().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/saju.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
