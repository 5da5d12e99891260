// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types.
//!
//! None of these reach the caller of the chart entrypoints: an
//! [`EphemerisError`] is turned into a degradation note by the month policy.
//! [`ConfigError`] and [`InputError`] surface from the configuration loader
//! and from the parsers a request layer uses before calling in.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure to evaluate the sun's longitude.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    /// No model is loaded (disabled, or failed to initialise).
    #[error("ephemeris unavailable: {0}")]
    Unavailable(String),

    /// The instant lies outside the tabulated span.
    #[error("instant {at} is outside the ephemeris range {start} to {end}")]
    OutOfRange {
        at: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// No junggi was found where one must exist.
    #[error("no junggi within {lookback_days} days before {before}")]
    NoJunggi {
        before: DateTime<Utc>,
        lookback_days: i64,
    },
}

/// Failure to load or validate configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Malformed caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid birth time '{0}', expected HH:MM")]
    BirthTime(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
