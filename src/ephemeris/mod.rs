// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Solar longitude provider.
//!
//! [`EphemerisProvider`] is the seam between the crossing search and the
//! astronomy.  [`Ephemeris`] is the production implementation; its variant
//! is chosen once, at construction:
//!
//! | Variant | Source |
//! |---------|--------|
//! | [`Ephemeris::Tabulated`] | Chebyshev table over a configured span of years |
//! | [`Ephemeris::Analytic`] | [`series`] evaluated directly |
//! | [`Ephemeris::Unavailable`] | none; every query fails |
//!
//! Building the table is the expensive step, so the process normally holds a
//! single instance obtained from [`Ephemeris::shared`].

pub mod chebyshev;
mod nutation;
pub mod series;
mod vsop87;

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{info, warn};
use qtty::{Days, Degrees};

use crate::config::{Config, EphemerisConfig, EphemerisMode};
use crate::error::EphemerisError;
use crate::instant::{JulianEphemerisDay, Time};
use chebyshev::SolarTable;

/// Source of the sun's apparent geocentric ecliptic longitude.
pub trait EphemerisProvider: Send + Sync {
    /// Longitude in `[0, 360)` at a UTC instant.
    fn sun_longitude(&self, at: DateTime<Utc>) -> Result<Degrees, EphemerisError>;
}

impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    fn sun_longitude(&self, at: DateTime<Utc>) -> Result<Degrees, EphemerisError> {
        (**self).sun_longitude(at)
    }
}

/// The production provider.
#[derive(Debug, Clone)]
pub enum Ephemeris {
    Tabulated(SolarTable),
    Analytic,
    Unavailable(String),
}

static SHARED: OnceLock<Ephemeris> = OnceLock::new();

fn year_start(year: i32) -> Option<JulianEphemerisDay> {
    let midnight = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(Time::from_utc(Utc.from_utc_datetime(&midnight)))
}

impl Ephemeris {
    /// Fit a table over `[start_year, end_year)`.
    pub fn tabulated(config: &EphemerisConfig) -> Result<Self, EphemerisError> {
        let (Some(start), Some(end)) = (
            year_start(config.table_start_year),
            year_start(config.table_end_year),
        ) else {
            return Err(EphemerisError::Unavailable(format!(
                "table years {}..{} are not representable",
                config.table_start_year, config.table_end_year
            )));
        };

        let table = SolarTable::build(
            start,
            end,
            Days::new(config.segment_days),
            config.coefficients,
            |t| series::apparent_longitude(t).value(),
        );
        if table.is_empty() {
            return Err(EphemerisError::Unavailable(format!(
                "empty table span {}..{}",
                config.table_start_year, config.table_end_year
            )));
        }
        info!(
            "solar table ready: {} segments of {} days, {}..{}",
            table.len(),
            config.segment_days,
            config.table_start_year,
            config.table_end_year
        );
        Ok(Ephemeris::Tabulated(table))
    }

    pub fn analytic() -> Self {
        Ephemeris::Analytic
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Ephemeris::Unavailable(reason.into())
    }

    /// Select and build the variant named by `config.mode`.
    ///
    /// A table that cannot be built yields [`Ephemeris::Unavailable`].
    pub fn from_config(config: &EphemerisConfig) -> Self {
        match config.mode {
            EphemerisMode::Tabulated => Self::tabulated(config).unwrap_or_else(|e| {
                warn!("solar table could not be built: {e}");
                Ephemeris::Unavailable(e.to_string())
            }),
            EphemerisMode::Analytic => {
                info!("solar longitude from analytic series");
                Ephemeris::Analytic
            }
            EphemerisMode::Disabled => {
                warn!("ephemeris disabled by configuration");
                Ephemeris::Unavailable("disabled by configuration".into())
            }
        }
    }

    /// The process-wide instance, built on first use from
    /// [`Config::from_env`].
    ///
    /// Concurrent first callers block until the single build finishes.  A
    /// configuration error leaves the engine unavailable rather than failing.
    pub fn shared() -> &'static Ephemeris {
        SHARED.get_or_init(|| match Config::from_env() {
            Ok(config) => Ephemeris::from_config(&config.ephemeris),
            Err(e) => {
                warn!("ephemeris configuration rejected: {e}");
                Ephemeris::Unavailable(format!("configuration: {e}"))
            }
        })
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Ephemeris::Unavailable(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Ephemeris::Tabulated(_) => "tabulated",
            Ephemeris::Analytic => "analytic",
            Ephemeris::Unavailable(_) => "unavailable",
        }
    }
}

impl EphemerisProvider for Ephemeris {
    fn sun_longitude(&self, at: DateTime<Utc>) -> Result<Degrees, EphemerisError> {
        let jde = JulianEphemerisDay::from_utc(at);
        match self {
            Ephemeris::Tabulated(table) => table.longitude(jde).ok_or_else(|| {
                EphemerisError::OutOfRange {
                    at,
                    start: table.start().to_utc().unwrap_or(DateTime::<Utc>::MIN_UTC),
                    end: table.end().to_utc().unwrap_or(DateTime::<Utc>::MAX_UTC),
                }
            }),
            Ephemeris::Analytic => Ok(series::apparent_longitude(jde)),
            Ephemeris::Unavailable(reason) => Err(EphemerisError::Unavailable(reason.clone())),
        }
    }
}
