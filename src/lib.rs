// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Four Pillars (saju)
//!
//! Sexagenary four-pillar charts with month boundaries taken from the sun's
//! apparent longitude.
//!
//! # Core types
//!
//! - [`Pillar`]: a stem–branch pair; [`Chart`] holds the year, month, day and
//!   optional hour pillars.
//! - [`CrossingFinder`]: locates the instants the sun crosses each 15°
//!   solar-term line inside a [`SearchWindow`].
//! - [`MonthPillarPolicy`]: one or two month pillar candidates for a birth.
//! - [`Analyzer`]: the chart, analysis, report and readiness entrypoints.
//! - [`EphemerisProvider`]: the longitude seam; [`Ephemeris`] is the
//!   production implementation, shared through [`Ephemeris::shared`].
//!
//! # Time scales
//!
//! | Marker | Scale |
//! |--------|-------|
//! | [`TT`] | Terrestrial Time, the axis of the solar series |
//! | [`UT`] | Universal Time (Earth rotation), the axis of civil timestamps |
//!
//! # ΔT (Delta T)
//!
//! **ΔT = TT − UT** is applied by the [`UT`] scale, so `Time::<TT>::from_utc`
//! evaluates the sun at the dynamical instant of a civil timestamp.
//!
//! # Degradation
//!
//! No entrypoint fails on business input.  An unusable ephemeris, an
//! unsupported timezone or a missing birth time become [`Degradation`]s and a
//! single accuracy note; see [`accuracy_note`].

pub mod analysis;
pub mod angle;
pub mod config;
mod delta_t;
pub mod degradation;
pub mod elements;
pub mod ephemeris;
pub mod error;
pub(crate) mod instant;
pub mod junggi;
pub mod month_policy;
pub mod report;
pub(crate) mod scales;
pub mod sexagenary;
pub mod solar_terms;
pub mod window;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use analysis::{AnalysisResult, Analyzer, ChartInput, ChartOutcome, EngineStatus};
pub use config::{Config, EphemerisConfig, EphemerisMode, LocaleConfig, SearchConfig};
pub use degradation::{accuracy_note, Degradation};
pub use elements::{score_chart, ElementScore, ElementStatus};
pub use ephemeris::{Ephemeris, EphemerisProvider};
pub use error::{ConfigError, EphemerisError, InputError};
pub use instant::{JulianEphemerisDay, Time, TimeScale};
pub use junggi::filter_junggi;
pub use month_policy::{MonthCandidates, MonthPillarPolicy};
pub use report::ManseReport;
pub use scales::{TT, UT};
pub use sexagenary::{
    calculate_chart, BirthTime, Branch, CalendarType, Chart, Element, Pillar, Position, Stem,
};
pub use solar_terms::{CrossingFinder, SearchOptions, SolarTerm, SolarTermCrossing};
pub use window::SearchWindow;
