// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The 24 solar terms and the search for their instants.
//!
//! A solar term begins when the sun's apparent ecliptic longitude reaches a
//! multiple of 15°.  [`CrossingFinder`] samples an [`EphemerisProvider`]
//! across a [`SearchWindow`], unwraps the samples into a continuous signal,
//! finds every grid line crossed between adjacent samples and refines each
//! one by bisection:
//!
//! ```text
//! sample ──► unwrap ──► detect (a, b] ──► bisect ──► sort + dedup
//! ```

use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use log::debug;
use serde::Serialize;

use crate::angle::{grid_indices_between, normalize_360, unwrap_longitudes, unwrap_relative};
use crate::config::SearchConfig;
use crate::ephemeris::EphemerisProvider;
use crate::error::EphemerisError;
use crate::window::SearchWindow;

/// Degrees between consecutive solar terms.
pub const TERM_STEP_DEG: f64 = 15.0;

/// The 24 solar terms, indexed by `longitude / 15°` from the March equinox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarTerm {
    Chunbun,
    Cheongmyeong,
    Gogu,
    Ipha,
    Soman,
    Mangjong,
    Haji,
    Soseo,
    Daeseo,
    Ipchu,
    Cheoseo,
    Baengno,
    Chubun,
    Hallo,
    Sanggang,
    Ipdong,
    Soseol,
    Daeseol,
    Dongji,
    Sohan,
    Daehan,
    Ipchun,
    Usu,
    Gyeongchip,
}

impl SolarTerm {
    pub const ALL: [SolarTerm; 24] = [
        SolarTerm::Chunbun,
        SolarTerm::Cheongmyeong,
        SolarTerm::Gogu,
        SolarTerm::Ipha,
        SolarTerm::Soman,
        SolarTerm::Mangjong,
        SolarTerm::Haji,
        SolarTerm::Soseo,
        SolarTerm::Daeseo,
        SolarTerm::Ipchu,
        SolarTerm::Cheoseo,
        SolarTerm::Baengno,
        SolarTerm::Chubun,
        SolarTerm::Hallo,
        SolarTerm::Sanggang,
        SolarTerm::Ipdong,
        SolarTerm::Soseol,
        SolarTerm::Daeseol,
        SolarTerm::Dongji,
        SolarTerm::Sohan,
        SolarTerm::Daehan,
        SolarTerm::Ipchun,
        SolarTerm::Usu,
        SolarTerm::Gyeongchip,
    ];

    /// Position on the 15° grid, 0 = 春分 (0°).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i64) -> SolarTerm {
        Self::ALL[index.rem_euclid(24) as usize]
    }

    /// Term whose grid line is nearest to `longitude`.
    pub fn from_longitude(longitude: f64) -> SolarTerm {
        Self::from_index((normalize_360(longitude) / TERM_STEP_DEG).round() as i64)
    }

    pub fn longitude(self) -> f64 {
        self.index() as f64 * TERM_STEP_DEG
    }

    /// Mid-terms (中氣) sit on the 30° grid.
    pub fn is_junggi(self) -> bool {
        self.index() % 2 == 0
    }

    /// Korean name.
    pub fn hangul(self) -> &'static str {
        const NAMES: [&str; 24] = [
            "춘분", "청명", "곡우", "입하", "소만", "망종", "하지", "소서", "대서", "입추", "처서",
            "백로", "추분", "한로", "상강", "입동", "소설", "대설", "동지", "소한", "대한", "입춘",
            "우수", "경칩",
        ];
        NAMES[self.index()]
    }

    /// Hanja name.
    pub fn hanja(self) -> &'static str {
        const NAMES: [&str; 24] = [
            "春分", "淸明", "穀雨", "立夏", "小滿", "芒種", "夏至", "小暑", "大暑", "立秋", "處暑",
            "白露", "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒", "立春",
            "雨水", "驚蟄",
        ];
        NAMES[self.index()]
    }
}

impl fmt::Display for SolarTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hangul())
    }
}

/// The instant the sun reached one grid line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarTermCrossing {
    pub term: SolarTerm,
    /// Multiple of 15° in `[0, 360)`.
    pub target_longitude: f64,
    pub instant: DateTime<FixedOffset>,
}

/// Search tuning, normally taken from [`SearchConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub wide_step: Duration,
    pub day_step: Duration,
    pub bisection_iterations: u32,
    pub dedup: Duration,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for SearchOptions {
    fn from(config: &SearchConfig) -> Self {
        SearchOptions {
            wide_step: config.wide_step(),
            day_step: config.day_step(),
            bisection_iterations: config.bisection_iterations,
            dedup: config.dedup(),
        }
    }
}

/// Refine the instant at which an increasing unwrapped longitude reaches
/// `target` inside `(lo, hi]`.
///
/// `reference` is the unwrapped longitude at `lo`; every midpoint value is
/// unwrapped relative to it.  Returns the final upper bound, which is the
/// first instant known to be at or past the target.
pub fn bisect_crossing<F>(
    mut lo: DateTime<Utc>,
    mut hi: DateTime<Utc>,
    reference: f64,
    target: f64,
    iterations: u32,
    mut longitude_at: F,
) -> Result<DateTime<Utc>, EphemerisError>
where
    F: FnMut(DateTime<Utc>) -> Result<f64, EphemerisError>,
{
    for _ in 0..iterations {
        let half = (hi - lo) / 2;
        if half.is_zero() {
            break;
        }
        let mid = lo + half;
        let mid_lon = unwrap_relative(reference, longitude_at(mid)?);
        if mid_lon >= target {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// A grid line bracketed between two adjacent samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub grid_index: i64,
    /// Index of the left sample.
    pub sample: usize,
}

/// Every grid line crossed between adjacent unwrapped samples.
///
/// Pairs that do not increase contribute nothing.  A grid value equal to the
/// right-hand sample belongs to that pair.
pub fn detect_brackets(unwrapped: &[f64], step_deg: f64) -> Vec<Bracket> {
    unwrapped
        .windows(2)
        .enumerate()
        .flat_map(|(i, pair)| {
            grid_indices_between(pair[0], pair[1], step_deg).map(move |k| Bracket {
                grid_index: k,
                sample: i,
            })
        })
        .collect()
}

/// Sort ascending and drop events within `min_gap` of the last kept one.
pub fn dedup_crossings(
    mut crossings: Vec<SolarTermCrossing>,
    min_gap: Duration,
) -> Vec<SolarTermCrossing> {
    crossings.sort_by_key(|c| c.instant);
    let mut kept: Vec<SolarTermCrossing> = Vec::with_capacity(crossings.len());
    for c in crossings {
        if let Some(last) = kept.last() {
            if (c.instant - last.instant).abs() < min_gap {
                continue;
            }
        }
        kept.push(c);
    }
    kept
}

/// Finds solar-term crossings using an injected provider.
///
/// Instants are reported in the finder's fixed `offset`.
pub struct CrossingFinder<'a, P: EphemerisProvider + ?Sized> {
    provider: &'a P,
    offset: FixedOffset,
    options: SearchOptions,
}

impl<'a, P: EphemerisProvider + ?Sized> CrossingFinder<'a, P> {
    pub fn new(provider: &'a P, offset: FixedOffset) -> Self {
        Self::with_options(provider, offset, SearchOptions::default())
    }

    pub fn with_options(provider: &'a P, offset: FixedOffset, options: SearchOptions) -> Self {
        CrossingFinder {
            provider,
            offset,
            options,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn longitude_at(&self, at: DateTime<Utc>) -> Result<f64, EphemerisError> {
        Ok(self.provider.sun_longitude(at)?.value())
    }

    /// All crossings in `window`, sampled every `step`.
    ///
    /// An empty or inverted window yields no crossings.
    pub fn find_in_window(
        &self,
        window: SearchWindow,
        step: Duration,
    ) -> Result<Vec<SolarTermCrossing>, EphemerisError> {
        let times = window.sample(step);
        if times.len() < 2 {
            return Ok(Vec::new());
        }

        let samples = times
            .iter()
            .map(|&t| self.longitude_at(t))
            .collect::<Result<Vec<f64>, _>>()?;
        let unwrapped = unwrap_longitudes(&samples);

        let brackets = detect_brackets(&unwrapped, TERM_STEP_DEG);
        let mut crossings = Vec::with_capacity(brackets.len());
        for b in &brackets {
            let target = b.grid_index as f64 * TERM_STEP_DEG;
            let reference = unwrapped[b.sample];
            let instant = bisect_crossing(
                times[b.sample],
                times[b.sample + 1],
                reference,
                target,
                self.options.bisection_iterations,
                |t| self.longitude_at(t),
            )?;
            crossings.push(SolarTermCrossing {
                term: SolarTerm::from_index(b.grid_index),
                target_longitude: normalize_360(target),
                instant: instant.with_timezone(&self.offset),
            });
        }

        let crossings = dedup_crossings(crossings, self.options.dedup);
        debug!(
            "{} samples over {window}: {} crossings",
            times.len(),
            crossings.len()
        );
        Ok(crossings)
    }

    /// Crossings inside `[00:00, 24:00)` of `date` in the finder's offset.
    pub fn find_for_local_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<SolarTermCrossing>, EphemerisError> {
        let Some(window) = SearchWindow::local_day(date, self.offset) else {
            return Ok(Vec::new());
        };
        let crossings = self.find_in_window(window, self.options.day_step)?;
        Ok(crossings
            .into_iter()
            .filter(|c| {
                let at = c.instant.with_timezone(&Utc);
                window.start <= at && at < window.end
            })
            .collect())
    }

    /// The latest crossing at or before `instant` within `lookback_days`.
    pub fn last_crossing_before(
        &self,
        instant: DateTime<Utc>,
        lookback_days: i64,
    ) -> Result<Option<SolarTermCrossing>, EphemerisError> {
        let window = SearchWindow::lookback(instant, lookback_days);
        let crossings = self.find_in_window(window, self.options.wide_step)?;
        Ok(crossings
            .into_iter()
            .filter(|c| c.instant.with_timezone(&Utc) <= instant)
            .max_by_key(|c| c.instant))
    }
}
