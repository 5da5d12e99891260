// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Month pillar candidates from junggi boundaries.
//!
//! | Birth time | Junggi on the date | Result |
//! |------------|--------------------|--------|
//! | known | any | 1 pillar, slot of the last junggi at or before birth |
//! | unknown | none | 1 pillar, slot of the last junggi at or before local noon |
//! | unknown | one or more | 2 pillars, slots before and after the first crossing |
//!
//! Any ephemeris failure falls back to the calendar-month rule and records a
//! [`Degradation::EngineFallback`].

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use log::warn;
use serde::Serialize;

use crate::config::{Config, LocaleConfig};
use crate::degradation::Degradation;
use crate::ephemeris::EphemerisProvider;
use crate::error::EphemerisError;
use crate::junggi::month_slot;
use crate::sexagenary::{calendar_month_slot, month_pillar_for_slot, BirthTime, Pillar, Stem};
use crate::solar_terms::{CrossingFinder, SearchOptions};

/// One or two month pillars for a birth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCandidates {
    /// Chronological: before the boundary first.
    pub pillars: Vec<Pillar>,
    /// True iff two candidates are returned.
    pub uncertain: bool,
    #[serde(skip)]
    pub degradations: Vec<Degradation>,
}

impl MonthCandidates {
    fn single(pillar: Pillar, degradations: Vec<Degradation>) -> Self {
        MonthCandidates {
            pillars: vec![pillar],
            uncertain: false,
            degradations,
        }
    }

    /// The first candidate.
    pub fn primary(&self) -> Option<Pillar> {
        self.pillars.first().copied()
    }

    pub fn used_fallback(&self) -> bool {
        self.degradations
            .iter()
            .any(|d| matches!(d, Degradation::EngineFallback { .. }))
    }
}

enum Resolution {
    Slot(usize),
    Boundary(usize),
}

/// Policy C over an injected provider.
pub struct MonthPillarPolicy<'a, P: EphemerisProvider + ?Sized> {
    finder: CrossingFinder<'a, P>,
    locale: LocaleConfig,
    lookback_days: i64,
}

impl<'a, P: EphemerisProvider + ?Sized> MonthPillarPolicy<'a, P> {
    pub fn new(provider: &'a P, config: &Config) -> Self {
        let locale = config.locale.clone();
        MonthPillarPolicy {
            finder: CrossingFinder::with_options(
                provider,
                locale.offset(),
                SearchOptions::from(&config.search),
            ),
            locale,
            lookback_days: config.search.junggi_lookback_days,
        }
    }

    pub fn finder(&self) -> &CrossingFinder<'a, P> {
        &self.finder
    }

    /// Month pillar candidates for a birth on `date`.
    ///
    /// Never fails: engine errors become a calendar-rule pillar plus a
    /// degradation, and an unsupported `timezone` only adds a degradation.
    pub fn candidates(
        &self,
        date: NaiveDate,
        time: Option<BirthTime>,
        year_stem: Stem,
        timezone: &str,
    ) -> MonthCandidates {
        let mut degradations = Vec::new();
        if !self.locale.is_supported(timezone) {
            degradations.push(Degradation::TimezoneFallback {
                requested: timezone.to_string(),
                applied: self.locale.convention(),
            });
        }

        match self.resolve(date, time) {
            Ok(Resolution::Slot(slot)) => {
                MonthCandidates::single(month_pillar_for_slot(year_stem, slot), degradations)
            }
            Ok(Resolution::Boundary(after)) => MonthCandidates {
                pillars: vec![
                    month_pillar_for_slot(year_stem, (after + 11) % 12),
                    month_pillar_for_slot(year_stem, after),
                ],
                uncertain: true,
                degradations,
            },
            Err(e) => {
                warn!("month pillar for {date} uses the calendar rule: {e}");
                degradations.push(Degradation::EngineFallback {
                    reason: e.to_string(),
                });
                let slot = calendar_month_slot(date.month());
                MonthCandidates::single(month_pillar_for_slot(year_stem, slot), degradations)
            }
        }
    }

    fn resolve(
        &self,
        date: NaiveDate,
        time: Option<BirthTime>,
    ) -> Result<Resolution, EphemerisError> {
        let on_date = self.finder.find_junggi_for_local_date(date)?;
        match time {
            Some(t) => self.slot_at(self.local_instant(date, t.to_naive_time())),
            None => match on_date.first() {
                Some(boundary) => Ok(Resolution::Boundary(month_slot(boundary.term))),
                None => {
                    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
                    self.slot_at(self.local_instant(date, noon))
                }
            },
        }
    }

    fn slot_at(&self, instant: DateTime<Utc>) -> Result<Resolution, EphemerisError> {
        let last = self
            .finder
            .last_junggi_before(instant, self.lookback_days)?
            .ok_or(EphemerisError::NoJunggi {
                before: instant,
                lookback_days: self.lookback_days,
            })?;
        Ok(Resolution::Slot(month_slot(last.term)))
    }

    fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let naive = date.and_time(time);
        self.finder
            .offset()
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }
}
