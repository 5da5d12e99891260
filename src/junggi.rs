// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Mid-terms (中氣, *junggi*): the twelve solar terms on the 30° grid that
//! bound the astronomical months.

use chrono::{DateTime, NaiveDate, Utc};

use crate::ephemeris::EphemerisProvider;
use crate::error::EphemerisError;
use crate::solar_terms::{CrossingFinder, SolarTerm, SolarTermCrossing};

/// Keep the crossings on the 30° grid, in chronological order.
///
/// Each kept crossing is relabelled from its longitude, so a crossing whose
/// name and angle disagree ends up named by the angle.
pub fn filter_junggi(crossings: &[SolarTermCrossing]) -> Vec<SolarTermCrossing> {
    let mut out: Vec<SolarTermCrossing> = crossings
        .iter()
        .filter(|c| (c.target_longitude % 30.0).abs() < 1e-9)
        .map(|c| SolarTermCrossing {
            term: SolarTerm::from_longitude(c.target_longitude),
            ..c.clone()
        })
        .collect();
    out.sort_by_key(|c| c.instant);
    out
}

/// Month slot (0 = 寅) that begins at a junggi.
///
/// 雨水 (330°) opens slot 0; each following junggi opens the next slot.
pub fn month_slot(term: SolarTerm) -> usize {
    (term.index() + 24 - SolarTerm::Usu.index()) % 24 / 2
}

impl<P: EphemerisProvider + ?Sized> CrossingFinder<'_, P> {
    /// Junggi crossings on `date` in the finder's offset.
    pub fn find_junggi_for_local_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<SolarTermCrossing>, EphemerisError> {
        Ok(filter_junggi(&self.find_for_local_date(date)?))
    }

    /// The latest junggi at or before `instant`, searching `lookback_days`.
    pub fn last_junggi_before(
        &self,
        instant: DateTime<Utc>,
        lookback_days: i64,
    ) -> Result<Option<SolarTermCrossing>, EphemerisError> {
        let window = crate::window::SearchWindow::lookback(instant, lookback_days);
        let crossings = self.find_in_window(window, self.options().wide_step)?;
        let before: Vec<SolarTermCrossing> = crossings
            .into_iter()
            .filter(|c| c.instant.with_timezone(&Utc) <= instant)
            .collect();
        Ok(filter_junggi(&before).pop())
    }
}
