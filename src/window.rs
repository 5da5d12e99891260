// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! UTC search windows.
//!
//! A [`SearchWindow`] is the span a crossing search samples.  Windows are
//! built either directly from two UTC instants, from a local calendar day in
//! a fixed offset, or as a lookback ending at an instant.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::fmt;

/// A closed UTC interval `[start, end]` to be sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SearchWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        SearchWindow { start, end }
    }

    /// The 24 hours of `date` in `offset`, as UTC.
    ///
    /// Returns `None` when the date's midnight is not representable.
    pub fn local_day(date: NaiveDate, offset: FixedOffset) -> Option<Self> {
        let midnight = offset
            .from_local_datetime(&date.and_time(NaiveTime::MIN))
            .single()?
            .with_timezone(&Utc);
        Some(SearchWindow::new(midnight, midnight + Duration::days(1)))
    }

    /// The window of `days` ending at `end`.
    pub fn lookback(end: DateTime<Utc>, days: i64) -> Self {
        SearchWindow::new(end - Duration::days(days), end)
    }

    /// True when the window holds no time at all (`end <= start`).
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Sample instants from `start` every `step`, always ending at `end`.
    ///
    /// An empty window or a non-positive step gives no samples.
    pub fn sample(&self, step: Duration) -> Vec<DateTime<Utc>> {
        if self.is_empty() || step <= Duration::zero() {
            return Vec::new();
        }
        let mut out = Vec::new();
        let mut t = self.start;
        while t <= self.end {
            out.push(t);
            t += step;
        }
        if out.last().is_some_and(|&last| last < self.end) {
            out.push(self.end);
        }
        out
    }
}

impl fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
