// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Precomputed Chebyshev table of the solar longitude.
//!
//! The analytic series is sampled once at Chebyshev nodes over fixed-length
//! segments and each segment is stored as a coefficient vector.  Evaluating
//! the table is a bounds check plus one Clenshaw recurrence, which keeps the
//! hundreds of evaluations a crossing search makes cheap.

use crate::angle::{normalize_360, unwrap_relative};
use crate::instant::JulianEphemerisDay;
use qtty::{Days, Degrees};
use std::f64::consts::PI;

/// Evaluate `sum(c_k * T_k(s))` by the Clenshaw recurrence.
///
/// `s` is the normalised argument in `[-1, 1]`.
pub fn clenshaw(coeffs: &[f64], s: f64) -> f64 {
    match coeffs.len() {
        0 => return 0.0,
        1 => return coeffs[0],
        _ => {}
    }

    let mut b1 = 0.0;
    let mut b2 = 0.0;
    let two_s = 2.0 * s;
    for &c in coeffs[1..].iter().rev() {
        let b = two_s * b1 - b2 + c;
        b2 = b1;
        b1 = b;
    }
    s * b1 - b2 + coeffs[0]
}

/// Chebyshev interpolant of `f` on `[-1, 1]` with `n` coefficients.
///
/// `f` is sampled at the `n` Chebyshev nodes `cos(π(k + ½)/n)`.
pub fn fit<F>(n: usize, f: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    if n == 0 {
        return Vec::new();
    }
    let nf = n as f64;
    let values: Vec<f64> = (0..n)
        .map(|k| f((PI * (k as f64 + 0.5) / nf).cos()))
        .collect();

    let mut coeffs: Vec<f64> = (0..n)
        .map(|j| {
            let sum: f64 = values
                .iter()
                .enumerate()
                .map(|(k, v)| v * (PI * j as f64 * (k as f64 + 0.5) / nf).cos())
                .sum();
            2.0 / nf * sum
        })
        .collect();
    coeffs[0] *= 0.5;
    coeffs
}

/// One fitted span of the table.
#[derive(Debug, Clone)]
struct Segment {
    coeffs: Vec<f64>,
}

/// Tabulated longitude over `[start, end)` on the TT axis.
#[derive(Debug, Clone)]
pub struct SolarTable {
    start: JulianEphemerisDay,
    end: JulianEphemerisDay,
    segment: Days,
    segments: Vec<Segment>,
}

impl SolarTable {
    /// Fit `source` over `[start, end)` with segments of `segment` length and
    /// `degree` coefficients each.
    ///
    /// Inside a segment the longitude is unwrapped around its midpoint value
    /// so the fitted function is smooth across 0°/360°.
    pub fn build<F>(
        start: JulianEphemerisDay,
        end: JulianEphemerisDay,
        segment: Days,
        degree: usize,
        source: F,
    ) -> Self
    where
        F: Fn(JulianEphemerisDay) -> f64,
    {
        let span = (end - start).value();
        let count = if span > 0.0 && segment.value() > 0.0 {
            (span / segment.value()).ceil() as usize
        } else {
            0
        };
        let half = segment / 2.0;

        let segments = (0..count)
            .map(|i| {
                let mid = start + segment * i as f64 + half;
                let anchor = source(mid);
                let coeffs = fit(degree, |s| unwrap_relative(anchor, source(mid + half * s)));
                Segment { coeffs }
            })
            .collect();

        SolarTable {
            start,
            end,
            segment,
            segments,
        }
    }

    pub fn start(&self) -> JulianEphemerisDay {
        self.start
    }

    pub fn end(&self) -> JulianEphemerisDay {
        self.end
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn covers(&self, jde: JulianEphemerisDay) -> bool {
        self.start <= jde && jde < self.end
    }

    /// Longitude at `jde`, or `None` outside the table.
    pub fn longitude(&self, jde: JulianEphemerisDay) -> Option<Degrees> {
        if !self.covers(jde) {
            return None;
        }
        let offset = (jde - self.start).value() / self.segment.value();
        let index = (offset.floor() as usize).min(self.segments.len().checked_sub(1)?);
        let local = offset - index as f64;
        let s = (2.0 * local - 1.0).clamp(-1.0, 1.0);
        let raw = clenshaw(&self.segments[index].coeffs, s);
        Some(Degrees::new(normalize_360(raw)))
    }
}
