// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Angle helpers for ecliptic longitudes.
//!
//! The crossing search works on *unwrapped* longitudes: a bounded `[0, 360)`
//! sample sequence is lifted onto the real line so that the seam at 0°/360°
//! reads as a continuation (`359° → 361°`) and never as a jump.  Everything
//! here is a pure function over plain `f64` degrees so the search can be
//! exercised with synthetic sequences.

/// Wrap an angle into `[0, 360)`.
#[inline]
pub fn normalize_360(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

/// Wrap an angle into `(-180, 180]`.
#[inline]
pub fn normalize_pm180(deg: f64) -> f64 {
    let r = normalize_360(deg);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

/// Shift `value` by whole turns so it lies within 180° of `reference`.
#[inline]
pub fn unwrap_relative(reference: f64, value: f64) -> f64 {
    let mut v = value;
    while v < reference - 180.0 {
        v += 360.0;
    }
    while v > reference + 180.0 {
        v -= 360.0;
    }
    v
}

/// Lift a bounded longitude sequence onto a continuous one.
///
/// The first sample is kept as is; every later sample is unwrapped relative
/// to its already-unwrapped predecessor.
pub fn unwrap_longitudes(samples: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(samples.len());
    for &lon in samples {
        let next = match out.last() {
            Some(&prev) => unwrap_relative(prev, lon),
            None => lon,
        };
        out.push(next);
    }
    out
}

/// Grid indices `k` with `k * step` in the half-open range `(a, b]`.
///
/// Empty when `b <= a`.
pub fn grid_indices_between(a: f64, b: f64, step: f64) -> std::ops::RangeInclusive<i64> {
    if b <= a {
        #[allow(clippy::reversed_empty_ranges)]
        return 1..=0;
    }
    let first = (a / step).floor() as i64 + 1;
    let last = (b / step).floor() as i64;
    first..=last
}
