// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # ΔT (TT − UT)
//!
//! Piecewise model used when civil timestamps are moved onto the dynamical
//! axis of the solar series:
//!
//! * **before 1620**: Stephenson & Houlden (1986) quadratic;
//! * **1620–1992**: biennial table compiled by Meeus (ch. 9), bicubic
//!   interpolation;
//! * **1992–2026**: annual observed values (IERS/USNO Bulletin A), linear
//!   interpolation;
//! * **after 2026**: linear extrapolation at the recent observed rate.
//!
//! A one-minute error in ΔT moves a solar-term instant by one minute, so the
//! observed segment matters for the dates this crate is asked about most.

use qtty::{Days, Seconds};

/// Number of biennial terms (1620–1992).
const TERMS: usize = 187;

/// Biennial ΔT table from 1620 to 1992 (seconds), Meeus.
#[rustfmt::skip]
const DELTA_T: [Seconds; TERMS] = qtty::qtty_vec!(
    Seconds;
    124.0,115.0,106.0, 98.0, 91.0, 85.0, 79.0, 74.0, 70.0, 65.0,
     62.0, 58.0, 55.0, 53.0, 50.0, 48.0, 46.0, 44.0, 42.0, 40.0,
     37.0, 35.0, 33.0, 31.0, 28.0, 26.0, 24.0, 22.0, 20.0, 18.0,
     16.0, 14.0, 13.0, 12.0, 11.0, 10.0,  9.0,  9.0,  9.0,  9.0,
      9.0,  9.0,  9.0,  9.0, 10.0, 10.0, 10.0, 10.0, 10.0, 11.0,
     11.0, 11.0, 11.0, 11.0, 11.0, 11.0, 12.0, 12.0, 12.0, 12.0,
     12.0, 12.0, 13.0, 13.0, 13.0, 13.0, 14.0, 14.0, 14.0, 15.0,
     15.0, 15.0, 15.0, 16.0, 16.0, 16.0, 16.0, 16.0, 17.0, 17.0,
     17.0, 17.0, 17.0, 17.0, 17.0, 17.0, 16.0, 16.0, 15.0, 14.0,
     13.7, 13.1, 12.7, 12.5, 12.5, 12.5, 12.5, 12.5, 12.5, 12.3,
     12.0, 11.4, 10.6,  9.6,  8.6,  7.5,  6.6,  6.0,  5.7,  5.6,
      5.7,  5.9,  6.2,  6.5,  6.8,  7.1,  7.3,  7.5,  7.7,  7.8,
      7.9,  7.5,  6.4,  5.4,  2.9,  1.6, -1.0, -2.7, -3.6, -4.7,
     -5.4, -5.2, -5.5, -5.6, -5.8, -5.9, -6.2, -6.4, -6.1, -4.7,
     -2.7,  0.0,  2.6,  5.4,  7.7, 10.5, 13.4, 16.0, 18.2, 20.2,
     21.2, 22.4, 23.5, 23.9, 24.3, 24.0, 23.9, 23.9, 23.7, 24.0,
     24.3, 25.3, 26.2, 27.3, 28.2, 29.1, 30.0, 30.7, 31.4, 32.2,
     33.1, 34.0, 35.0, 36.5, 38.3, 40.2, 42.2, 44.5, 46.5, 48.5,
     50.5, 52.2, 53.8, 54.9, 55.8, 56.9, 58.3,
);

/// Annual observed ΔT (seconds), index 0 = 1992.0.
const OBSERVED_TERMS: usize = 34;
const OBSERVED_START_YEAR: f64 = 1992.0;

#[rustfmt::skip]
const OBSERVED_DT: [Seconds; OBSERVED_TERMS] = qtty::qtty_vec!(
    Seconds;
    // 1992  1993   1994   1995   1996   1997   1998   1999
    58.31, 59.12, 59.98, 60.78, 61.63, 62.30, 62.97, 63.47,
    // 2000  2001   2002   2003   2004   2005   2006   2007
    63.83, 64.09, 64.30, 64.47, 64.57, 64.69, 64.85, 65.15,
    // 2008  2009   2010   2011   2012   2013   2014   2015
    65.46, 65.78, 66.07, 66.32, 66.60, 66.91, 67.28, 67.64,
    // 2016  2017   2018   2019   2020   2021   2022   2023
    68.10, 68.59, 68.97, 69.22, 69.36, 69.36, 69.29, 69.18,
    // 2024  2025
    69.09, 69.36,
);

const OBSERVED_END_YEAR: f64 = OBSERVED_START_YEAR + OBSERVED_TERMS as f64;

/// Seconds per year past the last observed value.
const EXTRAPOLATION_RATE: f64 = 0.02;

const JD_J2000: f64 = 2_451_545.0;
const JD_1620: f64 = 2_312_752.5;
const JD_1992: f64 = 2_448_622.5;
const JD_2026: f64 = 2_461_041.5;

/// Fractional Gregorian-ish year for a UT Julian Day.
#[inline]
fn decimal_year(jd_ut: f64) -> f64 {
    2000.0 + (jd_ut - JD_J2000) / 365.25
}

/// **Before 1620.** Stephenson & Houlden, centred on 1850.
#[inline]
fn delta_t_early(jd_ut: f64) -> Seconds {
    const JD_1850: f64 = 2_396_758.5;
    let c = (jd_ut - JD_1850) / 36_525.0;
    Seconds::new(22.5 * c * c)
}

/// **1620–1992.** Bicubic interpolation in the biennial table.
#[inline]
fn delta_t_table(jd_ut: f64) -> Seconds {
    const STEP: f64 = 730.5;
    let i = (((jd_ut - JD_1620) / STEP) as usize).min(TERMS - 3);
    let a = DELTA_T[i + 1] - DELTA_T[i];
    let b = DELTA_T[i + 2] - DELTA_T[i + 1];
    let c = a - b;
    let n = (jd_ut - (JD_1620 + STEP * i as f64)) / STEP;
    DELTA_T[i + 1] + n / 2.0 * (a + b + n * c)
}

/// **1992–2026.** Linear interpolation between annual observations.
#[inline]
fn delta_t_observed(jd_ut: f64) -> Seconds {
    let idx_f = decimal_year(jd_ut) - OBSERVED_START_YEAR;
    let idx = idx_f as usize;
    if idx + 1 >= OBSERVED_TERMS {
        return OBSERVED_DT[OBSERVED_TERMS - 1];
    }
    let frac = idx_f - idx as f64;
    OBSERVED_DT[idx] + frac * (OBSERVED_DT[idx + 1] - OBSERVED_DT[idx])
}

/// **After 2026.** Linear extrapolation from the last observation.
#[inline]
fn delta_t_extrapolated(jd_ut: f64) -> Seconds {
    let years_past = decimal_year(jd_ut) - OBSERVED_END_YEAR;
    OBSERVED_DT[OBSERVED_TERMS - 1] + Seconds::new(EXTRAPOLATION_RATE * years_past)
}

/// Returns **ΔT** in seconds for a Julian Day on the UT axis.
#[inline]
pub(crate) fn delta_t_seconds_from_ut(jd_ut: Days) -> Seconds {
    match jd_ut.value() {
        jd if jd < JD_1620 => delta_t_early(jd),
        jd if jd < JD_1992 => delta_t_table(jd),
        jd if jd < JD_2026 => delta_t_observed(jd),
        jd => delta_t_extrapolated(jd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(jd: f64) -> Seconds {
        delta_t_seconds_from_ut(Days::new(jd))
    }

    #[test]
    fn table_start_matches_second_entry() {
        assert!((dt(JD_1620) - Seconds::new(115.0)).abs() < Seconds::new(1e-6));
    }

    #[test]
    fn table_upper_clip() {
        let v = delta_t_table(2_449_356.0);
        assert!((v - Seconds::new(59.3)).abs() < Seconds::new(1e-6));
    }

    #[test]
    fn early_twentieth_century_is_small() {
        // 1900-01-01: ΔT ≈ -2.7 s
        let v = dt(2_415_020.5);
        assert!(v.value().abs() < 5.0, "ΔT(1900) = {v}");
    }

    #[test]
    fn observed_j2000() {
        assert!((dt(JD_J2000) - Seconds::new(63.83)).abs() < Seconds::new(0.1));
    }

    #[test]
    fn observed_segment_is_continuous_at_1992() {
        let below = dt(JD_1992 - 1e-6);
        let above = dt(JD_1992);
        assert!((below - above).abs() < Seconds::new(1.0));
    }

    #[test]
    fn extrapolation_grows_slowly() {
        let at_2026 = dt(JD_2026);
        let at_2100 = dt(JD_2026 + 74.0 * 365.25);
        let growth = (at_2100 - at_2026).value();
        assert!((growth - 74.0 * EXTRAPOLATION_RATE).abs() < 0.05);
    }

    #[test]
    fn early_branch_before_1620() {
        // 1500: roughly three minutes
        let v = dt(2_268_923.5);
        assert!(v.value() > 100.0 && v.value() < 300.0, "ΔT(1500) = {v}");
    }
}
