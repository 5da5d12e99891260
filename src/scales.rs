// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time-scale markers.
//!
//! | Marker | Axis | Relation to JD(TT) |
//! |--------|------|--------------------|
//! | [`TT`] | Terrestrial Time, the axis of the solar series | identity |
//! | [`UT`] | Universal Time, the axis of civil timestamps | `+ ΔT` |

use super::delta_t::delta_t_seconds_from_ut;
use super::instant::TimeScale;
use qtty::{Day, Days};

/// Terrestrial Time.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct TT;

impl TimeScale for TT {
    const LABEL: &'static str = "TT";

    #[inline(always)]
    fn to_jd_tt(value: Days) -> Days {
        value
    }

    #[inline(always)]
    fn from_jd_tt(jd_tt: Days) -> Days {
        jd_tt
    }
}

/// Universal Time, tied to Earth's rotation.
///
/// `to_jd_tt` adds ΔT for the epoch; the inverse solves
/// `ut + ΔT(ut) = tt` by fixed-point iteration.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct UT;

impl TimeScale for UT {
    const LABEL: &'static str = "UT";

    #[inline]
    fn to_jd_tt(ut_value: Days) -> Days {
        ut_value + delta_t_seconds_from_ut(ut_value).to::<Day>()
    }

    #[inline]
    fn from_jd_tt(jd_tt: Days) -> Days {
        // dΔT/dJD ≈ 3e-8: three rounds are plenty.
        let mut ut = jd_tt;
        for _ in 0..3 {
            ut = jd_tt - delta_t_seconds_from_ut(ut).to::<Day>();
        }
        ut
    }
}
