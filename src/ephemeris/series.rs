// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Analytic apparent solar longitude.
//!
//! The pipeline of Meeus, *Astronomical Algorithms* (2nd ed.) ch. 25
//! "higher accuracy", as used by the NREL Solar Position Algorithm:
//!
//! 1. heliocentric Earth longitude `L` and distance `R` from VSOP87D;
//! 2. geocentric Sun longitude `Θ = L + 180°`, reduced to FK5 (−0.09033″);
//! 3. nutation in longitude Δψ (IAU 2000B);
//! 4. annual aberration −20.4898″ / R.
//!
//! The result is referred to the true equinox of date and agrees with
//! published equinox and solstice instants to a few seconds of time.

use crate::angle::normalize_360;
use crate::instant::JulianEphemerisDay;
use qtty::Degrees;

use super::nutation::nutation_in_longitude;
use super::vsop87::{evaluate, EARTH_L, EARTH_R};

const ARCSEC: f64 = 1.0 / 3600.0;
const FK5_CORRECTION: f64 = -0.090_33 * ARCSEC;
const ABERRATION: f64 = -20.489_8 * ARCSEC;

/// Geometric geocentric longitude (degrees, FK5, mean equinox of date)
/// and Sun–Earth distance in AU.
fn geometric(jde: JulianEphemerisDay) -> (f64, f64) {
    let tau = jde.julian_centuries() / 10.0;
    let l = evaluate(&EARTH_L, tau).to_degrees();
    let r = evaluate(&EARTH_R, tau);
    (l + 180.0 + FK5_CORRECTION, r)
}

/// Apparent geocentric ecliptic longitude of the Sun, in `[0, 360)`.
pub fn apparent_longitude(jde: JulianEphemerisDay) -> Degrees {
    let (theta, r) = geometric(jde);
    let dpsi = nutation_in_longitude(jde.julian_centuries()) * ARCSEC;
    Degrees::new(normalize_360(theta + dpsi + ABERRATION / r))
}
