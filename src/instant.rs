// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Scale-tagged instants used by the ephemeris.
//!
//! [`Time<S>`] stores a Julian Day in [`Days`] whose axis is fixed by the
//! compile-time marker `S: TimeScale`.  Civil timestamps enter as
//! [`Time<UT>`](crate::UT) through [`Time::from_utc`]; the solar series are
//! evaluated on [`Time<TT>`](crate::TT), and the ΔT correction between the
//! two axes is applied by the scale markers themselves.

use chrono::{DateTime, Utc};
use qtty::{Day, Days, Second, Seconds, Simplify};
use std::marker::PhantomData;
use std::ops::{Add, Sub};

use super::scales::{TT, UT};

/// Julian Day of the Unix epoch (1970-01-01T00:00:00Z).
const UNIX_EPOCH_JD: Days = Days::new(2_440_587.5);

/// Marker trait for time scales.
///
/// Each scale relates its own Julian Day to the Julian Day on the uniform TT
/// axis, which is the canonical representation used for conversion.
pub trait TimeScale: Copy + Clone + std::fmt::Debug + PartialEq + PartialOrd + 'static {
    /// Display label used by [`Time`] formatting.
    const LABEL: &'static str;

    /// Convert a Julian Day on this scale to a Julian Day on TT.
    fn to_jd_tt(value: Days) -> Days;

    /// Convert a Julian Day on TT back to this scale.
    fn from_jd_tt(jd_tt: Days) -> Days;
}

/// A point on time scale `S`, stored as a Julian Day.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct Time<S: TimeScale> {
    quantity: Days,
    _scale: PhantomData<S>,
}

/// Julian Ephemeris Day: a Julian Day on the TT axis.
pub type JulianEphemerisDay = Time<TT>;

impl<S: TimeScale> Time<S> {
    /// Create from a raw Julian Day on this scale.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self {
            quantity: Days::new(value),
            _scale: PhantomData,
        }
    }

    /// Create from a [`Days`] quantity.
    #[inline]
    pub const fn from_days(days: Days) -> Self {
        Self {
            quantity: days,
            _scale: PhantomData,
        }
    }

    /// The underlying Julian Day.
    #[inline]
    pub const fn quantity(&self) -> Days {
        self.quantity
    }

    /// The underlying Julian Day as a scalar.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.quantity.value()
    }

    /// Convert this instant to another time scale through the TT axis.
    #[inline]
    pub fn to<T: TimeScale>(&self) -> Time<T> {
        Time::<T>::from_days(T::from_jd_tt(S::to_jd_tt(self.quantity)))
    }

    /// Build an instant from a civil UTC timestamp.
    ///
    /// The timestamp is read as Universal Time; converting to a dynamical
    /// scale adds ΔT.
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        let whole = Seconds::new(datetime.timestamp() as f64);
        let nanos = Seconds::new(datetime.timestamp_subsec_nanos() as f64 / 1e9);
        let jd_ut = UNIX_EPOCH_JD + (whole + nanos).to::<Day>();
        Time::<UT>::from_days(jd_ut).to::<S>()
    }

    /// Convert back to a UTC timestamp, removing ΔT.
    ///
    /// Returns `None` outside chrono's representable range.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        let jd_ut = self.to::<UT>().quantity();
        let since_epoch = (jd_ut - UNIX_EPOCH_JD).to::<Second>().value();
        let secs = since_epoch.floor() as i64;
        let nanos = ((since_epoch - secs as f64) * 1e9) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos)
    }
}

impl Time<TT> {
    /// J2000.0 epoch: 2000-01-01T12:00:00 TT.
    pub const J2000: Self = Self::new(2_451_545.0);

    /// One Julian century in days.
    pub const JULIAN_CENTURY: Days = Days::new(36_525.0);

    /// Julian centuries since J2000.0, the argument of the solar series.
    #[inline]
    pub fn julian_centuries(&self) -> f64 {
        ((*self - Self::J2000) / Self::JULIAN_CENTURY)
            .simplify()
            .value()
    }
}

impl<S: TimeScale> std::fmt::Display for Time<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", S::LABEL, self.quantity)
    }
}

impl<S: TimeScale> Add<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity + rhs)
    }
}

impl<S: TimeScale> Sub<Days> for Time<S> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Days) -> Self::Output {
        Self::from_days(self.quantity - rhs)
    }
}

impl<S: TimeScale> Sub for Time<S> {
    type Output = Days;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.quantity - rhs.quantity
    }
}
