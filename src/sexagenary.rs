// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Stems, branches and the sexagenary cycle.
//!
//! A [`Pillar`] pairs one of the 10 heavenly stems with one of the 12
//! earthly branches.  Only pairs with equal index parity occur, which is why
//! the cycle has 60 positions and not 120; every constructor here either
//! derives both halves from one cycle index or checks parity.
//!
//! The year, day and hour pillars are plain arithmetic on the calendar:
//!
//! | Pillar | Cycle index |
//! |--------|-------------|
//! | year | `(year − 1984) mod 60` (1984 = 甲子) |
//! | day | `(days since 1900-01-31 + 40) mod 60` (1900-01-31 = 甲辰) |
//! | month | stem `(2·year_stem + month_number) mod 10`, branch from the month slot |
//! | hour | stem `(2·day_stem + hour_branch) mod 10`, branch from the two-hour slot |

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::error::InputError;

/// The five elements (五行).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Element::Wood => "wood",
            Element::Fire => "fire",
            Element::Earth => "earth",
            Element::Metal => "metal",
            Element::Water => "water",
        }
    }

    pub fn hanja(self) -> &'static str {
        ["木", "火", "土", "金", "水"][self.index()]
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Heavenly stem (天干).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stem {
    Gap,
    Eul,
    Byeong,
    Jeong,
    Mu,
    Gi,
    Gyeong,
    Sin,
    Im,
    Gye,
}

impl Stem {
    pub const ALL: [Stem; 10] = [
        Stem::Gap,
        Stem::Eul,
        Stem::Byeong,
        Stem::Jeong,
        Stem::Mu,
        Stem::Gi,
        Stem::Gyeong,
        Stem::Sin,
        Stem::Im,
        Stem::Gye,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i64) -> Stem {
        Self::ALL[index.rem_euclid(10) as usize]
    }

    pub fn hanja(self) -> &'static str {
        ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"][self.index()]
    }

    pub fn hangul(self) -> &'static str {
        ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"][self.index()]
    }

    /// Stems go in yang/yin pairs per element.
    pub fn element(self) -> Element {
        Element::ALL[self.index() / 2]
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanja())
    }
}

impl Serialize for Stem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hanja())
    }
}

/// Earthly branch (地支).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    Ja,
    Chuk,
    In,
    Myo,
    Jin,
    Sa,
    O,
    Mi,
    Sin,
    Yu,
    Sul,
    Hae,
}

impl Branch {
    pub const ALL: [Branch; 12] = [
        Branch::Ja,
        Branch::Chuk,
        Branch::In,
        Branch::Myo,
        Branch::Jin,
        Branch::Sa,
        Branch::O,
        Branch::Mi,
        Branch::Sin,
        Branch::Yu,
        Branch::Sul,
        Branch::Hae,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: i64) -> Branch {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    pub fn hanja(self) -> &'static str {
        [
            "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
        ][self.index()]
    }

    pub fn hangul(self) -> &'static str {
        [
            "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
        ][self.index()]
    }

    /// Dominant element (本氣).
    pub fn element(self) -> Element {
        match self {
            Branch::In | Branch::Myo => Element::Wood,
            Branch::Sa | Branch::O => Element::Fire,
            Branch::Jin | Branch::Sul | Branch::Chuk | Branch::Mi => Element::Earth,
            Branch::Sin | Branch::Yu => Element::Metal,
            Branch::Hae | Branch::Ja => Element::Water,
        }
    }

    /// Hidden stems (支藏干) with their shares; shares sum to 1.
    pub fn hidden_stems(self) -> &'static [(Stem, f64)] {
        use Stem::*;
        match self {
            Branch::Ja => &[(Gye, 1.0)],
            Branch::Chuk => &[(Gi, 0.6), (Gye, 0.3), (Sin, 0.1)],
            Branch::In => &[(Gap, 0.6), (Byeong, 0.3), (Mu, 0.1)],
            Branch::Myo => &[(Eul, 1.0)],
            Branch::Jin => &[(Mu, 0.6), (Eul, 0.3), (Gye, 0.1)],
            Branch::Sa => &[(Byeong, 0.6), (Gyeong, 0.3), (Mu, 0.1)],
            Branch::O => &[(Jeong, 0.6), (Gi, 0.3), (Byeong, 0.1)],
            Branch::Mi => &[(Gi, 0.6), (Jeong, 0.3), (Eul, 0.1)],
            Branch::Sin => &[(Gyeong, 0.6), (Im, 0.3), (Mu, 0.1)],
            Branch::Yu => &[(Sin, 1.0)],
            Branch::Sul => &[(Mu, 0.6), (Sin, 0.3), (Jeong, 0.1)],
            Branch::Hae => &[(Im, 0.6), (Gap, 0.3), (Mu, 0.1)],
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hanja())
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.hanja())
    }
}

/// A stem–branch pair from the 60-position cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pillar {
    stem: Stem,
    branch: Branch,
}

impl Pillar {
    /// Position `index mod 60` of the cycle (0 = 甲子).
    pub fn from_cycle_index(index: i64) -> Pillar {
        Pillar {
            stem: Stem::from_index(index),
            branch: Branch::from_index(index),
        }
    }

    /// `None` when the parities differ.
    pub fn new(stem: Stem, branch: Branch) -> Option<Pillar> {
        (stem.index() % 2 == branch.index() % 2).then_some(Pillar { stem, branch })
    }

    pub fn stem(&self) -> Stem {
        self.stem
    }

    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// Position in the cycle, inverse of [`Pillar::from_cycle_index`].
    pub fn cycle_index(&self) -> usize {
        let s = self.stem.index() as i64;
        let b = self.branch.index() as i64;
        (6 * s - 5 * b).rem_euclid(60) as usize
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.stem, self.branch)
    }
}

/// Birth time of day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BirthTime {
    hour: u32,
    minute: u32,
}

impl BirthTime {
    pub fn new(hour: u32, minute: u32) -> Option<BirthTime> {
        (hour < 24 && minute < 60).then_some(BirthTime { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for BirthTime {
    fn from(t: NaiveTime) -> Self {
        BirthTime {
            hour: t.hour(),
            minute: t.minute(),
        }
    }
}

impl FromStr for BirthTime {
    type Err = InputError;

    /// Parses `HH:MM` (a single-digit hour is accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || InputError::BirthTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(bad());
        }
        let hour: u32 = h.parse().map_err(|_| bad())?;
        let minute: u32 = m.parse().map_err(|_| bad())?;
        BirthTime::new(hour, minute).ok_or_else(bad)
    }
}

impl fmt::Display for BirthTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for BirthTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Calendar the birth date was given in.
///
/// Carried through unchanged: dates are always read as Gregorian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CalendarType {
    #[default]
    Solar,
    Lunar,
}

impl CalendarType {
    /// Case-insensitive; anything unrecognised is `Solar`.
    pub fn normalize(value: Option<&str>) -> CalendarType {
        match value.map(|v| v.trim().to_ascii_uppercase()).as_deref() {
            Some("LUNAR") => CalendarType::Lunar,
            _ => CalendarType::Solar,
        }
    }
}

/// The four pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    /// Present iff a birth time was given.
    pub hour: Option<Pillar>,
}

/// Where a pillar sits in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Year,
    Month,
    Day,
    Hour,
}

impl Position {
    pub fn name(self) -> &'static str {
        match self {
            Position::Year => "year",
            Position::Month => "month",
            Position::Day => "day",
            Position::Hour => "hour",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Chart {
    /// Present pillars with their positions, year first.
    pub fn positions(&self) -> Vec<(Position, Pillar)> {
        let mut out = vec![
            (Position::Year, self.year),
            (Position::Month, self.month),
            (Position::Day, self.day),
        ];
        if let Some(hour) = self.hour {
            out.push((Position::Hour, hour));
        }
        out
    }
}

/// Epoch of the day count; its cycle position is [`REFERENCE_DAY_INDEX`].
pub fn reference_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 31).unwrap_or(NaiveDate::MIN)
}

/// 1900-01-31 is 甲辰.
pub const REFERENCE_DAY_INDEX: i64 = 40;

/// 1984 is 甲子.
pub const REFERENCE_YEAR: i32 = 1984;

pub fn year_cycle_index(year: i32) -> i64 {
    (i64::from(year) - i64::from(REFERENCE_YEAR)).rem_euclid(60)
}

pub fn day_cycle_index(date: NaiveDate) -> i64 {
    let offset = date.signed_duration_since(reference_day()).num_days();
    (offset + REFERENCE_DAY_INDEX).rem_euclid(60)
}

pub fn year_pillar(date: NaiveDate) -> Pillar {
    Pillar::from_cycle_index(year_cycle_index(date.year()))
}

pub fn day_pillar(date: NaiveDate) -> Pillar {
    Pillar::from_cycle_index(day_cycle_index(date))
}

/// Month pillar for `slot` (0 = 寅 … 11 = 丑) in a year with `year_stem`.
///
/// The month number fed to the stem formula is `slot + 2`, which equals the
/// branch index mod 12 and so keeps stem and branch parity together.
pub fn month_pillar_for_slot(year_stem: Stem, slot: usize) -> Pillar {
    let month_number = (slot % 12) as i64 + 2;
    Pillar {
        stem: Stem::from_index(year_stem.index() as i64 * 2 + month_number),
        branch: Branch::from_index(month_number),
    }
}

/// Calendar-month rule: February opens the 寅 month.
pub fn calendar_month_slot(month: u32) -> usize {
    ((month + 10) % 12) as usize
}

/// Month pillar by the calendar-month rule.
pub fn calendar_month_pillar(date: NaiveDate) -> Pillar {
    month_pillar_for_slot(year_pillar(date).stem(), calendar_month_slot(date.month()))
}

/// Two-hour slot; 23:00–00:59 is 子.
pub fn hour_branch(hour: u32) -> Branch {
    if hour == 23 {
        Branch::Ja
    } else {
        Branch::from_index(i64::from((hour + 1) / 2))
    }
}

pub fn hour_pillar(day_stem: Stem, time: BirthTime) -> Pillar {
    let branch = hour_branch(time.hour());
    Pillar {
        stem: Stem::from_index(day_stem.index() as i64 * 2 + branch.index() as i64),
        branch,
    }
}

/// Chart by pure calendar arithmetic.
///
/// `calendar` and `is_leap_month` are accepted for the request contract and
/// do not change the result.
pub fn calculate_chart(
    date: NaiveDate,
    time: Option<BirthTime>,
    calendar: CalendarType,
    is_leap_month: bool,
) -> Chart {
    let _ = (calendar, is_leap_month);
    let day = day_pillar(date);
    Chart {
        year: year_pillar(date),
        month: calendar_month_pillar(date),
        day,
        hour: time.map(|t| hour_pillar(day.stem(), t)),
    }
}
