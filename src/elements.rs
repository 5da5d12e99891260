// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Five-element balance of a chart.
//!
//! Each present pillar contributes its stem, its branch's dominant element
//! and the branch's hidden stems:
//!
//! | Position | Stem weight | Branch weight |
//! |----------|-------------|---------------|
//! | year | 1.0 | 1.0 |
//! | month | 1.2 | 1.4 |
//! | day | 1.5 | 1.2 |
//! | hour | 0.8 | 0.8 |
//!
//! A hidden stem adds `branch weight × 0.5 × ratio` to its element.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::sexagenary::{Chart, Element, Position};

/// Share of a hidden stem relative to its branch weight.
pub const HIDDEN_STEM_FACTOR: f64 = 0.5;

/// `(stem, branch)` weight for a chart position.
pub fn position_weights(position: Position) -> (f64, f64) {
    match position {
        Position::Year => (1.0, 1.0),
        Position::Month => (1.2, 1.4),
        Position::Day => (1.5, 1.2),
        Position::Hour => (0.8, 0.8),
    }
}

/// Band of a normalised percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementStatus {
    VeryLow,
    Low,
    Normal,
    High,
    VeryHigh,
}

impl ElementStatus {
    /// `<8`, `<14`, `<24`, `<32`, otherwise very high.
    pub fn classify(percent: f64) -> ElementStatus {
        if percent < 8.0 {
            ElementStatus::VeryLow
        } else if percent < 14.0 {
            ElementStatus::Low
        } else if percent < 24.0 {
            ElementStatus::Normal
        } else if percent < 32.0 {
            ElementStatus::High
        } else {
            ElementStatus::VeryHigh
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementScore {
    pub raw: BTreeMap<Element, f64>,
    /// Percentages, two decimals.
    pub normalized: BTreeMap<Element, f64>,
    pub status: BTreeMap<Element, ElementStatus>,
    /// Weakest first.
    pub top_deficiencies: Vec<Element>,
    /// Strongest first.
    pub top_excesses: Vec<Element>,
}

impl ElementScore {
    pub fn weakest(&self) -> Element {
        self.top_deficiencies.first().copied().unwrap_or(Element::Wood)
    }

    pub fn strongest(&self) -> Element {
        self.top_excesses.first().copied().unwrap_or(Element::Wood)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn score_chart(chart: &Chart) -> ElementScore {
    let mut acc = [0.0_f64; 5];
    for (position, pillar) in chart.positions() {
        let (stem_w, branch_w) = position_weights(position);
        acc[pillar.stem().element().index()] += stem_w;
        acc[pillar.branch().element().index()] += branch_w;
        for &(stem, ratio) in pillar.branch().hidden_stems() {
            acc[stem.element().index()] += branch_w * HIDDEN_STEM_FACTOR * ratio;
        }
    }

    let total: f64 = acc.iter().sum();
    let mut raw = BTreeMap::new();
    let mut normalized = BTreeMap::new();
    let mut status = BTreeMap::new();
    for element in Element::ALL {
        let value = acc[element.index()];
        let percent = if total > 0.0 {
            round2(value / total * 100.0)
        } else {
            0.0
        };
        raw.insert(element, value);
        normalized.insert(element, percent);
        status.insert(element, ElementStatus::classify(percent));
    }

    let by_value = |e: &Element| normalized[e];
    let mut top_deficiencies = Element::ALL.to_vec();
    top_deficiencies.sort_by(|a, b| by_value(a).total_cmp(&by_value(b)));
    let mut top_excesses = Element::ALL.to_vec();
    top_excesses.sort_by(|a, b| by_value(b).total_cmp(&by_value(a)));

    ElementScore {
        raw,
        normalized,
        status,
        top_deficiencies,
        top_excesses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexagenary::{calculate_chart, BirthTime, CalendarType};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn chart(y: i32, m: u32, d: u32, time: Option<&str>) -> Chart {
        calculate_chart(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            time.map(|t| t.parse::<BirthTime>().unwrap()),
            CalendarType::Solar,
            false,
        )
    }

    #[test]
    fn status_bands() {
        assert_eq!(ElementStatus::classify(0.0), ElementStatus::VeryLow);
        assert_eq!(ElementStatus::classify(7.99), ElementStatus::VeryLow);
        assert_eq!(ElementStatus::classify(8.0), ElementStatus::Low);
        assert_eq!(ElementStatus::classify(14.0), ElementStatus::Normal);
        assert_eq!(ElementStatus::classify(24.0), ElementStatus::High);
        assert_eq!(ElementStatus::classify(32.0), ElementStatus::VeryHigh);
    }

    #[test]
    fn every_position_has_weights() {
        let order = [Position::Year, Position::Month, Position::Day, Position::Hour];
        let weights: Vec<(f64, f64)> = order.into_iter().map(position_weights).collect();
        assert_eq!(weights, vec![(1.0, 1.0), (1.2, 1.4), (1.5, 1.2), (0.8, 0.8)]);
        let stem_total: f64 = weights.iter().map(|w| w.0).sum();
        assert!((stem_total - 4.5).abs() < 1e-12);
    }

    #[test]
    fn fixture_1995_raw_scores() {
        // 乙亥 甲申 辛卯 辛卯
        let score = score_chart(&chart(1995, 8, 28, Some("05:30")));
        let raw = |e| score.raw[&e];
        // wood: 乙 1.0 + 甲 1.2 + 卯 1.2 + 卯 0.8 + hidden 亥甲, 卯乙 ×2
        let wood = 1.0 + 1.2 + 1.2 + 0.8 + 0.5 * 0.3 + 1.2 * 0.5 + 0.8 * 0.5;
        assert!((raw(Element::Wood) - wood).abs() < 1e-9, "{}", raw(Element::Wood));
        assert_eq!(score.weakest(), Element::Fire);
        assert_eq!(score.strongest(), Element::Wood);
    }

    #[test]
    fn rankings_are_stable_over_element_order() {
        let score = score_chart(&chart(1988, 9, 20, None));
        for pair in score.top_deficiencies.windows(2) {
            let (a, b) = (score.normalized[&pair[0]], score.normalized[&pair[1]]);
            assert!(a < b || (a == b && pair[0] < pair[1]));
        }
        for pair in score.top_excesses.windows(2) {
            let (a, b) = (score.normalized[&pair[0]], score.normalized[&pair[1]]);
            assert!(a > b || (a == b && pair[0] < pair[1]));
        }
    }

    #[test]
    fn missing_hour_changes_total_weight() {
        let with = score_chart(&chart(1995, 8, 28, Some("05:30")));
        let without = score_chart(&chart(1995, 8, 28, None));
        let sum = |s: &ElementScore| s.raw.values().sum::<f64>();
        assert!((sum(&with) - sum(&without) - 1.6 - 0.8 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn serializes_lowercase_elements() {
        let score = score_chart(&chart(1995, 8, 28, None));
        let json = serde_json::to_value(&score).unwrap();
        assert!(json["normalized"]["wood"].is_number());
        assert!(json["status"]["fire"].is_string());
        assert_eq!(json["top_deficiencies"].as_array().unwrap().len(), 5);
    }

    proptest! {
        #[test]
        fn normalized_sums_to_hundred(days in 0i64..73_000, hour in 0u32..24, known in any::<bool>()) {
            let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(days);
            let time = if known { BirthTime::new(hour, 0) } else { None };
            let score = score_chart(&calculate_chart(date, time, CalendarType::Solar, false));
            let sum: f64 = score.normalized.values().sum();
            prop_assert!((sum - 100.0).abs() <= 1.0, "sum {}", sum);
        }
    }
}
