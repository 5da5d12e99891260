// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The printed chart sheet (萬歲曆 style).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::analysis::{Analyzer, ChartInput};
use crate::ephemeris::EphemerisProvider;
use crate::sexagenary::{hour_branch, Branch, Element, Pillar, Stem};

pub const REPORT_TITLE: &str = "四柱八字";
pub const UNKNOWN: &str = "未詳";
pub const UNKNOWN_HOUR: &str = "時柱未詳";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPillar {
    pub stem: Stem,
    pub branch: Branch,
    pub stem_element: Element,
    pub branch_element: Element,
}

impl From<Pillar> for ReportPillar {
    fn from(pillar: Pillar) -> Self {
        ReportPillar {
            stem: pillar.stem(),
            branch: pillar.branch(),
            stem_element: pillar.stem().element(),
            branch_element: pillar.branch().element(),
        }
    }
}

/// Pillars in sheet order, hour first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPillars {
    pub hour: Option<ReportPillar>,
    pub day: ReportPillar,
    pub month: ReportPillar,
    pub year: ReportPillar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManseReport {
    pub title: String,
    pub name: String,
    pub birth_date: String,
    pub birth_time: String,
    pub pillars: ReportPillars,
    pub raw_text: String,
    pub month_candidates: Vec<Pillar>,
    pub uncertain: bool,
}

/// `1995年 8月 28日`
pub fn birth_date_text(date: NaiveDate) -> String {
    format!("{}年 {}月 {}日", date.year(), date.month(), date.day())
}

impl<P: EphemerisProvider> Analyzer<P> {
    pub fn build_manse_report(&self, input: &ChartInput, name: Option<&str>) -> ManseReport {
        let outcome = self.chart(input);
        let chart = outcome.chart;

        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();
        let birth_date = birth_date_text(input.date);
        let birth_time = match input.time {
            Some(t) => format!("{}時", hour_branch(t.hour())),
            None => UNKNOWN_HOUR.to_string(),
        };

        let pillars = ReportPillars {
            hour: chart.hour.map(ReportPillar::from),
            day: chart.day.into(),
            month: chart.month.into(),
            year: chart.year.into(),
        };

        let hour_text = chart
            .hour
            .map(|p| p.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let raw_text = [
            REPORT_TITLE.to_string(),
            format!("姓名: {name}"),
            format!("生年月日: {birth_date}"),
            format!("出生時間: {birth_time}"),
            String::new(),
            format!("時柱: {hour_text}"),
            format!("日柱: {}", chart.day),
            format!("月柱: {}", chart.month),
            format!("年柱: {}", chart.year),
        ]
        .join("\n");

        ManseReport {
            title: REPORT_TITLE.to_string(),
            name,
            birth_date,
            birth_time,
            pillars,
            raw_text,
            month_candidates: outcome.month_candidates,
            uncertain: outcome.uncertain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ephemeris::Ephemeris;
    use crate::sexagenary::BirthTime;

    fn analyzer() -> Analyzer<Ephemeris> {
        Analyzer::new(Ephemeris::analytic(), Config::default())
    }

    #[test]
    fn sheet_for_1995_with_time() {
        let input = ChartInput::new(NaiveDate::from_ymd_opt(1995, 8, 28).unwrap())
            .with_time(BirthTime::new(5, 30));
        let report = analyzer().build_manse_report(&input, Some("홍길동"));
        assert_eq!(report.title, "四柱八字");
        assert_eq!(report.name, "홍길동");
        assert_eq!(report.birth_date, "1995年 8月 28日");
        assert_eq!(report.birth_time, "卯時");
        let hour = report.pillars.hour.unwrap();
        assert_eq!(hour.stem_element, Element::Metal);
        assert_eq!(hour.branch_element, Element::Wood);
        assert_eq!(
            report.raw_text,
            "四柱八字\n姓名: 홍길동\n生年月日: 1995年 8月 28日\n出生時間: 卯時\n\n\
             時柱: 辛卯\n日柱: 辛卯\n月柱: 甲申\n年柱: 乙亥"
        );
    }

    #[test]
    fn unknown_name_and_time() {
        let input = ChartInput::new(NaiveDate::from_ymd_opt(1988, 9, 20).unwrap());
        let report = analyzer().build_manse_report(&input, Some("  "));
        assert_eq!(report.name, "未詳");
        assert_eq!(report.birth_time, "時柱未詳");
        assert_eq!(report.pillars.hour, None);
        assert!(report.raw_text.contains("時柱: 未詳"));
        assert!(report.raw_text.ends_with("年柱: 戊辰"));
    }

    #[test]
    fn serializes_hour_as_null() {
        let input = ChartInput::new(NaiveDate::from_ymd_opt(1988, 9, 20).unwrap());
        let json = serde_json::to_value(analyzer().build_manse_report(&input, None)).unwrap();
        assert!(json["pillars"]["hour"].is_null());
        assert_eq!(json["pillars"]["day"]["stem"], "戊");
        assert_eq!(json["pillars"]["day"]["branch_element"], "wood");
    }
}
