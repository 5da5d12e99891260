// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! The chart entrypoints.
//!
//! [`Analyzer`] owns a provider and a [`Config`] and composes the calendar
//! chart, the month candidates, the element score and the accuracy note.
//! Nothing here returns an error; degradations travel in the result.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::config::Config;
use crate::degradation::{accuracy_note, ordered, Degradation};
use crate::elements::{score_chart, ElementScore};
use crate::ephemeris::{Ephemeris, EphemerisProvider};
use crate::month_policy::{MonthCandidates, MonthPillarPolicy};
use crate::sexagenary::{calculate_chart, BirthTime, CalendarType, Chart, Element, Pillar, Stem};
use crate::solar_terms::CrossingFinder;

/// A birth to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartInput {
    pub date: NaiveDate,
    pub time: Option<BirthTime>,
    pub calendar_type: CalendarType,
    pub is_leap_month: bool,
    pub timezone: String,
}

impl ChartInput {
    /// Solar calendar, no time, `Asia/Seoul`.
    pub fn new(date: NaiveDate) -> Self {
        ChartInput {
            date,
            time: None,
            calendar_type: CalendarType::Solar,
            is_leap_month: false,
            timezone: "Asia/Seoul".to_string(),
        }
    }

    pub fn with_time(mut self, time: Option<BirthTime>) -> Self {
        self.time = time;
        self
    }

    pub fn with_calendar(mut self, calendar_type: CalendarType, is_leap_month: bool) -> Self {
        self.calendar_type = calendar_type;
        self.is_leap_month = is_leap_month;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }
}

/// One hidden stem and its share of the branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HiddenStem {
    pub stem: Stem,
    pub ratio: f64,
}

/// Hidden stems keyed `year_branch`, `month_branch`, `day_branch` and, with a
/// birth time, `hour_branch`.
pub fn hidden_stem_map(chart: &Chart) -> BTreeMap<String, Vec<HiddenStem>> {
    chart
        .positions()
        .into_iter()
        .map(|(position, pillar)| {
            let stems = pillar
                .branch()
                .hidden_stems()
                .iter()
                .map(|&(stem, ratio)| HiddenStem { stem, ratio })
                .collect();
            (format!("{}_branch", position.name()), stems)
        })
        .collect()
}

/// Chart plus its hidden stems and note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOutcome {
    pub chart: Chart,
    pub hidden_stems: BTreeMap<String, Vec<HiddenStem>>,
    pub month_candidates: Vec<Pillar>,
    pub uncertain: bool,
    pub degradations: Vec<Degradation>,
    pub accuracy_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub chart: Chart,
    pub hidden_stems: BTreeMap<String, Vec<HiddenStem>>,
    pub month_candidates: Vec<Pillar>,
    pub uncertain: bool,
    pub element_score: ElementScore,
    pub summary: BTreeMap<String, String>,
    pub routines: BTreeMap<String, Vec<String>>,
    pub degradations: Vec<Degradation>,
    pub accuracy_note: Option<String>,
}

/// Readiness of the solar-term engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub ready: bool,
    /// `solar_terms_unavailable: …` when not ready.
    pub warning: Option<String>,
}

fn routines_for(element: Element) -> [&'static str; 4] {
    match element {
        Element::Wood => ["아침 산책", "스트레칭", "녹색 채소 섭취", "성장 목표 설정"],
        Element::Fire => ["아침 햇빛 노출", "심박수 운동", "따뜻한 식사", "오전 집중 작업"],
        Element::Earth => ["정리정돈 10분", "규칙적인 식사", "토성색 의상", "마음 안정 호흡"],
        Element::Metal => ["집중 작업 25분", "호흡 정리", "하얀색 포인트", "필요 없는 것 버리기"],
        Element::Water => ["수분 섭취", "저녁 산책", "일기 작성", "차분한 음악"],
    }
}

fn summary_for(weakest: Element) -> BTreeMap<String, String> {
    [
        (
            "personality",
            format!("{} 기운을 보강하면 균형감이 높아집니다.", weakest.name()),
        ),
        (
            "money_work",
            "집중 루틴을 통해 성과를 높이는 흐름이 필요합니다.".to_string(),
        ),
        (
            "relationships",
            "호흡을 가다듬고 여유 있는 소통이 도움이 됩니다.".to_string(),
        ),
        (
            "health",
            "수면과 식사 리듬을 일정하게 유지하세요.".to_string(),
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Composes the chart entrypoints over one provider.
pub struct Analyzer<P: EphemerisProvider> {
    provider: P,
    config: Config,
}

impl Analyzer<&'static Ephemeris> {
    /// Analyzer over [`Ephemeris::shared`], configured from the environment.
    pub fn shared() -> Self {
        let config = Config::from_env().unwrap_or_else(|e| {
            warn!("using default configuration: {e}");
            Config::default()
        });
        Analyzer::new(Ephemeris::shared(), config)
    }
}

impl<P: EphemerisProvider> Analyzer<P> {
    pub fn new(provider: P, config: Config) -> Self {
        Analyzer { provider, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn policy(&self) -> MonthPillarPolicy<'_, P> {
        MonthPillarPolicy::new(&self.provider, &self.config)
    }

    /// Month pillar candidates (Policy C).
    pub fn month_pillar_candidates(
        &self,
        date: NaiveDate,
        time: Option<BirthTime>,
        year_stem: Stem,
        timezone: &str,
    ) -> MonthCandidates {
        self.policy().candidates(date, time, year_stem, timezone)
    }

    /// Chart, hidden stems and accuracy note.
    pub fn chart(&self, input: &ChartInput) -> ChartOutcome {
        let chart = calculate_chart(input.date, input.time, input.calendar_type, input.is_leap_month);
        let candidates =
            self.month_pillar_candidates(input.date, input.time, chart.year.stem(), &input.timezone);

        let mut degradations = candidates.degradations;
        if input.time.is_none() {
            degradations.push(Degradation::BirthTimeMissing);
        }
        let degradations = ordered(&degradations);
        debug!(
            "chart for {} ({}): {} month candidates, {} degradations",
            input.date,
            input.timezone,
            candidates.pillars.len(),
            degradations.len()
        );

        ChartOutcome {
            hidden_stems: hidden_stem_map(&chart),
            chart,
            month_candidates: candidates.pillars,
            uncertain: candidates.uncertain,
            accuracy_note: accuracy_note(&degradations),
            degradations,
        }
    }

    /// Full analysis: chart, element balance, summary and routines.
    pub fn analyze(&self, input: &ChartInput) -> AnalysisResult {
        let outcome = self.chart(input);
        let element_score = score_chart(&outcome.chart);
        let weakest = element_score.weakest();

        let mut routines = BTreeMap::new();
        routines.insert(
            "primary".to_string(),
            routines_for(weakest).iter().map(|r| r.to_string()).collect(),
        );

        AnalysisResult {
            chart: outcome.chart,
            hidden_stems: outcome.hidden_stems,
            month_candidates: outcome.month_candidates,
            uncertain: outcome.uncertain,
            summary: summary_for(weakest),
            element_score,
            routines,
            degradations: outcome.degradations,
            accuracy_note: outcome.accuracy_note,
        }
    }

    /// Bounded junggi lookup ending at `now`; never fails.
    pub fn engine_status(&self, now: DateTime<Utc>) -> EngineStatus {
        let finder = CrossingFinder::with_options(
            &self.provider,
            self.config.locale.offset(),
            (&self.config.search).into(),
        );
        let lookback = self.config.search.junggi_lookback_days;
        match finder.last_junggi_before(now, lookback) {
            Ok(Some(_)) => EngineStatus {
                ready: true,
                warning: None,
            },
            Ok(None) => EngineStatus {
                ready: false,
                warning: Some(format!(
                    "solar_terms_unavailable: no junggi within {lookback} days before {now}"
                )),
            },
            Err(e) => EngineStatus {
                ready: false,
                warning: Some(format!("solar_terms_unavailable: {e}")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::degradation::FALLBACK_MARKER;
    use crate::error::EphemerisError;
    use chrono::TimeZone;
    use qtty::Degrees;

    struct Down;

    impl EphemerisProvider for Down {
        fn sun_longitude(&self, _: DateTime<Utc>) -> Result<Degrees, EphemerisError> {
            Err(EphemerisError::Unavailable("not loaded".into()))
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn analytic() -> Analyzer<Ephemeris> {
        Analyzer::new(Ephemeris::analytic(), Config::default())
    }

    #[test]
    fn fixture_1995_with_time() {
        let input = ChartInput::new(ymd(1995, 8, 28)).with_time(BirthTime::new(5, 30));
        let result = analytic().analyze(&input);
        let chart = result.chart;
        assert_eq!(chart.year.to_string(), "乙亥");
        assert_eq!(chart.month.to_string(), "甲申");
        assert_eq!(chart.day.to_string(), "辛卯");
        assert_eq!(chart.hour.map(|p| p.to_string()).as_deref(), Some("辛卯"));
        let keys: Vec<&str> = result.hidden_stems.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["day_branch", "hour_branch", "month_branch", "year_branch"]);
        assert_eq!(result.accuracy_note, None);
        assert!(!result.uncertain);
    }

    #[test]
    fn fixture_1988_without_time() {
        let input = ChartInput::new(ymd(1988, 9, 20));
        let result = analytic().analyze(&input);
        assert_eq!(result.chart.year.to_string(), "戊辰");
        assert_eq!(result.chart.month.to_string(), "辛酉");
        assert_eq!(result.chart.day.to_string(), "戊寅");
        assert!(result.chart.hour.is_none());
        assert!(!result.hidden_stems.contains_key("hour_branch"));
        assert_eq!(result.degradations, vec![Degradation::BirthTimeMissing]);
        assert_eq!(
            result.accuracy_note.as_deref(),
            Some("출생시간 미입력으로 시주가 제외되어 분석 정확도가 낮아질 수 있음")
        );
    }

    #[test]
    fn summary_and_routines_follow_weakest_element() {
        let input = ChartInput::new(ymd(1995, 8, 28)).with_time(BirthTime::new(5, 30));
        let result = analytic().analyze(&input);
        let weakest = result.element_score.weakest();
        assert_eq!(weakest, Element::Fire);
        assert_eq!(result.summary.len(), 4);
        assert_eq!(
            result.summary["personality"],
            "fire 기운을 보강하면 균형감이 높아집니다."
        );
        assert_eq!(result.summary["health"], "수면과 식사 리듬을 일정하게 유지하세요.");
        assert_eq!(
            result.routines["primary"],
            vec!["아침 햇빛 노출", "심박수 운동", "따뜻한 식사", "오전 집중 작업"]
        );
    }

    #[test]
    fn compounded_degradations_keep_precedence() {
        let analyzer = Analyzer::new(Down, Config::default());
        let input = ChartInput::new(ymd(2024, 2, 4)).with_timezone("America/New_York");
        let result = analyzer.analyze(&input);
        assert_eq!(result.degradations.len(), 3);
        let note = result.accuracy_note.unwrap();
        let parts: Vec<&str> = note.split(" / ").collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].contains(FALLBACK_MARKER));
        assert!(parts[1].contains("America/New_York"));
        assert!(parts[1].contains("KST(Asia/Seoul), UTC+09:00"));
        assert!(parts[2].starts_with("출생시간 미입력"));
        // still a full chart
        assert_eq!(result.month_candidates.len(), 1);
        assert_eq!(result.month_candidates[0], result.chart.month);
    }

    #[test]
    fn engine_status_reports_without_failing() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 3, 0, 0).unwrap();
        let ready = analytic().engine_status(now);
        assert!(ready.ready);
        assert!(ready.warning.is_none());

        let down = Analyzer::new(Down, Config::default()).engine_status(now);
        assert!(!down.ready);
        let warning = down.warning.unwrap();
        assert!(warning.starts_with("solar_terms_unavailable:"), "{warning}");
        assert!(warning.contains("not loaded"));
    }

    #[test]
    fn borrowed_provider_works() {
        let eph = Ephemeris::analytic();
        let analyzer = Analyzer::new(&eph, Config::default());
        let out = analyzer.chart(&ChartInput::new(ymd(2000, 1, 1)).with_time(BirthTime::new(0, 0)));
        assert!(out.chart.hour.is_some());
        assert_eq!(out.accuracy_note, None);
    }

    #[test]
    fn result_serializes() {
        let result = analytic().analyze(&ChartInput::new(ymd(1988, 9, 20)));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["chart"]["year"]["stem"], "戊");
        assert_eq!(json["chart"]["hour"], serde_json::Value::Null);
        assert!(json["hidden_stems"]["year_branch"].is_array());
        assert!(json["accuracy_note"].is_string());
    }
}
