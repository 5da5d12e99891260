// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Reduced-precision conditions and the accuracy note built from them.
//!
//! Degradations are data, never errors.  When several apply, the note lists
//! them by precedence: engine fallback, then timezone fallback, then missing
//! birth time, joined with `" / "`.

use std::fmt;

use serde::Serialize;

/// Substring present in every engine-fallback message.
pub const FALLBACK_MARKER: &str = "폴백";

const NOTE_SEPARATOR: &str = " / ";

const BIRTH_TIME_MISSING: &str =
    "출생시간 미입력으로 시주가 제외되어 분석 정확도가 낮아질 수 있음";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    /// The solar-term engine failed; the month came from the calendar rule.
    EngineFallback { reason: String },
    /// The requested timezone is not the supported one.
    TimezoneFallback { requested: String, applied: String },
    /// No birth time: no hour pillar.
    BirthTimeMissing,
}

impl Degradation {
    /// Lower sorts first in the accuracy note.
    pub fn precedence(&self) -> u8 {
        match self {
            Degradation::EngineFallback { .. } => 0,
            Degradation::TimezoneFallback { .. } => 1,
            Degradation::BirthTimeMissing => 2,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Degradation::EngineFallback { reason } => format!(
                "절기 엔진을 사용할 수 없어({reason}) 월주를 양력 월 기준 간이 규칙으로 {FALLBACK_MARKER}함"
            ),
            Degradation::TimezoneFallback { requested, applied } => format!(
                "'{requested}' 시간대는 지원하지 않아 {applied} 기준으로 계산함"
            ),
            Degradation::BirthTimeMissing => BIRTH_TIME_MISSING.to_string(),
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Order by precedence and drop repeats of the same condition.
pub fn ordered(degradations: &[Degradation]) -> Vec<Degradation> {
    let mut out = degradations.to_vec();
    out.sort_by_key(Degradation::precedence);
    out.dedup_by_key(|d| d.precedence());
    out
}

/// One note covering every degradation, or `None` when there are none.
pub fn accuracy_note(degradations: &[Degradation]) -> Option<String> {
    let ordered = ordered(degradations);
    if ordered.is_empty() {
        return None;
    }
    Some(
        ordered
            .iter()
            .map(Degradation::message)
            .collect::<Vec<_>>()
            .join(NOTE_SEPARATOR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Degradation {
        Degradation::EngineFallback {
            reason: "ephemeris unavailable: disabled".into(),
        }
    }

    fn timezone() -> Degradation {
        Degradation::TimezoneFallback {
            requested: "UTC".into(),
            applied: "KST(Asia/Seoul), UTC+09:00".into(),
        }
    }

    #[test]
    fn no_degradation_no_note() {
        assert_eq!(accuracy_note(&[]), None);
    }

    #[test]
    fn precedence_is_fixed_regardless_of_input_order() {
        let note = accuracy_note(&[Degradation::BirthTimeMissing, timezone(), engine()]).unwrap();
        let parts: Vec<&str> = note.split(NOTE_SEPARATOR).collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[0].contains(FALLBACK_MARKER));
        assert!(parts[1].contains("KST(Asia/Seoul)"));
        assert!(parts[1].contains("UTC+09:00"));
        assert_eq!(parts[2], BIRTH_TIME_MISSING);
    }

    #[test]
    fn repeated_condition_is_reported_once() {
        let note = accuracy_note(&[engine(), engine()]).unwrap();
        assert_eq!(note.matches(FALLBACK_MARKER).count(), 1);
    }

    #[test]
    fn messages_are_korean() {
        assert_eq!(
            engine().message(),
            "절기 엔진을 사용할 수 없어(ephemeris unavailable: disabled) 월주를 양력 월 기준 간이 규칙으로 폴백함"
        );
        assert_eq!(
            timezone().to_string(),
            "'UTC' 시간대는 지원하지 않아 KST(Asia/Seoul), UTC+09:00 기준으로 계산함"
        );
        assert_eq!(
            Degradation::BirthTimeMissing.message(),
            "출생시간 미입력으로 시주가 제외되어 분석 정확도가 낮아질 수 있음"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Degradation::BirthTimeMissing).unwrap();
        assert_eq!(json, r#"{"kind":"birth_time_missing"}"#);
    }
}
