use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use qtty::{Day, Second, Seconds};
use saju::{
    filter_junggi, Analyzer, BirthTime, Branch, ChartInput, Config, CrossingFinder, Ephemeris,
    EphemerisProvider, JulianEphemerisDay, SearchWindow, SolarTerm, Time, UT,
};

fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn crossing_near(term: SolarTerm, expected: DateTime<Utc>) -> DateTime<Utc> {
    let eph = Ephemeris::shared();
    assert!(eph.is_available(), "shared ephemeris is {}", eph.kind());
    let finder = CrossingFinder::new(eph, kst());
    let window = SearchWindow::new(expected - Duration::days(1), expected + Duration::days(1));
    let found = finder
        .find_in_window(window, Duration::hours(1))
        .expect("search");
    let hit = found
        .iter()
        .find(|c| c.term == term)
        .unwrap_or_else(|| panic!("{term} not found in {window}: {found:?}"));
    hit.instant.with_timezone(&Utc)
}

#[test]
fn utc_roundtrip_j2000_is_stable() {
    let datetime = DateTime::from_timestamp(946_728_000, 0).unwrap();
    let jde = JulianEphemerisDay::from_utc(datetime);
    let back = jde.to_utc().expect("to_utc");
    let delta_ns = back.timestamp_nanos_opt().unwrap() - datetime.timestamp_nanos_opt().unwrap();
    assert!(delta_ns.abs() < 1_000);
}

#[test]
fn ut_applies_delta_t_near_j2000() {
    let ut = Time::<UT>::new(2_451_545.0);
    let tt: JulianEphemerisDay = ut.to();
    let offset = (tt.quantity() - ut.quantity()).to::<Day>();
    let offset_s = offset.to::<Second>();
    assert!((offset_s - Seconds::new(63.83)).abs() < Seconds::new(1.0));
}

/// Within a minute of a reference instant given to the second.
fn assert_crossing(term: SolarTerm, y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) {
    let expected = Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap();
    let found = crossing_near(term, expected);
    let error = (found - expected).num_seconds();
    assert!(error.abs() <= 60, "{term}: {found}, off by {error} s");
}

#[test]
fn equinoxes_and_solstices_2024() {
    assert_crossing(SolarTerm::Chunbun, 2024, 3, 20, 3, 6, 28);
    assert_crossing(SolarTerm::Haji, 2024, 6, 20, 20, 50, 58);
    assert_crossing(SolarTerm::Chubun, 2024, 9, 22, 12, 43, 41);
    assert_crossing(SolarTerm::Dongji, 2024, 12, 21, 9, 20, 29);
}

#[test]
fn equinox_2000_and_solstice_1995() {
    assert_crossing(SolarTerm::Chunbun, 2000, 3, 20, 7, 35, 22);
    assert_crossing(SolarTerm::Dongji, 1995, 12, 22, 8, 16, 46);
}

#[test]
fn junggi_just_before_kst_midnight() {
    // 霜降 1998-10-23 23:58:38 KST and 大寒 2020-01-20 23:54:41 KST
    assert_crossing(SolarTerm::Sanggang, 1998, 10, 23, 14, 58, 38);
    assert_crossing(SolarTerm::Daehan, 2020, 1, 20, 14, 54, 41);

    let analyzer = Analyzer::new(Ephemeris::shared(), Config::default());
    let date = ymd(1998, 10, 23);
    let stem = saju::sexagenary::year_pillar(date).stem();

    let unknown = analyzer.month_pillar_candidates(date, None, stem, "Asia/Seoul");
    assert!(unknown.uncertain);
    let branches: Vec<Branch> = unknown.pillars.iter().map(|p| p.branch()).collect();
    assert_eq!(branches, vec![Branch::Yu, Branch::Sul]);

    let late = analyzer.month_pillar_candidates(date, BirthTime::new(23, 50), stem, "Asia/Seoul");
    assert!(!late.uncertain);
    assert_eq!(late.pillars[0].branch(), Branch::Yu);

    let next_day = analyzer.month_pillar_candidates(ymd(1998, 10, 24), None, stem, "Asia/Seoul");
    assert!(!next_day.uncertain);
    assert_eq!(next_day.pillars[0].branch(), Branch::Sul);

    let date = ymd(2020, 1, 20);
    let stem = saju::sexagenary::year_pillar(date).stem();
    let unknown = analyzer.month_pillar_candidates(date, None, stem, "Asia/Seoul");
    let branches: Vec<Branch> = unknown.pillars.iter().map(|p| p.branch()).collect();
    assert_eq!(branches, vec![Branch::Ja, Branch::Chuk]);
}

#[test]
fn a_year_has_twelve_junggi() {
    let finder = CrossingFinder::new(Ephemeris::shared(), kst());
    let window = SearchWindow::new(
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );
    let all = finder.find_in_window(window, Duration::hours(6)).unwrap();
    assert_eq!(all.len(), 24);
    let junggi = filter_junggi(&all);
    assert_eq!(junggi.len(), 12);
    for pair in junggi.windows(2) {
        let gap = pair[1].instant - pair[0].instant;
        assert!(gap > Duration::days(29) && gap < Duration::days(32), "{gap}");
    }
}

#[test]
fn shared_handle_is_one_instance_across_threads() {
    let addrs: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| Ephemeris::shared() as *const Ephemeris as usize))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));
    let at = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
    let lon = Ephemeris::shared().sun_longitude(at).unwrap();
    assert!((lon.value() - 280.37).abs() < 0.05, "{lon}");
}

#[test]
fn fixture_1995_08_28_0530() {
    let analyzer = Analyzer::new(Ephemeris::shared(), Config::default());
    let input = ChartInput::new(ymd(1995, 8, 28)).with_time(BirthTime::new(5, 30));
    let result = analyzer.analyze(&input);
    let pillars: Vec<String> = result
        .chart
        .positions()
        .iter()
        .map(|(_, p)| p.to_string())
        .collect();
    assert_eq!(pillars, vec!["乙亥", "甲申", "辛卯", "辛卯"]);
    assert_eq!(result.month_candidates.len(), 1);
    assert_eq!(result.accuracy_note, None);
}

#[test]
fn fixture_1988_09_20_unknown_time() {
    let analyzer = Analyzer::new(Ephemeris::shared(), Config::default());
    let result = analyzer.analyze(&ChartInput::new(ymd(1988, 9, 20)));
    assert_eq!(result.chart.year.to_string(), "戊辰");
    assert_eq!(result.chart.month.to_string(), "辛酉");
    assert_eq!(result.chart.day.to_string(), "戊寅");
    assert!(result.chart.hour.is_none());
    assert!(!result.uncertain);
    assert!(result.accuracy_note.is_some());
}

#[test]
fn policy_c_on_usu_2026() {
    let analyzer = Analyzer::new(Ephemeris::shared(), Config::default());
    let date = ymd(2026, 2, 19);
    let stem = saju::sexagenary::year_pillar(date).stem();

    let unknown = analyzer.month_pillar_candidates(date, None, stem, "Asia/Seoul");
    assert!(unknown.uncertain);
    let names: Vec<String> = unknown.pillars.iter().map(|p| p.to_string()).collect();
    assert_eq!(names, vec!["辛丑", "庚寅"]);

    let known = analyzer.month_pillar_candidates(date, BirthTime::new(12, 0), stem, "Asia/Seoul");
    assert!(!known.uncertain);
    assert_eq!(known.pillars[0].branch(), Branch::In);

    let day_after = analyzer.month_pillar_candidates(ymd(2026, 2, 20), None, stem, "Asia/Seoul");
    assert_eq!(day_after.pillars.len(), 1);
}

#[test]
fn unavailable_engine_still_charts() {
    let analyzer = Analyzer::new(Ephemeris::unavailable("disabled"), Config::default());
    let input = ChartInput::new(ymd(2026, 2, 19)).with_timezone("Europe/Madrid");
    let result = analyzer.analyze(&input);
    assert_eq!(result.month_candidates, vec![result.chart.month]);
    let note = result.accuracy_note.unwrap();
    assert!(note.contains("폴백"), "{note}");
    assert!(note.contains("KST(Asia/Seoul)"), "{note}");

    let status = analyzer.engine_status(Utc::now());
    assert!(!status.ready);
    assert!(status.warning.unwrap().starts_with("solar_terms_unavailable:"));
}

#[test]
fn report_and_analysis_serialize() {
    let analyzer = Analyzer::new(Ephemeris::shared(), Config::default());
    let input = ChartInput::new(ymd(1995, 8, 28)).with_time(BirthTime::new(5, 30));

    let analysis = serde_json::to_value(analyzer.analyze(&input)).unwrap();
    for key in [
        "chart",
        "hidden_stems",
        "month_candidates",
        "uncertain",
        "element_score",
        "summary",
        "routines",
        "accuracy_note",
    ] {
        assert!(analysis.get(key).is_some(), "missing {key}");
    }
    assert_eq!(analysis["chart"]["hour"]["branch"], "卯");
    assert_eq!(analysis["routines"]["primary"].as_array().unwrap().len(), 4);

    let report = serde_json::to_value(analyzer.build_manse_report(&input, None)).unwrap();
    assert_eq!(report["title"], "四柱八字");
    assert_eq!(report["birth_time"], "卯時");
    assert_eq!(report["pillars"]["year"]["stem_element"], "wood");
}
