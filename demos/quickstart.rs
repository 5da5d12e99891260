use chrono::{NaiveDate, Utc};
use saju::{Analyzer, BirthTime, ChartInput};

fn main() {
    let analyzer = Analyzer::shared();
    println!("engine: {:?}", analyzer.engine_status(Utc::now()));

    let date = NaiveDate::from_ymd_opt(1995, 8, 28).expect("valid date");
    let time: Option<BirthTime> = "05:30".parse().ok();
    let input = ChartInput::new(date).with_time(time);

    let report = analyzer.build_manse_report(&input, Some("Demo"));
    println!("{}\n", report.raw_text);

    let result = analyzer.analyze(&input);
    for (element, percent) in &result.element_score.normalized {
        println!("{element:>6}: {percent:5.2}%");
    }
    println!("weakest: {}", result.element_score.weakest());
    if let Some(note) = result.accuracy_note {
        println!("note: {note}");
    }

    let boundary = NaiveDate::from_ymd_opt(2026, 2, 19).expect("valid date");
    let out = analyzer.chart(&ChartInput::new(boundary));
    let names: Vec<String> = out.month_candidates.iter().map(|p| p.to_string()).collect();
    println!("\n{boundary} month candidates: {} (uncertain: {})", names.join(", "), out.uncertain);
}
