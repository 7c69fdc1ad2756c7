// End-to-end: CSV text → SalesReport → FAQ answers

use sales_insights::{
    load_from_reader, ChangeStatus, ReportError, SalesReport, Verdict, FALLBACK_ANSWER,
};

/// 50 days of sales; the second half sells roughly twice as much
fn fifty_day_csv() -> String {
    let mut csv = String::from("sale_id,sale_time,purchaser_gender,product\n");
    let mut id = 0;

    for day in 0..50u32 {
        let per_day = if day < 25 { 8 + day % 3 } else { 16 + day % 4 };
        for k in 0..per_day {
            id += 1;
            let date = chrono::NaiveDate::from_ymd_opt(2013, 1, 1).unwrap()
                + chrono::Duration::days(day as i64);
            let hour = (k * 3) % 24;
            let gender = if k % 2 == 0 { "female" } else { "male" };
            csv.push_str(&format!(
                "{},{} {:02}:15:00,{},widget\n",
                id, date, hour, gender
            ));
        }
    }

    csv
}

#[test]
fn test_full_pipeline() {
    let csv = fifty_day_csv();
    let transactions = load_from_reader(csv.as_bytes()).unwrap();
    let report = SalesReport::build(&transactions);

    assert_eq!(report.daily.len(), 50);
    assert_eq!(
        report.gender.iter().map(|c| c.count).sum::<usize>(),
        transactions.len()
    );
    assert_eq!(
        report.dayparts.iter().map(|c| c.count).sum::<usize>(),
        transactions.len()
    );

    let assessment = report.change.assessment().unwrap();
    assert_eq!(assessment.split_index, 25);
    assert_eq!(assessment.change_date.to_string(), "2013-01-26");
    assert_eq!(assessment.verdict(), Verdict::Significant);

    assert!(report
        .answer("What is the detected change date?")
        .contains("2013-01-26"));
    assert_eq!(
        report.answer("what is the p value?"),
        report.answer("What is the p-value?")
    );
    assert_eq!(report.answer("asdkjasdkj nonsense query"), FALLBACK_ANSWER);
    assert_eq!(report.answer(""), FALLBACK_ANSWER);
}

#[test]
fn test_rebuild_is_deterministic() {
    let csv = fifty_day_csv();
    let transactions = load_from_reader(csv.as_bytes()).unwrap();

    let first = SalesReport::build(&transactions);
    let second = SalesReport::build(&transactions);

    assert_eq!(first.change.assessment(), second.change.assessment());
    assert_eq!(first.daily, second.daily);
    assert_eq!(first.summary(), second.summary());
}

#[test]
fn test_single_day_dataset() {
    let csv = "sale_time,purchaser_gender\n\
               2013-01-01 10:00:00,female\n\
               2013-01-01 11:00:00,male\n";
    let report = SalesReport::build(&load_from_reader(csv.as_bytes()).unwrap());

    assert!(matches!(report.change, ChangeStatus::InsufficientData { days: 1 }));
    assert!(report.answer("What is the p-value?").contains("not enough"));
}

#[test]
fn test_bad_row_aborts_load() {
    let csv = "sale_time,purchaser_gender\n\
               2013-01-01 10:00:00,female\n\
               2013-01-01 25:00:00,male\n";

    let err = load_from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, ReportError::Load { line: 2, .. }));
}
