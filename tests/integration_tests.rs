use std::path::Path;

use chrono::NaiveDate;
use pos_analytics::bills::Dataset;
use pos_analytics::errors::{LoadError, PipelineError};
use pos_analytics::loader::{LoadOptions, load_reader};
use pos_analytics::normalize::normalize;
use pos_analytics::report::{Report, ReportOptions, run_pipeline};

fn sample_dataset() -> Dataset {
    let bytes = include_bytes!("fixtures/sample_pos.csv");
    let lines = load_reader(&bytes[..], &LoadOptions::default()).expect("Failed to load fixture");
    Dataset::new(normalize(lines, None).expect("Failed to normalize fixture"))
}

fn sample_report() -> Report {
    Report::build(&sample_dataset(), &ReportOptions::default()).expect("Failed to build report")
}

#[test]
fn test_full_pipeline_from_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_pos.csv");
    let report = run_pipeline(&path, &LoadOptions::default(), None, &ReportOptions::default())
        .expect("Pipeline failed");

    assert_eq!(report, sample_report());
}

#[test]
fn test_basic_metrics() {
    let m = sample_report().metrics;

    assert_eq!(m.total_lines, 14);
    assert_eq!(m.total_sales, 2158.0);
    assert_eq!(m.total_quantity, 18.0);
    assert_eq!(m.total_bills, 7);
    assert_eq!(m.unique_items, 4);
    assert_eq!(m.avg_basket_value, Some(2158.0 / 7.0));
}

#[test]
fn test_item_summary_sorted_by_quantity() {
    let items = sample_report().items;
    let names: Vec<_> = items.iter().map(|i| i.item_name.as_str()).collect();

    assert_eq!(names, vec!["Bread", "Milk 1L", "Eggs (12)", "Basmati Rice 5kg"]);
    assert_eq!(items[0].total_qty, 7.0);
    assert_eq!(items[0].bills, 4);
    assert_eq!(items[1].total_sales, 336.0);
    assert_eq!(items[1].bills, 4);
}

#[test]
fn test_basket_affinity_top_pairs() {
    let pairs: Vec<_> = sample_report()
        .affinity
        .into_iter()
        .map(|p| (p.item_a, p.item_b, p.count))
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("Bread".to_string(), "Eggs (12)".to_string(), 3),
            ("Bread".to_string(), "Milk 1L".to_string(), 2),
            ("Eggs (12)".to_string(), "Milk 1L".to_string(), 1),
            ("Basmati Rice 5kg".to_string(), "Milk 1L".to_string(), 1),
        ]
    );
}

#[test]
fn test_peak_hours_and_weekdays() {
    let report = sample_report();
    let hours: Vec<_> = report.peak_hours.iter().map(|b| (b.hour, b.bills)).collect();

    assert_eq!(hours, vec![(9, 3), (18, 3), (19, 1)]);
    assert_eq!(report.busiest_hour, Some(9));
    assert_eq!(report.weekdays[0].weekday, "Monday");
    assert_eq!(report.weekdays[0].bills, 4);
    assert_eq!(report.weekdays[1].weekday, "Tuesday");
    assert_eq!(report.weekdays[1].bills, 3);
}

#[test]
fn test_terminal_performance_and_daily_trend() {
    let report = sample_report();

    assert_eq!(report.terminals[0].terminal, "POS-1");
    assert_eq!(report.terminals[0].bills, 4);
    assert_eq!(report.terminals[0].total_qty, 11.0);
    assert_eq!(report.terminals[0].total_sales, 1197.0);
    assert_eq!(report.terminals[1].total_sales, 961.0);

    assert_eq!(report.daily_trend.len(), 2);
    assert_eq!(report.daily_trend[0].total_sales, 1774.0);
    assert_eq!(report.daily_trend[1].total_sales, 384.0);
}

#[test]
fn test_bill_validation() {
    let v = sample_report().validation;

    assert_eq!(v.conflicts.len(), 1);
    assert_eq!(v.conflicts[0].bill_no, "1001");
    assert_eq!(v.conflicts[0].terminals, vec!["POS-1", "POS-2"]);

    assert_eq!(v.gaps[0].terminal, "POS-1");
    assert_eq!(v.gaps[0].missing, vec![1003]);
    assert_eq!(v.gaps[1].terminal, "POS-2");
    assert_eq!(v.gaps[1].missing.len(), 498);
    assert_eq!(v.gaps[1].missing.first(), Some(&503));
    assert_eq!(v.gaps[1].missing.last(), Some(&1000));

    assert_eq!(v.timestamp_mismatches.len(), 1);
    assert_eq!(v.timestamp_mismatches[0].bill_no, "502");
    assert!(!v.is_clean());
}

#[test]
fn test_pipeline_is_idempotent() {
    let dataset = sample_dataset();
    let options = ReportOptions::default();
    assert_eq!(
        Report::build(&dataset, &options).unwrap(),
        Report::build(&dataset, &options).unwrap()
    );
}

#[test]
fn test_two_bill_scenario() {
    let csv = "\
pos_name,tran_no,item_name,qty,rate,item_total,tran_date
T1,1,Apple,2,1.0,2.0,2024-03-04 10:00:00
T1,1,Bread,1,2.0,2.0,2024-03-04 10:00:00
T1,2,Apple,1,1.0,1.0,2024-03-04 11:00:00
T1,2,Milk,1,1.5,1.5,2024-03-04 11:00:00
";
    let lines = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    let dataset = Dataset::new(normalize(lines, None).unwrap());
    let report = Report::build(&dataset, &ReportOptions::default()).unwrap();

    let apple = report.items.iter().find(|i| i.item_name == "Apple").unwrap();
    assert_eq!(apple.total_qty, 3.0);
    assert_eq!(apple.bills, 2);

    let pairs: Vec<_> = report
        .affinity
        .iter()
        .map(|p| (p.item_a.as_str(), p.item_b.as_str(), p.count))
        .collect();
    assert_eq!(pairs, vec![("Apple", "Bread", 1), ("Apple", "Milk", 1)]);
}

#[test]
fn test_missing_file_is_a_load_error() {
    let err = run_pipeline(
        Path::new("does/not/exist.csv"),
        &LoadOptions::default(),
        None,
        &ReportOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::Load(LoadError::NotFound(_))));
}

#[test]
fn test_bad_timestamp_is_a_normalization_error() {
    let csv = "\
pos_name,tran_no,item_name,qty,rate,item_total,tran_date
T1,1,Apple,1,1.0,1.0,2024-03-04 10:00:00
T1,2,Apple,1,1.0,1.0,sometime
";
    let lines = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    let err = normalize(lines, None).unwrap_err();
    assert_eq!(err.row, 2);
}

#[test]
fn test_workbook_pipeline() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_pos.xlsx");
    let report = run_pipeline(&path, &LoadOptions::default(), None, &ReportOptions::default())
        .expect("Pipeline failed");

    assert_eq!(report.metrics.total_lines, 4);
    assert_eq!(report.metrics.total_sales, 248.0);
    assert_eq!(report.metrics.total_quantity, 5.0);
    assert_eq!(report.metrics.total_bills, 3);

    let daily: Vec<_> = report
        .daily_trend
        .iter()
        .map(|d| (d.date, d.total_sales))
        .collect();
    assert_eq!(
        daily,
        vec![
            (NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 176.0),
            (NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 72.0),
        ]
    );
    let hours: Vec<_> = report.peak_hours.iter().map(|b| (b.hour, b.bills)).collect();
    assert_eq!(hours, vec![(9, 1), (10, 1), (18, 1)]);

    assert_eq!(report.validation.conflicts.len(), 1);
    assert_eq!(report.validation.conflicts[0].bill_no, "1002");
    assert_eq!(report.validation.conflicts[0].terminals, vec!["POS-1", "POS-2"]);
}

#[test]
fn test_integral_bill_spellings_are_one_bill() {
    let csv = "\
pos_name,tran_no,item_name,qty,rate,item_total,tran_date
X,100,Apple,1,1.0,1.0,2024-03-04 10:00:00
X,100.0,Bread,1,2.0,2.0,2024-03-04 10:00:00
Y,100.0,Milk,1,1.5,1.5,2024-03-04 11:00:00
";
    let lines = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    let dataset = Dataset::new(normalize(lines, None).unwrap());
    let report = Report::build(&dataset, &ReportOptions::default()).unwrap();

    assert_eq!(report.metrics.total_bills, 2);
    assert_eq!(report.validation.conflicts.len(), 1);
    assert_eq!(report.validation.conflicts[0].bill_no, "100");
    assert_eq!(report.validation.conflicts[0].terminals, vec!["X", "Y"]);
    assert_eq!(report.validation.gaps[0].observed, 1);
    assert_eq!(
        report.affinity.iter().map(|p| p.count).collect::<Vec<_>>(),
        vec![1]
    );
}

#[test]
fn test_blank_bill_number_is_a_load_error() {
    let csv = "\
pos_name,tran_no,item_name,qty,rate,item_total,tran_date
T1,1,Apple,1,1.0,1.0,2024-03-04 10:00:00
T1,,Bread,1,2.0,2.0,2024-03-04 10:00:00
";
    let err = load_reader(csv.as_bytes(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::EmptyValue { row: 2, column: "tran_no" }));
}
