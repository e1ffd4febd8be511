use std::fs;
use std::path::Path;

use iis_log_stats::report::{EXEC_TIME_GRID_FILE, REPORT_FILE, REQUESTS_GRID_FILE};
use iis_log_stats::{analyze_logs, AnalysisConfig, AnalysisError};

const COLUMNS: &str = "date time s-ip cs-method cs-uri-stem cs-uri-query s-port c-ip sc-status sc-bytes cs-bytes time-taken";

fn line(time: &str, ip: &str, stem: &str, query: &str, sent: u64, received: u64, taken: u64) -> String {
    format!("2010-07-30 {time} 10.1.1.1 GET {stem} {query} 80 {ip} 200 {sent} {received} {taken}")
}

fn setup(dir: &Path, logs: &[(&str, Vec<String>)]) {
    fs::write(dir.join("columns.txt"), COLUMNS).unwrap();
    for (name, lines) in logs {
        let mut content = format!("#Fields: {COLUMNS}\n");
        for l in lines {
            content.push_str(l);
            content.push('\n');
        }
        fs::write(dir.join(name), content).unwrap();
    }
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn averages_across_files_in_time_series() {
    let dir = tempfile::tempdir().unwrap();
    setup(
        dir.path(),
        &[
            ("u_ex100730.log", vec![line("17:30:00", "10.0.0.1", "/x", "-", 10, 1, 50)]),
            ("u_ex100731.log", vec![line("17:30:00", "10.0.0.2", "/x", "-", 10, 1, 150)]),
        ],
    );

    let config = AnalysisConfig::new(dir.path()).unwrap();
    let summary = analyze_logs(&config).unwrap();
    assert_eq!(summary.files_processed, 2);
    assert_eq!(summary.records_ingested, 2);
    assert_eq!(summary.comments_skipped, 2);

    assert_eq!(read(dir.path(), EXEC_TIME_GRID_FILE), "Url, 63000\n/x, 100\n");
    assert_eq!(read(dir.path(), REQUESTS_GRID_FILE), "Url, 63000\n/x, 2\n");

    let report = read(dir.path(), REPORT_FILE);
    assert!(report.starts_with("Total Requests: 2\nTotal Unique IP Address: 2\n"));
    // only the 150ms request is high cost
    assert!(report.contains("\t1         \t150ms        \t/x\n"));
}

#[test]
fn cutoff_applies_only_to_time_series() {
    let dir = tempfile::tempdir().unwrap();
    setup(
        dir.path(),
        &[(
            "a.log",
            vec![
                line("17:29:59", "10.0.0.1", "/Visits", "OnlyScheduled=true", 100, 10, 20),
                line("17:30:00", "10.0.0.1", "/visits", "onlyscheduled=true", 100, 10, 40),
            ],
        )],
    );

    let config = AnalysisConfig::new(dir.path()).unwrap();
    let summary = analyze_logs(&config).unwrap();
    assert_eq!(summary.unique_urls, 1);
    assert_eq!(summary.seconds_tracked, 1);
    assert_eq!(summary.top_urls, vec![("/visits_scheduled".to_string(), 2)]);

    assert_eq!(
        read(dir.path(), REQUESTS_GRID_FILE),
        "Url, 63000\n/visits_scheduled, 1\n"
    );
    let report = read(dir.path(), REPORT_FILE);
    assert!(report.contains("Total Requests: 2\n"));
    assert!(report.contains("Total 220, Sent 200, Received 20\n"));
}

#[test]
fn malformed_line_aborts_without_outputs() {
    let dir = tempfile::tempdir().unwrap();
    setup(
        dir.path(),
        &[
            ("a.log", vec![line("18:00:00", "10.0.0.1", "/x", "-", 1, 1, 1)]),
            ("b.log", vec!["2010-07-30 18:00:01 too few fields".to_string()]),
        ],
    );

    let config = AnalysisConfig::new(dir.path()).unwrap();
    let err = analyze_logs(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::MalformedRecord { line_number: 2, .. })
    ));

    for name in [REPORT_FILE, REQUESTS_GRID_FILE, EXEC_TIME_GRID_FILE] {
        assert!(!dir.path().join(name).exists(), "{name} should not be written");
    }
}

#[test]
fn non_numeric_field_aborts_without_outputs() {
    let dir = tempfile::tempdir().unwrap();
    setup(
        dir.path(),
        &[(
            "a.log",
            vec!["2010-07-30 18:00:00 10.1.1.1 GET /x - 80 10.0.0.1 200 lots 1 1".to_string()],
        )],
    );

    let config = AnalysisConfig::new(dir.path()).unwrap();
    let err = analyze_logs(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::FieldConversion { .. })
    ));
    assert!(!dir.path().join(REPORT_FILE).exists());
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let lines = vec![
        line("17:45:10", "10.0.0.3", "/a", "-", 500, 20, 120),
        line("17:45:10", "10.0.0.1", "/b", "onlyPastVisits=true", 50, 20, 30),
        line("17:45:11", "10.0.0.2", "/a", "-", 500, 20, 80),
        line("09:00:00", "10.0.0.2", "/c", "onlyscheduled=false&onlypastvisits=false", 5, 2, 300),
    ];
    setup(dir.path(), &[("a.log", lines)]);

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for out in [&first, &second] {
        let mut config = AnalysisConfig::new(dir.path()).unwrap();
        config.output_dir = out.path().to_path_buf();
        analyze_logs(&config).unwrap();
    }

    for name in [REPORT_FILE, REQUESTS_GRID_FILE, EXEC_TIME_GRID_FILE] {
        assert_eq!(read(first.path(), name), read(second.path(), name));
    }
    assert!(read(first.path(), REPORT_FILE).contains("/c_visithistory"));
    assert!(read(first.path(), REPORT_FILE).contains("/b_vistList"));
}

#[test]
fn empty_directory_still_writes_reports() {
    let dir = tempfile::tempdir().unwrap();
    setup(dir.path(), &[]);

    let config = AnalysisConfig::new(dir.path()).unwrap();
    let summary = analyze_logs(&config).unwrap();
    assert_eq!(summary.files_processed, 0);
    assert_eq!(read(dir.path(), REQUESTS_GRID_FILE), "Url\n");
}

#[test]
fn failed_output_write_leaves_no_outputs() {
    let dir = tempfile::tempdir().unwrap();
    setup(
        dir.path(),
        &[("a.log", vec![line("18:00:00", "10.0.0.1", "/x", "-", 1, 1, 1)])],
    );
    let out = tempfile::tempdir().unwrap();
    fs::create_dir(out.path().join(REQUESTS_GRID_FILE)).unwrap();

    let mut config = AnalysisConfig::new(dir.path()).unwrap();
    config.output_dir = out.path().to_path_buf();
    assert!(analyze_logs(&config).is_err());

    assert!(!out.path().join(REPORT_FILE).exists());
    assert!(!out.path().join(EXEC_TIME_GRID_FILE).exists());
    // only the blocking directory remains, no staged temporaries
    let remaining: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1);
}

#[test]
fn overflowing_byte_counts_abort_without_outputs() {
    let dir = tempfile::tempdir().unwrap();
    setup(
        dir.path(),
        &[(
            "a.log",
            vec![
                line("18:00:00", "10.0.0.1", "/x", "-", i64::MAX as u64, 1, 1),
                line("18:00:01", "10.0.0.1", "/x", "-", 1, 1, 1),
            ],
        )],
    );

    let config = AnalysisConfig::new(dir.path()).unwrap();
    let err = analyze_logs(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AnalysisError>(),
        Some(AnalysisError::FieldConversion { reason, .. }) if reason == "overflow"
    ));
    assert!(!dir.path().join(REPORT_FILE).exists());
}
