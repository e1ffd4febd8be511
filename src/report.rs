use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::engine::{Aggregator, FIELD_BYTES_RECEIVED, FIELD_BYTES_SENT, HIGH_COST_THRESHOLD_MS};
use crate::error::{AnalysisError, AnalysisResult};
use crate::stats::{RequestStat, SecondBucket};

pub const REPORT_FILE: &str = "report.txt";
pub const REQUESTS_GRID_FILE: &str = "numberOfRequests.csv";
pub const EXEC_TIME_GRID_FILE: &str = "requestExecutionTime.csv";

/// Fully rendered outputs, built in memory before anything touches disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reports {
    pub text: String,
    pub requests_grid: String,
    pub exec_time_grid: String,
}

pub fn render(engine: &Aggregator) -> AnalysisResult<Reports> {
    let start_time = Instant::now();

    let mut text = String::new();
    for section in [
        address_report(engine),
        url_report(engine),
        high_cost_url_report(engine),
        byte_report(engine)?,
    ] {
        text.push_str(&section);
        text.push('\n');
    }

    let reports = Reports {
        text,
        requests_grid: requests_grid(engine),
        exec_time_grid: exec_time_grid(engine),
    };

    info!(
        action = "complete",
        component = "report_render",
        duration_ms = start_time.elapsed().as_millis(),
        "Rendered reports"
    );
    Ok(reports)
}

pub fn address_report(engine: &Aggregator) -> String {
    let addresses = engine.addresses();
    let total: u64 = addresses.iter().map(|(_, count)| *count).sum();

    let mut out = String::new();
    let _ = writeln!(out, "Total Requests: {}", total);
    let _ = writeln!(out, "Total Unique IP Address: {}", addresses.len());
    let _ = writeln!(out, "Traffic Per IP Address:");
    let _ = writeln!(out, "\tIP Address     \tNumber Of Requests");
    for (address, count) in addresses.sorted_desc_by(|count| *count) {
        let _ = writeln!(out, "\t{:<15}\t{}", address, count);
    }
    out
}

pub fn url_report(engine: &Aggregator) -> String {
    let urls = engine.urls();
    let mut out = String::new();
    let _ = writeln!(out, "Total Unique URLs: {}", urls.len());
    let _ = writeln!(out, "Hits Per URL:");
    write_request_rows(&mut out, urls.sorted_desc_by(|stat| stat.count));
    out
}

pub fn high_cost_url_report(engine: &Aggregator) -> String {
    let urls = engine.high_cost_urls();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "High Cost Requests - These are statistics for any request that took longer than {}ms",
        HIGH_COST_THRESHOLD_MS
    );
    let _ = writeln!(out, "Total Unique URLs: {}", urls.len());
    let _ = writeln!(out, "Hits Per URL:");
    write_request_rows(&mut out, urls.sorted_desc_by(RequestStat::average_exec_time));
    out
}

fn write_request_rows(out: &mut String, rows: Vec<(&str, &RequestStat)>) {
    let _ = writeln!(out, "\tRequests  \tAvg Exec Time\tUrl");
    for (key, stat) in rows {
        let average = format!("{}ms", stat.average_exec_time());
        let _ = writeln!(out, "\t{:<10}\t{:<13}\t{}", stat.count, average, key);
    }
}

/// Byte totals per key. Per-request averages divide by the key's request count.
pub fn byte_report(engine: &Aggregator) -> AnalysisResult<String> {
    let bytes = engine.bytes();
    let sent = checked_sum(bytes.iter().map(|(_, stat)| stat.sent), FIELD_BYTES_SENT)?;
    let received = checked_sum(
        bytes.iter().map(|(_, stat)| stat.received),
        FIELD_BYTES_RECEIVED,
    )?;
    let total = sent
        .checked_add(received)
        .ok_or_else(|| AnalysisError::overflow(FIELD_BYTES_RECEIVED, received))?;

    let mut out = String::new();
    let _ = writeln!(out, "Bytes Transferred Per Url -");
    let _ = writeln!(
        out,
        "Total {}, Sent {}, Received {}",
        total,
        sent,
        received
    );
    let _ = writeln!(out, "Hits Per URL:");
    let _ = writeln!(
        out,
        "\tBytes Total    \tBytes Sent     \tBytes Received \tAvg Bytes Sent \tAvg Bytes Recv \tUrl"
    );

    for (key, stat) in bytes.sorted_desc_by(|stat| stat.sent) {
        let requests = engine
            .urls()
            .get(key)
            .map(|url| url.count as i64)
            .filter(|count| *count > 0)
            .ok_or_else(|| AnalysisError::Consistency {
                key: key.to_string(),
            })?;
        let _ = writeln!(
            out,
            "\t{:<15}\t{:<15}\t{:<15}\t{:<15}\t{:<15}\t{}",
            stat.total()?,
            stat.sent,
            stat.received,
            stat.sent / requests,
            stat.received / requests,
            key
        );
    }
    Ok(out)
}

fn checked_sum(mut values: impl Iterator<Item = i64>, field: &str) -> AnalysisResult<i64> {
    values.try_fold(0i64, |acc, value| {
        acc.checked_add(value)
            .ok_or_else(|| AnalysisError::overflow(field, value))
    })
}

/// Raw request count per URL key and second.
pub fn requests_grid(engine: &Aggregator) -> String {
    let rows = engine.urls().sorted_desc_by(|stat| stat.count);
    render_grid(engine, &rows, |bucket, key| {
        bucket.request_counts.get(key).copied().unwrap_or(0) as i64
    })
}

/// Average execution time per URL key and second.
pub fn exec_time_grid(engine: &Aggregator) -> String {
    let rows = engine.urls().sorted_desc_by(RequestStat::average_exec_time);
    render_grid(engine, &rows, |bucket, key| {
        bucket
            .exec_stats
            .get(key)
            .map(RequestStat::average_exec_time)
            .unwrap_or(0)
    })
}

fn render_grid(
    engine: &Aggregator,
    rows: &[(&str, &RequestStat)],
    cell: impl Fn(&SecondBucket, &str) -> i64,
) -> String {
    let mut out = String::from("Url");
    for second in engine.seconds().keys() {
        let _ = write!(out, ", {}", second);
    }
    out.push('\n');

    for &(key, _) in rows {
        out.push_str(key);
        for bucket in engine.seconds().values() {
            let _ = write!(out, ", {}", cell(bucket, key));
        }
        out.push('\n');
    }
    out
}

/// Writes all three outputs into `output_dir`, returning the paths written.
///
/// Each output is staged in a temporary file next to its destination and only
/// renamed into place once every output has been staged. If a rename fails,
/// outputs already moved into place are removed again.
pub fn write_reports(reports: &Reports, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let mut staged = Vec::new();
    for (name, content) in [
        (REPORT_FILE, &reports.text),
        (REQUESTS_GRID_FILE, &reports.requests_grid),
        (EXEC_TIME_GRID_FILE, &reports.exec_time_grid),
    ] {
        let path = output_dir.join(name);
        let mut file = NamedTempFile::new_in(output_dir)
            .with_context(|| format!("Failed to stage {:?}", path))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write {:?}", path))?;
        staged.push((file, path, content.len()));
    }

    let mut written: Vec<PathBuf> = Vec::new();
    for (file, path, bytes) in staged {
        if let Err(e) = file.persist(&path) {
            for done in &written {
                if let Err(cleanup) = fs::remove_file(done) {
                    warn!(action = "cleanup", component = "report_output", file_path = ?done, error = %cleanup, "Failed to remove partial output");
                }
            }
            return Err(anyhow::Error::new(e.error).context(format!("Failed to write {:?}", path)));
        }
        info!(action = "write", component = "report_output", file_path = ?path, bytes, "Wrote output");
        written.push(path);
    }
    Ok(written)
}
