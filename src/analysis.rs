use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::engine::Aggregator;
use crate::logs::{discover_log_files, ingest_file};
use crate::report::{render, write_reports};
use crate::schema::Schema;
use crate::stats::RunSummary;
use crate::utils::format_number;

/// Runs the whole pipeline: schema, discovery, ingestion, rendering, output.
///
/// Outputs are only written once every file has been ingested and every
/// report rendered, so a failed run leaves no output files behind.
pub fn analyze_logs(config: &AnalysisConfig) -> Result<RunSummary> {
    let total_start_time = Instant::now();
    info!(action = "start", component = "analysis", log_dir = ?config.log_dir, "Starting log analysis");

    let schema = Schema::load(&config.columns_file)?;
    let files = discover_log_files(&config.log_dir, &config.file_pattern)?;
    if files.is_empty() {
        warn!(action = "discover", component = "analysis", log_dir = ?config.log_dir, "No log files matched");
    }

    let mut engine = Aggregator::new();
    let mut summary = RunSummary {
        files_processed: 0,
        lines_read: 0,
        comments_skipped: 0,
        records_ingested: 0,
        unique_addresses: 0,
        unique_urls: 0,
        seconds_tracked: 0,
        top_urls: Vec::new(),
        outputs: Vec::new(),
    };

    for file in &files {
        let file_summary = ingest_file(file, &schema, &mut engine)?;
        summary.files_processed += 1;
        summary.lines_read += file_summary.lines_read;
        summary.comments_skipped += file_summary.comments_skipped;
        summary.records_ingested += file_summary.records_ingested;
    }

    let reports = render(&engine)?;
    summary.outputs = write_reports(&reports, &config.output_dir)?;

    summary.unique_addresses = engine.addresses().len();
    summary.unique_urls = engine.urls().len();
    summary.seconds_tracked = engine.seconds().len();
    summary.top_urls = engine
        .urls()
        .sorted_desc_by(|stat| stat.count)
        .into_iter()
        .take(config.top)
        .map(|(key, stat)| (key.to_string(), stat.count))
        .collect();

    info!(
        action = "complete",
        component = "analysis",
        files = summary.files_processed,
        records = summary.records_ingested,
        duration_ms = total_start_time.elapsed().as_millis(),
        "Analysis completed successfully"
    );
    Ok(summary)
}

pub fn print_analysis_results(summary: &RunSummary) {
    println!("\n--- IIS Log Analysis ---");
    println!(
        "Files processed: {} ({} lines, {} comments skipped)",
        format_number(summary.files_processed as u64),
        format_number(summary.lines_read),
        format_number(summary.comments_skipped)
    );
    println!(
        "Records ingested: {}",
        format_number(summary.records_ingested)
    );
    println!(
        "Unique IP addresses: {}",
        format_number(summary.unique_addresses as u64)
    );
    println!("Unique URLs: {}", format_number(summary.unique_urls as u64));
    println!(
        "Seconds tracked after cutoff: {}",
        format_number(summary.seconds_tracked as u64)
    );

    if !summary.top_urls.is_empty() {
        println!("\nTop {} most requested URLs:", summary.top_urls.len());
        for (url, count) in &summary.top_urls {
            println!("- {}: {} requests", url, format_number(*count));
        }
    }

    println!("\nOutputs:");
    for path in &summary.outputs {
        println!("- {}", path.display());
    }
}
