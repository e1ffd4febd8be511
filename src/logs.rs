use anyhow::{Context, Result};
use regex::Regex;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::engine::Aggregator;
use crate::parser::{parse_line, ParsedLine};
use crate::schema::Schema;

/// Line counters for one ingested log file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub lines_read: u64,
    pub comments_skipped: u64,
    pub records_ingested: u64,
}

/// Lists files directly inside `dir` whose name matches `pattern`, sorted by path.
pub fn discover_log_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let start_time = Instant::now();
    info!(action = "start", component = "log_discovery", directory = ?dir, pattern = pattern.as_str(), "Discovering log files");

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        match name.to_str() {
            Some(name) if pattern.is_match(name) => files.push(entry.path()),
            Some(_) => {}
            None => {
                warn!(action = "skip", component = "log_discovery", file_name = ?name, "Skipping file with non UTF-8 name")
            }
        }
    }
    files.sort();

    info!(
        action = "complete",
        component = "log_discovery",
        file_count = files.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Log discovery completed"
    );
    Ok(files)
}

/// Streams every line of `path` through the parser into `engine`.
///
/// The first malformed line or unconvertible field aborts with that error.
pub fn ingest_file(path: &Path, schema: &Schema, engine: &mut Aggregator) -> Result<IngestSummary> {
    let start_time = Instant::now();
    info!(action = "load", component = "log_file", file_path = ?path, "Loading log file");

    let file = File::open(path).with_context(|| format!("Failed to open log file {:?}", path))?;
    let summary = ingest_reader(BufReader::new(file), path, schema, engine)?;

    info!(
        action = "loaded",
        component = "log_file",
        file_path = ?path,
        lines = summary.lines_read,
        comments = summary.comments_skipped,
        records = summary.records_ingested,
        duration_ms = start_time.elapsed().as_millis(),
        "Loaded log file"
    );
    Ok(summary)
}

pub fn ingest_reader<R: BufRead>(
    reader: R,
    source: &Path,
    schema: &Schema,
    engine: &mut Aggregator,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {:?}", source))?;
        summary.lines_read += 1;

        match parse_line(schema, &line).map_err(|e| e.at(source, index + 1))? {
            ParsedLine::Skip => summary.comments_skipped += 1,
            ParsedLine::Record(record) => {
                engine.ingest(&record).with_context(|| {
                    format!("Failed to ingest {}:{}", source.display(), index + 1)
                })?;
                summary.records_ingested += 1;
            }
        }
    }
    Ok(summary)
}
