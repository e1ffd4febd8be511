use anyhow::{Context, Result};
use regex::Regex;
use std::path::PathBuf;

use crate::args::Args;

pub const DEFAULT_COLUMNS_FILE: &str = "columns.txt";

/// Resolved settings for one run. Every path the run touches comes from here.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub log_dir: PathBuf,
    pub output_dir: PathBuf,
    pub columns_file: PathBuf,
    pub file_pattern: Regex,
    pub top: usize,
}

impl AnalysisConfig {
    pub fn new(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        Ok(Self {
            output_dir: log_dir.clone(),
            columns_file: log_dir.join(DEFAULT_COLUMNS_FILE),
            file_pattern: Regex::new(r"\.log$")?,
            top: 10,
            log_dir,
        })
    }
}

impl TryFrom<&Args> for AnalysisConfig {
    type Error = anyhow::Error;

    fn try_from(args: &Args) -> Result<Self> {
        if args.top == 0 {
            anyhow::bail!("--top must be greater than 0");
        }
        if !args.log_dir.is_dir() {
            anyhow::bail!("Log directory not found: {:?}", args.log_dir);
        }

        let file_pattern = Regex::new(&args.pattern)
            .with_context(|| format!("Invalid file pattern {:?}", args.pattern))?;

        Ok(Self {
            log_dir: args.log_dir.clone(),
            output_dir: args
                .output_dir
                .clone()
                .unwrap_or_else(|| args.log_dir.clone()),
            columns_file: args
                .columns
                .clone()
                .unwrap_or_else(|| args.log_dir.join(DEFAULT_COLUMNS_FILE)),
            file_pattern,
            top: args.top,
        })
    }
}
