use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "iis-log-stats",
    about = "Aggregate traffic and performance statistics from IIS access logs",
    version,
    long_about = None
)]
pub struct Args {
    /// Directory containing the log files
    #[arg(default_value = ".")]
    pub log_dir: PathBuf,

    /// Directory the report and CSV files are written to (defaults to the log directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Column file naming the log fields (defaults to columns.txt in the log directory)
    #[arg(short, long)]
    pub columns: Option<PathBuf>,

    /// Regex matched against file names to select log files
    #[arg(short, long, default_value = r"\.log$")]
    pub pattern: String,

    /// Number of busiest URLs to show in the console summary
    #[arg(short, long, default_value_t = 10)]
    pub top: usize,

    /// Do not print the console summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
