use anyhow::Result;
use clap::Parser;
use tracing::error;

use iis_log_stats::analysis::print_analysis_results;
use iis_log_stats::utils::setup_logging;
use iis_log_stats::{analyze_logs, AnalysisConfig, Args};

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = AnalysisConfig::try_from(&args)?;

    match analyze_logs(&config) {
        Ok(summary) => {
            if !args.quiet {
                print_analysis_results(&summary);
            }
            Ok(())
        }
        Err(e) => {
            error!(action = "abort", component = "analysis", error = %format!("{:#}", e), "Analysis failed");
            std::process::exit(1);
        }
    }
}
