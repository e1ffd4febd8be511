pub mod analysis;
pub mod args;
pub mod config;
pub mod engine;
pub mod error;
pub mod logs;
pub mod parser;
pub mod report;
pub mod schema;
pub mod stats;
pub mod url_key;
pub mod utils;

pub use analysis::analyze_logs;
pub use args::Args;
pub use config::AnalysisConfig;
pub use engine::Aggregator;
pub use error::AnalysisError;
pub use stats::RunSummary;
