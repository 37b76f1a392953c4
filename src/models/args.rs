use std::path::PathBuf;
use clap::{Parser, ValueEnum};
use crate::core::collect::CollectorConfig;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportType {
    Text,
    Json,
    Plot,
    Hist,
}

#[derive(Parser, Debug)]
#[command(version, about = "Merge attack results and report on them", long_about = None)]
pub struct Args {
    /// Result files to merge, `-` reads stdin
    #[arg(default_value = "-")]
    pub inputs: Vec<String>,

    /// Report to render
    #[arg(short = 't', long = "type", value_enum, default_value_t = ReportType::Text)]
    pub report_type: ReportType,

    /// Where to write the report, `-` is stdout
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Charting script embedded into the plot report
    #[arg(long)]
    pub plot_library: Option<PathBuf>,

    /// Plot title
    #[arg(long, default_value = "Atomic Bomb Plot")]
    pub title: String,

    /// Record channel capacity
    #[arg(long, default_value_t = 1024)]
    pub buffer: usize,

    /// Abandon a source after this many errors in a row, 0 never gives up
    #[arg(long, default_value_t = 100)]
    pub max_consecutive_errors: usize,
}

impl Args {
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig {
            record_buffer: self.buffer,
            max_consecutive_errors: match self.max_consecutive_errors {
                0 => None,
                n => Some(n),
            },
            ..CollectorConfig::default()
        }
    }
}
