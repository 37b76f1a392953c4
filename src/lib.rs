pub mod models;
pub mod core;

pub use crate::core::codec::{encode_record, RecordReader, RecordWriter};
pub use crate::core::collect::{CollectSummary, Collection, Collector, CollectorConfig, Drained, SourceStats};
pub use crate::core::reporters::{report_json, report_text, HistogramReporter, MetricsDocument, PlotReporter, Reporter};
pub use crate::models::errors::{DecodeError, ReportError, SourceError};
pub use crate::models::metrics::Metrics;
pub use crate::models::record::{Outcome, Record, Results};
pub use crate::models::target::Target;
