//! Renderers turning a result set into a byte payload.
//!
//! Every reporter builds its whole output in memory and only hands it back
//! once rendering succeeded, so a failed report never yields partial bytes.

pub mod histogram;
pub mod json;
pub mod plot;
pub mod text;

use crate::models::errors::ReportError;
use crate::models::record::Record;

pub use self::histogram::HistogramReporter;
pub use self::json::{report_json, MetricsDocument};
pub use self::plot::PlotReporter;
pub use self::text::report_text;

pub trait Reporter: Send + Sync {
    fn report(&self, results: &[Record]) -> Result<Vec<u8>, ReportError>;
}

impl<F> Reporter for F
where
    F: Fn(&[Record]) -> Result<Vec<u8>, ReportError> + Send + Sync,
{
    fn report(&self, results: &[Record]) -> Result<Vec<u8>, ReportError> {
        self(results)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::time::{Duration, SystemTime};
    use crate::models::record::Record;

    /// Ten records a second apart with latencies 10ms..100ms, the last three
    /// failing.
    pub fn attack() -> Vec<Record> {
        (1..=10u64)
            .map(|i| {
                let failed = i > 7;
                Record {
                    code: if failed { 500 } else { 200 },
                    timestamp: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000 + i),
                    latency: Duration::from_millis(i * 10),
                    bytes_out: 20,
                    bytes_in: 512,
                    error: if failed { "500 Internal Server Error".to_string() } else { String::new() },
                }
            })
            .collect()
    }
}
