use std::ops::RangeInclusive;
use std::time::Duration;
use ::histogram::Histogram;
use prettytable::{format, row, Table};
use crate::core::reporters::Reporter;
use crate::models::errors::ReportError;
use crate::models::record::Record;

const PERCENTILES: [f64; 7] = [50.0, 75.0, 90.0, 95.0, 99.0, 99.9, 100.0];

/// Latency distribution bucketed in microseconds, shown as the bucket each
/// percentile falls into.
#[derive(Debug, Clone)]
pub struct HistogramReporter {
    grouping_power: u8,
    max_value_power: u8,
}

impl Default for HistogramReporter {
    fn default() -> Self {
        // buckets are within 1% of their value, up to about 12 days
        HistogramReporter {
            grouping_power: 7,
            max_value_power: 40,
        }
    }
}

impl HistogramReporter {
    pub fn new(grouping_power: u8, max_value_power: u8) -> Self {
        HistogramReporter {
            grouping_power,
            max_value_power,
        }
    }

    fn ladder(&self, results: &[Record]) -> Result<Vec<(f64, RangeInclusive<u64>)>, ReportError> {
        if results.is_empty() {
            return Ok(Vec::new());
        }
        let mut histogram = Histogram::new(self.grouping_power, self.max_value_power)
            .map_err(|e| ReportError::Histogram(format!("{:?}", e)))?;
        let ceiling = (1u64 << self.max_value_power.min(63)) - 1;
        for r in results {
            let micros = u64::try_from(r.latency.as_micros()).unwrap_or(u64::MAX).min(ceiling);
            histogram
                .increment(micros)
                .map_err(|e| ReportError::Histogram(format!("{:?}", e)))?;
        }

        PERCENTILES
            .iter()
            .map(|p| {
                let bucket = histogram
                    .percentile(*p)
                    .map_err(|e| ReportError::Histogram(format!("{:?}", e)))?;
                Ok((*p, bucket.range()))
            })
            .collect()
    }
}

impl Reporter for HistogramReporter {
    fn report(&self, results: &[Record]) -> Result<Vec<u8>, ReportError> {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table.add_row(row!["Percentile", "Bucket", "Requests"]);
        for (p, range) in self.ladder(results)? {
            let start = Duration::from_micros(*range.start());
            let end = Duration::from_micros(*range.end());
            table.add_row(row![
                format!("{}", p),
                format!("[{:?}, {:?}]", start, end),
                format!("{}", (results.len() as f64 * p / 100.0).ceil())
            ]);
        }

        let mut out = Vec::new();
        table.print(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reporters::fixtures;

    #[test]
    fn ladder_brackets_the_latencies() {
        let ladder = HistogramReporter::default().ladder(&fixtures::attack()).unwrap();

        assert_eq!(ladder.len(), PERCENTILES.len());
        let (p, top) = ladder.last().unwrap();
        assert_eq!(*p, 100.0);
        assert!(top.contains(&100_000), "{:?}", top);
        assert!(*ladder[0].1.start() >= 10_000);
        assert!(ladder.windows(2).all(|w| w[0].1.start() <= w[1].1.start()));
    }

    #[test]
    fn report_lists_each_percentile() {
        let out = HistogramReporter::default().report(&fixtures::attack()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().count(), PERCENTILES.len() + 1);
        // rows carry a one space left pad
        assert_eq!(text.lines().next().unwrap().split_whitespace().next(), Some("Percentile"));
        assert!(text.contains("99.9"));
    }

    #[test]
    fn empty_results_render_header_only() {
        let out = HistogramReporter::default().report(&[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }

    #[test]
    fn bad_configuration_is_reported() {
        let reporter = HistogramReporter::new(40, 10);
        assert!(matches!(
            reporter.report(&fixtures::attack()),
            Err(ReportError::Histogram(_))
        ));
    }
}
