use std::io::Write;
use prettytable::{format, row, Table};
use crate::models::errors::ReportError;
use crate::models::metrics::Metrics;
use crate::models::record::Record;

/// Summary as an aligned plain-text table followed by the error set.
pub fn report_text(results: &[Record]) -> Result<Vec<u8>, ReportError> {
    let m = Metrics::new(results);

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    table.add_row(row!["Requests", "[total]", m.requests]);
    table.add_row(row![
        "Duration",
        "[total, attack, wait]",
        format!("{:?}, {:?}, {:?}", m.total_duration(), m.duration, m.wait)
    ]);
    table.add_row(row![
        "Latencies",
        "[mean, 50, 95, 99, max]",
        format!(
            "{:?}, {:?}, {:?}, {:?}, {:?}",
            m.latencies.mean, m.latencies.p50, m.latencies.p95, m.latencies.p99, m.latencies.max
        )
    ]);
    table.add_row(row![
        "Bytes In",
        "[total, mean]",
        format!("{}, {:.2}", m.bytes_in.total, m.bytes_in.mean)
    ]);
    table.add_row(row![
        "Bytes Out",
        "[total, mean]",
        format!("{}, {:.2}", m.bytes_out.total, m.bytes_out.mean)
    ]);
    table.add_row(row!["Success", "[ratio]", format!("{:.2}%", m.success * 100.0)]);
    let codes: Vec<String> = m
        .status_codes
        .iter()
        .map(|(code, count)| format!("{}:{}", code, count))
        .collect();
    table.add_row(row!["Status Codes", "[code:count]", codes.join("  ")]);

    let mut out = Vec::new();
    table.print(&mut out)?;
    writeln!(out, "Error Set:")?;
    for error in &m.errors {
        writeln!(out, "{}", error)?;
    }
    Ok(out)
}
