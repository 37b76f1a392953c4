use std::collections::BTreeMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::models::errors::ReportError;
use crate::models::metrics::Metrics;
use crate::models::record::Record;

/// Wire form of [`Metrics`]. Durations are integer nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDocument {
    pub requests: u64,
    #[serde(with = "nanos")]
    pub duration_total: Duration,
    #[serde(with = "nanos")]
    pub duration_attack: Duration,
    #[serde(with = "nanos")]
    pub duration_wait: Duration,
    pub latencies: LatencyDocument,
    pub bytes_in: BytesDocument,
    pub bytes_out: BytesDocument,
    pub success: f64,
    pub status_codes: BTreeMap<String, u64>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyDocument {
    #[serde(with = "nanos")]
    pub mean: Duration,
    #[serde(rename = "50th", with = "nanos")]
    pub p50: Duration,
    #[serde(rename = "95th", with = "nanos")]
    pub p95: Duration,
    #[serde(rename = "99th", with = "nanos")]
    pub p99: Duration,
    #[serde(with = "nanos")]
    pub max: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BytesDocument {
    pub total: u64,
    pub mean: f64,
}

impl From<&Metrics> for MetricsDocument {
    fn from(m: &Metrics) -> Self {
        MetricsDocument {
            requests: m.requests,
            duration_total: m.total_duration(),
            duration_attack: m.duration,
            duration_wait: m.wait,
            latencies: LatencyDocument {
                mean: m.latencies.mean,
                p50: m.latencies.p50,
                p95: m.latencies.p95,
                p99: m.latencies.p99,
                max: m.latencies.max,
            },
            bytes_in: BytesDocument {
                total: m.bytes_in.total,
                mean: m.bytes_in.mean,
            },
            bytes_out: BytesDocument {
                total: m.bytes_out.total,
                mean: m.bytes_out.mean,
            },
            success: m.success,
            status_codes: m
                .status_codes
                .iter()
                .map(|(code, count)| (code.to_string(), *count))
                .collect(),
            errors: m.errors.clone(),
        }
    }
}

pub fn report_json(results: &[Record]) -> Result<Vec<u8>, ReportError> {
    let document = MetricsDocument::from(&Metrics::new(results));
    Ok(serde_json::to_vec(&document)?)
}

mod nanos {
    use std::time::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use crate::core::reporters::fixtures;

    #[test]
    fn decoded_report_matches_metrics() {
        let results = fixtures::attack();
        let bytes = report_json(&results).unwrap();
        let decoded: MetricsDocument = serde_json::from_slice(&bytes).unwrap();
        let metrics = Metrics::new(&results);

        assert_eq!(decoded.requests, metrics.requests);
        assert_eq!(decoded.success, metrics.success);
        assert_eq!(decoded.status_codes.get("200"), Some(&7));
        assert_eq!(decoded.status_codes.get("500"), Some(&3));
        assert_eq!(decoded, MetricsDocument::from(&metrics));
    }

    #[test]
    fn field_names_are_stable() {
        let value: Value = serde_json::from_slice(&report_json(&fixtures::attack()).unwrap()).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "bytes_in",
                "bytes_out",
                "duration_attack",
                "duration_total",
                "duration_wait",
                "errors",
                "latencies",
                "requests",
                "status_codes",
                "success",
            ]
        );
        assert_eq!(value["latencies"]["50th"], 50_000_000);
        assert_eq!(value["latencies"]["max"], 100_000_000);
        assert_eq!(value["duration_wait"], 100_000_000);
        assert_eq!(value["errors"][0], "500 Internal Server Error");
    }

    #[test]
    fn empty_results_encode_zeroes() {
        let value: Value = serde_json::from_slice(&report_json(&[]).unwrap()).unwrap();
        assert_eq!(value["requests"], 0);
        assert_eq!(value["success"], 0.0);
        assert_eq!(value["bytes_in"]["mean"], 0.0);
        assert_eq!(value["status_codes"], serde_json::json!({}));
        assert_eq!(value["errors"], serde_json::json!([]));
    }
}
