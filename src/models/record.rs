use std::ops::Deref;
use std::time::{Duration, SystemTime};
use serde::{Deserialize, Serialize};

/// One observed outcome of a single request made during an attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Protocol status code, 0 or negative when the transport itself failed
    pub code: i32,
    /// When the request was issued
    pub timestamp: SystemTime,
    pub latency: Duration,
    pub bytes_out: u64,
    pub bytes_in: u64,
    /// Empty on success
    pub error: String,
}

/// Latency of a record tagged with whether it succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success(Duration),
    Failure(Duration),
}

impl Record {
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    pub fn outcome(&self) -> Outcome {
        if self.is_success() {
            Outcome::Success(self.latency)
        } else {
            Outcome::Failure(self.latency)
        }
    }

    /// Instant the response (or failure) arrived.
    pub fn end(&self) -> SystemTime {
        self.timestamp + self.latency
    }
}

/// Accumulated records of one or more attacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Results(Vec<Record>);

impl Results {
    pub fn new() -> Self {
        Results(Vec::new())
    }

    pub fn push(&mut self, record: Record) {
        self.0.push(record);
    }

    /// Sort by issue timestamp. Stable, so records sharing a timestamp keep
    /// their arrival order.
    pub fn sort(&mut self) {
        self.0.sort_by_key(|r| r.timestamp);
    }

    pub fn into_inner(self) -> Vec<Record> {
        self.0
    }
}

impl Deref for Results {
    type Target = [Record];

    fn deref(&self) -> &[Record] {
        &self.0
    }
}

impl From<Vec<Record>> for Results {
    fn from(records: Vec<Record>) -> Self {
        Results(records)
    }
}

impl FromIterator<Record> for Results {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Results(iter.into_iter().collect())
    }
}

impl Extend<Record> for Results {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}
