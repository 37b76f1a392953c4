use serde::{Deserialize, Serialize};

/// Request line of a record, supplied by whoever produced the records.
/// Only the plot report shows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub method: String,
    pub url: String,
}

impl Target {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Target {
            method: method.into(),
            url: url.into(),
        }
    }
}
