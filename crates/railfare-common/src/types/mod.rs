//! Common types used across railfare

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column contract of every tabular file and every route table, in order.
///
/// The header row of a tabular file is exactly this list joined by commas, and
/// the loader inserts fields positionally into these columns.
pub const FLAT_ROW_COLUMNS: [&str; 10] = [
    "journey_id",
    "departure_time",
    "departure_station",
    "arrival_station",
    "arrival_time",
    "price",
    "train_number",
    "train_type",
    "eco_seats_available",
    "request_date",
];

/// Outcome of a batch run over many files or routes
///
/// Batch drivers never stop at the first failure; they log it, record the
/// item here and move on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedItem>,
}

/// One item a batch driver could not finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    pub item: String,
    pub reason: String,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, item: impl Into<String>) {
        self.succeeded.push(item.into());
    }

    pub fn record_failure(&mut self, item: impl Into<String>, reason: impl fmt::Display) {
        self.failed.push(FailedItem {
            item: item.into(),
            reason: reason.to_string(),
        });
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} attempted, {} succeeded, {} failed",
            self.attempted(),
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_order() {
        assert_eq!(
            FLAT_ROW_COLUMNS.join(","),
            "journey_id,departure_time,departure_station,arrival_station,arrival_time,\
             price,train_number,train_type,eco_seats_available,request_date"
        );
    }

    #[test]
    fn test_batch_report_counts() {
        let mut report = BatchReport::new();
        report.record_success("a.txt");
        report.record_failure("b.txt", "permission denied");

        assert_eq!(report.attempted(), 2);
        assert!(!report.is_success());
        assert_eq!(report.failed[0].reason, "permission denied");
        assert_eq!(report.to_string(), "2 attempted, 1 succeeded, 1 failed");
    }
}
