//! Batch record processing.
//!
//! # Responsibilities
//! - Run every record through the request pipeline independently
//! - Bound how many records are in flight
//! - Report per-record success in record order
//!
//! # Design Decisions
//! - One record's failure never aborts its siblings
//! - Unhandled failures are recovered here and mark the record failed
//! - Each record gets its own deadline regardless of concurrency
//! - Concurrency 1 is strictly sequential

use futures_util::stream::{self, StreamExt};
use serde_json::Value;

use crate::dispatch::Outcome;
use crate::event::{BatchSource, Record};
use crate::observability::metrics;
use crate::runtime::Pipeline;

/// Result of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub record_id: String,
    pub success: bool,
}

/// Per-record outcomes of one batch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub source: BatchSource,
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    /// Identifiers of failed records, in record order.
    pub fn failed_ids(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.success)
            .map(|outcome| outcome.record_id.clone())
            .collect()
    }

    /// Aggregate envelope for the host.
    pub fn to_json(&self) -> Value {
        self.source.aggregate(&self.failed_ids())
    }
}

/// Drives batch records through a [`Pipeline`].
#[derive(Debug, Clone, Copy)]
pub struct BatchProcessor {
    concurrency: usize,
}

impl BatchProcessor {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub async fn process(&self, pipeline: &Pipeline, source: BatchSource, records: Vec<Record>) -> BatchReport {
        let total = records.len();

        let mut outcomes: Vec<(usize, BatchOutcome)> = stream::iter(records.into_iter().enumerate())
            .map(|(index, record)| async move {
                let outcome = pipeline.process(record.request).await;
                if let Outcome::Unhandled(error) = &outcome {
                    tracing::error!(
                        record_id = %record.id,
                        error = %error.report(),
                        "Unhandled error in batch record"
                    );
                }
                let success = outcome.is_success();
                (
                    index,
                    BatchOutcome {
                        record_id: record.id,
                        success,
                    },
                )
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);
        let report = BatchReport {
            source,
            outcomes: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
        };

        let failed = report.outcomes.iter().filter(|o| !o.success).count();
        metrics::record_batch_failures(source.as_str(), failed);
        tracing::debug!(
            source = source.as_str(),
            records = total,
            failed,
            concurrency = self.concurrency,
            "Batch processed"
        );
        report
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(id: &str, success: bool) -> BatchOutcome {
        BatchOutcome {
            record_id: id.to_string(),
            success,
        }
    }

    #[test]
    fn test_report_lists_only_failures() {
        let report = BatchReport {
            source: BatchSource::Generic,
            outcomes: vec![outcome("1", true), outcome("2", false), outcome("3", true)],
        };
        assert_eq!(report.failed_ids(), vec!["2".to_string()]);
        assert_eq!(report.to_json(), json!({"failedRecordIds": ["2"]}));
    }

    #[test]
    fn test_zero_concurrency_is_sequential() {
        assert_eq!(BatchProcessor::new(0).concurrency(), 1);
    }
}
