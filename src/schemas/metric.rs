use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label name to value mapping, ordered by label name.
pub type Labels = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Coverage,
    DurationSeconds,
    Id,
    QueuedDurationSeconds,
    RunCount,
    Status,
    Timestamp,
    TestReportTotalTime,
    TestReportTotalCount,
    TestReportSuccessCount,
    TestReportFailedCount,
    TestReportSkippedCount,
    TestReportErrorCount,
    TestSuiteTotalTime,
    TestSuiteTotalCount,
    TestSuiteSuccessCount,
    TestSuiteFailedCount,
    TestSuiteSkippedCount,
    TestSuiteErrorCount,
    TestCaseExecutionTime,
    TestCaseStatus,
}

impl MetricKind {
    /// Exposition name of the metric family.
    pub fn name(self) -> &'static str {
        match self {
            Self::Coverage => "gitlab_ci_pipeline_coverage",
            Self::DurationSeconds => "gitlab_ci_pipeline_duration_seconds",
            Self::Id => "gitlab_ci_pipeline_id",
            Self::QueuedDurationSeconds => "gitlab_ci_pipeline_queued_duration_seconds",
            Self::RunCount => "gitlab_ci_pipeline_run_count",
            Self::Status => "gitlab_ci_pipeline_status",
            Self::Timestamp => "gitlab_ci_pipeline_timestamp",
            Self::TestReportTotalTime => "gitlab_ci_pipeline_test_report_total_time",
            Self::TestReportTotalCount => "gitlab_ci_pipeline_test_report_total_count",
            Self::TestReportSuccessCount => "gitlab_ci_pipeline_test_report_success_count",
            Self::TestReportFailedCount => "gitlab_ci_pipeline_test_report_failed_count",
            Self::TestReportSkippedCount => "gitlab_ci_pipeline_test_report_skipped_count",
            Self::TestReportErrorCount => "gitlab_ci_pipeline_test_report_error_count",
            Self::TestSuiteTotalTime => "gitlab_ci_pipeline_test_suite_total_time",
            Self::TestSuiteTotalCount => "gitlab_ci_pipeline_test_suite_total_count",
            Self::TestSuiteSuccessCount => "gitlab_ci_pipeline_test_suite_success_count",
            Self::TestSuiteFailedCount => "gitlab_ci_pipeline_test_suite_failed_count",
            Self::TestSuiteSkippedCount => "gitlab_ci_pipeline_test_suite_skipped_count",
            Self::TestSuiteErrorCount => "gitlab_ci_pipeline_test_suite_error_count",
            Self::TestCaseExecutionTime => "gitlab_ci_pipeline_test_case_execution_time",
            Self::TestCaseStatus => "gitlab_ci_pipeline_test_case_status",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a metric: its kind plus its full label set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub kind: MetricKind,
    pub labels: Labels,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub kind: MetricKind,
    pub labels: Labels,
    pub value: f64,
}

impl Metric {
    pub fn new(kind: MetricKind, labels: Labels, value: f64) -> Self {
        Self {
            kind,
            labels,
            value,
        }
    }

    pub fn key(&self) -> MetricKey {
        MetricKey {
            kind: self.kind,
            labels: self.labels.clone(),
        }
    }
}
