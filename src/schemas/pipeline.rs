use serde::{Deserialize, Serialize};

/// Pipeline entry as returned by the pipeline listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: String,
}

/// A single CI run, as last reconciled for a ref.
///
/// `id == 0` is reserved for "no pipeline yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Numeric ID assigned by GitLab (monotonic, never reused)
    pub id: u64,
    /// Pipeline status (e.g., "running", "success", "failed")
    pub status: String,
    /// Trigger source (e.g., "push", "schedule", "web")
    pub source: String,
    /// Test coverage percentage
    pub coverage: f64,
    pub duration_seconds: f64,
    pub queued_duration_seconds: f64,
    /// Creation time as Unix seconds
    pub timestamp: f64,
    /// Pipeline variables rendered as `key:value` pairs joined by `,`
    pub variables: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_report: Option<TestReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub total_time: f64,
    pub total_count: u64,
    pub success_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    pub error_count: u64,
    #[serde(default)]
    pub test_suites: Vec<TestSuite>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub name: String,
    pub total_time: f64,
    pub total_count: u64,
    pub success_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    pub error_count: u64,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub classname: String,
    /// Case status (e.g., "success", "failed", "skipped", "error")
    pub status: String,
    pub execution_time: f64,
}
