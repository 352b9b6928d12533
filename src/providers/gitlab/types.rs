//! Wire shapes of the GitLab v4 REST API and their conversion into the
//! exporter's schemas.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::schemas::{Pipeline, PipelineSummary, TestCase, TestReport, TestSuite};

/// Entry of `GET /projects/:id/pipelines`.
#[derive(Debug, Deserialize)]
pub(super) struct ApiPipelineInfo {
    pub id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Body of `GET /projects/:id/pipelines/:pipeline_id`.
#[derive(Debug, Deserialize)]
pub(super) struct ApiPipeline {
    pub id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Reported as a decimal string, e.g. "87.50"
    #[serde(default)]
    pub coverage: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queued_duration: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiTestReport {
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub test_suites: Vec<ApiTestSuite>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiTestSuite {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_time: f64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub test_cases: Vec<ApiTestCase>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiTestCase {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub classname: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub execution_time: Option<f64>,
}

impl From<ApiPipelineInfo> for PipelineSummary {
    fn from(info: ApiPipelineInfo) -> Self {
        Self {
            id: info.id,
            status: info.status,
            source: info.source.unwrap_or_default(),
        }
    }
}

impl From<ApiPipeline> for Pipeline {
    fn from(api: ApiPipeline) -> Self {
        let coverage = api
            .coverage
            .as_deref()
            .and_then(|c| c.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        #[allow(clippy::cast_precision_loss)]
        let timestamp = api.created_at.map_or(0.0, |t| t.timestamp() as f64);

        Self {
            id: api.id,
            status: api.status,
            source: api.source.unwrap_or_default(),
            coverage,
            duration_seconds: api.duration.unwrap_or(0.0),
            queued_duration_seconds: api.queued_duration.unwrap_or(0.0),
            timestamp,
            variables: String::new(),
            test_report: None,
        }
    }
}

impl From<ApiTestReport> for TestReport {
    fn from(api: ApiTestReport) -> Self {
        Self {
            total_time: api.total_time,
            total_count: api.total_count,
            success_count: api.success_count,
            failed_count: api.failed_count,
            skipped_count: api.skipped_count,
            error_count: api.error_count,
            test_suites: api.test_suites.into_iter().map(TestSuite::from).collect(),
        }
    }
}

impl From<ApiTestSuite> for TestSuite {
    fn from(api: ApiTestSuite) -> Self {
        Self {
            name: api.name,
            total_time: api.total_time,
            total_count: api.total_count,
            success_count: api.success_count,
            failed_count: api.failed_count,
            skipped_count: api.skipped_count,
            error_count: api.error_count,
            test_cases: api.test_cases.into_iter().map(TestCase::from).collect(),
        }
    }
}

impl From<ApiTestCase> for TestCase {
    fn from(api: ApiTestCase) -> Self {
        Self {
            name: api.name,
            classname: api.classname,
            status: api.status.unwrap_or_default(),
            execution_time: api.execution_time.unwrap_or(0.0),
        }
    }
}

/// Renders variables as `key:value` pairs joined by `,`.
pub(super) fn concatenate_variables(variables: &[ApiVariable]) -> String {
    variables
        .iter()
        .map(|v| format!("{}:{}", v.key, v.value))
        .collect::<Vec<_>>()
        .join(",")
}
