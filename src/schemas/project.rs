use serde::{Deserialize, Serialize};

/// A GitLab project whose refs are tracked, along with its pull settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    /// Full project path (e.g., "group/project")
    pub name: String,

    /// Comma separated project topics, exposed as a label
    #[serde(default)]
    pub topics: String,

    /// Only emit the metric of the current status instead of the full one-hot set
    #[serde(default = "default_true")]
    pub output_sparse_status_metrics: bool,

    #[serde(default)]
    pub pull: ProjectPull,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectPull {
    #[serde(default)]
    pub pipeline: PipelinePull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelinePull {
    /// Number of most recent pipelines listed per ref on every pull
    #[serde(default = "default_per_ref")]
    pub per_ref: u32,

    #[serde(default)]
    pub variables: VariablesPull,

    #[serde(default)]
    pub jobs: JobsPull,

    #[serde(default)]
    pub test_reports: TestReportsPull,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VariablesPull {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobsPull {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestReportsPull {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub test_cases: TestCasesPull,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCasesPull {
    #[serde(default)]
    pub enabled: bool,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            topics: String::new(),
            output_sparse_status_metrics: default_true(),
            pull: ProjectPull::default(),
        }
    }
}

impl Default for PipelinePull {
    fn default() -> Self {
        Self {
            per_ref: default_per_ref(),
            variables: VariablesPull::default(),
            jobs: JobsPull::default(),
            test_reports: TestReportsPull::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_per_ref() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_defaults() {
        let project = Project::new("group/project");
        assert_eq!(project.name, "group/project");
        assert!(project.output_sparse_status_metrics);
        assert_eq!(project.pull.pipeline.per_ref, 1);
        assert!(!project.pull.pipeline.variables.enabled);
        assert!(!project.pull.pipeline.jobs.enabled);
        assert!(!project.pull.pipeline.test_reports.enabled);
        assert!(!project.pull.pipeline.test_reports.test_cases.enabled);
    }

    #[test]
    fn test_project_deserializes_partial_pull_settings() {
        let project: Project = serde_json::from_str(
            r#"{
  "name": "g1/p1",
  "pull": { "pipeline": { "test-reports": { "enabled": true } } }
}"#,
        )
        .unwrap();

        assert!(project.output_sparse_status_metrics);
        assert_eq!(project.pull.pipeline.per_ref, 1);
        assert!(project.pull.pipeline.test_reports.enabled);
        assert!(!project.pull.pipeline.test_reports.test_cases.enabled);
    }
}
