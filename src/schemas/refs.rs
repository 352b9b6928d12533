use std::fmt;

use serde::{Deserialize, Serialize};

use super::metric::Labels;
use super::pipeline::Pipeline;
use super::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefKind {
    Branch,
    Tag,
    MergeRequest,
}

impl RefKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Tag => "tag",
            Self::MergeRequest => "merge-request",
        }
    }
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store identity of a ref: project path, kind and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefKey {
    pub project: String,
    pub kind: RefKind,
    pub name: String,
}

/// A branch, tag or merge request head tracked within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    pub project: Project,
    pub kind: RefKind,
    /// Branch or tag name, or the merge request IID
    pub name: String,
    /// Last reconciled pipeline, `id == 0` when never reconciled
    #[serde(default)]
    pub latest_pipeline: Pipeline,
}

impl Ref {
    pub fn new(project: Project, kind: RefKind, name: impl Into<String>) -> Self {
        Self {
            project,
            kind,
            name: name.into(),
            latest_pipeline: Pipeline::default(),
        }
    }

    pub fn key(&self) -> RefKey {
        RefKey {
            project: self.project.name.clone(),
            kind: self.kind,
            name: self.name.clone(),
        }
    }

    /// Ref name in the form the pipelines API filters on.
    ///
    /// Merge requests are addressed through their head ref.
    pub fn pipelines_ref_name(&self) -> String {
        match self.kind {
            RefKind::MergeRequest => format!("refs/merge-requests/{}/head", self.name),
            RefKind::Branch | RefKind::Tag => self.name.clone(),
        }
    }

    /// Labels identifying this ref, scoped to its latest pipeline.
    pub fn default_labels_values(&self) -> Labels {
        self.pipeline_labels_values(&self.latest_pipeline)
    }

    /// Labels identifying this ref, scoped to the given pipeline's source and variables.
    pub fn pipeline_labels_values(&self, pipeline: &Pipeline) -> Labels {
        Labels::from([
            ("project".to_string(), self.project.name.clone()),
            ("topics".to_string(), self.project.topics.clone()),
            ("kind".to_string(), self.kind.to_string()),
            ("ref".to_string(), self.name.clone()),
            ("source".to_string(), pipeline.source.clone()),
            ("variables".to_string(), pipeline.variables.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_ref(kind: RefKind, name: &str) -> Ref {
        Ref::new(Project::new("group/project"), kind, name)
    }

    #[test]
    fn test_pipelines_ref_name_branch_and_tag() {
        assert_eq!(
            create_test_ref(RefKind::Branch, "main").pipelines_ref_name(),
            "main"
        );
        assert_eq!(
            create_test_ref(RefKind::Tag, "v1.2.0").pipelines_ref_name(),
            "v1.2.0"
        );
    }

    #[test]
    fn test_pipelines_ref_name_merge_request() {
        assert_eq!(
            create_test_ref(RefKind::MergeRequest, "17").pipelines_ref_name(),
            "refs/merge-requests/17/head"
        );
    }

    #[test]
    fn test_default_labels_values() {
        let mut ref_ = create_test_ref(RefKind::Branch, "main");
        ref_.project.topics = "infra,rust".to_string();
        ref_.latest_pipeline.source = "push".to_string();
        ref_.latest_pipeline.variables = "FOO:bar".to_string();

        let labels = ref_.default_labels_values();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels["project"], "group/project");
        assert_eq!(labels["topics"], "infra,rust");
        assert_eq!(labels["kind"], "branch");
        assert_eq!(labels["ref"], "main");
        assert_eq!(labels["source"], "push");
        assert_eq!(labels["variables"], "FOO:bar");
    }

    #[test]
    fn test_pipeline_labels_values_use_given_pipeline() {
        let ref_ = create_test_ref(RefKind::Tag, "v1");
        let pipeline = Pipeline {
            id: 7,
            source: "schedule".to_string(),
            ..Default::default()
        };

        let labels = ref_.pipeline_labels_values(&pipeline);
        assert_eq!(labels["source"], "schedule");
        assert_eq!(labels["kind"], "tag");
        assert_eq!(ref_.default_labels_values()["source"], "");
    }

    #[test]
    fn test_labels_are_deterministic() {
        let ref_ = create_test_ref(RefKind::Branch, "main");
        assert_eq!(ref_.default_labels_values(), ref_.default_labels_values());
    }
}
