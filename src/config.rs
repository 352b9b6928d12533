use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::schemas::{Project, ProjectPull, Ref, RefKind};

/// Configuration file structure for the exporter.
///
/// Lists the GitLab instance to talk to and the projects and refs whose
/// pipelines are reconciled into metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// Tracked projects
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitLabConfig {
    /// GitLab instance base URL
    #[serde(default = "default_gitlab_url")]
    pub url: String,

    /// GitLab personal access token
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// GitLab project path (e.g., 'group/project')
    pub name: String,

    #[serde(default)]
    pub topics: String,

    #[serde(default = "default_true")]
    pub output_sparse_status_metrics: bool,

    #[serde(default)]
    pub pull: ProjectPull,

    /// Refs to reconcile
    #[serde(default)]
    pub refs: Vec<RefConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RefConfig {
    pub name: String,

    #[serde(default = "default_ref_kind")]
    pub kind: RefKind,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: default_gitlab_url(),
            token: None,
        }
    }
}

fn default_gitlab_url() -> String {
    "https://gitlab.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_ref_kind() -> RefKind {
    RefKind::Branch
}

impl ProjectConfig {
    pub fn project(&self) -> Project {
        let mut project = Project::new(self.name.clone());
        project.topics.clone_from(&self.topics);
        project.output_sparse_status_metrics = self.output_sparse_status_metrics;
        project.pull = self.pull.clone();
        project
    }
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipelines-exporter.toml
    /// 3. ./pipelines-exporter.json
    /// 4. ./pipelines-exporter.yaml
    /// 5. ./pipelines-exporter.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "pipelines-exporter.toml",
            "pipelines-exporter.json",
            "pipelines-exporter.yaml",
            "pipelines-exporter.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Every configured ref, bound to its project settings.
    pub fn refs(&self) -> Vec<Ref> {
        self.projects
            .iter()
            .flat_map(|project_config| {
                let project = project_config.project();
                project_config
                    .refs
                    .iter()
                    .map(move |r| Ref::new(project.clone(), r.kind, r.name.clone()))
            })
            .collect()
    }
}
