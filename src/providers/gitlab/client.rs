use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{
    concatenate_variables, ApiPipeline, ApiPipelineInfo, ApiTestReport, ApiVariable,
};
use crate::auth::Token;
use crate::error::{ExporterError, Result};
use crate::schemas::{Pipeline, PipelineSummary, TestReport};

/// Remote calls the reconciliation core relies on.
#[async_trait]
pub trait GitLabApi: Send + Sync {
    /// Lists the most recent pipelines of a ref, newest first, first page only.
    async fn list_project_pipelines(
        &self,
        project: &str,
        ref_name: &str,
        per_page: u32,
    ) -> Result<Vec<PipelineSummary>>;

    async fn get_pipeline(&self, project: &str, pipeline_id: u64) -> Result<Pipeline>;

    /// Pipeline variables as `key:value` pairs joined by `,`.
    async fn get_pipeline_variables(&self, project: &str, pipeline_id: u64) -> Result<String>;

    async fn get_pipeline_test_report(&self, project: &str, pipeline_id: u64)
        -> Result<TestReport>;
}

/// GitLab v4 REST API client.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pipelines-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ExporterError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| ExporterError::Config(format!("Invalid base URL: {e}")))?
            .join("api/v4")
            .map_err(|e| ExporterError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Builds `/projects/:project/<segments>`, with the project path encoded
    /// as a single segment.
    fn project_url(&self, project: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| ExporterError::Config(format!("Invalid API base URL: {}", self.api_url)))?
            .pop_if_empty()
            .push("projects")
            .push(project)
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {url}");

        let response = self.auth_request(self.client.get(url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(ExporterError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GitLabApi for GitLabClient {
    async fn list_project_pipelines(
        &self,
        project: &str,
        ref_name: &str,
        per_page: u32,
    ) -> Result<Vec<PipelineSummary>> {
        let mut url = self.project_url(project, &["pipelines"])?;
        url.query_pairs_mut()
            .append_pair("ref", ref_name)
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", "1");

        let pipelines: Vec<ApiPipelineInfo> = self.get_json(url).await?;
        Ok(pipelines.into_iter().map(PipelineSummary::from).collect())
    }

    async fn get_pipeline(&self, project: &str, pipeline_id: u64) -> Result<Pipeline> {
        let url = self.project_url(project, &["pipelines", pipeline_id.to_string().as_str()])?;
        let pipeline: ApiPipeline = self.get_json(url).await?;
        Ok(pipeline.into())
    }

    async fn get_pipeline_variables(&self, project: &str, pipeline_id: u64) -> Result<String> {
        let url = self.project_url(
            project,
            &["pipelines", pipeline_id.to_string().as_str(), "variables"],
        )?;
        let variables: Vec<ApiVariable> = self.get_json(url).await?;
        Ok(concatenate_variables(&variables))
    }

    async fn get_pipeline_test_report(
        &self,
        project: &str,
        pipeline_id: u64,
    ) -> Result<TestReport> {
        let url = self.project_url(
            project,
            &["pipelines", pipeline_id.to_string().as_str(), "test_report"],
        )?;
        let report: ApiTestReport = self.get_json(url).await?;
        Ok(report.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn project_path_matcher(suffix: &str) -> Matcher {
        Matcher::Regex(format!(r"^/api/v4/projects/group(%2F|/)project/{suffix}$"))
    }

    #[test]
    fn test_project_url_encodes_project_path() {
        let client = GitLabClient::new("https://gitlab.example.com", None).unwrap();
        let url = client.project_url("group/project", &["pipelines", "7"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/projects/group%2Fproject/pipelines/7"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = GitLabClient::new("not a url", None);
        assert!(matches!(result, Err(ExporterError::Config(_))));
    }

    #[tokio::test]
    async fn test_list_project_pipelines() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", project_path_matcher("pipelines"))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ref".into(), "refs/merge-requests/3/head".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("authorization", "Bearer glpat-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
  {"id": 12, "status": "running", "source": "merge_request_event"},
  {"id": 11, "status": "success", "source": "merge_request_event"}
]"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), Some(Token::from("glpat-test"))).unwrap();
        let pipelines = client
            .list_project_pipelines("group/project", "refs/merge-requests/3/head", 2)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(pipelines.len(), 2);
        assert_eq!(pipelines[0].id, 12);
        assert_eq!(pipelines[1].status, "success");
    }

    #[tokio::test]
    async fn test_get_pipeline() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", project_path_matcher("pipelines/42"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"id": 42, "status": "failed", "source": "push", "coverage": "61.20",
"duration": 300, "queued_duration": 1.5, "created_at": "2024-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let pipeline = client.get_pipeline("group/project", 42).await.unwrap();

        assert_eq!(pipeline.id, 42);
        assert_eq!(pipeline.status, "failed");
        assert_eq!(pipeline.coverage, 61.2);
        assert_eq!(pipeline.duration_seconds, 300.0);
    }

    #[tokio::test]
    async fn test_get_pipeline_variables() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", project_path_matcher("pipelines/42/variables"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"key": "FOO", "value": "bar", "variable_type": "env_var"},
{"key": "ENV", "value": "prod", "variable_type": "env_var"}]"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let variables = client
            .get_pipeline_variables("group/project", 42)
            .await
            .unwrap();

        assert_eq!(variables, "FOO:bar,ENV:prod");
    }

    #[tokio::test]
    async fn test_get_pipeline_test_report() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", project_path_matcher("pipelines/42/test_report"))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
  "total_time": 5.5, "total_count": 3, "success_count": 2, "failed_count": 1,
  "skipped_count": 0, "error_count": 0,
  "test_suites": [{
    "name": "rspec", "total_time": 5.5, "total_count": 3, "success_count": 2,
    "failed_count": 1, "skipped_count": 0, "error_count": 0,
    "test_cases": [
      {"status": "success", "name": "adds", "classname": "Calc", "execution_time": 1.0},
      {"status": "failed", "name": "divides", "classname": "Calc", "execution_time": 4.5}
    ]
  }]
}"#,
            )
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let report = client
            .get_pipeline_test_report("group/project", 42)
            .await
            .unwrap();

        assert_eq!(report.total_count, 3);
        assert_eq!(report.test_suites.len(), 1);
        assert_eq!(report.test_suites[0].test_cases[1].status, "failed");
        assert_eq!(report.test_suites[0].test_cases[1].execution_time, 4.5);
    }

    #[tokio::test]
    async fn test_api_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", project_path_matcher("pipelines/1"))
            .with_status(404)
            .with_body(r#"{"message": "404 Not found"}"#)
            .create_async()
            .await;

        let client = GitLabClient::new(&server.url(), None).unwrap();
        let err = client.get_pipeline("group/project", 1).await.unwrap_err();

        match err {
            ExporterError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("404 Not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
