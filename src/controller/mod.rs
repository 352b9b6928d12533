//! Reconciles GitLab pipeline history into metrics.
//!
//! A pull for one ref runs sequentially: refresh the ref from the store,
//! list its most recent pipelines, then process them oldest to newest.
//! Concurrency across refs is left to the caller.

mod emit;
mod jobs;
mod pipelines;
mod test_reports;

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{ExporterError, Result};
use crate::providers::GitLabApi;
use crate::store::Store;

pub use jobs::{JobsPuller, LoggingJobsPuller};

pub struct Controller {
    pub store: Arc<dyn Store>,
    pub gitlab: Arc<dyn GitLabApi>,
    pub jobs: Arc<dyn JobsPuller>,
}

impl Controller {
    pub fn new(store: Arc<dyn Store>, gitlab: Arc<dyn GitLabApi>, jobs: Arc<dyn JobsPuller>) -> Self {
        Self {
            store,
            gitlab,
            jobs,
        }
    }
}

/// Races a remote or store call against the cancellation token.
async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExporterError::Cancelled),
        result = fut => result,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory GitLab and job pullers that count their calls.

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{Controller, JobsPuller};
    use crate::error::{ExporterError, Result};
    use crate::providers::GitLabApi;
    use crate::schemas::{
        Metric, MetricKey, Pipeline, PipelineSummary, Project, Ref, RefKey, RefKind, TestReport,
    };
    use crate::store::{MemoryStore, Store};

    #[derive(Default)]
    pub struct FakeGitLab {
        /// Listing result, newest first
        pub listed: Mutex<Vec<PipelineSummary>>,
        pub pipelines: Mutex<HashMap<u64, Pipeline>>,
        pub failing_pipelines: Mutex<Vec<u64>>,
        pub variables: Mutex<HashMap<u64, String>>,
        pub test_report: Mutex<TestReport>,
        pub listed_ref_names: Mutex<Vec<String>>,
        pub processed: Mutex<Vec<u64>>,
        pub variables_calls: AtomicUsize,
        pub test_report_calls: AtomicUsize,
    }

    impl FakeGitLab {
        pub fn add_pipeline(&self, id: u64, status: &str) {
            let pipeline = Pipeline {
                id,
                status: status.to_string(),
                source: "push".to_string(),
                coverage: 87.5,
                duration_seconds: 120.0,
                queued_duration_seconds: 4.0,
                timestamp: 1_704_067_200.0,
                ..Default::default()
            };
            self.pipelines.lock().unwrap().insert(id, pipeline);
            self.listed.lock().unwrap().insert(
                0,
                PipelineSummary {
                    id,
                    status: status.to_string(),
                    source: "push".to_string(),
                },
            );
        }

        pub fn set_status(&self, id: u64, status: &str) {
            if let Some(pipeline) = self.pipelines.lock().unwrap().get_mut(&id) {
                pipeline.status = status.to_string();
            }
        }

        pub fn variables_calls(&self) -> usize {
            self.variables_calls.load(Ordering::SeqCst)
        }

        pub fn test_report_calls(&self) -> usize {
            self.test_report_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GitLabApi for FakeGitLab {
        async fn list_project_pipelines(
            &self,
            _project: &str,
            ref_name: &str,
            per_page: u32,
        ) -> Result<Vec<PipelineSummary>> {
            self.listed_ref_names
                .lock()
                .unwrap()
                .push(ref_name.to_string());
            let listed = self.listed.lock().unwrap();
            Ok(listed.iter().take(per_page as usize).cloned().collect())
        }

        async fn get_pipeline(&self, _project: &str, pipeline_id: u64) -> Result<Pipeline> {
            self.processed.lock().unwrap().push(pipeline_id);
            if self.failing_pipelines.lock().unwrap().contains(&pipeline_id) {
                return Err(ExporterError::Api {
                    status: 500,
                    message: "internal error".to_string(),
                });
            }
            self.pipelines
                .lock()
                .unwrap()
                .get(&pipeline_id)
                .cloned()
                .ok_or_else(|| ExporterError::Api {
                    status: 404,
                    message: format!("pipeline {pipeline_id} not found"),
                })
        }

        async fn get_pipeline_variables(&self, _project: &str, pipeline_id: u64) -> Result<String> {
            self.variables_calls.fetch_add(1, Ordering::SeqCst);
            self.variables
                .lock()
                .unwrap()
                .get(&pipeline_id)
                .cloned()
                .ok_or_else(|| ExporterError::Api {
                    status: 403,
                    message: "forbidden".to_string(),
                })
        }

        async fn get_pipeline_test_report(
            &self,
            _project: &str,
            _pipeline_id: u64,
        ) -> Result<TestReport> {
            self.test_report_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.test_report.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    pub struct CountingJobsPuller {
        pub full: AtomicUsize,
        pub most_recent: AtomicUsize,
    }

    impl CountingJobsPuller {
        pub fn full(&self) -> usize {
            self.full.load(Ordering::SeqCst)
        }

        pub fn most_recent(&self) -> usize {
            self.most_recent.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobsPuller for CountingJobsPuller {
        async fn pull_full_job_metrics(&self, _ref_: &Ref) -> Result<()> {
            self.full.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn pull_most_recent_job_metrics(&self, _ref_: &Ref) -> Result<()> {
            self.most_recent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Store whose ref reads always fail.
    #[derive(Default)]
    pub struct BrokenRefStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl Store for BrokenRefStore {
        async fn get_ref(&self, _key: &RefKey) -> Result<Option<Ref>> {
            Err(ExporterError::Store("connection reset".to_string()))
        }
        async fn set_ref(&self, ref_: Ref) -> Result<()> {
            self.inner.set_ref(ref_).await
        }
        async fn get_metric(&self, key: &MetricKey) -> Result<Option<Metric>> {
            self.inner.get_metric(key).await
        }
        async fn set_metric(&self, metric: Metric) -> Result<()> {
            self.inner.set_metric(metric).await
        }
        async fn del_metric(&self, key: &MetricKey) -> Result<()> {
            self.inner.del_metric(key).await
        }
        async fn metrics(&self) -> Result<Vec<Metric>> {
            self.inner.metrics().await
        }
        async fn pipeline_variables_exist(&self, project: &str, pipeline_id: u64) -> Result<bool> {
            self.inner.pipeline_variables_exist(project, pipeline_id).await
        }
        async fn get_pipeline_variables(&self, project: &str, pipeline_id: u64) -> Result<String> {
            self.inner.get_pipeline_variables(project, pipeline_id).await
        }
        async fn set_pipeline_variables(
            &self,
            project: &str,
            pipeline_id: u64,
            variables: String,
        ) -> Result<()> {
            self.inner
                .set_pipeline_variables(project, pipeline_id, variables)
                .await
        }
    }

    pub struct Harness {
        pub controller: Controller,
        pub store: Arc<MemoryStore>,
        pub gitlab: Arc<FakeGitLab>,
        pub jobs: Arc<CountingJobsPuller>,
    }

    pub fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let gitlab = Arc::new(FakeGitLab::default());
        let jobs = Arc::new(CountingJobsPuller::default());
        let controller = Controller::new(store.clone(), gitlab.clone(), jobs.clone());

        Harness {
            controller,
            store,
            gitlab,
            jobs,
        }
    }

    pub fn create_test_ref() -> Ref {
        let mut project = Project::new("g1/p1");
        project.output_sparse_status_metrics = false;
        Ref::new(project, RefKind::Branch, "main")
    }
}
