use async_trait::async_trait;
use log::debug;

use crate::error::Result;
use crate::schemas::Ref;

/// Job-level metric pulling, triggered by pipeline reconciliation.
#[async_trait]
pub trait JobsPuller: Send + Sync {
    /// Pulls every job of the ref's latest pipeline.
    async fn pull_full_job_metrics(&self, ref_: &Ref) -> Result<()>;

    /// Pulls only the jobs that changed since the previous pull.
    async fn pull_most_recent_job_metrics(&self, ref_: &Ref) -> Result<()>;
}

/// Records job pull requests without contacting GitLab.
#[derive(Debug, Default)]
pub struct LoggingJobsPuller;

#[async_trait]
impl JobsPuller for LoggingJobsPuller {
    async fn pull_full_job_metrics(&self, ref_: &Ref) -> Result<()> {
        debug!(
            "Full job metrics pull requested (project={}, ref={}, pipeline={})",
            ref_.project.name, ref_.name, ref_.latest_pipeline.id
        );
        Ok(())
    }

    async fn pull_most_recent_job_metrics(&self, ref_: &Ref) -> Result<()> {
        debug!(
            "Most recent job metrics pull requested (project={}, ref={}, pipeline={})",
            ref_.project.name, ref_.name, ref_.latest_pipeline.id
        );
        Ok(())
    }
}
