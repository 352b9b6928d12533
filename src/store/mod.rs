mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::schemas::{Metric, MetricKey, Ref, RefKey};

pub use memory::MemoryStore;

/// Durable state shared by every reconciliation: refs, metrics and
/// pipeline variables.
///
/// Reads return `None` for unknown records so callers keep their own
/// working copy. Writes overwrite, last write wins.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_ref(&self, key: &RefKey) -> Result<Option<Ref>>;
    async fn set_ref(&self, ref_: Ref) -> Result<()>;

    async fn get_metric(&self, key: &MetricKey) -> Result<Option<Metric>>;
    async fn set_metric(&self, metric: Metric) -> Result<()>;
    async fn del_metric(&self, key: &MetricKey) -> Result<()>;
    async fn metrics(&self) -> Result<Vec<Metric>>;

    async fn pipeline_variables_exist(&self, project: &str, pipeline_id: u64) -> Result<bool>;
    async fn get_pipeline_variables(&self, project: &str, pipeline_id: u64) -> Result<String>;
    async fn set_pipeline_variables(
        &self,
        project: &str,
        pipeline_id: u64,
        variables: String,
    ) -> Result<()>;
}
