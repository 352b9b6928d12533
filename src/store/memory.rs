use std::collections::HashMap;

use async_trait::async_trait;
use indexmap::IndexMap;
use log::trace;
use tokio::sync::RwLock;

use super::Store;
use crate::error::{ExporterError, Result};
use crate::schemas::{Metric, MetricKey, Ref, RefKey};

/// In-process store.
///
/// Metrics keep their first insertion order so dumps stay stable across
/// overwrites.
#[derive(Default)]
pub struct MemoryStore {
    refs: RwLock<HashMap<RefKey, Ref>>,
    metrics: RwLock<IndexMap<MetricKey, Metric>>,
    variables: RwLock<HashMap<(String, u64), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_ref(&self, key: &RefKey) -> Result<Option<Ref>> {
        Ok(self.refs.read().await.get(key).cloned())
    }

    async fn set_ref(&self, ref_: Ref) -> Result<()> {
        trace!(
            "Storing ref {}/{} ({}) with latest pipeline {}",
            ref_.project.name,
            ref_.name,
            ref_.kind,
            ref_.latest_pipeline.id
        );
        self.refs.write().await.insert(ref_.key(), ref_);
        Ok(())
    }

    async fn get_metric(&self, key: &MetricKey) -> Result<Option<Metric>> {
        Ok(self.metrics.read().await.get(key).cloned())
    }

    async fn set_metric(&self, metric: Metric) -> Result<()> {
        if !metric.value.is_finite() {
            return Err(ExporterError::Store(format!(
                "refusing to store non-finite value for {}",
                metric.kind
            )));
        }
        self.metrics.write().await.insert(metric.key(), metric);
        Ok(())
    }

    async fn del_metric(&self, key: &MetricKey) -> Result<()> {
        self.metrics.write().await.shift_remove(key);
        Ok(())
    }

    async fn metrics(&self) -> Result<Vec<Metric>> {
        Ok(self.metrics.read().await.values().cloned().collect())
    }

    async fn pipeline_variables_exist(&self, project: &str, pipeline_id: u64) -> Result<bool> {
        Ok(self
            .variables
            .read()
            .await
            .contains_key(&(project.to_string(), pipeline_id)))
    }

    async fn get_pipeline_variables(&self, project: &str, pipeline_id: u64) -> Result<String> {
        self.variables
            .read()
            .await
            .get(&(project.to_string(), pipeline_id))
            .cloned()
            .ok_or_else(|| {
                ExporterError::Store(format!(
                    "no variables stored for pipeline {pipeline_id} of {project}"
                ))
            })
    }

    async fn set_pipeline_variables(
        &self,
        project: &str,
        pipeline_id: u64,
        variables: String,
    ) -> Result<()> {
        self.variables
            .write()
            .await
            .insert((project.to_string(), pipeline_id), variables);
        Ok(())
    }
}
