use log::{debug, error, warn};
use tokio_util::sync::CancellationToken;

use super::emit::{
    emit_status_metric, store_get_metric, store_set_metric, PIPELINE_STATUSES, TERMINAL_STATUSES,
};
use super::{cancellable, Controller};
use crate::error::Result;
use crate::schemas::{Metric, MetricKind, Pipeline, PipelineSummary, Ref};

impl Controller {
    /// Reconciles the most recent pipelines of a ref into metrics.
    ///
    /// The ref is refreshed from the store first, since the caller's copy may
    /// lag behind other pulls of the same ref. Pipelines are processed oldest
    /// first and a failing pipeline does not stop the rest of the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the store refresh or the pipeline listing fails.
    pub async fn pull_ref_metrics(&self, cancel: &CancellationToken, ref_: Ref) -> Result<()> {
        let mut ref_ = ref_;
        if let Some(stored) = cancellable(cancel, self.store.get_ref(&ref_.key())).await? {
            ref_ = stored;
        }

        let ref_name = ref_.pipelines_ref_name();
        let mut pipelines = cancellable(
            cancel,
            self.gitlab.list_project_pipelines(
                &ref_.project.name,
                &ref_name,
                ref_.project.pull.pipeline.per_ref,
            ),
        )
        .await
        .inspect_err(|err| {
            error!(
                "Fetching pipelines failed (project={}, ref={}, ref-kind={}): {err}",
                ref_.project.name, ref_.name, ref_.kind
            );
        })?;

        if pipelines.is_empty() {
            debug!(
                "No pipeline found (project={}, ref={}, ref-kind={})",
                ref_.project.name, ref_.name, ref_.kind
            );
            return Ok(());
        }

        // GitLab lists newest first
        pipelines.reverse();

        for summary in &pipelines {
            // Each pipeline starts from the refreshed ref, not from the
            // previous iteration's updates.
            if let Err(err) = self
                .process_pipelines_metrics(cancel, ref_.clone(), summary)
                .await
            {
                error!(
                    "Processing pipeline metrics failed (project={}, ref={}, ref-kind={}, pipeline={}): {err}",
                    ref_.project.name, ref_.name, ref_.kind, summary.id
                );
            }
        }

        Ok(())
    }

    /// Reconciles a single pipeline of a ref.
    ///
    /// A pipeline counts as new when the ref was never reconciled or when its
    /// ID differs from the stored ID metric. Only new pipelines re-emit the
    /// pipeline metrics and bump the run count; status changes on a known
    /// pipeline ID only trigger the most recent jobs pull.
    ///
    /// # Errors
    ///
    /// Returns an error if a remote call, the ref write, a job pull or the
    /// variables fetch fails. A failed variables fetch still stores and
    /// attaches the (empty) variables before returning.
    pub async fn process_pipelines_metrics(
        &self,
        cancel: &CancellationToken,
        mut ref_: Ref,
        summary: &PipelineSummary,
    ) -> Result<()> {
        let mut pipeline = cancellable(
            cancel,
            self.gitlab.get_pipeline(&ref_.project.name, summary.id),
        )
        .await?;

        if ref_.project.pull.pipeline.variables.enabled {
            self.attach_pipeline_variables(cancel, &ref_, &mut pipeline)
                .await?;
        }

        #[allow(clippy::cast_precision_loss)]
        let pipeline_id_value = pipeline.id as f64;

        let id_metric = Metric::new(
            MetricKind::Id,
            ref_.pipeline_labels_values(&pipeline),
            pipeline_id_value,
        );
        let recorded_id = store_get_metric(cancel, self.store.as_ref(), &id_metric.key())
            .await
            .map_or(id_metric.value, |m| m.value);

        // Only the ID is compared, a status change on a known pipeline is not
        // a new observation.
        if ref_.latest_pipeline.id == 0 || recorded_id != pipeline_id_value {
            let former = std::mem::replace(&mut ref_.latest_pipeline, pipeline);
            cancellable(cancel, self.store.set_ref(ref_.clone())).await?;

            self.emit_pipeline_metrics(cancel, &ref_, &former).await;

            if ref_.project.pull.pipeline.jobs.enabled {
                cancellable(cancel, self.jobs.pull_full_job_metrics(&ref_)).await?;
            }
        } else {
            cancellable(cancel, self.jobs.pull_most_recent_job_metrics(&ref_)).await?;
        }

        if ref_.project.pull.pipeline.test_reports.enabled
            && TERMINAL_STATUSES.contains(&ref_.latest_pipeline.status.as_str())
        {
            let report = cancellable(
                cancel,
                self.gitlab
                    .get_pipeline_test_report(&ref_.project.name, ref_.latest_pipeline.id),
            )
            .await?;
            ref_.latest_pipeline.test_report = Some(report);

            if let Some(report) = &ref_.latest_pipeline.test_report {
                self.process_test_report_metrics(cancel, &ref_, report).await;

                for suite in &report.test_suites {
                    self.process_test_suite_metrics(cancel, &ref_, suite).await;

                    if ref_.project.pull.pipeline.test_reports.test_cases.enabled {
                        for case in &suite.test_cases {
                            self.process_test_case_metrics(cancel, &ref_, suite, case)
                                .await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Attaches the pipeline's variables, fetching them from GitLab only the
    /// first time the pipeline is seen.
    async fn attach_pipeline_variables(
        &self,
        cancel: &CancellationToken,
        ref_: &Ref,
        pipeline: &mut Pipeline,
    ) -> Result<()> {
        let project = ref_.project.name.as_str();

        let exists = cancellable(
            cancel,
            self.store.pipeline_variables_exist(project, pipeline.id),
        )
        .await
        .unwrap_or_else(|err| {
            warn!(
                "Checking stored variables failed (project={project}, pipeline={}): {err}",
                pipeline.id
            );
            false
        });

        if exists {
            pipeline.variables = cancellable(
                cancel,
                self.store.get_pipeline_variables(project, pipeline.id),
            )
            .await
            .unwrap_or_else(|err| {
                warn!(
                    "Reading stored variables failed (project={project}, pipeline={}): {err}",
                    pipeline.id
                );
                String::new()
            });
            return Ok(());
        }

        let (variables, fetched) = match cancellable(
            cancel,
            self.gitlab.get_pipeline_variables(project, pipeline.id),
        )
        .await
        {
            Ok(variables) => (variables, Ok(())),
            Err(err) => (String::new(), Err(err)),
        };

        if let Err(err) = cancellable(
            cancel,
            self.store
                .set_pipeline_variables(project, pipeline.id, variables.clone()),
        )
        .await
        {
            warn!(
                "Storing variables failed (project={project}, pipeline={}): {err}",
                pipeline.id
            );
        }
        pipeline.variables = variables;

        fetched
    }

    /// Emits the pipeline level metrics of the ref's latest pipeline.
    async fn emit_pipeline_metrics(&self, cancel: &CancellationToken, ref_: &Ref, former: &Pipeline) {
        let store = self.store.as_ref();
        let pipeline = &ref_.latest_pipeline;
        let labels = ref_.default_labels_values();

        // Start from 0 rather than 1 when the metric is unknown, so a restart
        // does not look like a new run.
        let mut run_count = Metric::new(MetricKind::RunCount, labels.clone(), 0.0);
        if let Some(stored) = store_get_metric(cancel, store, &run_count.key()).await {
            run_count.value = stored.value;
        }
        if former.id != 0 && former.id != pipeline.id {
            run_count.value += 1.0;
        }
        store_set_metric(cancel, store, run_count).await;

        #[allow(clippy::cast_precision_loss)]
        let id_value = pipeline.id as f64;

        store_set_metric(
            cancel,
            store,
            Metric::new(MetricKind::Coverage, labels.clone(), pipeline.coverage),
        )
        .await;
        store_set_metric(
            cancel,
            store,
            Metric::new(MetricKind::Id, labels.clone(), id_value),
        )
        .await;

        emit_status_metric(
            cancel,
            store,
            MetricKind::Status,
            &labels,
            &PIPELINE_STATUSES,
            &pipeline.status,
            ref_.project.output_sparse_status_metrics,
        )
        .await;

        store_set_metric(
            cancel,
            store,
            Metric::new(
                MetricKind::DurationSeconds,
                labels.clone(),
                pipeline.duration_seconds,
            ),
        )
        .await;
        store_set_metric(
            cancel,
            store,
            Metric::new(
                MetricKind::QueuedDurationSeconds,
                labels.clone(),
                pipeline.queued_duration_seconds,
            ),
        )
        .await;
        store_set_metric(
            cancel,
            store,
            Metric::new(MetricKind::Timestamp, labels, pipeline.timestamp),
        )
        .await;
    }
}
