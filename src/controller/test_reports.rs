use log::{error, trace};
use tokio_util::sync::CancellationToken;

use super::emit::{emit_status_metric, store_set_metric, TEST_CASE_STATUSES};
use super::{cancellable, Controller};
use crate::schemas::{Metric, MetricKind, Ref, TestCase, TestReport, TestSuite};

impl Controller {
    /// Re-reads the ref before emitting; a failed read skips the emission.
    async fn refresh_ref(&self, cancel: &CancellationToken, ref_: &Ref, context: &str) -> Option<Ref> {
        match cancellable(cancel, self.store.get_ref(&ref_.key())).await {
            Ok(stored) => Some(stored.unwrap_or_else(|| ref_.clone())),
            Err(err) => {
                error!(
                    "Getting ref from the store failed (project={}, ref={}{context}): {err}",
                    ref_.project.name, ref_.name
                );
                None
            }
        }
    }

    pub async fn process_test_report_metrics(
        &self,
        cancel: &CancellationToken,
        ref_: &Ref,
        report: &TestReport,
    ) {
        let labels = ref_.default_labels_values();

        if self.refresh_ref(cancel, ref_, "").await.is_none() {
            return;
        }

        trace!(
            "Processing test report metrics (project={}, ref={})",
            ref_.project.name,
            ref_.name
        );

        #[allow(clippy::cast_precision_loss)]
        let values = [
            (MetricKind::TestReportErrorCount, report.error_count as f64),
            (MetricKind::TestReportFailedCount, report.failed_count as f64),
            (MetricKind::TestReportSkippedCount, report.skipped_count as f64),
            (MetricKind::TestReportSuccessCount, report.success_count as f64),
            (MetricKind::TestReportTotalCount, report.total_count as f64),
            (MetricKind::TestReportTotalTime, report.total_time),
        ];

        for (kind, value) in values {
            store_set_metric(
                cancel,
                self.store.as_ref(),
                Metric::new(kind, labels.clone(), value),
            )
            .await;
        }
    }

    pub async fn process_test_suite_metrics(
        &self,
        cancel: &CancellationToken,
        ref_: &Ref,
        suite: &TestSuite,
    ) {
        let mut labels = ref_.default_labels_values();
        labels.insert("test_suite_name".to_string(), suite.name.clone());

        let context = format!(", test-suite-name={}", suite.name);
        if self.refresh_ref(cancel, ref_, &context).await.is_none() {
            return;
        }

        trace!(
            "Processing test suite metrics (project={}, ref={}{context})",
            ref_.project.name,
            ref_.name
        );

        #[allow(clippy::cast_precision_loss)]
        let values = [
            (MetricKind::TestSuiteErrorCount, suite.error_count as f64),
            (MetricKind::TestSuiteFailedCount, suite.failed_count as f64),
            (MetricKind::TestSuiteSkippedCount, suite.skipped_count as f64),
            (MetricKind::TestSuiteSuccessCount, suite.success_count as f64),
            (MetricKind::TestSuiteTotalCount, suite.total_count as f64),
            (MetricKind::TestSuiteTotalTime, suite.total_time),
        ];

        for (kind, value) in values {
            store_set_metric(
                cancel,
                self.store.as_ref(),
                Metric::new(kind, labels.clone(), value),
            )
            .await;
        }
    }

    pub async fn process_test_case_metrics(
        &self,
        cancel: &CancellationToken,
        ref_: &Ref,
        suite: &TestSuite,
        case: &TestCase,
    ) {
        let mut labels = ref_.default_labels_values();
        labels.insert("test_suite_name".to_string(), suite.name.clone());
        labels.insert("test_case_name".to_string(), case.name.clone());
        labels.insert("test_case_classname".to_string(), case.classname.clone());

        let context = format!(
            ", test-suite-name={}, test-case-name={}, test-case-status={}",
            suite.name, case.name, case.status
        );
        let Some(current) = self.refresh_ref(cancel, ref_, &context).await else {
            return;
        };

        trace!(
            "Processing test case metrics (project={}, ref={}{context})",
            ref_.project.name,
            ref_.name
        );

        store_set_metric(
            cancel,
            self.store.as_ref(),
            Metric::new(
                MetricKind::TestCaseExecutionTime,
                labels.clone(),
                case.execution_time,
            ),
        )
        .await;

        emit_status_metric(
            cancel,
            self.store.as_ref(),
            MetricKind::TestCaseStatus,
            &labels,
            &TEST_CASE_STATUSES,
            &case.status,
            current.project.output_sparse_status_metrics,
        )
        .await;
    }
}
