use log::error;
use tokio_util::sync::CancellationToken;

use super::cancellable;
use crate::schemas::{Labels, Metric, MetricKey, MetricKind};
use crate::store::Store;

/// Pipeline statuses as reported by the GitLab API.
pub const PIPELINE_STATUSES: [&str; 11] = [
    "created",
    "waiting_for_resource",
    "preparing",
    "pending",
    "running",
    "success",
    "failed",
    "canceled",
    "skipped",
    "manual",
    "scheduled",
];

/// Statuses a test case can end in.
pub const TEST_CASE_STATUSES: [&str; 4] = ["success", "failed", "skipped", "error"];

/// Statuses after which a pipeline's test report is final.
pub const TERMINAL_STATUSES: [&str; 4] = ["success", "failed", "skipped", "cancelled"];

/// Reads a metric, logging and swallowing store failures.
pub(super) async fn store_get_metric(
    cancel: &CancellationToken,
    store: &dyn Store,
    key: &MetricKey,
) -> Option<Metric> {
    match cancellable(cancel, store.get_metric(key)).await {
        Ok(metric) => metric,
        Err(err) => {
            error!("Reading metric {} from the store failed: {err}", key.kind);
            None
        }
    }
}

/// Writes a metric, logging and swallowing store failures.
pub(super) async fn store_set_metric(cancel: &CancellationToken, store: &dyn Store, metric: Metric) {
    let kind = metric.kind;
    if let Err(err) = cancellable(cancel, store.set_metric(metric)).await {
        error!("Writing metric {kind} in the store failed: {err}");
    }
}

async fn store_del_metric(cancel: &CancellationToken, store: &dyn Store, key: &MetricKey) {
    if let Err(err) = cancellable(cancel, store.del_metric(key)).await {
        error!("Deleting metric {} from the store failed: {err}", key.kind);
    }
}

/// Expands `status` into one boolean metric per entry of `statuses`, each
/// labelled with `status=<entry>`.
///
/// The matching entry is set to 1. The others are set to 0, or removed from
/// the store when `sparse` is enabled. A status outside `statuses` yields
/// no 1-valued metric.
pub(super) async fn emit_status_metric(
    cancel: &CancellationToken,
    store: &dyn Store,
    kind: MetricKind,
    labels: &Labels,
    statuses: &[&str],
    status: &str,
    sparse: bool,
) {
    for &candidate in statuses {
        let mut status_labels = labels.clone();
        status_labels.insert("status".to_string(), candidate.to_string());

        if candidate == status {
            store_set_metric(cancel, store, Metric::new(kind, status_labels, 1.0)).await;
        } else if sparse {
            let key = MetricKey {
                kind,
                labels: status_labels,
            };
            store_del_metric(cancel, store, &key).await;
        } else {
            store_set_metric(cancel, store, Metric::new(kind, status_labels, 0.0)).await;
        }
    }
}
