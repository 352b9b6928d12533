use std::fmt::Write;

use comfy_table::Cell;

use super::styling::{bright, dim};
use super::tables::{coverage_cell, create_table, header_cells, status_cell};
use crate::schemas::{Metric, MetricKey, MetricKind, Ref};

/// Prints a table of the reconciled refs to stderr.
pub fn print_summary(refs: &[Ref], metrics: &[Metric]) -> std::fmt::Result {
    eprintln!("{}", render_summary(refs, metrics)?);
    Ok(())
}

fn find_value(metrics: &[Metric], key: &MetricKey) -> Option<f64> {
    metrics
        .iter()
        .find(|m| m.kind == key.kind && m.labels == key.labels)
        .map(|m| m.value)
}

fn render_summary(refs: &[Ref], metrics: &[Metric]) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    writeln!(output, "{}", bright("Refs").underlined())?;

    let mut table = create_table();
    table.set_header(header_cells(&[
        "Project", "Ref", "Kind", "Pipeline", "Status", "Runs", "Coverage", "Duration",
    ]));

    for ref_ in refs {
        let pipeline = &ref_.latest_pipeline;
        if pipeline.id == 0 {
            table.add_row(vec![
                Cell::new(&ref_.project.name),
                Cell::new(&ref_.name),
                Cell::new(ref_.kind),
                Cell::new("-"),
                status_cell(""),
                Cell::new("-"),
                coverage_cell(None),
                Cell::new("-"),
            ]);
            continue;
        }

        let run_count = find_value(
            metrics,
            &MetricKey {
                kind: MetricKind::RunCount,
                labels: ref_.default_labels_values(),
            },
        )
        .map_or_else(|| "-".to_string(), |v| format!("{v:.0}"));

        table.add_row(vec![
            Cell::new(&ref_.project.name),
            Cell::new(&ref_.name),
            Cell::new(ref_.kind),
            Cell::new(pipeline.id),
            status_cell(&pipeline.status),
            Cell::new(run_count),
            coverage_cell(Some(pipeline.coverage)),
            Cell::new(format!("{:.0}s", pipeline.duration_seconds)),
        ]);
    }

    writeln!(output, "{table}")?;
    writeln!(output, "{}", dim(format!("{} metrics in store", metrics.len())))?;

    Ok(output)
}
