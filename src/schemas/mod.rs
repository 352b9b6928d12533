mod metric;
mod pipeline;
mod project;
mod refs;

pub use metric::{Labels, Metric, MetricKey, MetricKind};
pub use pipeline::{Pipeline, PipelineSummary, TestCase, TestReport, TestSuite};
pub use project::{Project, ProjectPull};
pub use refs::{Ref, RefKey, RefKind};
