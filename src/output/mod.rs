mod progress;
mod styling;
mod summary;
mod tables;

pub use progress::PullProgress;
pub use summary::print_summary;

use styling::{dim, magenta_bold};

/// Prints the exporter banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("pipelines-exporter"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("GitLab CI pipeline metrics")
    );
}
