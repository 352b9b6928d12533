use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::styling::{bright_green, bright_yellow};

/// Spinner shown on stderr while refs are being pulled.
pub struct PullProgress {
    pb: ProgressBar,
}

impl PullProgress {
    pub fn start(refs: usize) -> Self {
        let pb = ProgressBar::new(refs as u64);
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {msg} {spinner} {pos}/{len}")
        {
            pb.set_style(style);
        }
        pb.set_message(bright_yellow("Pulling ref metrics").to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn ref_done(&self) {
        self.pb.inc(1);
    }

    pub fn finish(self) {
        self.pb
            .finish_with_message(bright_green("Pulled ref metrics ✓").to_string());
    }
}
