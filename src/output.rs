//! Terminal progress rendering helpers.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Percent-based upload bar matching the service's 0-100 progress scale.
pub fn upload_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:40.cyan/blue}] {pos}%")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message("Uploading");
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn finish_success(pb: &ProgressBar, msg: &str) {
    pb.finish_with_message(format!("{} {}", style("✓").green().bold(), msg));
}

pub fn finish_error(pb: &ProgressBar, msg: &str) {
    pb.finish_with_message(format!("{} {}", style("✗").red().bold(), msg));
}
