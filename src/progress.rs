use indicatif::{ProgressBar, ProgressStyle};

/// Percentage bar used for downloads and encodes.
pub fn percent_bar(label: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    let style = ProgressStyle::with_template(
        "{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb.set_prefix(label.to_string());
    pb
}

/// Clamp a fractional percentage into the bar's 0..=100 range.
pub fn to_position(percent: f64) -> u64 {
    if percent.is_nan() {
        return 0;
    }
    percent.clamp(0.0, 100.0) as u64
}
