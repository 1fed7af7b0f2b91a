//! Spinners and progress bars using indicatif

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for a step of unknown length
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.cyan} {msg}")
            .expect("spinner template is valid")
            .tick_chars(TICK_CHARS),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run `step` behind a spinner.
///
/// On success the spinner is finished with `done(&value)`; on error it is
/// cleared so the error message is printed on a clean line.
pub fn with_spinner<T, E>(
    message: &str,
    step: impl FnOnce() -> Result<T, E>,
    done: impl FnOnce(&T) -> String,
) -> Result<T, E> {
    let spinner = create_spinner(message);
    match step() {
        Ok(value) => {
            finish_with_success(&spinner, &done(&value));
            Ok(value)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e)
        }
    }
}

/// Bar over the models of a plan. The message shows the model being fitted.
pub fn create_model_progress(models: usize) -> ProgressBar {
    let pb = ProgressBar::new(models as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("model progress template is valid")
            .tick_chars(TICK_CHARS)
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Finish the model bar, as a warning when any model failed
pub fn finish_model_progress(pb: &ProgressBar, fitted: usize, failed: usize) {
    if failed == 0 {
        finish_with_success(pb, &format!("{} models fitted", fitted));
    } else {
        finish_with_warning(
            pb,
            &format!("{} of {} models failed", failed, fitted + failed),
        );
    }
}

pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("⚠️  {}", message));
}
