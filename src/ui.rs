// UI module for consistent terminal output with spinners and progress lines

#![allow(clippy::print_stdout, clippy::print_stderr)]

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Spinner style similar to uv/pnpm
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Check if stderr is a TTY (for spinners)
fn is_tty() -> bool {
    Term::stderr().is_term()
}

/// Whether a user is watching stdout; downloaders stay quiet otherwise
pub fn is_interactive() -> bool {
    Term::stdout().is_term()
}

/// Create a styled spinner for network checks
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if !is_tty() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars(SPINNER_CHARS)
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());

    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }

    pb
}

/// Clear a progress bar without leaving a message
pub fn clear_bar(pb: &ProgressBar) {
    pb.finish_and_clear();
}

/// Render the in-place object-storage progress line
pub fn download_progress(transferred: u64, total: u64) {
    let line = if total == 0 {
        format!("\rDownloaded {} bytes", transferred)
    } else {
        let percentage = transferred as f64 / total as f64 * 100.0;
        format!(
            "\rDownloaded {} bytes of {}. {}% completed",
            transferred, total, percentage as u64
        )
    };
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(line.as_bytes());
    let _ = stdout.flush();
}

/// Terminate the progress line
pub fn finish_progress() {
    println!();
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print an info/action message with arrow
pub fn action(message: &str) {
    println!("{} {}", style("→").cyan(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Print a header/section message
pub fn header(message: &str) {
    println!("{}", style(message).bold());
}

/// Print a dimmed/secondary message
pub fn dim(message: &str) {
    println!("{}", style(message).dim());
}

/// Print a labelled value
pub fn status(prefix: &str, message: &str) {
    println!("{} {}", style(prefix).cyan().bold(), message);
}

/// Print a bare line, e.g. a path meant for scripts
pub fn plain(message: &str) {
    println!("{}", message);
}
