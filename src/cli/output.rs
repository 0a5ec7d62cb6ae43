use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Print a success message.
pub fn success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print a warning message.
pub fn warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}

/// Print a header line.
pub fn header(msg: &str) {
    println!("\n{}", msg.bold());
}

/// Start a spinner for a network operation.
pub fn spinner(msg: &str) -> ProgressBar {
    let sp = ProgressBar::new_spinner();
    sp.set_style(
        ProgressStyle::with_template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    sp.set_message(msg.to_string());
    sp.enable_steady_tick(Duration::from_millis(80));
    sp
}

/// Stop a spinner and print a success line in its place.
pub fn finish_spinner(sp: ProgressBar, msg: &str) {
    sp.finish_and_clear();
    success(msg);
}

/// Stop a spinner without printing anything.
pub fn abandon_spinner(sp: ProgressBar) {
    sp.finish_and_clear();
}
