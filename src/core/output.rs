//! Colored console output for fetch runs
//!
//! Uses owo-colors for terminal colors. Status lines go to stdout,
//! warnings and errors to stderr.

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Fetching https://example.com/foo.tar.gz"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a mirror attempt with its position in the candidate list
/// Example: "(2/3) https://mirror.example.com/foo.tar.gz"
pub fn attempt(current: usize, total: usize, location: &str) {
    println!("  {} {}", format!("({}/{})", current, total).cyan(), location);
}

/// Print a detail line (dimmed prefix)
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a skip message (dimmed)
/// Example: "==> foo.tar.gz is up to date, skipping"
pub fn skip(message: &str) {
    println!("{} {}", "==>".dimmed(), message.dimmed());
}
