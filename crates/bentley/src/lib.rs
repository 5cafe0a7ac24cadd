//! ## Features
//!
//! - Prefixed console levels (info, warn, error, verbose, success) on stderr
//! - Multi-line message support with consistent formatting
//! - Banner displays for messages that must not be missed
//! - `tracing` subscriber setup shared by every curio binary
//!
//! ## Usage
//!
//! Console functions: `info()`, `warn()`, `error()`, `verbose()`, `success()`
//!
//! Banners: `spotlight()`, `showstopper()`
//!
//! The macros accept `format!` arguments: `bentley::warn!("{} unavailable", corpus)`.

use colored::*;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_directives` when it is set. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_tracing(default_directives: &str) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

  let _ = tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(filter)
    .try_init();
}

/// Core output function, one stderr line per message line
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a colored prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  let pad = 7usize.saturating_sub(prefix.len() + 2);
  format!("[{}]{:<pad$}", prefix.color(color).bold(), "")
}

fn log_with_prefix(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

/// Create a banner line of the specified length and character
pub fn banner_line(length: usize, char: char) -> String {
  char.to_string().repeat(length)
}

/// Display a message with a banner around it
pub fn as_banner<F>(log_fn: F, message: &str, width: Option<usize>, border_char: Option<char>)
where
  F: Fn(&str),
{
  let longest = message.lines().map(|line| line.chars().count()).max().unwrap_or(0);
  let width = width.unwrap_or(50).max(longest);
  let banner = banner_line(width, border_char.unwrap_or('='));

  log_fn(&banner);
  log_fn(message);
  log_fn(&banner);
}

pub fn verbose(message: &str) {
  log_with_prefix(Color::Cyan, "verb", message);
}

/// Info level - general progress
pub fn info(message: &str) {
  log_with_prefix(Color::Blue, "info", message);
}

/// Warning level - degraded but still working
pub fn warn(message: &str) {
  log_with_prefix(Color::Yellow, "warn", message);
}

/// Error level - an operation failed
pub fn error(message: &str) {
  log_with_prefix(Color::Red, "error", message);
}

/// Success level - an operation completed
pub fn success(message: &str) {
  log_with_prefix(Color::Green, "sccs", message);
}

/// Highlight information the user should notice
pub fn spotlight(message: &str) {
  as_banner(|msg| log(&msg.yellow().bold().to_string()), message, Some(40), Some('*'));
}

/// Critical announcement
pub fn showstopper(message: &str) {
  as_banner(|msg| log(&msg.bright_red().bold().to_string()), message, Some(60), Some('*'));
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => {
    $crate::info(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($($arg:tt)*) => {
    $crate::warn(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => {
    $crate::error(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($($arg:tt)*) => {
    $crate::verbose(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => {
    $crate::success(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! spotlight {
  ($($arg:tt)*) => {
    $crate::spotlight(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! showstopper {
  ($($arg:tt)*) => {
    $crate::showstopper(&format!($($arg)*)); // LCOV_EXCL_LINE
  };
}
