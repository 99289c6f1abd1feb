//! Split progress reporting.
//!
//! Provides a flexible progress reporting system for split runs.
//! Supports multiple output formats including console (with colors) and JSON.
//!
//! # Example
//!
//! ```
//! use smartsprite::split::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//! use smartsprite::split::FileStatus;
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::RunStarted { total_files: 1, workers: 4 });
//! reporter.report(ProgressEvent::FileCompleted {
//!     index: 1,
//!     total: 1,
//!     file: "hero.png".to_string(),
//!     status: FileStatus::Split { sprites: 6 },
//!     duration_ms: 12,
//! });
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::json;

use super::result::FileStatus;

/// Completed files between two throughput checkpoints.
pub const CHECKPOINT_INTERVAL: usize = 50;

/// Events that can be reported during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Splitting started
    RunStarted {
        /// Number of files to process
        total_files: usize,
        /// Number of worker threads
        workers: usize,
    },
    /// A file was split, skipped or failed
    FileCompleted {
        /// 1-based completion index
        index: usize,
        /// Number of files in the run
        total: usize,
        /// Config key of the file
        file: String,
        /// Outcome
        status: FileStatus,
        /// Duration in milliseconds
        duration_ms: u64,
    },
    /// A file was analysed while generating a config
    FileDetected {
        /// 1-based position in discovery order
        index: usize,
        /// Number of files being analysed
        total: usize,
        /// Config key of the file
        file: String,
        /// Detected sprite count
        count: u32,
        /// Whether the count is the fixed fallback
        fallback: bool,
    },
    /// Periodic throughput report
    Checkpoint {
        /// Files completed so far
        completed: usize,
        /// Number of files in the run
        total: usize,
        /// Files per second
        rate: f64,
        /// Estimated seconds remaining
        eta_secs: u64,
    },
    /// Splitting finished
    RunCompleted {
        /// Files split into sprites
        succeeded: usize,
        /// Files with a count of 0 or 1
        skipped: usize,
        /// Files that failed
        failed: usize,
        /// Sprites written
        sprites: u64,
        /// Total duration in milliseconds
        duration_ms: u64,
    },
    /// Informational message
    Notice {
        /// Message text
        message: String,
    },
    /// A warning was generated
    Warning {
        /// File that generated the warning (if applicable)
        file: Option<String>,
        /// Warning message
        message: String,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
    /// Output writer (for testing)
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a new console progress reporter writing to stdout.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
            output: Mutex::new(Box::new(std::io::stdout())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false, // Disable colors for custom output
            verbose: false,
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Set whether to use colors.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn bold(&self, text: &str) -> String {
        self.color(text, "\x1b[1m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total_files, workers } => {
                self.writeln(&format!(
                    "{} Processing {} file{} with {} worker{}",
                    self.cyan("[split]"),
                    total_files,
                    if total_files == 1 { "" } else { "s" },
                    workers,
                    if workers == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::FileCompleted { index, total, file, status, duration_ms } => {
                let status_str = match &status {
                    FileStatus::Split { sprites } => self.green(&format!("ok {} sprites", sprites)),
                    FileStatus::Skipped { count } => {
                        self.yellow(&format!("skip (only {} sprite)", count))
                    }
                    FileStatus::Failed(_) => self.red("FAILED"),
                };

                let mut line =
                    format!("[{:>3}/{}] {} {}", index, total, file, status_str);
                if self.verbose {
                    line.push_str(&format!(" ({})", format_duration(duration_ms)));
                }
                self.writeln(&line);

                if let FileStatus::Failed(err) = status {
                    self.writeln(&format!("        {}", self.red(&err)));
                }
            }
            ProgressEvent::FileDetected { index, total, file, count, fallback } => {
                let note = if fallback { self.yellow(" (fallback)") } else { String::new() };
                self.writeln(&format!(
                    "[{:>3}/{}] {} -> {} sprites{}",
                    index, total, file, count, note
                ));
            }
            ProgressEvent::Checkpoint { completed, total, rate, eta_secs } => {
                self.writeln(&format!(
                    "   {} {}/{} | {:.1} files/sec | ETA {}s",
                    self.cyan("[progress]"),
                    completed,
                    total,
                    rate,
                    eta_secs
                ));
            }
            ProgressEvent::RunCompleted { succeeded, skipped, failed, sprites, duration_ms } => {
                let rule = "=".repeat(50);
                self.writeln(&format!("\n{}", rule));
                self.writeln(&self.bold("SUMMARY"));
                self.writeln(&format!("{} Split:   {} files", self.green("[ok]"), succeeded));
                self.writeln(&format!("{} Skipped: {} files", self.yellow("[--]"), skipped));
                let failed_tag = if failed > 0 { self.red("[!!]") } else { "[!!]".to_string() };
                self.writeln(&format!("{} Failed:  {} files", failed_tag, failed));
                self.writeln(&format!("Total sprites: {}", sprites));
                self.writeln(&format!("Time: {}", format_duration(duration_ms)));
                self.writeln(&rule);
            }
            ProgressEvent::Notice { message } => {
                self.writeln(&message);
            }
            ProgressEvent::Warning { file, message } => {
                let prefix = match file {
                    Some(f) => format!("{}: ", f),
                    None => String::new(),
                };
                self.writeln(&format!("{} {}{}", self.yellow("[warn]"), prefix, message));
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// JSON progress reporter for machine-readable output (one object per line).
pub struct JsonProgress {
    /// Output writer
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for JsonProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProgress").finish()
    }
}

impl JsonProgress {
    /// Create a new JSON progress reporter writing to stdout.
    pub fn new() -> Self {
        Self { output: Mutex::new(Box::new(std::io::stdout())) }
    }

    /// Create a JSON progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self { output: Mutex::new(Box::new(output)) }
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", value);
        }
    }
}

impl Default for JsonProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let value = match event {
            ProgressEvent::RunStarted { total_files, workers } => {
                json!({ "event": "run_started", "total_files": total_files, "workers": workers })
            }
            ProgressEvent::FileCompleted { index, total, file, status, duration_ms } => {
                let mut value = json!({
                    "event": "file_completed",
                    "index": index,
                    "total": total,
                    "file": file,
                    "duration_ms": duration_ms,
                });
                match status {
                    FileStatus::Split { sprites } => {
                        value["status"] = json!("split");
                        value["sprites"] = json!(sprites);
                    }
                    FileStatus::Skipped { count } => {
                        value["status"] = json!("skipped");
                        value["sprite_count"] = json!(count);
                    }
                    FileStatus::Failed(error) => {
                        value["status"] = json!("failed");
                        value["error"] = json!(error);
                    }
                }
                value
            }
            ProgressEvent::FileDetected { index, total, file, count, fallback } => json!({
                "event": "file_detected",
                "index": index,
                "total": total,
                "file": file,
                "sprite_count": count,
                "fallback": fallback,
            }),
            ProgressEvent::Checkpoint { completed, total, rate, eta_secs } => json!({
                "event": "checkpoint",
                "completed": completed,
                "total": total,
                "rate": rate,
                "eta_secs": eta_secs,
            }),
            ProgressEvent::RunCompleted { succeeded, skipped, failed, sprites, duration_ms } => {
                json!({
                    "event": "run_completed",
                    "succeeded": succeeded,
                    "skipped": skipped,
                    "failed": failed,
                    "sprites": sprites,
                    "duration_ms": duration_ms,
                })
            }
            ProgressEvent::Notice { message } => json!({ "event": "notice", "message": message }),
            ProgressEvent::Warning { file, message } => {
                let mut value = json!({ "event": "warning", "message": message });
                if let Some(file) = file {
                    value["file"] = json!(file);
                }
                value
            }
        };
        self.write_json(value);
    }
}

/// Thread-safe counters shared by the workers of one run.
#[derive(Debug)]
pub struct SplitTally {
    start: Instant,
    total: usize,
    completed: AtomicUsize,
    succeeded: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    sprites: AtomicU64,
}

impl SplitTally {
    /// Start tallying a run of `total` files.
    pub fn new(total: usize) -> Self {
        Self {
            start: Instant::now(),
            total,
            completed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            sprites: AtomicU64::new(0),
        }
    }

    /// Record a finished file and return its 1-based completion index.
    pub fn record(&self, status: &FileStatus) -> usize {
        match status {
            FileStatus::Split { sprites } => {
                self.succeeded.fetch_add(1, Ordering::SeqCst);
                self.sprites.fetch_add(u64::from(*sprites), Ordering::SeqCst);
            }
            FileStatus::Skipped { .. } => {
                self.skipped.fetch_add(1, Ordering::SeqCst);
            }
            FileStatus::Failed(_) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.completed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of files in the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Files completed so far.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Files split so far.
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Files skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Files failed so far.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Sprites written so far.
    pub fn sprites(&self) -> u64 {
        self.sprites.load(Ordering::SeqCst)
    }

    /// Time since the tally was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Throughput checkpoint for `completed` files, if one is due.
    pub fn checkpoint(&self, completed: usize) -> Option<ProgressEvent> {
        if completed == 0 || completed % CHECKPOINT_INTERVAL != 0 {
            return None;
        }
        let elapsed = self.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { completed as f64 / elapsed } else { 0.0 };
        let remaining = self.total.saturating_sub(completed) as f64;
        let eta_secs = if rate > 0.0 { (remaining / rate).round() as u64 } else { 0 };
        Some(ProgressEvent::Checkpoint { completed, total: self.total, rate, eta_secs })
    }

    /// Final summary event.
    pub fn completed_event(&self) -> ProgressEvent {
        ProgressEvent::RunCompleted {
            succeeded: self.succeeded(),
            skipped: self.skipped(),
            failed: self.failed(),
            sprites: self.sprites(),
            duration_ms: self.elapsed().as_millis() as u64,
        }
    }
}

/// Format a duration in milliseconds to a human-readable string.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
