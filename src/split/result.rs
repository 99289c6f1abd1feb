//! Split result types.
//!
//! Contains types for representing the outcome of splitting files.

use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The file was cut into this many sprites
    Split { sprites: u32 },
    /// The count was 0 or 1, nothing written
    Skipped { count: u32 },
    /// The file failed with an error
    Failed(String),
}

impl FileStatus {
    /// Check if the status indicates success (split or skipped).
    pub fn is_success(&self) -> bool {
        !self.is_failure()
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, FileStatus::Failed(_))
    }

    /// Sprites written for this file.
    pub fn sprites(&self) -> u32 {
        match self {
            FileStatus::Split { sprites } => *sprites,
            _ => 0,
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Split { sprites } => write!(f, "{} sprites", sprites),
            FileStatus::Skipped { count } => write!(f, "skipped (only {} sprite)", count),
            FileStatus::Failed(err) => write!(f, "error: {}", err),
        }
    }
}

/// Result of splitting a single file.
#[derive(Debug, Clone)]
pub struct FileResult {
    /// Config key (path relative to the input directory)
    pub key: String,
    /// Outcome
    pub status: FileStatus,
    /// Sprite files written
    pub outputs: Vec<PathBuf>,
    /// Time spent on the file
    pub duration: Duration,
}

impl FileResult {
    /// Create a successful result.
    pub fn split(key: String, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        let sprites = outputs.len() as u32;
        Self { key, status: FileStatus::Split { sprites }, outputs, duration }
    }

    /// Create a skipped result.
    pub fn skipped(key: String, count: u32, duration: Duration) -> Self {
        Self { key, status: FileStatus::Skipped { count }, outputs: vec![], duration }
    }

    /// Create a failed result.
    pub fn failed(key: String, error: String, duration: Duration) -> Self {
        Self { key, status: FileStatus::Failed(error), outputs: vec![], duration }
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a complete split run.
#[derive(Debug, Default)]
pub struct SplitResult {
    /// Results for each file, in discovery order
    pub files: Vec<FileResult>,
    /// Total run duration
    pub total_duration: Duration,
}

impl SplitResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file result.
    pub fn add_result(&mut self, result: FileResult) {
        self.files.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Number of files that were split.
    pub fn split_count(&self) -> usize {
        self.files.iter().filter(|r| matches!(r.status, FileStatus::Split { .. })).count()
    }

    /// Number of skipped files.
    pub fn skipped_count(&self) -> usize {
        self.files.iter().filter(|r| matches!(r.status, FileStatus::Skipped { .. })).count()
    }

    /// Number of failed files.
    pub fn failed_count(&self) -> usize {
        self.files.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Total sprites written.
    pub fn total_sprites(&self) -> u64 {
        self.files.iter().map(|r| u64::from(r.status.sprites())).sum()
    }

    /// Check if the run had no failures.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all sprite files written.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.files.iter().flat_map(|r| r.outputs.iter()).collect()
    }

    /// Get failed file results.
    pub fn failures(&self) -> Vec<&FileResult> {
        self.files.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Look up the result for a config key.
    pub fn get(&self, key: &str) -> Option<&FileResult> {
        self.files.iter().find(|r| r.key == key)
    }
}
