//! Split context containing the options of a batch run.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::detect::DetectionMethod;
use std::path::{Path, PathBuf};

/// Default number of worker threads.
pub const DEFAULT_JOBS: usize = 4;

/// Options for splitting every image below an input directory.
#[derive(Debug, Clone)]
pub struct SplitContext {
    /// Directory scanned for source images
    input_dir: PathBuf,
    /// Root of the sprite output tree
    output_dir: PathBuf,
    /// Sprite config path (relative paths resolve under `input_dir`)
    config_path: PathBuf,
    /// Number of worker threads
    jobs: usize,
    /// Detection method for files without a config entry
    method: DetectionMethod,
    /// Whether to run in verbose mode
    verbose: bool,
}

impl SplitContext {
    /// Create a context with default config path, jobs and method.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            jobs: DEFAULT_JOBS,
            method: DetectionMethod::default(),
            verbose: false,
        }
    }

    /// Get the input directory.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Get the output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Get the config path as given.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get the number of worker threads.
    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Get the detection method.
    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set the config path.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Set the number of worker threads (at least 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set the detection method.
    pub fn with_method(mut self, method: DetectionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
