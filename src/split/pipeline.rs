//! Batch pipeline: config generation and splitting a whole input tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use thiserror::Error;

use super::context::SplitContext;
use super::discovery::{discover_images, relative_key, relative_path, DiscoveryError};
use super::parallel::{ParallelSplit, StopHandle};
use super::progress::{NullProgress, ProgressEvent, ProgressReporter, SplitTally};
use super::result::{FileResult, SplitResult};
use crate::config::{
    config_read_path, config_write_path, load_config, save_config, ConfigError, SpriteConfig,
    SpriteEntry,
};
use crate::detect::{detect_file, detect_image, DetectionMethod};
use crate::output::{sprite_output_dir, write_sprites};
use crate::slice::{slice, SliceError};

/// Errors that abort a whole run (per-file errors never do).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SplitError {
    /// Source discovery failed
    #[error("{0}")]
    Discovery(#[from] DiscoveryError),
    /// Config could not be written
    #[error("{0}")]
    Config(#[from] ConfigError),
    /// Directory creation or metadata lookup failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Worker pool could not be started
    #[error("cannot start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Split a single file.
///
/// The config entry for `key` overrides detection when present. Counts of
/// 0 or 1 are reported as skipped without touching the output tree. The
/// source is decoded once for both detection and slicing.
pub fn split_file(
    source: &Path,
    key: &str,
    output_dir: &Path,
    config: &SpriteConfig,
    method: DetectionMethod,
) -> FileResult {
    let start = Instant::now();

    let configured = config.get(key).map(|entry| entry.count());
    if let Some(count) = configured.filter(|&count| count <= 1) {
        return FileResult::skipped(key.to_string(), count, start.elapsed());
    }

    let image = match image::open(source) {
        Ok(image) => image,
        Err(e) => {
            if configured.is_none() {
                // Detection would fall back to 8, which cannot be cut either
                log::warn!("Auto-detect failed for {}: {}", key, e);
            }
            let error = SliceError::Decode { path: source.display().to_string(), source: e };
            return FileResult::failed(key.to_string(), error.to_string(), start.elapsed());
        }
    };

    let count = match configured {
        Some(count) => count,
        None => detect_image(source, &image, method).count(),
    };
    if count <= 1 {
        return FileResult::skipped(key.to_string(), count, start.elapsed());
    }

    let sprites = match slice(&image, count) {
        Ok(sprites) => sprites,
        Err(e) => return FileResult::failed(key.to_string(), e.to_string(), start.elapsed()),
    };

    let dir = sprite_output_dir(output_dir, Path::new(key));
    match write_sprites(&sprites, &dir) {
        Ok(outputs) => FileResult::split(key.to_string(), outputs, start.elapsed()),
        Err(e) => FileResult::failed(
            key.to_string(),
            format!("cannot write sprites to '{}': {}", dir.display(), e),
            start.elapsed(),
        ),
    }
}

/// Detect every image below `input_dir` and write the result as a config.
///
/// `config_path` is resolved with [`config_write_path`]. Returns the
/// generated config.
pub fn generate_config(
    input_dir: &Path,
    config_path: &Path,
    method: DetectionMethod,
    pool: &ParallelSplit,
    reporter: &dyn ProgressReporter,
) -> Result<SpriteConfig, SplitError> {
    if !input_dir.is_dir() {
        return Err(SplitError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input directory '{}' not found", input_dir.display()),
        )));
    }

    let files = discover_images(input_dir)?;
    reporter.report(ProgressEvent::Notice {
        message: format!("Analyzing {} files...", files.len()),
    });

    let detections = pool.run(&files, |_, path| {
        let size = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        (detect_file(path, method), size)
    })?;

    let total = files.len();
    let mut config = SpriteConfig::new();
    for (i, (path, detection)) in files.iter().zip(detections).enumerate() {
        let Some((detection, size)) = detection else {
            continue;
        };
        let key = relative_key(input_dir, path)?;
        reporter.report(ProgressEvent::FileDetected {
            index: i + 1,
            total,
            file: key.clone(),
            count: detection.count(),
            fallback: detection.is_fallback(),
        });
        config.insert(key, SpriteEntry::detected(detection.count(), size));
    }

    let path = config_write_path(input_dir, config_path);
    save_config(&config, &path)?;
    reporter.report(ProgressEvent::Notice {
        message: format!("Config saved to '{}'", path.display()),
    });

    Ok(config)
}

/// A batch split over every image below the input directory.
///
/// # Example
///
/// ```ignore
/// use smartsprite::split::{SplitContext, SplitRun};
///
/// let context = SplitContext::new("input", "output").with_jobs(4);
/// let result = SplitRun::new(context).run()?;
/// println!("{} sprites written", result.total_sprites());
/// ```
pub struct SplitRun {
    context: SplitContext,
    reporter: Box<dyn ProgressReporter>,
    stop: StopHandle,
    fresh_config: bool,
}

impl SplitRun {
    /// Create a run that reports nothing.
    pub fn new(context: SplitContext) -> Self {
        Self {
            context,
            reporter: Box::new(NullProgress::new()),
            stop: StopHandle::new(),
            fresh_config: false,
        }
    }

    /// Set the progress reporter.
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Share a stop handle with the caller.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Detect every file again and overwrite the config instead of loading it.
    pub fn with_fresh_config(mut self) -> Self {
        self.fresh_config = true;
        self
    }

    /// Get the context.
    pub fn context(&self) -> &SplitContext {
        &self.context
    }

    /// Get the stop handle.
    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    fn pool(&self) -> ParallelSplit {
        ParallelSplit::new().with_jobs(self.context.jobs()).with_stop_handle(self.stop.clone())
    }

    fn notice(&self, message: String) {
        self.reporter.report(ProgressEvent::Notice { message });
    }

    fn generate(&self) -> Result<SpriteConfig, SplitError> {
        let ctx = &self.context;
        generate_config(
            ctx.input_dir(),
            ctx.config_path(),
            ctx.method(),
            &self.pool(),
            self.reporter.as_ref(),
        )
    }

    /// Load the sprite config, generating one when it is missing or empty.
    ///
    /// An unreadable or invalid config is reported and ignored: every file is
    /// auto-detected and the file on disk is left alone.
    pub fn load_or_generate_config(&self) -> Result<SpriteConfig, SplitError> {
        let ctx = &self.context;
        let path = config_read_path(ctx.input_dir(), ctx.config_path());

        match load_config(&path) {
            Ok(config) if !config.is_empty() => {
                self.notice(format!(
                    "Loaded config '{}' ({} entries)",
                    path.display(),
                    config.len()
                ));
                Ok(config)
            }
            Ok(_) | Err(ConfigError::NotFound(_)) => {
                self.notice(format!(
                    "No usable config at '{}', generating one...",
                    path.display()
                ));
                self.generate()
            }
            Err(e) => {
                log::warn!("ignoring config '{}': {}", path.display(), e);
                self.reporter.report(ProgressEvent::Warning {
                    file: Some(path.display().to_string()),
                    message: format!("{}; auto-detecting every file", e),
                });
                Ok(SpriteConfig::new())
            }
        }
    }

    /// Run the split.
    pub fn run(&self) -> Result<SplitResult, SplitError> {
        let start = Instant::now();
        let ctx = &self.context;

        if !ctx.input_dir().exists() {
            fs::create_dir_all(ctx.input_dir())?;
            self.notice(format!(
                "Input folder '{}' not found, created it. Add images and run again.",
                ctx.input_dir().display()
            ));
            return Ok(SplitResult::new().with_duration(start.elapsed()));
        }

        fs::create_dir_all(ctx.output_dir())?;
        let config =
            if self.fresh_config { self.generate()? } else { self.load_or_generate_config()? };

        let files = discover_images(ctx.input_dir())?;
        if files.is_empty() {
            self.notice(format!("No image files in '{}'", ctx.input_dir().display()));
            return Ok(SplitResult::new().with_duration(start.elapsed()));
        }

        let result = self.split_files(&files, &config)?;
        Ok(result.with_duration(start.elapsed()))
    }

    /// Split `files` (all below the input directory) with `config` overrides.
    pub fn split_files(
        &self,
        files: &[PathBuf],
        config: &SpriteConfig,
    ) -> Result<SplitResult, SplitError> {
        let ctx = &self.context;
        let pool = self.pool();
        let tally = SplitTally::new(files.len());
        let reporter = self.reporter.as_ref();

        reporter.report(ProgressEvent::RunStarted { total_files: files.len(), workers: pool.jobs() });

        let results = pool.run(files, |_, path| {
            let result = match relative_path(ctx.input_dir(), path) {
                Ok(rel) => {
                    if ctx.is_verbose() {
                        log::info!("splitting {}", rel.display());
                    }
                    let key = rel.to_string_lossy();
                    split_file(path, &key, ctx.output_dir(), config, ctx.method())
                }
                Err(e) => FileResult::failed(
                    path.display().to_string(),
                    e.to_string(),
                    Duration::ZERO,
                ),
            };

            let index = tally.record(&result.status);
            reporter.report(ProgressEvent::FileCompleted {
                index,
                total: tally.total(),
                file: result.key.clone(),
                status: result.status.clone(),
                duration_ms: result.duration.as_millis() as u64,
            });
            if let Some(checkpoint) = tally.checkpoint(index) {
                reporter.report(checkpoint);
            }
            result
        })?;

        if self.stop.is_stopped() {
            self.notice(format!("Stopped after {} of {} files", tally.completed(), files.len()));
        }
        reporter.report(tally.completed_event());

        let mut split = SplitResult::new();
        for result in results.into_iter().flatten() {
            split.add_result(result);
        }
        Ok(split)
    }
}
