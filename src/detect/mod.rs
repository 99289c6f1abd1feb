//! Sprite-boundary detection.
//!
//! Estimates how many equal-width sprites are packed side by side in an
//! image. Three heuristics are available and are chained so that a method
//! without a usable signal hands over to the aspect-ratio guess:
//!
//! | Method         | Chain                              |
//! |----------------|------------------------------------|
//! | `transparency` | transparency -> aspect ratio       |
//! | `color_change` | color change -> aspect ratio       |
//! | anything else  | aspect ratio                       |
//!
//! Detection never fails toward the caller. Decode errors and degenerate
//! images produce [`Detection::Fallback`] carrying [`FALLBACK_SPRITE_COUNT`].
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use smartsprite::detect::{detect, DetectionMethod};
//!
//! // 100x50 opaque sheet: no transparency, so the aspect ratio decides.
//! let sheet = RgbaImage::from_pixel(100, 50, Rgba([200, 40, 40, 255]));
//! assert_eq!(detect(&sheet, DetectionMethod::Transparency).count(), 2);
//! ```

mod columns;
mod strategy;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use columns::{column_means, modal_gap, transparent_columns};
pub use strategy::{
    strategy_chain, AspectRatioStrategy, ColorChangeStrategy, Strategy, StrategyKind,
    TransparencyStrategy,
};

/// Sprite count returned when detection cannot run at all.
pub const FALLBACK_SPRITE_COUNT: u32 = 8;

/// Transparent-column gaps at or below this width are treated as seams.
pub const MIN_SPRITE_GAP: u32 = 10;

/// Euclidean distance between neighbouring column means that marks a change.
pub const COLOR_CHANGE_THRESHOLD: f64 = 30.0;

/// Internal reasons for falling back to [`FALLBACK_SPRITE_COUNT`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DetectError {
    /// The file could not be opened or decoded
    #[error("cannot decode image: {0}")]
    Decode(#[from] image::ImageError),
    /// The image has no pixels along one axis
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Caller-selected detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Gaps between fully transparent columns
    #[default]
    Transparency,
    /// Jumps in the mean color of neighbouring columns
    ColorChange,
    /// Assume square sprites as tall as the image
    AspectRatio,
}

impl DetectionMethod {
    /// Method name as written in config files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Transparency => "transparency",
            DetectionMethod::ColorChange => "color_change",
            DetectionMethod::AspectRatio => "aspect_ratio",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectionMethod {
    type Err = std::convert::Infallible;

    /// Unrecognized names (including the reserved `edge_detect`) select the
    /// aspect-ratio guess.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "transparency" => DetectionMethod::Transparency,
            "color_change" => DetectionMethod::ColorChange,
            _ => DetectionMethod::AspectRatio,
        })
    }
}

/// Outcome of a detection run.
#[derive(Debug)]
pub enum Detection {
    /// A strategy in the chain produced a count
    Detected { count: u32, strategy: StrategyKind },
    /// Detection could not run; `count` is always [`FALLBACK_SPRITE_COUNT`]
    Fallback { count: u32, cause: DetectError },
}

impl Detection {
    fn fallback(cause: DetectError) -> Self {
        Detection::Fallback { count: FALLBACK_SPRITE_COUNT, cause }
    }

    /// The sprite count, always at least 1.
    pub fn count(&self) -> u32 {
        match self {
            Detection::Detected { count, .. } | Detection::Fallback { count, .. } => *count,
        }
    }

    /// Whether this is the fixed fallback rather than a real estimate.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Detection::Fallback { .. })
    }

    /// The strategy that produced the count, if any.
    pub fn strategy(&self) -> Option<StrategyKind> {
        match self {
            Detection::Detected { strategy, .. } => Some(*strategy),
            Detection::Fallback { .. } => None,
        }
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Detection::Detected { count, strategy } => write!(f, "{} ({})", count, strategy),
            Detection::Fallback { count, cause } => write!(f, "{} (fallback: {})", count, cause),
        }
    }
}

/// Estimate the sprite count of an RGBA image.
pub fn detect(image: &RgbaImage, method: DetectionMethod) -> Detection {
    let (width, height) = image.dimensions();
    // No pixels means no signal for any strategy, aspect ratio included.
    if width == 0 || height == 0 {
        return Detection::fallback(DetectError::EmptyImage { width, height });
    }

    for strategy in strategy_chain(method) {
        if let Some(count) = strategy.estimate(image) {
            let count = count.max(1);
            log::debug!("{} strategy estimated {} sprites", strategy.kind(), count);
            return Detection::Detected { count, strategy: strategy.kind() };
        }
        log::debug!("{} strategy found no signal", strategy.kind());
    }

    // The aspect-ratio strategy closes every chain and always answers.
    Detection::Detected { count: 1, strategy: StrategyKind::AspectRatio }
}

/// Decode a file and estimate its sprite count.
///
/// Decode failures are logged with the file name and turned into the
/// fallback count.
pub fn detect_file(path: &Path, method: DetectionMethod) -> Detection {
    match image::open(path) {
        Ok(img) => detect_image(path, &img, method),
        Err(e) => warn_on_fallback(path, Detection::fallback(DetectError::Decode(e))),
    }
}

/// Estimate the sprite count of `path`, already decoded as `image`.
pub fn detect_image(path: &Path, image: &DynamicImage, method: DetectionMethod) -> Detection {
    warn_on_fallback(path, detect(&image.to_rgba8(), method))
}

fn warn_on_fallback(path: &Path, detection: Detection) -> Detection {
    if let Detection::Fallback { cause, .. } = &detection {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        log::warn!("Auto-detect failed for {}: {}", name, cause);
    }
    detection
}
