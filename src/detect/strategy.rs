//! Detection strategies and the chains built from them.

use std::fmt;

use image::RgbaImage;
use serde::Serialize;

use super::columns::{column_means, modal_gap, transparent_columns};
use super::{DetectionMethod, COLOR_CHANGE_THRESHOLD, MIN_SPRITE_GAP};

/// Identifies which strategy produced a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Transparency,
    ColorChange,
    AspectRatio,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Transparency => write!(f, "transparency"),
            StrategyKind::ColorChange => write!(f, "color_change"),
            StrategyKind::AspectRatio => write!(f, "aspect_ratio"),
        }
    }
}

/// A single sprite-count heuristic.
///
/// Implementations return `None` when the image carries no usable signal,
/// letting the next strategy in the chain try. Callers guarantee the image
/// is at least 1x1.
pub trait Strategy: Send + Sync {
    /// Which heuristic this is.
    fn kind(&self) -> StrategyKind;

    /// Estimate the sprite count, or `None` to defer.
    fn estimate(&self, image: &RgbaImage) -> Option<u32>;
}

/// Sprite width = modal distance between fully transparent columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparencyStrategy;

impl Strategy for TransparencyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Transparency
    }

    fn estimate(&self, image: &RgbaImage) -> Option<u32> {
        let columns = transparent_columns(image);
        let gaps: Vec<u32> = columns
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|&gap| gap > MIN_SPRITE_GAP)
            .collect();

        let sprite_width = modal_gap(&gaps)?;
        Some((image.width() / sprite_width).max(1))
    }
}

/// Counts sharp changes between neighbouring column mean colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorChangeStrategy;

impl Strategy for ColorChangeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ColorChange
    }

    fn estimate(&self, image: &RgbaImage) -> Option<u32> {
        let means = column_means(image);
        let changes = means
            .windows(2)
            .filter(|pair| color_distance(&pair[0], &pair[1]) > COLOR_CHANGE_THRESHOLD)
            .count() as u32;

        if changes <= 1 {
            return None;
        }

        let width = image.width();
        let average_width = width / (changes + 1);
        width.checked_div(average_width).map(|count| count.max(1))
    }
}

/// Last resort: sprites are assumed square and as tall as the image.
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectRatioStrategy;

impl Strategy for AspectRatioStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AspectRatio
    }

    fn estimate(&self, image: &RgbaImage) -> Option<u32> {
        let (width, height) = image.dimensions();
        if width > height {
            Some(width.checked_div(height).unwrap_or(1).max(1))
        } else {
            Some(1)
        }
    }
}

static TRANSPARENCY_CHAIN: [&dyn Strategy; 2] = [&TransparencyStrategy, &AspectRatioStrategy];
static COLOR_CHANGE_CHAIN: [&dyn Strategy; 2] = [&ColorChangeStrategy, &AspectRatioStrategy];
static ASPECT_RATIO_CHAIN: [&dyn Strategy; 1] = [&AspectRatioStrategy];

/// Ordered strategies tried for a method. The first `Some` wins.
pub fn strategy_chain(method: DetectionMethod) -> &'static [&'static dyn Strategy] {
    match method {
        DetectionMethod::Transparency => &TRANSPARENCY_CHAIN,
        DetectionMethod::ColorChange => &COLOR_CHANGE_CHAIN,
        DetectionMethod::AspectRatio => &ASPECT_RATIO_CHAIN,
    }
}

fn color_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f64>().sqrt()
}
