//! Sprite slicing - cuts a horizontal sprite strip into equal-width crops

use std::ops::Range;
use std::path::Path;

use image::{DynamicImage, GenericImageView};
use thiserror::Error;

/// Error when slicing an image into sprites.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SliceError {
    /// Source could not be opened or decoded
    #[error("cannot decode '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// Source has no pixels to cut
    #[error("cannot slice an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Column ranges for cutting `width` pixels into `count` sprites.
///
/// Every range but the last is `width / count` wide; the last one ends at
/// `width` and absorbs the remainder. A `count` of 0 or 1 yields no ranges.
/// Counts above `width` are clamped to `width`.
///
/// # Examples
///
/// ```
/// use smartsprite::slice::column_ranges;
///
/// assert_eq!(column_ranges(10, 3), vec![0..3, 3..6, 6..10]);
/// assert!(column_ranges(10, 1).is_empty());
/// ```
pub fn column_ranges(width: u32, count: u32) -> Vec<Range<u32>> {
    if count <= 1 || width == 0 {
        return Vec::new();
    }

    let count = count.min(width);
    let sprite_width = width / count;

    (0..count)
        .map(|i| {
            let left = i * sprite_width;
            let right = if i == count - 1 { width } else { left + sprite_width };
            left..right
        })
        .collect()
}

/// Cut `image` into `count` sprites, left to right.
///
/// Returns an empty vector when `count <= 1`; a single-sprite image is not
/// worth splitting.
pub fn slice(image: &DynamicImage, count: u32) -> Result<Vec<DynamicImage>, SliceError> {
    let (width, height) = image.dimensions();
    if count <= 1 {
        return Ok(Vec::new());
    }
    if width == 0 || height == 0 {
        return Err(SliceError::EmptyImage { width, height });
    }
    if count > width {
        log::warn!(
            "sprite count {} exceeds image width {}; using {} one-pixel sprites",
            count,
            width,
            width
        );
    }

    Ok(column_ranges(width, count)
        .into_iter()
        .map(|cols| image.crop_imm(cols.start, 0, cols.end - cols.start, height))
        .collect())
}

/// Decode `path` and cut it into `count` sprites.
pub fn slice_file(path: &Path, count: u32) -> Result<Vec<DynamicImage>, SliceError> {
    let image = image::open(path).map_err(|source| SliceError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    slice(&image, count)
}
