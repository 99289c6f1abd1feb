//! PNG output and sprite path generation

use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Save an image as PNG, whatever the path's extension says.
///
/// Floating-point images have no PNG representation and are stored as
/// 8-bit RGBA.
pub fn save_png(image: &DynamicImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    match image {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            DynamicImage::ImageRgba8(image.to_rgba8()).save_with_format(path, ImageFormat::Png)?
        }
        _ => image.save_with_format(path, ImageFormat::Png)?,
    }
    Ok(())
}

/// File name of the sprite at 0-based `index`: `sprite_01.png`, `sprite_02.png`, ...
pub fn sprite_file_name(index: usize) -> String {
    format!("sprite_{:02}.png", index + 1)
}

/// Directory receiving the sprites of one source image.
///
/// | Source (relative to input) | Output directory          |
/// |----------------------------|---------------------------|
/// | `hero.png`                 | `{out}/hero`              |
/// | `chars/hero.png`           | `{out}/chars/hero`        |
/// | `chars/hero.sheet.bmp`     | `{out}/chars/hero.sheet`  |
pub fn sprite_output_dir(output_root: &Path, relative_source: &Path) -> PathBuf {
    output_root.join(relative_source.with_extension(""))
}

/// Staging directory used while the sprites of `dir` are being written.
fn staging_dir(dir: &Path) -> PathBuf {
    let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    dir.with_file_name(format!(".{}.partial", name))
}

/// Write all sprites of one source into `dir` as `sprite_NN.png`.
///
/// Files are written to a hidden staging directory first and moved into
/// place once every sprite is encoded. If anything fails the staging
/// directory is removed and `dir` is left untouched, so a sprite directory
/// always holds a complete set. An existing `dir` is replaced.
pub fn write_sprites(sprites: &[DynamicImage], dir: &Path) -> Result<Vec<PathBuf>, OutputError> {
    let staging = staging_dir(dir);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    fs::create_dir_all(&staging)?;

    for (i, sprite) in sprites.iter().enumerate() {
        if let Err(e) = save_png(sprite, &staging.join(sprite_file_name(i))) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
    }

    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    if let Err(e) = fs::rename(&staging, dir) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e.into());
    }

    Ok((0..sprites.len()).map(|i| dir.join(sprite_file_name(i))).collect())
}
