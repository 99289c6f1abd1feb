//! Source image discovery.
//!
//! Finds raster images under the input directory by extension.

use glob::{glob_with, MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

/// Extensions picked up by discovery (matched case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Error during source discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// Invalid glob pattern
    InvalidPattern(String, glob::PatternError),
    /// IO error during file enumeration
    Io(std::io::Error),
    /// A source path that does not live below the input directory
    OutsideRoot { path: PathBuf, root: PathBuf },
}

impl std::fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscoveryError::InvalidPattern(pattern, err) => {
                write!(f, "Invalid glob pattern '{}': {}", pattern, err)
            }
            DiscoveryError::Io(err) => write!(f, "IO error during discovery: {}", err),
            DiscoveryError::OutsideRoot { path, root } => write!(
                f,
                "'{}' is not inside the input directory '{}'",
                path.display(),
                root.display()
            ),
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::Io(err)
    }
}

/// Check if a path has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// `dir` without `.` components, so `./in`, `in/.` and `in` name the same root.
///
/// The current directory itself normalizes to an empty path.
pub fn normalize_root(dir: &Path) -> PathBuf {
    dir.components().filter(|c| !matches!(c, Component::CurDir)).collect()
}

/// Find all images below `dir` (recursively), sorted and deduplicated.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let root = normalize_root(dir);
    let root = if root.as_os_str().is_empty() { PathBuf::from(".") } else { root };
    let base = Pattern::escape(&root.to_string_lossy());
    let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };
    let mut files = BTreeSet::new();

    for ext in IMAGE_EXTENSIONS {
        let pattern = format!("{}/**/*.{}", base, ext);
        let paths = glob_with(&pattern, options)
            .map_err(|e| DiscoveryError::InvalidPattern(pattern.clone(), e))?;

        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => {
                    files.insert(path);
                }
                Ok(_) => {}
                Err(e) => log::warn!("error reading path: {}", e),
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// Config key of `path`: its path relative to `input_dir`.
pub fn relative_key(input_dir: &Path, path: &Path) -> Result<String, DiscoveryError> {
    relative_path(input_dir, path).map(|rel| rel.to_string_lossy().into_owned())
}

/// `path` relative to `input_dir`.
///
/// Both sides are compared without `.` components. A path that is not below
/// `input_dir` is an error.
pub fn relative_path<'a>(input_dir: &Path, path: &'a Path) -> Result<&'a Path, DiscoveryError> {
    let root = normalize_root(input_dir);
    let trimmed = path.strip_prefix(".").unwrap_or(path);
    trimmed.strip_prefix(&root).map_err(|_| DiscoveryError::OutsideRoot {
        path: path.to_path_buf(),
        root: input_dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("a.png")));
        assert!(is_image_file(Path::new("dir/b.JPG")));
        assert!(is_image_file(Path::new("c.jpeg")));
        assert!(is_image_file(Path::new("d.Bmp")));
        assert!(!is_image_file(Path::new("e.gif")));
        assert!(!is_image_file(Path::new("config.json")));
        assert!(!is_image_file(Path::new("png")));
    }

    #[test]
    fn test_discover_images() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("a.png"), "x").unwrap();
        fs::write(dir.join("b.txt"), "x").unwrap();
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("nested/c.jpg"), "x").unwrap();
        fs::write(dir.join("nested/deeper/d.bmp"), "x").unwrap();
        fs::write(dir.join("nested/deeper/e.jpeg"), "x").unwrap();

        let files = discover_images(dir).unwrap();
        let keys: Vec<String> = files.iter().map(|f| relative_key(dir, f).unwrap()).collect();

        assert_eq!(files.len(), 4);
        assert!(keys.contains(&"a.png".to_string()));
        assert!(keys.iter().any(|k| k.ends_with("d.bmp")));
        assert!(files.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_discover_images_uppercase_extension() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("SHEET.PNG"), "x").unwrap();

        let files = discover_images(temp.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_discover_images_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(discover_images(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_relative_key() {
        let input = Path::new("/in");
        assert_eq!(relative_key(input, Path::new("/in/a.png")).unwrap(), "a.png");
        assert_eq!(
            relative_key(input, Path::new("/in/sub/b.png")).unwrap(),
            Path::new("sub").join("b.png").to_string_lossy()
        );
        assert!(matches!(
            relative_key(input, Path::new("/elsewhere/c.png")),
            Err(DiscoveryError::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_relative_key_ignores_current_dir_components() {
        let sub_b = Path::new("sub").join("b.png").to_string_lossy().into_owned();

        // Paths as glob reports them for a `./in` root
        assert_eq!(relative_key(Path::new("./in"), Path::new("in/sub/b.png")).unwrap(), sub_b);
        assert_eq!(relative_key(Path::new("./in"), Path::new("./in/sub/b.png")).unwrap(), sub_b);
        assert_eq!(relative_key(Path::new("in/."), Path::new("in/sub/b.png")).unwrap(), sub_b);
        assert_eq!(relative_key(Path::new("in"), Path::new("./in/sub/b.png")).unwrap(), sub_b);
        assert_eq!(relative_key(Path::new("."), Path::new("a.png")).unwrap(), "a.png");
        assert_eq!(relative_key(Path::new("./"), Path::new("./a.png")).unwrap(), "a.png");
    }

    #[test]
    fn test_normalize_root() {
        assert_eq!(normalize_root(Path::new("./in")), PathBuf::from("in"));
        assert_eq!(normalize_root(Path::new("in/./sub/")), PathBuf::from("in/sub"));
        assert_eq!(normalize_root(Path::new("../in")), PathBuf::from("../in"));
        assert_eq!(normalize_root(Path::new(".")), PathBuf::new());
    }

    #[test]
    fn test_discover_images_dotted_root() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        fs::create_dir_all(input.join("sub")).unwrap();
        fs::write(input.join("sub/a.png"), "x").unwrap();

        let dotted = temp.path().join(".").join("in").join(".");
        let files = discover_images(&dotted).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(
            relative_key(&dotted, &files[0]).unwrap(),
            Path::new("sub").join("a.png").to_string_lossy()
        );
    }
}
