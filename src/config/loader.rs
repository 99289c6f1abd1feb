//! Loading and saving sprite config files
//!
//! Relative config paths are resolved against the input directory, so the
//! config normally lives next to the images it describes.

use super::schema::SpriteConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file used when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "sprite_config.json";

/// Config file written by the auto-detect menu entry.
pub const AUTO_CONFIG_FILE: &str = "auto_config.json";

/// Config file written by manual mode.
pub const MANUAL_CONFIG_FILE: &str = "manual_sprite_config.json";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Config file does not exist
    #[error("Config file '{}' not found", .0.display())]
    NotFound(PathBuf),
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing error
    #[error("Failed to parse sprite config: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Where a config at `path` is written.
///
/// Absolute paths are used as given; relative ones land in `input_dir`.
pub fn config_write_path(input_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        input_dir.join(path)
    }
}

/// Where a config at `path` is read from.
///
/// An existing file is used as given; otherwise the path is resolved the
/// same way as [`config_write_path`].
pub fn config_read_path(input_dir: &Path, path: &Path) -> PathBuf {
    if path.is_file() {
        path.to_path_buf()
    } else {
        config_write_path(input_dir, path)
    }
}

/// Load and validate a sprite config.
///
/// # Returns
/// - `Ok(SpriteConfig)` on success
/// - `Err(ConfigError::NotFound)` if the file does not exist
/// - `Err(ConfigError)` if the file cannot be read, parsed or validated
pub fn load_config(path: &Path) -> Result<SpriteConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let config: SpriteConfig = serde_json::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Write a sprite config as pretty-printed JSON, creating parent directories.
pub fn save_config(config: &SpriteConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpriteEntry;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("sprite_config.json");
        fs::write(
            &config_path,
            r#"{
  "a.png": { "sprite_count": 5, "auto_detected": false, "file_size": 10 },
  "sub/b.png": { "sprite_count": 0, "auto_detected": true, "file_size": 20 }
}"#,
        )
        .expect("should write config");

        let config = load_config(&config_path).expect("config should load");
        assert_eq!(config.len(), 2);
        assert_eq!(config.get("a.png").map(|e| e.count()), Some(5));
        assert_eq!(config.get("sub/b.png").map(|e| e.count()), Some(0));
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(&temp.path().join("nope.json"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_config_invalid_json() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("sprite_config.json");
        fs::write(&config_path, "{ this is not json").expect("should write config");

        let result = load_config(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_negative_count() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("sprite_config.json");
        fs::write(&config_path, r#"{"a.png": {"sprite_count": -3}}"#)
            .expect("should write config");

        let result = load_config(&config_path);
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("a.png"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("nested/dir/config.json");

        let mut config = SpriteConfig::new();
        config.insert("x.png", SpriteEntry::detected(8, 123));
        save_config(&config, &config_path).expect("config should save");

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("\n  \"x.png\": {"));
        assert_eq!(load_config(&config_path).unwrap(), config);
    }

    #[test]
    fn test_config_write_path() {
        let input = Path::new("/data/input");
        assert_eq!(
            config_write_path(input, Path::new("sprite_config.json")),
            PathBuf::from("/data/input/sprite_config.json")
        );
        assert_eq!(
            config_write_path(input, Path::new("/etc/custom.json")),
            PathBuf::from("/etc/custom.json")
        );
    }

    #[test]
    fn test_config_read_path_prefers_existing() {
        let temp = TempDir::new().expect("should create temp dir");
        let existing = temp.path().join("here.json");
        fs::write(&existing, "{}").unwrap();

        assert_eq!(config_read_path(Path::new("/data/input"), &existing), existing);
        assert_eq!(
            config_read_path(Path::new("/data/input"), Path::new("missing.json")),
            PathBuf::from("/data/input/missing.json")
        );
    }
}
