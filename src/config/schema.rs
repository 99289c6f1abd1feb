//! Sprite config schema
//!
//! A sprite config maps image paths (relative to the input root) to the
//! number of sprites each image holds. It is stored as a flat JSON object:
//!
//! ```json
//! {
//!   "heroes/knight.png": { "sprite_count": 6, "auto_detected": true, "file_size": 10422 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-file config entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteEntry {
    /// Number of sprites in the image; 0 or 1 means "do not split"
    pub sprite_count: i64,
    /// Whether the count came from detection rather than a person
    #[serde(default)]
    pub auto_detected: bool,
    /// Source file size in bytes when the entry was written
    #[serde(default)]
    pub file_size: u64,
}

impl SpriteEntry {
    /// Entry produced by detection.
    pub fn detected(sprite_count: u32, file_size: u64) -> Self {
        Self { sprite_count: sprite_count as i64, auto_detected: true, file_size }
    }

    /// Entry typed in by a person.
    pub fn manual(sprite_count: u32, file_size: u64) -> Self {
        Self { sprite_count: sprite_count as i64, auto_detected: false, file_size }
    }

    /// The sprite count as an unsigned value. Out-of-range counts read as 0.
    pub fn count(&self) -> u32 {
        u32::try_from(self.sprite_count).unwrap_or(0)
    }
}

/// Config validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Config key of the offending entry
    pub file: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}': {}", self.file, self.message)
    }
}

/// Sprite counts keyed by relative image path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteConfig {
    entries: BTreeMap<String, SpriteEntry>,
}

impl SpriteConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `key`.
    pub fn insert(&mut self, key: impl Into<String>, entry: SpriteEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Look up an entry.
    ///
    /// Keys written on one platform are found on another: `a\b.png` and
    /// `a/b.png` name the same file.
    pub fn get(&self, key: &str) -> Option<&SpriteEntry> {
        if let Some(entry) = self.entries.get(key) {
            return Some(entry);
        }
        let forward = key.replace('\\', "/");
        if let Some(entry) = self.entries.get(&forward) {
            return Some(entry);
        }
        self.entries.get(&forward.replace('/', "\\"))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the config has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SpriteEntry)> {
        self.entries.iter()
    }

    /// Sum of the counts of all entries that will be split.
    pub fn total_sprites(&self) -> u64 {
        self.entries.values().map(|e| e.count()).filter(|&c| c > 1).map(u64::from).sum()
    }

    /// Validate the config and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        for (file, entry) in &self.entries {
            if entry.sprite_count < 0 {
                errors.push(ConfigValidationError {
                    file: file.clone(),
                    message: format!("sprite_count must be >= 0 (got {})", entry.sprite_count),
                });
            } else if entry.sprite_count > u32::MAX as i64 {
                errors.push(ConfigValidationError {
                    file: file.clone(),
                    message: format!("sprite_count {} is too large", entry.sprite_count),
                });
            }

            if file.is_empty() {
                errors.push(ConfigValidationError {
                    file: file.clone(),
                    message: "file path must be non-empty".to_string(),
                });
            }
        }

        errors
    }
}

impl FromIterator<(String, SpriteEntry)> for SpriteConfig {
    fn from_iter<I: IntoIterator<Item = (String, SpriteEntry)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        let json = r#"{"a.png": {"sprite_count": 5, "auto_detected": false, "file_size": 1024}}"#;
        let config: SpriteConfig = serde_json::from_str(json).unwrap();

        let entry = config.get("a.png").unwrap();
        assert_eq!(entry.count(), 5);
        assert!(!entry.auto_detected);
        assert_eq!(entry.file_size, 1024);
    }

    #[test]
    fn test_parse_entry_defaults() {
        let json = r#"{"a.png": {"sprite_count": 3}}"#;
        let config: SpriteConfig = serde_json::from_str(json).unwrap();

        let entry = config.get("a.png").unwrap();
        assert_eq!(entry.count(), 3);
        assert!(!entry.auto_detected);
        assert_eq!(entry.file_size, 0);
    }

    #[test]
    fn test_serialize_shape() {
        let mut config = SpriteConfig::new();
        config.insert("walk.png", SpriteEntry::detected(4, 99));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["walk.png"]["sprite_count"], 4);
        assert_eq!(value["walk.png"]["auto_detected"], true);
        assert_eq!(value["walk.png"]["file_size"], 99);
    }

    #[test]
    fn test_get_across_separators() {
        let mut config = SpriteConfig::new();
        config.insert("chars\\hero.png", SpriteEntry::manual(2, 0));
        config.insert("tiles/grass.png", SpriteEntry::manual(3, 0));

        assert_eq!(config.get("chars/hero.png").map(|e| e.count()), Some(2));
        assert_eq!(config.get("tiles\\grass.png").map(|e| e.count()), Some(3));
        assert!(config.get("tiles/water.png").is_none());
    }

    #[test]
    fn test_validate_negative_count() {
        let mut config = SpriteConfig::new();
        config.insert("ok.png", SpriteEntry::manual(0, 0));
        config.insert(
            "bad.png",
            SpriteEntry { sprite_count: -2, auto_detected: false, file_size: 0 },
        );

        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file, "bad.png");
        assert!(errors[0].to_string().contains(">= 0"));
    }

    #[test]
    fn test_count_out_of_range() {
        let entry = SpriteEntry { sprite_count: -1, auto_detected: false, file_size: 0 };
        assert_eq!(entry.count(), 0);
    }

    #[test]
    fn test_total_sprites_ignores_skipped() {
        let config: SpriteConfig = [
            ("a.png".to_string(), SpriteEntry::detected(4, 0)),
            ("b.png".to_string(), SpriteEntry::detected(1, 0)),
            ("c.png".to_string(), SpriteEntry::manual(0, 0)),
            ("d.png".to_string(), SpriteEntry::manual(3, 0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(config.total_sprites(), 7);
    }
}
