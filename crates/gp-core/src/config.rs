//! Editor configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{CLOSE_THRESHOLD, GROUND_HEIGHT};
use crate::props::{BedProps, FenceProps, PathProps};
use crate::snap::SnapConfig;

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Settings shared by every shape editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid snapping and units
    pub snap: SnapConfig,
    /// Grab radius for closing a loop on its first vertex
    pub close_threshold: f32,
    /// Height handles are clamped to while dragging
    pub ground_height: f32,
    /// Direction of north on the ground plane, in radians from +Z
    pub north_angle: f32,
    /// Properties given to new beds
    pub bed: BedProps,
    /// Properties given to new fences
    pub fence: FenceProps,
    /// Properties given to new paths
    pub path: PathProps,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            close_threshold: CLOSE_THRESHOLD,
            ground_height: GROUND_HEIGHT,
            north_angle: 0.0,
            bed: BedProps::default(),
            fence: FenceProps::default(),
            path: PathProps::default(),
        }
    }
}

impl EditorConfig {
    /// Configuration with imperial units
    pub fn imperial() -> Self {
        Self {
            snap: SnapConfig::imperial(),
            ..Default::default()
        }
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EditorConfig::from_ron_str("(close_threshold: 0.2)").unwrap();
        assert_eq!(config.close_threshold, 0.2);
        assert_eq!(config.snap, SnapConfig::default());
        assert_eq!(config.bed, BedProps::default());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            EditorConfig::from_ron_str("(close_threshold: \"far\")"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");

        let mut config = EditorConfig::imperial();
        config.fence.fence_height = 1.8;
        config.save(&path).unwrap();

        let loaded = EditorConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.snap.metric);
    }
}
