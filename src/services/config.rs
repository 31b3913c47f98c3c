use crate::error::ScanError;
use crate::models::config::ScanConfig;
use crate::models::recognition::LabelSet;
use crate::models::region::RegionManifest;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration manager for scanner settings
pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager instance
    ///
    /// This will create the config directory if it doesn't exist.
    /// Returns an error if directory creation fails.
    pub fn new() -> Result<Self, String> {
        // Get platform-specific config directory
        let config_dir = dirs::config_dir()
            .ok_or("Failed to determine config directory")?
            .join("draft-scanner");

        // Create directory if it doesn't exist
        fs::create_dir_all(&config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        let config_path = config_dir.join("config.json");

        Ok(Self {
            config_dir,
            config_path,
        })
    }

    /// Save configuration to disk
    pub fn save(&self, config: &ScanConfig) -> Result<(), String> {
        // Ensure config directory exists
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;

        // Pretty print for hand editing
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_path, json)
            .map_err(|e| format!("Failed to write config file: {}", e))?;

        Ok(())
    }

    /// Load configuration from disk
    ///
    /// If config file doesn't exist, returns default configuration
    pub fn load(&self) -> Result<ScanConfig, String> {
        if !self.config_exists() {
            return Ok(ScanConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: ScanConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Check if config file exists
    pub fn config_exists(&self) -> bool {
        self.config_path.exists()
    }
}

/// Load and validate the region manifest
///
/// A missing or malformed manifest means the scanner cannot start, so
/// everything maps to a configuration error.
pub fn load_manifest(path: &Path) -> Result<RegionManifest, ScanError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ScanError::Configuration(format!(
            "region manifest unreadable at {}: {}",
            path.display(),
            e
        ))
    })?;

    let manifest: RegionManifest = serde_json::from_str(&raw).map_err(|e| {
        ScanError::Configuration(format!(
            "region manifest malformed at {}: {}",
            path.display(),
            e
        ))
    })?;

    manifest
        .validate()
        .map_err(|e| ScanError::Configuration(format!("region manifest invalid: {}", e)))?;

    Ok(manifest)
}

/// Load the classifier label set
pub fn load_label_set(path: &Path) -> Result<LabelSet, ScanError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ScanError::Configuration(format!(
            "label set unreadable at {}: {}",
            path.display(),
            e
        ))
    })?;

    LabelSet::from_json(&raw).map_err(ScanError::Configuration)
}
