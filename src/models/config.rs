use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Weights for the composite candidate score
///
/// The score is the weighted mean of the normalized terms, so any
/// non-negative weights keep it inside [0, 1]. The value term defaults to
/// zero; enabling it restores the older three-term blend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringWeights {
    pub winrate: f64,
    pub pick_order: f64,
    pub value: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            winrate: 0.4,
            pick_order: 0.6,
            value: 0.0,
        }
    }
}

/// Scoring configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    /// Pick-order window: averages outside it are clamped before inversion
    pub min_pick_order: f64,
    pub max_pick_order: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            min_pick_order: 1.0,
            max_pick_order: 40.0,
        }
    }
}

/// Differential comparator tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DiffConfig {
    /// Sample every n-th pixel in both axes
    pub sample_step: u32,
    /// Per-channel difference above this counts the pixel as changed
    pub pixel_threshold: u8,
    /// Fraction of changed samples above which the region is changed
    pub change_ratio: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            sample_step: 4,
            pixel_threshold: 12,
            change_ratio: 0.02,
        }
    }
}

/// Recognition backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognitionConfig {
    /// Base URL of the local model server
    pub server_url: String,
    /// Predictions below this confidence are treated as empty slots
    pub confidence_threshold: f32,
    /// Overall deadline for one scan's recognition phase
    pub timeout_ms: u64,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
    /// Automatic model-server restarts before hard-failing
    pub max_restart_attempts: u32,
    /// Base delay between restart attempts, scaled by attempt number
    pub restart_backoff_ms: u64,
    /// Health probes while waiting for the server to come up
    pub ready_probe_attempts: u32,
    /// Delay between readiness probes
    pub ready_probe_delay_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:39817".to_string(),
            confidence_threshold: 0.85,
            timeout_ms: 10_000,
            request_timeout_secs: 5,
            max_restart_attempts: 3,
            restart_backoff_ms: 500,
            ready_probe_attempts: 60,
            ready_probe_delay_ms: 500,
        }
    }
}

/// Paths of the assets loaded at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetPaths {
    pub region_manifest: PathBuf,
    pub label_set: PathBuf,
    pub stats_snapshot: PathBuf,
    /// Model server binary; None means the server is managed externally
    #[serde(default)]
    pub model_server_bin: Option<PathBuf>,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            region_manifest: PathBuf::from("assets/regions.json"),
            label_set: PathBuf::from("assets/class_names.json"),
            stats_snapshot: PathBuf::from("assets/stats.json"),
            model_server_bin: None,
        }
    }
}

/// Complete scanner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScanConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub assets: AssetPaths,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

/// Suggestion list tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SuggestionConfig {
    /// Maximum entries in the ranked suggestion list
    pub top_tier_cap: usize,
    /// Minimum synergy lift (points) for the pool-priority set
    pub synergy_threshold: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            top_tier_cap: 10,
            synergy_threshold: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();

        // Scoring
        assert_eq!(config.scoring.weights.winrate, 0.4);
        assert_eq!(config.scoring.weights.pick_order, 0.6);
        assert_eq!(config.scoring.weights.value, 0.0);
        assert_eq!(config.scoring.min_pick_order, 1.0);
        assert_eq!(config.scoring.max_pick_order, 40.0);

        // Comparator
        assert_eq!(config.diff.sample_step, 4);
        assert_eq!(config.diff.pixel_threshold, 12);

        // Recognition
        assert_eq!(config.recognition.confidence_threshold, 0.85);
        assert_eq!(config.recognition.max_restart_attempts, 3);

        // Suggestions
        assert_eq!(config.suggestions.top_tier_cap, 10);
    }

    #[test]
    fn test_scan_config_serialization() {
        let config = ScanConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();

        let deserialized: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_scan_config_partial_json_fills_defaults() {
        // Older config files without newer sections still load
        let raw = r#"{"suggestions": {"top_tier_cap": 5, "synergy_threshold": 2.0}}"#;
        let config: ScanConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.suggestions.top_tier_cap, 5);
        assert_eq!(config.scoring.weights.winrate, 0.4);
        assert_eq!(config.recognition.timeout_ms, 10_000);
    }

    #[test]
    fn test_asset_paths_default() {
        let assets = AssetPaths::default();
        assert!(assets.region_manifest.ends_with("regions.json"));
        assert!(assets.model_server_bin.is_none());
    }
}
