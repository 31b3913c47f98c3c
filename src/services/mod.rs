pub mod capture;
pub mod config;
pub mod frame_diff;
pub mod pool_builder;
pub mod recognition;
pub mod scanner;
pub mod scoring;
pub mod selector;
pub mod stats_repo;
pub mod synergy;

// Re-export main types
pub use capture::{FrameSource, StaticFrames};
pub use config::ConfigManager;
pub use pool_builder::DraftPools;
pub use recognition::{AbilityClassifier, HttpClassifier, ModelServerManager, ServerState};
pub use scanner::{DraftScanner, ScanState};
pub use selector::ExclusionRules;
pub use stats_repo::{SnapshotRepository, StatsRepository, StatsSnapshot};
pub use synergy::SynergyReport;
