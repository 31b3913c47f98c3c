pub mod candidate;
pub mod config;
pub mod payload;
pub mod recognition;
pub mod region;

// Re-export main types
pub use candidate::{AbilityPair, AbilityStats, Candidate, CommittedPick, HeroModel};
pub use config::ScanConfig;
pub use payload::{ScanMode, ScanPayload, ScanResult};
pub use recognition::{LabelSet, Recognition, RecognitionResult};
pub use region::{Rect, Region, RegionManifest, RegionOwner, SlotKind};
