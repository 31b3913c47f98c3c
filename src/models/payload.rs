use crate::models::candidate::{AbilityPair, Candidate, CommittedPick, HeroModel};
use crate::models::region::Region;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scan mode discriminator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Initial,
    Incremental,
}

/// Display row for one board region, recognized or not
///
/// The overlay renders every slot, so unrecognized regions stay in the
/// list with `label: None` instead of being dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotRow {
    pub region: Region,
    pub label: Option<String>,
    pub confidence: f32,
}

/// Timing and bookkeeping for one completed scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanMetadata {
    pub mode: ScanMode,
    /// Seat whose picks the suggestions were optimized for, when one was resolvable
    pub target_player: Option<u8>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Regions sent to the classifier
    pub regions_scanned: usize,
    /// Pool regions answered from cache without a classifier call
    pub regions_skipped: usize,
}

/// Enriched scan output, identical in shape for both scan modes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanPayload {
    /// Pool candidates from ultimate slots, manifest order
    pub ultimates: Vec<Candidate>,
    /// Pool candidates from standard slots, manifest order
    pub standards: Vec<Candidate>,
    /// Every manifest region with its current label
    pub slots: Vec<SlotRow>,
    /// Committed picks per seat, ordered by (seat, slot)
    pub committed: Vec<CommittedPick>,
    /// Heroes identified from their defining ultimate slots
    pub hero_models: Vec<HeroModel>,
    /// Strong pairs with both ends visible on the board
    pub op_pairs: Vec<AbilityPair>,
    /// Deceptive pairs with both ends visible on the board
    pub trap_pairs: Vec<AbilityPair>,
    /// Pool abilities that synergize with the target player's picks
    pub synergy_in_pool: Vec<String>,
    /// Ranked suggestions, capped, synergy picks first
    pub top_tier: Vec<Candidate>,
    pub metadata: ScanMetadata,
}

/// Result of one initial scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InitialScan {
    pub payload: ScanPayload,
}

/// Result of one incremental scan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncrementalScan {
    pub payload: ScanPayload,
    /// True when the scan cache was empty and a full scan ran instead
    pub fell_back_to_full: bool,
    /// Changed pool slots re-checked against their cached label
    pub reconfirmed: usize,
    /// Pool slots answered from cache without a classifier call
    pub kept_from_cache: usize,
}

/// A completed scan, tagged by the mode that actually ran
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanResult {
    Initial(InitialScan),
    Incremental(IncrementalScan),
}

impl ScanResult {
    pub fn payload(&self) -> &ScanPayload {
        match self {
            ScanResult::Initial(scan) => &scan.payload,
            ScanResult::Incremental(scan) => &scan.payload,
        }
    }

    pub fn mode(&self) -> ScanMode {
        match self {
            ScanResult::Initial(_) => ScanMode::Initial,
            ScanResult::Incremental(_) => ScanMode::Incremental,
        }
    }
}
