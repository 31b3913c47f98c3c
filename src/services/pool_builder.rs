use crate::models::payload::SlotRow;
use crate::models::recognition::RecognitionResult;
use crate::models::region::SlotKind;
use std::collections::{BTreeMap, HashSet};

/// A draftable ability with the slot family it was first seen in
#[derive(Debug, Clone, PartialEq)]
pub struct PoolEntry {
    pub name: String,
    pub kind: SlotKind,
}

/// A recognized committed slot of one player
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedSlot {
    pub slot: u8,
    pub label: String,
}

/// Recognitions split into draft-pool and committed groups
///
/// Name lists are deduplicated in first-seen order; `rows` keeps every
/// region (recognized or not) for display, duplicates included.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DraftPools {
    pub pool_entries: Vec<PoolEntry>,
    pub committed_names: Vec<String>,
    /// Recognized committed slots per seat, ordered by slot within a seat
    pub committed_by_player: BTreeMap<u8, Vec<CommittedSlot>>,
    pub rows: Vec<SlotRow>,
}

impl DraftPools {
    pub fn pool_names(&self) -> Vec<String> {
        self.pool_entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Pool and committed names, deduplicated across both groups
    pub fn all_names(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut names = Vec::new();
        for entry in &self.pool_entries {
            if seen.insert(&entry.name) {
                names.push(entry.name.clone());
            }
        }
        for name in &self.committed_names {
            if seen.insert(name) {
                names.push(name.clone());
            }
        }
        names
    }

    /// Recognized picks of one seat
    pub fn picks_of(&self, player: u8) -> &[CommittedSlot] {
        self.committed_by_player
            .get(&player)
            .map(|slots| slots.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_pool_empty(&self) -> bool {
        self.pool_entries.is_empty()
    }
}

/// Split recognition results into pool and committed groups
pub fn build_pools(results: &[RecognitionResult]) -> DraftPools {
    let mut pools = DraftPools::default();
    let mut seen_pool: HashSet<String> = HashSet::new();
    let mut seen_committed: HashSet<String> = HashSet::new();

    for result in results {
        pools.rows.push(SlotRow {
            region: result.region,
            label: result.recognition.label.clone(),
            confidence: result.recognition.confidence,
        });

        let label = match result.label() {
            Some(label) => label.to_string(),
            None => continue,
        };

        if result.region.is_pool() {
            if seen_pool.insert(label.clone()) {
                pools.pool_entries.push(PoolEntry {
                    name: label,
                    kind: result.region.kind,
                });
            }
        } else if let Some(player) = result.region.participant() {
            if seen_committed.insert(label.clone()) {
                pools.committed_names.push(label.clone());
            }
            pools
                .committed_by_player
                .entry(player)
                .or_default()
                .push(CommittedSlot {
                    slot: result.region.slot,
                    label,
                });
        }
    }

    for slots in pools.committed_by_player.values_mut() {
        slots.sort_by_key(|s| s.slot);
    }

    pools
}
