use crate::error::{RepositoryError, ScanError};
use crate::models::candidate::{AbilityPair, AbilityStats, HeroRecord, SynergyPartner};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Read-only statistics store
///
/// Queried once per scan. Errors surface to the caller as-is; the
/// pipeline never retries a lookup.
pub trait StatsRepository: Send + Sync {
    /// Batch lookup of ability records; unknown names are absent from the map
    fn details_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, AbilityStats>, RepositoryError>;

    /// Every known partner of one ability, unscoped
    fn synergy_partners(&self, name: &str) -> Result<Vec<SynergyPartner>, RepositoryError>;

    /// Curated standout combinations
    fn strong_pairs(&self) -> Result<Vec<AbilityPair>, RepositoryError>;

    /// Curated deceptive combinations
    fn trap_pairs(&self) -> Result<Vec<AbilityPair>, RepositoryError>;

    /// The hero whose kit contains this ability
    fn hero_for_ability(&self, label: &str) -> Result<Option<HeroRecord>, RepositoryError>;
}

/// Hero entry in the snapshot file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroEntry {
    pub hero_key: String,
    pub display_name: String,
    /// Internal names of the hero's draftable abilities
    pub abilities: Vec<String>,
}

/// On-disk statistics snapshot produced by the stats scraper
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub abilities: Vec<AbilityStats>,
    /// All measured combinations; partner lists are derived from these
    #[serde(default)]
    pub pairs: Vec<AbilityPair>,
    #[serde(default)]
    pub op_pairs: Vec<AbilityPair>,
    #[serde(default)]
    pub trap_pairs: Vec<AbilityPair>,
    #[serde(default)]
    pub heroes: Vec<HeroEntry>,
}

/// Statistics repository backed by an in-memory snapshot
///
/// Indexes are built once at load; lookups afterwards are plain map hits.
#[derive(Debug)]
pub struct SnapshotRepository {
    by_name: HashMap<String, AbilityStats>,
    partners: HashMap<String, Vec<SynergyPartner>>,
    op_pairs: Vec<AbilityPair>,
    trap_pairs: Vec<AbilityPair>,
    hero_by_ability: HashMap<String, HeroRecord>,
}

impl SnapshotRepository {
    pub fn from_snapshot(snapshot: StatsSnapshot) -> Self {
        let mut by_name = HashMap::new();
        for stats in snapshot.abilities {
            by_name.insert(stats.internal_name.clone(), stats);
        }

        // Partner lists cover both directions of every measured pair
        let mut partners: HashMap<String, Vec<SynergyPartner>> = HashMap::new();
        for pair in &snapshot.pairs {
            partners
                .entry(pair.first.clone())
                .or_default()
                .push(SynergyPartner {
                    name: pair.second.clone(),
                    combined_winrate: pair.combined_winrate,
                    synergy: pair.synergy,
                });
            partners
                .entry(pair.second.clone())
                .or_default()
                .push(SynergyPartner {
                    name: pair.first.clone(),
                    combined_winrate: pair.combined_winrate,
                    synergy: pair.synergy,
                });
        }

        let mut hero_by_ability = HashMap::new();
        for hero in &snapshot.heroes {
            let record = HeroRecord {
                hero_key: hero.hero_key.clone(),
                display_name: hero.display_name.clone(),
            };
            for ability in &hero.abilities {
                hero_by_ability.insert(ability.clone(), record.clone());
            }
        }

        Self {
            by_name,
            partners,
            op_pairs: snapshot.op_pairs,
            trap_pairs: snapshot.trap_pairs,
            hero_by_ability,
        }
    }

    /// Load and index a snapshot file
    ///
    /// A missing or malformed snapshot is fatal at startup.
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ScanError::Configuration(format!(
                "stats snapshot unreadable at {}: {}",
                path.display(),
                e
            ))
        })?;

        let snapshot: StatsSnapshot = serde_json::from_str(&raw).map_err(|e| {
            ScanError::Configuration(format!(
                "stats snapshot malformed at {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self::from_snapshot(snapshot))
    }

    pub fn ability_count(&self) -> usize {
        self.by_name.len()
    }
}

impl StatsRepository for SnapshotRepository {
    fn details_by_names(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, AbilityStats>, RepositoryError> {
        let mut details = HashMap::new();
        for name in names {
            if let Some(stats) = self.by_name.get(name) {
                details.insert(name.clone(), stats.clone());
            }
        }
        Ok(details)
    }

    fn synergy_partners(&self, name: &str) -> Result<Vec<SynergyPartner>, RepositoryError> {
        Ok(self.partners.get(name).cloned().unwrap_or_default())
    }

    fn strong_pairs(&self) -> Result<Vec<AbilityPair>, RepositoryError> {
        Ok(self.op_pairs.clone())
    }

    fn trap_pairs(&self) -> Result<Vec<AbilityPair>, RepositoryError> {
        Ok(self.trap_pairs.clone())
    }

    fn hero_for_ability(&self, label: &str) -> Result<Option<HeroRecord>, RepositoryError> {
        Ok(self.hero_by_ability.get(label).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ability(name: &str, winrate: f64) -> AbilityStats {
        AbilityStats {
            internal_name: name.to_string(),
            display_name: name.to_string(),
            winrate: Some(winrate),
            ..Default::default()
        }
    }

    fn pair(first: &str, second: &str, synergy: f64) -> AbilityPair {
        AbilityPair {
            first: first.to_string(),
            second: second.to_string(),
            combined_winrate: 0.55,
            synergy,
        }
    }

    fn test_snapshot() -> StatsSnapshot {
        StatsSnapshot {
            abilities: vec![
                ability("cold_snap", 0.54),
                ability("chaos_bolt", 0.51),
                ability("epicenter", 0.57),
            ],
            pairs: vec![
                pair("cold_snap", "chaos_bolt", 3.2),
                pair("cold_snap", "epicenter", 1.1),
            ],
            op_pairs: vec![pair("cold_snap", "chaos_bolt", 3.2)],
            trap_pairs: vec![pair("chaos_bolt", "epicenter", -2.5)],
            heroes: vec![HeroEntry {
                hero_key: "sand_king".to_string(),
                display_name: "Sand King".to_string(),
                abilities: vec!["epicenter".to_string(), "burrowstrike".to_string()],
            }],
        }
    }

    #[test]
    fn test_details_by_names_skips_unknown() {
        let repo = SnapshotRepository::from_snapshot(test_snapshot());

        let names = vec!["cold_snap".to_string(), "no_such_ability".to_string()];
        let details = repo.details_by_names(&names).unwrap();

        assert_eq!(details.len(), 1);
        assert!(details.contains_key("cold_snap"));
        assert!(!details.contains_key("no_such_ability"));
    }

    #[test]
    fn test_partner_lists_cover_both_directions() {
        let repo = SnapshotRepository::from_snapshot(test_snapshot());

        let from_first = repo.synergy_partners("cold_snap").unwrap();
        assert_eq!(from_first.len(), 2);

        let from_second = repo.synergy_partners("chaos_bolt").unwrap();
        assert_eq!(from_second.len(), 1);
        assert_eq!(from_second[0].name, "cold_snap");
        assert_eq!(from_second[0].synergy, 3.2);
    }

    #[test]
    fn test_unknown_ability_has_no_partners() {
        let repo = SnapshotRepository::from_snapshot(test_snapshot());
        assert!(repo.synergy_partners("no_such_ability").unwrap().is_empty());
    }

    #[test]
    fn test_hero_for_ability() {
        let repo = SnapshotRepository::from_snapshot(test_snapshot());

        let hero = repo.hero_for_ability("epicenter").unwrap().unwrap();
        assert_eq!(hero.hero_key, "sand_king");

        assert!(repo.hero_for_ability("cold_snap").unwrap().is_none());
    }

    #[test]
    fn test_curated_pairs_pass_through() {
        let repo = SnapshotRepository::from_snapshot(test_snapshot());
        assert_eq!(repo.strong_pairs().unwrap().len(), 1);
        assert_eq!(repo.trap_pairs().unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_snapshot_is_configuration_error() {
        let path = std::env::temp_dir().join("draft-scanner-no-such-snapshot.json");
        let err = SnapshotRepository::load(&path).unwrap_err();
        assert!(matches!(err, ScanError::Configuration(_)));
    }
}
