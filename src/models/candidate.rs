use serde::{Deserialize, Serialize};

/// Statistics record for one ability as stored in the snapshot
///
/// Every numeric field is optional: the scraper may not have data for
/// newly added or rarely drafted abilities. Missing values score neutral.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AbilityStats {
    pub internal_name: String,
    pub display_name: String,
    #[serde(default)]
    pub hero_key: Option<String>,
    #[serde(default)]
    pub winrate: Option<f64>,
    #[serde(default)]
    pub high_skill_winrate: Option<f64>,
    #[serde(default)]
    pub pick_order_avg: Option<f64>,
    #[serde(default)]
    pub value_score: Option<f64>,
    #[serde(default)]
    pub is_ultimate: bool,
}

impl AbilityStats {
    /// Placeholder record for an ability the snapshot does not know
    pub fn unknown(internal_name: impl Into<String>, is_ultimate: bool) -> Self {
        let internal_name = internal_name.into();
        Self {
            display_name: internal_name.clone(),
            internal_name,
            is_ultimate,
            ..Default::default()
        }
    }
}

/// Where a candidate was seen on the board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    /// Draftable pool slot
    Pool,
    /// Already committed by the player at this seat
    Committed { player: u8 },
}

/// Synergy partner entry, scoped to abilities visible on the board
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynergyPartner {
    pub name: String,
    pub combined_winrate: f64,
    /// Winrate lift over the pair's independent baseline, in points
    pub synergy: f64,
}

/// Precomputed two-ability combination from the snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbilityPair {
    pub first: String,
    pub second: String,
    pub combined_winrate: f64,
    pub synergy: f64,
}

impl AbilityPair {
    pub fn involves(&self, name: &str) -> bool {
        self.first == name || self.second == name
    }

    /// The other end of the pair, if `name` is one of them
    pub fn partner_of(&self, name: &str) -> Option<&str> {
        if self.first == name {
            Some(&self.second)
        } else if self.second == name {
            Some(&self.first)
        } else {
            None
        }
    }
}

/// Fully enriched ability entry produced by one scan
///
/// Built fresh per scan from `AbilityStats` plus that scan's synergy and
/// scoring context. Never persisted between scans.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub stats: AbilityStats,
    pub origin: CandidateOrigin,
    pub synergy_partners: Vec<SynergyPartner>,
    /// Normalized composite score in [0, 1]
    pub score: f64,
    /// Selected for its synergy with the target player's picks
    pub is_synergy_pick: bool,
    /// Selected on raw score
    pub is_top_tier_pick: bool,
}

impl Candidate {
    pub fn from_stats(stats: AbilityStats, origin: CandidateOrigin) -> Self {
        Self {
            stats,
            origin,
            synergy_partners: Vec::new(),
            score: 0.0,
            is_synergy_pick: false,
            is_top_tier_pick: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.stats.internal_name
    }

    pub fn is_ultimate(&self) -> bool {
        self.stats.is_ultimate
    }
}

/// One committed pick of a drafting player
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommittedPick {
    pub player: u8,
    pub slot: u8,
    pub stats: AbilityStats,
}

/// Hero row from the statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroRecord {
    pub hero_key: String,
    pub display_name: String,
}

/// Board hero identified through its defining ultimate slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeroModel {
    /// Board position (0-11)
    pub hero: u8,
    pub hero_key: String,
    pub display_name: String,
    /// The ultimate label that identified this hero
    pub defining_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_stats_are_neutral() {
        let stats = AbilityStats::unknown("brain_drain", true);
        assert_eq!(stats.internal_name, "brain_drain");
        assert_eq!(stats.display_name, "brain_drain");
        assert!(stats.winrate.is_none());
        assert!(stats.pick_order_avg.is_none());
        assert!(stats.is_ultimate);
    }

    #[test]
    fn test_pair_partner_lookup() {
        let pair = AbilityPair {
            first: "cold_snap".to_string(),
            second: "chaos_bolt".to_string(),
            combined_winrate: 0.582,
            synergy: 4.1,
        };

        assert!(pair.involves("cold_snap"));
        assert!(!pair.involves("flame_guard"));
        assert_eq!(pair.partner_of("cold_snap"), Some("chaos_bolt"));
        assert_eq!(pair.partner_of("chaos_bolt"), Some("cold_snap"));
        assert_eq!(pair.partner_of("flame_guard"), None);
    }

    #[test]
    fn test_candidate_from_stats() {
        let stats = AbilityStats {
            internal_name: "cold_snap".to_string(),
            display_name: "Cold Snap".to_string(),
            winrate: Some(0.54),
            ..Default::default()
        };
        let candidate = Candidate::from_stats(stats, CandidateOrigin::Pool);

        assert_eq!(candidate.name(), "cold_snap");
        assert_eq!(candidate.score, 0.0);
        assert!(!candidate.is_synergy_pick);
        assert!(!candidate.is_top_tier_pick);
        assert!(candidate.synergy_partners.is_empty());
    }

    #[test]
    fn test_stats_deserialize_with_missing_fields() {
        let raw = r#"{"internal_name": "cold_snap", "display_name": "Cold Snap"}"#;
        let stats: AbilityStats = serde_json::from_str(raw).unwrap();

        assert!(stats.winrate.is_none());
        assert!(!stats.is_ultimate);
    }
}
