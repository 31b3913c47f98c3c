use crate::error::RepositoryError;
use crate::models::candidate::{AbilityPair, SynergyPartner};
use crate::services::stats_repo::StatsRepository;
use std::collections::{HashMap, HashSet};

/// Synergy view of one scan, restricted to abilities on the board
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SynergyReport {
    /// Partners per board ability; every partner is itself on the board
    pub partners_by_name: HashMap<String, Vec<SynergyPartner>>,
    /// Standout pairs with both ends on the board
    pub op_pairs: Vec<AbilityPair>,
    /// Deceptive pairs with both ends on the board
    pub trap_pairs: Vec<AbilityPair>,
    /// Pool abilities synergizing with the target player's picks, pool order
    pub synergy_in_pool: Vec<String>,
}

impl SynergyReport {
    pub fn partners_of(&self, name: &str) -> &[SynergyPartner] {
        self.partners_by_name
            .get(name)
            .map(|partners| partners.as_slice())
            .unwrap_or(&[])
    }
}

/// Resolve synergies for the current board
///
/// Partner lists are filtered to pool plus committed abilities with set
/// semantics: a partner appears at most once per ability no matter how
/// many regions show it. `target_picks` are the committed picks of the
/// suggestion target; pool abilities lifting any of them by more than
/// `synergy_threshold` points form the priority set.
pub fn resolve<R: StatsRepository + ?Sized>(
    pool_names: &[String],
    committed_names: &[String],
    target_picks: &[String],
    repo: &R,
    synergy_threshold: f64,
) -> Result<SynergyReport, RepositoryError> {
    let scope: HashSet<&str> = pool_names
        .iter()
        .chain(committed_names.iter())
        .map(|name| name.as_str())
        .collect();

    let mut report = SynergyReport::default();

    for name in pool_names.iter().chain(committed_names.iter()) {
        if report.partners_by_name.contains_key(name) {
            continue;
        }

        let mut seen: HashSet<String> = HashSet::new();
        let partners: Vec<SynergyPartner> = repo
            .synergy_partners(name)?
            .into_iter()
            .filter(|partner| {
                partner.name != *name
                    && scope.contains(partner.name.as_str())
                    && seen.insert(partner.name.clone())
            })
            .collect();

        report.partners_by_name.insert(name.clone(), partners);
    }

    report.op_pairs = repo
        .strong_pairs()?
        .into_iter()
        .filter(|pair| scope.contains(pair.first.as_str()) && scope.contains(pair.second.as_str()))
        .collect();

    report.trap_pairs = repo
        .trap_pairs()?
        .into_iter()
        .filter(|pair| scope.contains(pair.first.as_str()) && scope.contains(pair.second.as_str()))
        .collect();

    if !target_picks.is_empty() {
        for name in pool_names {
            let lifts_a_pick = target_picks.iter().any(|pick| {
                pick != name
                    && report
                        .partners_of(pick)
                        .iter()
                        .any(|partner| partner.name == *name && partner.synergy > synergy_threshold)
            });
            if lifts_a_pick {
                report.synergy_in_pool.push(name.clone());
            }
        }
    }

    Ok(report)
}
