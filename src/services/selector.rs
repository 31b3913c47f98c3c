use crate::models::candidate::Candidate;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Exclusion context for one selection pass
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    /// Names already committed anywhere on the board
    pub committed_names: HashSet<String>,
    /// Drop every ultimate: the target player already committed one
    pub exclude_ultimates: bool,
}

impl ExclusionRules {
    fn allows(&self, candidate: &Candidate) -> bool {
        if self.committed_names.contains(candidate.name()) {
            return false;
        }
        if self.exclude_ultimates && candidate.is_ultimate() {
            return false;
        }
        true
    }
}

/// Build the ranked suggestion list
///
/// Candidates passing the exclusion rules are partitioned into a synergy
/// set and a general set. Both sort by score descending with stable ties,
/// synergy picks fill the list first, and the whole list never exceeds
/// `cap`. Deterministic: identical inputs give identical output.
pub fn select_top_tier(
    candidates: &[Candidate],
    synergy_names: &HashSet<String>,
    rules: &ExclusionRules,
    cap: usize,
) -> Vec<Candidate> {
    let mut synergy: Vec<Candidate> = Vec::new();
    let mut general: Vec<Candidate> = Vec::new();

    for candidate in candidates {
        if !rules.allows(candidate) {
            continue;
        }
        if synergy_names.contains(candidate.name()) {
            synergy.push(candidate.clone());
        } else {
            general.push(candidate.clone());
        }
    }

    sort_by_score(&mut synergy);
    sort_by_score(&mut general);

    let mut selected = Vec::new();
    for mut candidate in synergy {
        if selected.len() >= cap {
            break;
        }
        candidate.is_synergy_pick = true;
        selected.push(candidate);
    }
    for mut candidate in general {
        if selected.len() >= cap {
            break;
        }
        candidate.is_top_tier_pick = true;
        selected.push(candidate);
    }

    selected
}

/// Stable descending sort; equal scores keep their input order
fn sort_by_score(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
