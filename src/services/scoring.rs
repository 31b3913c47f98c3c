use crate::models::candidate::AbilityStats;
use crate::models::config::ScoringConfig;

/// Neutral contribution for a missing or unusable statistic
const NEUTRAL: f64 = 0.5;

/// Composite candidate score in [0, 1]
///
/// Weighted mean of the normalized terms. Missing statistics contribute
/// the neutral 0.5, so sparse records neither sink nor float a candidate.
/// All-zero weights collapse to neutral. Never NaN.
pub fn score_ability(stats: &AbilityStats, config: &ScoringConfig) -> f64 {
    let weights = &config.weights;
    let total = weights.winrate + weights.pick_order + weights.value;
    if !total.is_finite() || total <= 0.0 {
        return NEUTRAL;
    }

    let sum = weights.winrate * winrate_term(stats.winrate)
        + weights.pick_order * pick_order_term(stats.pick_order_avg, config)
        + weights.value * value_term(stats.value_score);

    (sum / total).clamp(0.0, 1.0)
}

/// Winrate is already a fraction; clamp bad data into range
fn winrate_term(winrate: Option<f64>) -> f64 {
    match winrate {
        Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
        _ => NEUTRAL,
    }
}

/// Invert the pick-order average: picked early means valuable
///
/// The raw average is clamped into the configured window first, so an
/// out-of-range average scores the same as the nearest bound.
fn pick_order_term(pick_order: Option<f64>, config: &ScoringConfig) -> f64 {
    let raw = match pick_order {
        Some(value) if value.is_finite() => value,
        _ => return NEUTRAL,
    };

    let (min, max) = (config.min_pick_order, config.max_pick_order);
    if !(max > min) {
        return NEUTRAL;
    }

    let clamped = raw.clamp(min, max);
    (max - clamped) / (max - min)
}

fn value_term(value_score: Option<f64>) -> f64 {
    match value_score {
        Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
        _ => NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ScoringWeights;

    fn stats(winrate: Option<f64>, pick_order: Option<f64>) -> AbilityStats {
        AbilityStats {
            internal_name: "test_ability".to_string(),
            display_name: "Test Ability".to_string(),
            winrate,
            pick_order_avg: pick_order,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_everything_scores_neutral() {
        let score = score_ability(&stats(None, None), &ScoringConfig::default());
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_known_inputs() {
        // winrate term 0.6; pick-order term (40-5)/39
        let score = score_ability(&stats(Some(0.6), Some(5.0)), &ScoringConfig::default());
        let expected = 0.4 * 0.6 + 0.6 * (35.0 / 39.0);
        assert!((score - expected).abs() < 1e-12, "got {}", score);
    }

    #[test]
    fn test_pick_order_clamps_below_min() {
        let config = ScoringConfig::default();
        let at_zero = score_ability(&stats(None, Some(0.0)), &config);
        let at_min = score_ability(&stats(None, Some(config.min_pick_order)), &config);
        assert_eq!(at_zero, at_min);
    }

    #[test]
    fn test_pick_order_clamps_above_max() {
        let config = ScoringConfig::default();
        let beyond = score_ability(&stats(None, Some(250.0)), &config);
        let at_max = score_ability(&stats(None, Some(config.max_pick_order)), &config);
        assert_eq!(beyond, at_max);
    }

    #[test]
    fn test_early_pick_beats_late_pick() {
        let config = ScoringConfig::default();
        let early = score_ability(&stats(None, Some(3.0)), &config);
        let late = score_ability(&stats(None, Some(35.0)), &config);
        assert!(early > late);
    }

    #[test]
    fn test_out_of_range_winrate_clamped() {
        let config = ScoringConfig::default();
        let inflated = score_ability(&stats(Some(1.5), None), &config);
        let perfect = score_ability(&stats(Some(1.0), None), &config);
        assert_eq!(inflated, perfect);
    }

    #[test]
    fn test_zero_weights_score_neutral() {
        let config = ScoringConfig {
            weights: ScoringWeights {
                winrate: 0.0,
                pick_order: 0.0,
                value: 0.0,
            },
            ..ScoringConfig::default()
        };
        assert_eq!(score_ability(&stats(Some(0.9), Some(2.0)), &config), 0.5);
    }

    #[test]
    fn test_nan_inputs_never_poison_the_score() {
        let config = ScoringConfig::default();
        let score = score_ability(&stats(Some(f64::NAN), Some(f64::NAN)), &config);
        assert!(score.is_finite());
        assert_eq!(score, 0.5, "unusable values fall back to neutral");
    }

    #[test]
    fn test_score_stays_in_range() {
        let config = ScoringConfig::default();
        let winrates = [None, Some(-2.0), Some(0.0), Some(0.5), Some(1.0), Some(7.0)];
        let pick_orders = [None, Some(-5.0), Some(1.0), Some(20.0), Some(40.0), Some(999.0)];

        for winrate in winrates {
            for pick_order in pick_orders {
                let score = score_ability(&stats(winrate, pick_order), &config);
                assert!(
                    (0.0..=1.0).contains(&score),
                    "score {} out of range for {:?}/{:?}",
                    score,
                    winrate,
                    pick_order
                );
            }
        }
    }

    #[test]
    fn test_three_term_blend() {
        let config = ScoringConfig {
            weights: ScoringWeights {
                winrate: 0.25,
                pick_order: 0.35,
                value: 0.40,
            },
            ..ScoringConfig::default()
        };
        let mut record = stats(Some(0.5), Some(10.0));
        record.value_score = Some(0.8);

        let expected =
            (0.25 * 0.5 + 0.35 * (30.0 / 39.0) + 0.40 * 0.8) / (0.25 + 0.35 + 0.40);
        let score = score_ability(&record, &config);
        assert!((score - expected).abs() < 1e-12);
    }
}
