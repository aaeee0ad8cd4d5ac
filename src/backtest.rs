use rayon::prelude::*;

use crate::pick::{Pick, SignalSnapshot};
use crate::scorer::{
    self, WeightTable, aligned_count, family_averages, weighted_confidence,
};
use crate::stats::{PerformanceSummary, compute_summary};
use crate::types::Tier;

#[derive(Debug, Clone)]
pub struct RescoredPick {
    pub id: String,
    pub original_confidence: u32,
    pub confidence: u32,
    pub tier: Tier,
    pub kept: bool,
}

/// One what-if run. Carries the substituted weight table so the numbers can
/// be audited against the exact configuration that produced them.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub min_confidence: u32,
    pub weights: WeightTable,
    pub considered: usize,
    pub kept: usize,
    pub summary: PerformanceSummary,
    pub profit_units: f64,
    pub rescored: Vec<RescoredPick>,
}

/// Confidence a pick would have scored under `weights`, computed purely from
/// the signals snapshotted at recording time. Backtests must replay from
/// stored data alone, so nothing is re-derived from live context.
pub fn rescore_confidence(signals: &[SignalSnapshot], weights: &WeightTable) -> u32 {
    weighted_confidence(
        signals
            .iter()
            .map(|s| (s.score, weights.weight_of(&s.name))),
    )
}

pub fn rescore_tier(signals: &[SignalSnapshot], confidence: u32) -> Tier {
    let breakdown = family_averages(signals.iter().map(|s| (s.family, s.score)));
    scorer::tier_for(confidence, aligned_count(&breakdown))
}

/// Replay history under an alternate weight table and keep only the picks
/// that would have cleared `min_confidence`. Input picks are never mutated;
/// the report owns fresh copies of everything it returns.
pub fn run_backtest(picks: &[Pick], weights: &WeightTable, min_confidence: u32) -> BacktestReport {
    let mut rescored = Vec::with_capacity(picks.len());
    let mut kept_picks: Vec<Pick> = Vec::new();
    let mut profit_units = 0.0;

    for pick in picks {
        let confidence = rescore_confidence(&pick.signals, weights);
        let tier = rescore_tier(&pick.signals, confidence);
        let kept = confidence >= min_confidence;
        if kept {
            if let Some(units) = pick.profit_units() {
                profit_units += units;
            }
            kept_picks.push(pick.clone());
        }
        rescored.push(RescoredPick {
            id: pick.id.clone(),
            original_confidence: pick.confidence,
            confidence,
            tier,
            kept,
        });
    }

    BacktestReport {
        min_confidence,
        weights: weights.clone(),
        considered: picks.len(),
        kept: kept_picks.len(),
        summary: compute_summary(&kept_picks),
        profit_units,
        rescored,
    }
}

/// One backtest per candidate threshold, fanned out across threads. Reports
/// come back in the order the thresholds were given.
pub fn sweep_thresholds(
    picks: &[Pick],
    weights: &WeightTable,
    thresholds: &[u32],
) -> Vec<BacktestReport> {
    thresholds
        .par_iter()
        .map(|threshold| run_backtest(picks, weights, *threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pick::PickResult;
    use crate::types::{BetType, Side, SignalFamily, Sport};

    fn snapshot(name: &str, family: SignalFamily, score: f64, weight: u32) -> SignalSnapshot {
        SignalSnapshot {
            name: name.to_string(),
            family,
            score,
            weight,
        }
    }

    fn graded_pick(id: &str, confidence: u32, result: PickResult, scores: &[(f64, u32)]) -> Pick {
        Pick {
            id: id.to_string(),
            recorded_at: "2026-01-01T00:00:00+00:00".to_string(),
            sport: Sport::Nba,
            home: "H".to_string(),
            away: "A".to_string(),
            bet_type: BetType::Spread,
            side: Side::Home,
            line: Some(-3.0),
            odds: -110,
            book: None,
            confidence,
            tier: Tier::PartialAlignment,
            signals: scores
                .iter()
                .enumerate()
                .map(|(i, (score, weight))| {
                    snapshot(&format!("sig_{i}"), SignalFamily::Market, *score, *weight)
                })
                .collect(),
            result: Some(result),
            closing_line: None,
            clv: Some(1.0),
        }
    }

    #[test]
    fn rescore_uses_substituted_weights_only() {
        let signals = vec![
            snapshot("sharp_money", SignalFamily::Market, 80.0, 25),
            snapshot("public_fade", SignalFamily::Market, 40.0, 12),
        ];
        let only_sharp = WeightTable::from_pairs(&[("sharp_money", 10)]);
        assert_eq!(rescore_confidence(&signals, &only_sharp), 80);

        let even = WeightTable::from_pairs(&[("sharp_money", 10), ("public_fade", 10)]);
        assert_eq!(rescore_confidence(&signals, &even), 60);

        // Unknown names in the table are inert, missing names drop out.
        let stray = WeightTable::from_pairs(&[("sharp_money", 10), ("mystery", 50)]);
        assert_eq!(rescore_confidence(&signals, &stray), 80);
    }

    #[test]
    fn no_weighted_signals_fall_back_to_neutral() {
        let signals = vec![snapshot("sharp_money", SignalFamily::Market, 80.0, 25)];
        let empty = WeightTable::from_pairs(&[]);
        assert_eq!(rescore_confidence(&signals, &empty), 50);
    }

    #[test]
    fn threshold_filters_and_sums_profit() {
        let weights = WeightTable::from_pairs(&[("sig_0", 10)]);
        let picks = vec![
            graded_pick("p1", 70, PickResult::Win, &[(80.0, 10)]),
            graded_pick("p2", 70, PickResult::Loss, &[(55.0, 10)]),
        ];

        let report = run_backtest(&picks, &weights, 60);
        assert_eq!(report.considered, 2);
        assert_eq!(report.kept, 1);
        assert_eq!(report.summary.overall.wins, 1);
        // -110 winner pays 100/110 of a unit.
        assert!((report.profit_units - 100.0 / 110.0).abs() < 1e-9);

        let all_in = run_backtest(&picks, &weights, 0);
        assert_eq!(all_in.kept, 2);
        assert_eq!(all_in.summary.overall.graded, 2);
    }

    #[test]
    fn report_embeds_the_substituted_table() {
        let weights = WeightTable::builtin().with_override("sharp_money", 0);
        let report = run_backtest(&[], &weights, 50);
        assert_eq!(report.weights.weight_of("sharp_money"), 0);
        assert_eq!(report.weights, weights);
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let weights = WeightTable::from_pairs(&[("sig_0", 10)]);
        let picks = vec![
            graded_pick("p1", 70, PickResult::Win, &[(80.0, 10)]),
            graded_pick("p2", 70, PickResult::Loss, &[(55.0, 10)]),
        ];
        let reports = sweep_thresholds(&picks, &weights, &[0, 60, 90]);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].kept, run_backtest(&picks, &weights, 0).kept);
        assert_eq!(reports[1].kept, 1);
        assert_eq!(reports[2].kept, 0);
    }
}
