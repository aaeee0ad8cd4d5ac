use std::collections::BTreeMap;

use crate::pick::{Pick, PickResult};
use crate::types::{Sport, Tier};

/// Win/CLV aggregates for one group of picks. Pushes count as graded but are
/// excluded from the win-rate denominator; CLV averages run over every pick
/// that has a clv value, graded or not.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupSummary {
    pub graded: usize,
    pub wins: usize,
    pub losses: usize,
    pub pushes: usize,
    pub win_rate: f64,
    pub clv_samples: usize,
    pub avg_clv: f64,
    pub positive_clv_rate: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PerformanceSummary {
    pub overall: GroupSummary,
    pub by_tier: Vec<(Tier, GroupSummary)>,
    pub by_sport: Vec<(Sport, GroupSummary)>,
}

#[derive(Default)]
struct Acc {
    graded: usize,
    wins: usize,
    losses: usize,
    pushes: usize,
    clv_samples: usize,
    clv_sum: f64,
    clv_positive: usize,
}

impl Acc {
    fn add(&mut self, pick: &Pick) {
        match pick.result {
            Some(PickResult::Win) => {
                self.graded += 1;
                self.wins += 1;
            }
            Some(PickResult::Loss) => {
                self.graded += 1;
                self.losses += 1;
            }
            Some(PickResult::Push) => {
                self.graded += 1;
                self.pushes += 1;
            }
            None => {}
        }
        if let Some(clv) = pick.clv {
            self.clv_samples += 1;
            self.clv_sum += clv;
            if clv > 0.0 {
                self.clv_positive += 1;
            }
        }
    }

    fn finish(&self) -> GroupSummary {
        let decided = self.wins + self.losses;
        GroupSummary {
            graded: self.graded,
            wins: self.wins,
            losses: self.losses,
            pushes: self.pushes,
            win_rate: if decided > 0 {
                self.wins as f64 / decided as f64
            } else {
                0.0
            },
            clv_samples: self.clv_samples,
            avg_clv: if self.clv_samples > 0 {
                self.clv_sum / self.clv_samples as f64
            } else {
                0.0
            },
            positive_clv_rate: if self.clv_samples > 0 {
                self.clv_positive as f64 / self.clv_samples as f64
            } else {
                0.0
            },
        }
    }
}

/// Single read-only pass over the history. Zero graded picks produce a
/// zeroed summary with `graded = 0`, never a NaN.
pub fn compute_summary(picks: &[Pick]) -> PerformanceSummary {
    let mut overall = Acc::default();
    let mut by_tier: BTreeMap<Tier, Acc> = BTreeMap::new();
    let mut by_sport: BTreeMap<Sport, Acc> = BTreeMap::new();

    for pick in picks {
        overall.add(pick);
        by_tier.entry(pick.tier).or_default().add(pick);
        by_sport.entry(pick.sport).or_default().add(pick);
    }

    PerformanceSummary {
        overall: overall.finish(),
        by_tier: by_tier
            .iter()
            .map(|(tier, acc)| (*tier, acc.finish()))
            .collect(),
        by_sport: by_sport
            .iter()
            .map(|(sport, acc)| (*sport, acc.finish()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetType, Side};

    fn pick(result: Option<PickResult>, clv: Option<f64>, tier: Tier, sport: Sport) -> Pick {
        Pick {
            id: format!("pick_{}_{}", clv.unwrap_or(0.0), result.map(|r| r.code()).unwrap_or("-")),
            recorded_at: "2026-01-01T00:00:00+00:00".to_string(),
            sport,
            home: "H".to_string(),
            away: "A".to_string(),
            bet_type: BetType::Spread,
            side: Side::Home,
            line: Some(-3.0),
            odds: -110,
            book: None,
            confidence: 70,
            tier,
            signals: Vec::new(),
            result,
            closing_line: None,
            clv,
        }
    }

    #[test]
    fn pushes_leave_win_rate_and_count_in_clv() {
        let picks = vec![
            pick(Some(PickResult::Win), Some(1.5), Tier::SuperSignal, Sport::Nba),
            pick(Some(PickResult::Loss), Some(-0.5), Tier::SuperSignal, Sport::Nba),
            pick(Some(PickResult::Push), Some(0.0), Tier::Fragmented, Sport::Nfl),
        ];
        let summary = compute_summary(&picks);

        assert_eq!(summary.overall.graded, 3);
        assert!((summary.overall.win_rate - 0.5).abs() < 1e-9);
        assert!((summary.overall.avg_clv - (1.5 - 0.5 + 0.0) / 3.0).abs() < 1e-9);
        assert!((summary.overall.positive_clv_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_history_is_a_defined_zero_state() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.overall, GroupSummary::default());
        assert!(summary.by_tier.is_empty());
        assert!(summary.by_sport.is_empty());
    }

    #[test]
    fn breakdowns_restrict_the_same_formulas() {
        let picks = vec![
            pick(Some(PickResult::Win), Some(2.0), Tier::GoldenConvergence, Sport::Nba),
            pick(Some(PickResult::Loss), None, Tier::GoldenConvergence, Sport::Nba),
            pick(Some(PickResult::Win), Some(-1.0), Tier::Fragmented, Sport::Nfl),
        ];
        let summary = compute_summary(&picks);

        let (tier, golden) = summary
            .by_tier
            .iter()
            .find(|(t, _)| *t == Tier::GoldenConvergence)
            .unwrap();
        assert_eq!(*tier, Tier::GoldenConvergence);
        assert_eq!(golden.graded, 2);
        assert!((golden.win_rate - 0.5).abs() < 1e-9);
        assert_eq!(golden.clv_samples, 1);

        let (_, nfl) = summary
            .by_sport
            .iter()
            .find(|(s, _)| *s == Sport::Nfl)
            .unwrap();
        assert_eq!(nfl.wins, 1);
        assert!((nfl.avg_clv + 1.0).abs() < 1e-9);
    }

    #[test]
    fn ungraded_picks_do_not_count_as_graded() {
        let picks = vec![pick(None, Some(1.0), Tier::Fragmented, Sport::Nhl)];
        let summary = compute_summary(&picks);
        assert_eq!(summary.overall.graded, 0);
        assert_eq!(summary.overall.clv_samples, 1);
    }
}
