use std::collections::BTreeMap;

use crate::market_signals::team_key;
use crate::pick::Pick;
use crate::types::{BetType, Side};

const SAME_GAME_PENALTY: u32 = 30;
const SAME_TEAM_PENALTY: u32 = 15;
const DIRECTIONAL_PENALTY: u32 = 15;
const CLUSTER_PENALTY: u32 = 10;

const DIRECTIONAL_MIN_PICKS: usize = 3;
const DIRECTIONAL_SHARE: f64 = 0.8;
const CLUSTER_MIN_PICKS: usize = 3;
const CLUSTER_SHARE: f64 = 0.6;
const BIG_SPREAD_POINTS: f64 = 7.0;
const TOTAL_VARIANCE_FLOOR: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationKind {
    SameGame,
    SameTeam,
    SpreadBias,
    TotalBias,
    SpreadCluster,
    TotalCluster,
}

#[derive(Debug, Clone)]
pub struct CorrelationWarning {
    pub kind: CorrelationKind,
    pub severity: Severity,
    pub detail: String,
    pub pick_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureGrade {
    Good,
    Caution,
    Warning,
    Danger,
}

impl ExposureGrade {
    pub fn label(&self) -> &'static str {
        match self {
            ExposureGrade::Good => "good",
            ExposureGrade::Caution => "caution",
            ExposureGrade::Warning => "warning",
            ExposureGrade::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExposureReport {
    pub has_correlation: bool,
    pub warnings: Vec<CorrelationWarning>,
    pub diversification: u32,
    pub grade: ExposureGrade,
    pub stake_multiplier: f64,
}

/// Scan the working pick set for concentration. Detection is pure and does
/// not depend on input order: groups are keyed through sorted BTreeMaps and
/// every warning lists its pick ids sorted.
pub fn detect_correlation(picks: &[Pick]) -> ExposureReport {
    let mut warnings = Vec::new();

    let game_groups = group_by_game(picks);
    for (key, ids) in &game_groups {
        if ids.len() >= 2 {
            warnings.push(CorrelationWarning {
                kind: CorrelationKind::SameGame,
                severity: Severity::High,
                detail: format!("{} picks on the same game ({key})", ids.len()),
                pick_ids: ids.clone(),
            });
        }
    }
    warnings.extend(same_team_warnings(picks));
    warnings.extend(directional_warnings(picks));
    warnings.extend(cluster_warnings(picks));

    let penalty: u32 = warnings
        .iter()
        .map(|w| match w.kind {
            CorrelationKind::SameGame => SAME_GAME_PENALTY,
            CorrelationKind::SameTeam => SAME_TEAM_PENALTY,
            CorrelationKind::SpreadBias | CorrelationKind::TotalBias => DIRECTIONAL_PENALTY,
            CorrelationKind::SpreadCluster | CorrelationKind::TotalCluster => CLUSTER_PENALTY,
        })
        .sum();
    let diversification = 100u32.saturating_sub(penalty);

    ExposureReport {
        has_correlation: !warnings.is_empty(),
        warnings,
        diversification,
        grade: grade_for(diversification),
        stake_multiplier: stake_multiplier_for(diversification),
    }
}

pub fn grade_for(diversification: u32) -> ExposureGrade {
    match diversification {
        d if d >= 80 => ExposureGrade::Good,
        d if d >= 60 => ExposureGrade::Caution,
        d if d >= 40 => ExposureGrade::Warning,
        _ => ExposureGrade::Danger,
    }
}

pub fn stake_multiplier_for(diversification: u32) -> f64 {
    match diversification {
        d if d >= 80 => 1.0,
        d if d >= 60 => 0.85,
        d if d >= 40 => 0.7,
        _ => 0.5,
    }
}

fn game_key(pick: &Pick) -> String {
    let mut teams = [team_key(&pick.home), team_key(&pick.away)];
    teams.sort();
    format!("{} vs {}", teams[0], teams[1])
}

fn group_by_game(picks: &[Pick]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for pick in picks {
        groups.entry(game_key(pick)).or_default().push(pick.id.clone());
    }
    for ids in groups.values_mut() {
        ids.sort();
    }
    groups
}

/// A team showing up across several different games. Picks within one game
/// already carry the heavier same-game warning and are not recounted here.
fn same_team_warnings(picks: &[Pick]) -> Vec<CorrelationWarning> {
    let mut by_team: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();
    for pick in picks {
        let game = game_key(pick);
        for team in [team_key(&pick.home), team_key(&pick.away)] {
            by_team
                .entry(team)
                .or_default()
                .entry(game.clone())
                .or_default()
                .push(pick.id.clone());
        }
    }

    let mut out = Vec::new();
    for (team, games) in &by_team {
        if games.len() < 2 {
            continue;
        }
        let mut ids: Vec<String> = games.values().flatten().cloned().collect();
        ids.sort();
        ids.dedup();
        out.push(CorrelationWarning {
            kind: CorrelationKind::SameTeam,
            severity: Severity::Medium,
            detail: format!("{team} appears in {} different games", games.len()),
            pick_ids: ids,
        });
    }
    out
}

fn directional_warnings(picks: &[Pick]) -> Vec<CorrelationWarning> {
    let mut out = Vec::new();

    let spreads: Vec<&Pick> = picks
        .iter()
        .filter(|p| p.bet_type == BetType::Spread && p.line.is_some())
        .collect();
    if spreads.len() >= DIRECTIONAL_MIN_PICKS {
        let favorites = spreads
            .iter()
            .filter(|p| p.line.unwrap_or(0.0) < 0.0)
            .count();
        let share = favorites as f64 / spreads.len() as f64;
        let (biased, label) = if share >= DIRECTIONAL_SHARE {
            (true, "favorites")
        } else if 1.0 - share >= DIRECTIONAL_SHARE {
            (true, "underdogs")
        } else {
            (false, "")
        };
        if biased {
            out.push(CorrelationWarning {
                kind: CorrelationKind::SpreadBias,
                severity: Severity::Medium,
                detail: format!(
                    "{:.0}% of {} spread picks are {label}",
                    share.max(1.0 - share) * 100.0,
                    spreads.len()
                ),
                pick_ids: sorted_ids(&spreads),
            });
        }
    }

    let totals: Vec<&Pick> = picks
        .iter()
        .filter(|p| p.bet_type == BetType::Total)
        .collect();
    if totals.len() >= DIRECTIONAL_MIN_PICKS {
        let overs = totals.iter().filter(|p| p.side == Side::Over).count();
        let share = overs as f64 / totals.len() as f64;
        let (biased, label) = if share >= DIRECTIONAL_SHARE {
            (true, "overs")
        } else if 1.0 - share >= DIRECTIONAL_SHARE {
            (true, "unders")
        } else {
            (false, "")
        };
        if biased {
            out.push(CorrelationWarning {
                kind: CorrelationKind::TotalBias,
                severity: Severity::Medium,
                detail: format!(
                    "{:.0}% of {} total picks are {label}",
                    share.max(1.0 - share) * 100.0,
                    totals.len()
                ),
                pick_ids: sorted_ids(&totals),
            });
        }
    }

    out
}

fn cluster_warnings(picks: &[Pick]) -> Vec<CorrelationWarning> {
    let mut out = Vec::new();

    let spreads: Vec<&Pick> = picks
        .iter()
        .filter(|p| p.bet_type == BetType::Spread && p.line.is_some())
        .collect();
    if spreads.len() >= CLUSTER_MIN_PICKS {
        let big = spreads
            .iter()
            .filter(|p| p.line.unwrap_or(0.0).abs() >= BIG_SPREAD_POINTS)
            .count();
        let share = big as f64 / spreads.len() as f64;
        if share >= CLUSTER_SHARE {
            out.push(CorrelationWarning {
                kind: CorrelationKind::SpreadCluster,
                severity: Severity::Low,
                detail: format!(
                    "{big} of {} spreads at {BIG_SPREAD_POINTS:.0}+ points",
                    spreads.len()
                ),
                pick_ids: sorted_ids(&spreads),
            });
        }
    }

    let total_lines: Vec<f64> = picks
        .iter()
        .filter(|p| p.bet_type == BetType::Total)
        .filter_map(|p| p.line)
        .collect();
    if total_lines.len() >= CLUSTER_MIN_PICKS {
        let mean = total_lines.iter().sum::<f64>() / total_lines.len() as f64;
        let variance = total_lines
            .iter()
            .map(|l| (l - mean).powi(2))
            .sum::<f64>()
            / total_lines.len() as f64;
        if variance < TOTAL_VARIANCE_FLOOR {
            let totals: Vec<&Pick> = picks
                .iter()
                .filter(|p| p.bet_type == BetType::Total && p.line.is_some())
                .collect();
            out.push(CorrelationWarning {
                kind: CorrelationKind::TotalCluster,
                severity: Severity::Low,
                detail: format!(
                    "{} totals bunched around {mean:.1} (variance {variance:.1})",
                    total_lines.len()
                ),
                pick_ids: sorted_ids(&totals),
            });
        }
    }

    out
}

fn sorted_ids(picks: &[&Pick]) -> Vec<String> {
    let mut ids: Vec<String> = picks.iter().map(|p| p.id.clone()).collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sport, Tier};

    fn pick(id: &str, home: &str, away: &str, bet_type: BetType, side: Side, line: f64) -> Pick {
        Pick {
            id: id.to_string(),
            recorded_at: "2026-01-01T00:00:00+00:00".to_string(),
            sport: Sport::Nba,
            home: home.to_string(),
            away: away.to_string(),
            bet_type,
            side,
            line: Some(line),
            odds: -110,
            book: None,
            confidence: 70,
            tier: Tier::PartialAlignment,
            signals: Vec::new(),
            result: None,
            closing_line: None,
            clv: None,
        }
    }

    #[test]
    fn same_game_pair_is_flagged_and_penalized() {
        let picks = vec![
            pick("p1", "Lakers", "Celtics", BetType::Spread, Side::Home, -3.0),
            pick("p2", "Lakers", "Celtics", BetType::Total, Side::Over, 215.0),
        ];
        let report = detect_correlation(&picks);
        assert!(report.has_correlation);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.kind == CorrelationKind::SameGame && w.severity == Severity::High)
        );
        assert_eq!(report.diversification, 100 - SAME_GAME_PENALTY);
    }

    #[test]
    fn shared_team_across_games_is_medium() {
        let picks = vec![
            pick("p1", "Lakers", "Celtics", BetType::Spread, Side::Home, -3.0),
            pick("p2", "Lakers", "Warriors", BetType::Spread, Side::Away, 4.0),
        ];
        let report = detect_correlation(&picks);
        let warning = report
            .warnings
            .iter()
            .find(|w| w.kind == CorrelationKind::SameTeam)
            .expect("same-team warning");
        assert_eq!(warning.severity, Severity::Medium);
        assert!(warning.detail.contains("LAKERS"));
    }

    #[test]
    fn heavy_favorite_slate_is_a_bias() {
        let picks = vec![
            pick("p1", "A", "B", BetType::Spread, Side::Home, -7.5),
            pick("p2", "C", "D", BetType::Spread, Side::Home, -9.0),
            pick("p3", "E", "F", BetType::Spread, Side::Away, -8.0),
        ];
        let report = detect_correlation(&picks);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.kind == CorrelationKind::SpreadBias)
        );
        // All three are also 7+ point spreads: clustering fires too.
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.kind == CorrelationKind::SpreadCluster)
        );
    }

    #[test]
    fn tight_total_lines_cluster() {
        let picks = vec![
            pick("p1", "A", "B", BetType::Total, Side::Over, 213.5),
            pick("p2", "C", "D", BetType::Total, Side::Over, 215.0),
            pick("p3", "E", "F", BetType::Total, Side::Under, 214.0),
        ];
        let report = detect_correlation(&picks);
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.kind == CorrelationKind::TotalCluster)
        );
    }

    #[test]
    fn detection_is_order_independent() {
        let mut picks = vec![
            pick("p1", "Lakers", "Celtics", BetType::Spread, Side::Home, -3.0),
            pick("p2", "Lakers", "Celtics", BetType::Total, Side::Over, 215.0),
            pick("p3", "Lakers", "Warriors", BetType::Spread, Side::Away, 4.0),
        ];
        let forward = detect_correlation(&picks);
        picks.reverse();
        let backward = detect_correlation(&picks);

        assert_eq!(forward.diversification, backward.diversification);
        assert_eq!(forward.warnings.len(), backward.warnings.len());
        for (a, b) in forward.warnings.iter().zip(&backward.warnings) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.pick_ids, b.pick_ids);
        }
    }

    #[test]
    fn empty_set_is_clean() {
        let report = detect_correlation(&[]);
        assert!(!report.has_correlation);
        assert_eq!(report.diversification, 100);
        assert_eq!(report.grade, ExposureGrade::Good);
        assert_eq!(report.stake_multiplier, 1.0);
    }

    #[test]
    fn grade_and_stake_step_together() {
        assert_eq!(grade_for(85), ExposureGrade::Good);
        assert_eq!(grade_for(70), ExposureGrade::Caution);
        assert_eq!(grade_for(40), ExposureGrade::Warning);
        assert_eq!(grade_for(10), ExposureGrade::Danger);
        assert_eq!(stake_multiplier_for(85), 1.0);
        assert_eq!(stake_multiplier_for(10), 0.5);
    }
}
