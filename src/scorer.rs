use std::cmp::Ordering;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::esoteric_signals;
use crate::market_signals;
use crate::types::{
    BetType, FamilyBreakdown, GameContext, Recommendation, ScoringResult, SignalFamily,
    SignalResult, SignalScore, Tier,
};

// A family counts as "aligned" when its unweighted average reaches this.
const ALIGNED_AVG: f64 = 60.0;

const HARMONIC_MIN_CONFIDENCE: u32 = 75;
const PARTIAL_MIN_CONFIDENCE: u32 = 65;

// Headline options cycled by confidence value. Selection is a stated rule:
// the same confidence always maps to the same headline, so re-rendering a
// card never flickers its copy.
const HEADLINES: [&str; 6] = [
    "Edge detected",
    "Signals stacking",
    "Market leaning in",
    "Convergence forming",
    "The numbers agree",
    "Alignment building",
];

pub struct EvaluatorSpec {
    pub name: &'static str,
    pub family: SignalFamily,
    applies: fn(&GameContext) -> bool,
    eval: fn(&GameContext) -> SignalScore,
}

fn always(_: &GameContext) -> bool {
    true
}

fn spreads_only(ctx: &GameContext) -> bool {
    ctx.bet.bet_type == BetType::Spread
}

fn multi_leg_only(ctx: &GameContext) -> bool {
    ctx.parlay.is_some()
}

fn model_consensus(ctx: &GameContext) -> SignalScore {
    match ctx.model.consensus {
        Some(v) => SignalScore::new(v, format!("ensemble model {v:.0}/100")),
        None => SignalScore::neutral("no ensemble score"),
    }
}

fn model_matchup(ctx: &GameContext) -> SignalScore {
    match ctx.model.matchup {
        Some(v) => SignalScore::new(v, format!("matchup model {v:.0}/100")),
        None => SignalScore::neutral("no matchup score"),
    }
}

/// Declaration order is the registration order and the final tie-break for
/// top-signal sorting, so it must stay stable.
pub static REGISTRY: &[EvaluatorSpec] = &[
    EvaluatorSpec {
        name: "sharp_money",
        family: SignalFamily::Market,
        applies: always,
        eval: market_signals::sharp_money,
    },
    EvaluatorSpec {
        name: "line_movement",
        family: SignalFamily::Market,
        applies: always,
        eval: market_signals::line_movement,
    },
    EvaluatorSpec {
        name: "line_value",
        family: SignalFamily::Market,
        applies: always,
        eval: market_signals::line_value,
    },
    EvaluatorSpec {
        name: "key_number",
        family: SignalFamily::Market,
        applies: spreads_only,
        eval: market_signals::key_number,
    },
    EvaluatorSpec {
        name: "injury_impact",
        family: SignalFamily::Market,
        applies: always,
        eval: market_signals::injury_impact,
    },
    EvaluatorSpec {
        name: "rest_fatigue",
        family: SignalFamily::Market,
        applies: always,
        eval: market_signals::rest_fatigue,
    },
    EvaluatorSpec {
        name: "public_fade",
        family: SignalFamily::Market,
        applies: always,
        eval: market_signals::public_fade,
    },
    EvaluatorSpec {
        name: "team_cipher",
        family: SignalFamily::Esoteric,
        applies: always,
        eval: esoteric_signals::team_cipher,
    },
    EvaluatorSpec {
        name: "lunar_phase",
        family: SignalFamily::Esoteric,
        applies: always,
        eval: esoteric_signals::lunar_phase_signal,
    },
    EvaluatorSpec {
        name: "life_path",
        family: SignalFamily::Esoteric,
        applies: always,
        eval: esoteric_signals::life_path_signal,
    },
    EvaluatorSpec {
        name: "vortex_sync",
        family: SignalFamily::Esoteric,
        applies: multi_leg_only,
        eval: esoteric_signals::vortex_sync,
    },
    EvaluatorSpec {
        name: "model_consensus",
        family: SignalFamily::Model,
        applies: always,
        eval: model_consensus,
    },
    EvaluatorSpec {
        name: "model_matchup",
        family: SignalFamily::Model,
        applies: always,
        eval: model_matchup,
    },
];

static DEFAULT_WEIGHTS: Lazy<WeightTable> = Lazy::new(|| {
    WeightTable::from_pairs(&[
        ("sharp_money", 25),
        ("line_movement", 15),
        ("line_value", 20),
        ("key_number", 12),
        ("injury_impact", 15),
        ("rest_fatigue", 10),
        ("public_fade", 12),
        ("team_cipher", 8),
        ("lunar_phase", 5),
        ("life_path", 5),
        ("vortex_sync", 6),
        ("model_consensus", 20),
        ("model_matchup", 15),
    ])
});

/// Immutable signal-name -> weight mapping. Unknown names are carried but
/// never consulted; negative inputs clamp to zero at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTable {
    weights: BTreeMap<String, u32>,
}

impl WeightTable {
    pub fn builtin() -> &'static WeightTable {
        &DEFAULT_WEIGHTS
    }

    pub fn from_pairs(pairs: &[(&str, i64)]) -> WeightTable {
        let weights = pairs
            .iter()
            .map(|(name, w)| (name.to_string(), (*w).max(0) as u32))
            .collect();
        WeightTable { weights }
    }

    /// Pure override combinator: returns a new table, the source is never
    /// touched. This is how backtests substitute what-if weights.
    pub fn with_override(&self, name: &str, weight: u32) -> WeightTable {
        let mut weights = self.weights.clone();
        weights.insert(name.to_string(), weight);
        WeightTable { weights }
    }

    pub fn weight_of(&self, name: &str) -> u32 {
        self.weights.get(name).copied().unwrap_or(0)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.weights.keys().map(String::as_str)
    }
}

pub struct Scorer {
    weights: WeightTable,
}

impl Scorer {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self::new(WeightTable::builtin().clone())
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    /// Run every applicable evaluator and combine. Never fails: evaluators
    /// degrade to neutral on missing data, and an all-zero weight table
    /// yields a flat 50.
    pub fn score(&self, ctx: &GameContext) -> ScoringResult {
        let mut results: Vec<SignalResult> = Vec::with_capacity(REGISTRY.len());
        for spec in REGISTRY {
            if !(spec.applies)(ctx) {
                continue;
            }
            let raw = (spec.eval)(ctx);
            results.push(SignalResult {
                name: spec.name.to_string(),
                family: spec.family,
                score: raw.score,
                contribution: raw.rationale,
                weight: self.weights.weight_of(spec.name),
            });
        }

        let confidence = weighted_confidence(results.iter().map(|r| (r.score, r.weight)));
        let breakdown = family_averages(results.iter().map(|r| (r.family, r.score)));
        let aligned = aligned_count(&breakdown);
        let tier = tier_for(confidence, aligned);
        let recommendation = recommendation_for(confidence);

        let mut top_signals = results;
        sort_signals(&mut top_signals);

        ScoringResult {
            confidence,
            tier,
            recommendation,
            top_signals,
            breakdown,
            headline: headline_for(confidence),
        }
    }
}

/// round(sum(score*w) / sum(w)) over weighted entries; 50 when nothing
/// carries weight.
pub fn weighted_confidence(entries: impl Iterator<Item = (f64, u32)>) -> u32 {
    let mut num = 0.0_f64;
    let mut den = 0u64;
    for (score, weight) in entries {
        if weight == 0 {
            continue;
        }
        num += score * weight as f64;
        den += weight as u64;
    }
    if den == 0 {
        return 50;
    }
    (num / den as f64).round().clamp(0.0, 100.0) as u32
}

/// Unweighted per-family averages in fixed family order; families with no
/// applicable signal report zero signals and cannot align.
pub fn family_averages(
    signals: impl Iterator<Item = (SignalFamily, f64)>,
) -> Vec<FamilyBreakdown> {
    let mut sums = BTreeMap::new();
    for (family, score) in signals {
        let entry = sums.entry(family).or_insert((0.0_f64, 0usize));
        entry.0 += score;
        entry.1 += 1;
    }

    [SignalFamily::Market, SignalFamily::Esoteric, SignalFamily::Model]
        .into_iter()
        .map(|family| {
            let (sum, count) = sums.get(&family).copied().unwrap_or((0.0, 0));
            FamilyBreakdown {
                family,
                average: if count > 0 { sum / count as f64 } else { 0.0 },
                signals: count,
            }
        })
        .collect()
}

pub fn aligned_count(breakdown: &[FamilyBreakdown]) -> usize {
    breakdown
        .iter()
        .filter(|b| b.signals > 0 && b.average >= ALIGNED_AVG)
        .count()
}

/// Tier ladder: three aligned families override raw confidence entirely,
/// two take the next rung, anything less falls back to confidence bands.
pub fn tier_for(confidence: u32, aligned_families: usize) -> Tier {
    match aligned_families {
        n if n >= 3 => Tier::GoldenConvergence,
        2 => Tier::SuperSignal,
        _ if confidence >= HARMONIC_MIN_CONFIDENCE => Tier::HarmonicAlignment,
        _ if confidence >= PARTIAL_MIN_CONFIDENCE => Tier::PartialAlignment,
        _ => Tier::Fragmented,
    }
}

pub fn recommendation_for(confidence: u32) -> Recommendation {
    match confidence {
        c if c >= 80 => Recommendation::Smash,
        c if c >= 72 => Recommendation::Strong,
        c if c >= 65 => Recommendation::Play,
        c if c >= 58 => Recommendation::Lean,
        _ => Recommendation::Pass,
    }
}

/// Stable headline per confidence value, cycling the fixed option list.
pub fn headline_for(confidence: u32) -> &'static str {
    HEADLINES[confidence as usize % HEADLINES.len()]
}

/// Score desc, then declared weight desc; the stable sort keeps registry
/// order for full ties.
pub fn sort_signals(signals: &mut [SignalResult]) {
    signals.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(b.weight.cmp(&a.weight))
    });
}
