use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sport {
    Nba,
    Nfl,
    Mlb,
    Nhl,
    Ncaab,
}

impl Sport {
    pub fn code(&self) -> &'static str {
        match self {
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::Mlb => "MLB",
            Sport::Nhl => "NHL",
            Sport::Ncaab => "NCAAB",
        }
    }

    pub fn from_code(code: &str) -> Option<Sport> {
        match code.trim().to_ascii_uppercase().as_str() {
            "NBA" => Some(Sport::Nba),
            "NFL" => Some(Sport::Nfl),
            "MLB" => Some(Sport::Mlb),
            "NHL" => Some(Sport::Nhl),
            "NCAAB" => Some(Sport::Ncaab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetType {
    Spread,
    Total,
    Moneyline,
    Prop,
}

impl BetType {
    pub fn code(&self) -> &'static str {
        match self {
            BetType::Spread => "spread",
            BetType::Total => "total",
            BetType::Moneyline => "moneyline",
            BetType::Prop => "prop",
        }
    }

    pub fn from_code(code: &str) -> Option<BetType> {
        match code.trim().to_ascii_lowercase().as_str() {
            "spread" => Some(BetType::Spread),
            "total" => Some(BetType::Total),
            "moneyline" | "ml" => Some(BetType::Moneyline),
            "prop" => Some(BetType::Prop),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
    Over,
    Under,
}

impl Side {
    pub fn code(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
            Side::Over => "over",
            Side::Under => "under",
        }
    }

    pub fn from_code(code: &str) -> Option<Side> {
        match code.trim().to_ascii_lowercase().as_str() {
            "home" => Some(Side::Home),
            "away" => Some(Side::Away),
            "over" => Some(Side::Over),
            "under" => Some(Side::Under),
            _ => None,
        }
    }

    pub fn is_total_side(&self) -> bool {
        matches!(self, Side::Over | Side::Under)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SignalFamily {
    Market,
    Esoteric,
    Model,
}

impl SignalFamily {
    pub fn label(&self) -> &'static str {
        match self {
            SignalFamily::Market => "market",
            SignalFamily::Esoteric => "esoteric",
            SignalFamily::Model => "model",
        }
    }
}

/// Conviction tier from category alignment, distinct from raw confidence.
/// Variant order is rank order (best first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    GoldenConvergence,
    SuperSignal,
    HarmonicAlignment,
    PartialAlignment,
    Fragmented,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::GoldenConvergence => "GOLDEN_CONVERGENCE",
            Tier::SuperSignal => "SUPER_SIGNAL",
            Tier::HarmonicAlignment => "HARMONIC_ALIGNMENT",
            Tier::PartialAlignment => "PARTIAL_ALIGNMENT",
            Tier::Fragmented => "FRAGMENTED",
        }
    }

    pub fn from_label(label: &str) -> Option<Tier> {
        match label.trim().to_ascii_uppercase().as_str() {
            "GOLDEN_CONVERGENCE" => Some(Tier::GoldenConvergence),
            "SUPER_SIGNAL" => Some(Tier::SuperSignal),
            "HARMONIC_ALIGNMENT" => Some(Tier::HarmonicAlignment),
            "PARTIAL_ALIGNMENT" => Some(Tier::PartialAlignment),
            "FRAGMENTED" => Some(Tier::Fragmented),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Smash,
    Strong,
    Play,
    Lean,
    Pass,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Smash => "SMASH",
            Recommendation::Strong => "STRONG",
            Recommendation::Play => "PLAY",
            Recommendation::Lean => "LEAN",
            Recommendation::Pass => "PASS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryImpact {
    Minimal,
    Moderate,
    Significant,
    Severe,
}

impl InjuryImpact {
    pub fn points(&self) -> i32 {
        match self {
            InjuryImpact::Minimal => 1,
            InjuryImpact::Moderate => 2,
            InjuryImpact::Significant => 3,
            InjuryImpact::Severe => 5,
        }
    }

    pub fn from_label(label: &str) -> Option<InjuryImpact> {
        match label.trim().to_ascii_lowercase().as_str() {
            "minimal" | "questionable" => Some(InjuryImpact::Minimal),
            "moderate" | "doubtful" => Some(InjuryImpact::Moderate),
            "significant" | "out" => Some(InjuryImpact::Significant),
            "severe" | "out_star" => Some(InjuryImpact::Severe),
            _ => None,
        }
    }
}

/// The bet under evaluation. Lines are signed for the picked side (a
/// favorite lays a negative number, a dog receives a positive one).
#[derive(Debug, Clone)]
pub struct BetContext {
    pub bet_type: BetType,
    pub side: Side,
    pub line: Option<f64>,
    pub odds: Option<i32>,
    pub book: Option<String>,
}

impl BetContext {
    pub fn new(bet_type: BetType, side: Side) -> Self {
        Self {
            bet_type,
            side,
            line: None,
            odds: None,
            book: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookOdds {
    pub book: String,
    pub odds: i32,
}

/// Market splits and line history, all relative to the picked side.
#[derive(Debug, Clone, Default)]
pub struct MarketContext {
    pub ticket_pct: Option<f64>,
    pub money_pct: Option<f64>,
    pub opening_line: Option<f64>,
    pub current_line: Option<f64>,
    pub book_odds: Vec<BookOdds>,
}

#[derive(Debug, Clone)]
pub struct InjuryNote {
    pub team: String,
    pub player: String,
    pub impact: InjuryImpact,
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleContext {
    pub home_rest_days: Option<u32>,
    pub away_rest_days: Option<u32>,
    pub home_back_to_back: bool,
    pub away_back_to_back: bool,
}

/// Scores computed by an external model pipeline; passed through untouched.
#[derive(Debug, Clone, Default)]
pub struct ModelContext {
    pub consensus: Option<f64>,
    pub matchup: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ParlayContext {
    pub legs: u32,
    pub combined_decimal_odds: Option<f64>,
}

/// Everything the evaluators may look at for one candidate bet. Ephemeral;
/// built per call by the normalization adapter or directly by the caller.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub sport: Option<Sport>,
    pub home: String,
    pub away: String,
    pub venue: Option<String>,
    pub date: Option<NaiveDate>,
    pub bet: BetContext,
    pub market: MarketContext,
    pub injuries: Vec<InjuryNote>,
    pub schedule: Option<ScheduleContext>,
    pub model: ModelContext,
    pub parlay: Option<ParlayContext>,
}

impl GameContext {
    /// Minimal context for a bet type and side; every other field empty so
    /// evaluators fall back to their neutral defaults.
    pub fn bare(home: &str, away: &str, bet_type: BetType, side: Side) -> Self {
        Self {
            sport: None,
            home: home.to_string(),
            away: away.to_string(),
            venue: None,
            date: None,
            bet: BetContext::new(bet_type, side),
            market: MarketContext::default(),
            injuries: Vec::new(),
            schedule: None,
            model: ModelContext::default(),
            parlay: None,
        }
    }

    /// Team name the bet is on, where the bet is on a team at all.
    pub fn picked_team(&self) -> Option<&str> {
        match self.bet.side {
            Side::Home => Some(self.home.as_str()),
            Side::Away => Some(self.away.as_str()),
            Side::Over | Side::Under => None,
        }
    }

    pub fn opponent_team(&self) -> Option<&str> {
        match self.bet.side {
            Side::Home => Some(self.away.as_str()),
            Side::Away => Some(self.home.as_str()),
            Side::Over | Side::Under => None,
        }
    }
}

/// Raw output of one evaluator before the scorer attaches name and weight.
#[derive(Debug, Clone)]
pub struct SignalScore {
    pub score: f64,
    pub rationale: String,
}

impl SignalScore {
    pub fn new(score: f64, rationale: impl Into<String>) -> Self {
        Self {
            score: score.clamp(0.0, 100.0),
            rationale: rationale.into(),
        }
    }

    pub fn neutral(reason: &str) -> Self {
        Self {
            score: 50.0,
            rationale: format!("{reason}; neutral"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalResult {
    pub name: String,
    pub family: SignalFamily,
    pub score: f64,
    pub contribution: String,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct FamilyBreakdown {
    pub family: SignalFamily,
    pub average: f64,
    pub signals: usize,
}

#[derive(Debug, Clone)]
pub struct ScoringResult {
    pub confidence: u32,
    pub tier: Tier,
    pub recommendation: Recommendation,
    pub top_signals: Vec<SignalResult>,
    pub breakdown: Vec<FamilyBreakdown>,
    pub headline: &'static str,
}
