use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{BetType, Side, SignalFamily, SignalResult, Sport, Tier};

// How many of the top signals survive onto the stored pick.
pub const SNAPSHOT_SIGNALS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickResult {
    Win,
    Loss,
    Push,
}

impl PickResult {
    pub fn code(&self) -> &'static str {
        match self {
            PickResult::Win => "WIN",
            PickResult::Loss => "LOSS",
            PickResult::Push => "PUSH",
        }
    }

    pub fn from_code(code: &str) -> Option<PickResult> {
        match code.trim().to_ascii_uppercase().as_str() {
            "WIN" => Some(PickResult::Win),
            "LOSS" => Some(PickResult::Loss),
            "PUSH" => Some(PickResult::Push),
            _ => None,
        }
    }
}

/// The slice of a SignalResult that is worth persisting with a pick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSnapshot {
    pub name: String,
    pub family: SignalFamily,
    pub score: f64,
    pub weight: u32,
}

impl From<&SignalResult> for SignalSnapshot {
    fn from(r: &SignalResult) -> Self {
        Self {
            name: r.name.clone(),
            family: r.family,
            score: r.score,
            weight: r.weight,
        }
    }
}

/// A tracked pick. Created ungraded; the grader sets `result`, the closing
/// line recorder sets `closing_line` and `clv`. The store owns these rows,
/// the scorer never sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    pub id: String,
    pub recorded_at: String,
    pub sport: Sport,
    pub home: String,
    pub away: String,
    pub bet_type: BetType,
    pub side: Side,
    pub line: Option<f64>,
    pub odds: i32,
    pub book: Option<String>,
    pub confidence: u32,
    pub tier: Tier,
    pub signals: Vec<SignalSnapshot>,
    #[serde(default)]
    pub result: Option<PickResult>,
    #[serde(default)]
    pub closing_line: Option<f64>,
    #[serde(default)]
    pub clv: Option<f64>,
}

impl Pick {
    pub fn is_graded(&self) -> bool {
        self.result.is_some()
    }

    /// Flat-stake profit in units for a graded pick, from its American odds.
    pub fn profit_units(&self) -> Option<f64> {
        match self.result? {
            PickResult::Win => {
                if self.odds >= 100 {
                    Some(self.odds as f64 / 100.0)
                } else if self.odds <= -100 {
                    Some(100.0 / -self.odds as f64)
                } else {
                    None
                }
            }
            PickResult::Loss => Some(-1.0),
            PickResult::Push => Some(0.0),
        }
    }
}

/// What the caller supplies when tracking a recommendation; the recorder
/// stamps id and timestamp and fills the lifecycle fields.
#[derive(Debug, Clone)]
pub struct PickDraft {
    pub sport: Sport,
    pub home: String,
    pub away: String,
    pub bet_type: BetType,
    pub side: Side,
    pub line: Option<f64>,
    pub odds: i32,
    pub book: Option<String>,
    pub confidence: u32,
    pub tier: Tier,
    pub signals: Vec<SignalSnapshot>,
}

/// The strongest signals from a scoring pass, in display order, trimmed to
/// what a stored pick keeps.
pub fn snapshot_top_signals(signals: &[SignalResult]) -> Vec<SignalSnapshot> {
    signals
        .iter()
        .take(SNAPSHOT_SIGNALS)
        .map(SignalSnapshot::from)
        .collect()
}

/// Time-based id with a short random suffix. Unique enough for a per-user
/// pick history; not a cryptographic identifier.
pub fn generate_pick_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!("pick_{millis}_{suffix}")
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
