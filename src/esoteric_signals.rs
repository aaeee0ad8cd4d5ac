use crate::cipher::{
    LunarPhase, chaldean_value, life_path, lunar_phase, mod9_root, ordinal_value, reduce_to_digit,
};
use crate::types::{GameContext, Side, SignalScore};

// Reduced cipher value treated as the "optimal" resonance target.
const OPTIMAL_CIPHER: u32 = 8;

const TESLA_NUMBERS: [u32; 3] = [3, 6, 9];

/// Cipher proximity of the picked team's name to the optimal constant,
/// relative to the opponent. Totals read the combined name of the matchup
/// instead. Needs nothing but the names, so it always produces an opinion.
pub fn team_cipher(ctx: &GameContext) -> SignalScore {
    if ctx.home.trim().is_empty() && ctx.away.trim().is_empty() {
        return SignalScore::neutral("no team names");
    }

    match ctx.bet.side {
        Side::Home | Side::Away => {
            let ours = ctx.picked_team().unwrap_or_default();
            let theirs = ctx.opponent_team().unwrap_or_default();
            let our_dist = dist(reduced_of(ours));
            let their_dist = dist(reduced_of(theirs));

            // Closer to optimal than the opponent scores up, 4 points per step.
            let score = 50.0 + (their_dist as f64 - our_dist as f64) * 4.0;
            SignalScore::new(
                score.clamp(20.0, 80.0),
                format!(
                    "{} resonance {} vs {} resonance {} (target {OPTIMAL_CIPHER})",
                    ours,
                    reduced_of(ours),
                    theirs,
                    reduced_of(theirs)
                ),
            )
        }
        Side::Over | Side::Under => {
            let combined = format!("{}{}", ctx.home, ctx.away);
            let reduced = reduce_to_digit(ordinal_value(&combined));
            let harmonic = is_master(reduced) || reduced == OPTIMAL_CIPHER;
            let score = match (harmonic, ctx.bet.side) {
                (true, Side::Over) => 72.0,
                (true, Side::Under) => 38.0,
                (false, Side::Over) => 48.0,
                (false, Side::Under) => 54.0,
                _ => 50.0,
            };
            SignalScore::new(
                score,
                format!("combined matchup cipher reduces to {reduced}"),
            )
        }
    }
}

/// Fixed score table over the 8-phase cycle of the game date.
pub fn lunar_phase_signal(ctx: &GameContext) -> SignalScore {
    let Some(date) = ctx.date else {
        return SignalScore::neutral("no game date for lunar phase");
    };

    let phase = lunar_phase(date);
    let score = match phase {
        LunarPhase::FullMoon => 74.0,
        LunarPhase::NewMoon => 66.0,
        LunarPhase::FirstQuarter | LunarPhase::LastQuarter => 58.0,
        LunarPhase::WaxingGibbous => 54.0,
        LunarPhase::WaxingCrescent | LunarPhase::WaningCrescent => 48.0,
        LunarPhase::WaningGibbous => 44.0,
    };

    SignalScore::new(score, format!("game lands on a {}", phase.label()))
}

/// Life path number of the game date through a fixed table; master numbers
/// score highest.
pub fn life_path_signal(ctx: &GameContext) -> SignalScore {
    let Some(date) = ctx.date else {
        return SignalScore::neutral("no game date for life path");
    };

    let path = life_path(date);
    let score = match path {
        33 => 90.0,
        22 => 86.0,
        11 => 82.0,
        8 => 72.0,
        3 | 6 | 9 => 66.0,
        1 | 5 | 7 => 54.0,
        2 | 4 => 46.0,
        _ => 50.0,
    };

    SignalScore::new(score, format!("date life path {path}"))
}

/// Tesla 3/6/9 check for multi-leg tickets: leg count and the digit root of
/// the combined decimal price, both under mod-9 reduction.
pub fn vortex_sync(ctx: &GameContext) -> SignalScore {
    let Some(parlay) = ctx.parlay.as_ref() else {
        return SignalScore::neutral("single-leg ticket");
    };

    let legs_root = mod9_root(parlay.legs as u64);
    let legs_hit = TESLA_NUMBERS.contains(&legs_root);

    let odds_root = parlay
        .combined_decimal_odds
        .filter(|o| *o > 0.0)
        .map(|o| mod9_root((o * 100.0).round() as u64));
    let odds_hit = odds_root.is_some_and(|r| TESLA_NUMBERS.contains(&r));

    let score = match (legs_hit, odds_hit) {
        (true, true) => 90.0,
        (true, false) => 70.0,
        (false, true) => 64.0,
        (false, false) => 42.0,
    };

    let odds_part = match odds_root {
        Some(r) => format!(", combined odds root {r}"),
        None => String::new(),
    };
    SignalScore::new(
        score,
        format!("{} legs root {legs_root}{odds_part}", parlay.legs),
    )
}

/// Both letter tables vote; the reduction closer to the target wins. Keeps a
/// single team from flipping value because one table disagrees.
fn reduced_of(name: &str) -> u32 {
    let ord = reduce_to_digit(ordinal_value(name));
    let cha = reduce_to_digit(chaldean_value(name));
    if dist(cha) < dist(ord) { cha } else { ord }
}

fn dist(reduced: u32) -> u32 {
    if is_master(reduced) {
        0
    } else {
        reduced.abs_diff(OPTIMAL_CIPHER)
    }
}

fn is_master(n: u32) -> bool {
    matches!(n, 11 | 22 | 33)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BetType, GameContext, ParlayContext};
    use chrono::NaiveDate;

    #[test]
    fn team_cipher_works_from_names_alone() {
        let ctx = GameContext::bare("Lakers", "Celtics", BetType::Moneyline, Side::Home);
        let s = team_cipher(&ctx);
        assert!((0.0..=100.0).contains(&s.score));
        assert_ne!(s.rationale, "");
        // Deterministic on repeat calls.
        assert_eq!(team_cipher(&ctx).score, s.score);
    }

    #[test]
    fn date_signals_default_without_date() {
        let ctx = GameContext::bare("A", "B", BetType::Spread, Side::Home);
        assert_eq!(lunar_phase_signal(&ctx).score, 50.0);
        assert_eq!(life_path_signal(&ctx).score, 50.0);
    }

    #[test]
    fn life_path_table_prefers_master_numbers() {
        // 2009-09-11: (2+0+0+9)+(9)+(1+1) = 22, a master number.
        let mut ctx = GameContext::bare("A", "B", BetType::Spread, Side::Home);
        ctx.date = NaiveDate::from_ymd_opt(2009, 9, 11);
        assert_eq!(life_path_signal(&ctx).score, 86.0);
    }

    #[test]
    fn vortex_rewards_tesla_leg_counts() {
        let mut ctx = GameContext::bare("A", "B", BetType::Prop, Side::Home);
        assert_eq!(vortex_sync(&ctx).score, 50.0);

        ctx.parlay = Some(ParlayContext {
            legs: 3,
            combined_decimal_odds: None,
        });
        let three = vortex_sync(&ctx).score;

        ctx.parlay = Some(ParlayContext {
            legs: 4,
            combined_decimal_odds: None,
        });
        let four = vortex_sync(&ctx).score;
        assert!(three > four);

        // 3 legs at 5.94 combined: 594 -> root 9, full sync.
        ctx.parlay = Some(ParlayContext {
            legs: 3,
            combined_decimal_odds: Some(5.94),
        });
        assert_eq!(vortex_sync(&ctx).score, 90.0);
    }
}
