use crate::clv::implied_prob;
use crate::types::{BetType, GameContext, Side, SignalScore, Sport};

// Divergence (money% minus ticket%) at which the sharp read kicks in.
const SHARP_DIVERGENCE_PP: f64 = 15.0;

// Line move (points, toward the pick getting more expensive) that counts as
// steam when the ticket majority sits on the other side.
const RLM_MIN_MOVE: f64 = 0.5;
const RLM_MAX_TICKET_PCT: f64 = 45.0;

/// Ticket/money divergence. Money share outrunning ticket share on the picked
/// side reads as sharp backing; score scales with the divergence and never
/// decreases as the divergence grows.
pub fn sharp_money(ctx: &GameContext) -> SignalScore {
    let (Some(ticket), Some(money)) = (ctx.market.ticket_pct, ctx.market.money_pct) else {
        return SignalScore::neutral("no ticket/money split");
    };

    let divergence = money - ticket;
    let score = if divergence >= SHARP_DIVERGENCE_PP {
        (60.0 + (divergence - SHARP_DIVERGENCE_PP) * 1.4).min(95.0)
    } else if divergence >= 0.0 {
        50.0 + divergence * 0.4
    } else {
        (50.0 + divergence * 0.8).max(12.0)
    };

    SignalScore::new(
        score,
        format!(
            "{ticket:.0}% tickets vs {money:.0}% money ({divergence:+.0} pp divergence)"
        ),
    )
}

/// Reverse line movement: the number moved toward the pick getting more
/// expensive while the ticket majority leaned the other way.
pub fn line_movement(ctx: &GameContext) -> SignalScore {
    let (Some(opening), Some(current)) = (ctx.market.opening_line, ctx.market.current_line) else {
        return SignalScore::neutral("no line history");
    };
    let Some(ticket) = ctx.market.ticket_pct else {
        return SignalScore::neutral("no ticket split for line move");
    };

    // Lines are signed for the picked side, so a drop means steam on the pick.
    let move_toward = opening - current;
    let score = if ticket <= RLM_MAX_TICKET_PCT && move_toward >= RLM_MIN_MOVE {
        (62.0 + (move_toward - RLM_MIN_MOVE) * 6.0).min(90.0)
    } else if move_toward > 0.0 {
        (50.0 + move_toward * 4.0).min(62.0)
    } else {
        (50.0 + move_toward * 4.0).max(25.0)
    };

    SignalScore::new(
        score,
        format!(
            "line {opening:+.1} -> {current:+.1} with {ticket:.0}% tickets on this side"
        ),
    )
}

/// Price on the picked side versus the across-book median price, in implied
/// probability points. Cheaper than the market consensus scores above neutral.
pub fn line_value(ctx: &GameContext) -> SignalScore {
    let Some(our_odds) = ctx.bet.odds else {
        return SignalScore::neutral("no entry odds");
    };
    let Some(ours) = implied_prob(our_odds) else {
        return SignalScore::neutral("entry odds out of range");
    };

    let mut probs: Vec<f64> = ctx
        .market
        .book_odds
        .iter()
        .filter_map(|b| implied_prob(b.odds))
        .collect();
    if probs.is_empty() {
        return SignalScore::neutral("no book prices to compare");
    }
    let Some(market) = median_f64(&mut probs) else {
        return SignalScore::neutral("no book prices to compare");
    };

    let edge_pp = (market - ours) * 100.0;
    let score = (50.0 + edge_pp * 5.0).clamp(10.0, 92.0);

    SignalScore::new(
        score,
        format!(
            "{our_odds:+} vs market median {:.1}% implied ({edge_pp:+.1} pp edge)",
            market * 100.0
        ),
    )
}

/// Spread magnitude landing on a historically frequent margin for the sport.
/// Receiving a key number is worth more than laying through it.
pub fn key_number(ctx: &GameContext) -> SignalScore {
    if ctx.bet.bet_type != BetType::Spread {
        return SignalScore::neutral("key numbers apply to spreads only");
    }
    let Some(line) = ctx.bet.line else {
        return SignalScore::neutral("no spread line");
    };
    let Some(sport) = ctx.sport else {
        return SignalScore::neutral("no sport for key numbers");
    };

    let keys = key_margins(sport);
    let magnitude = line.abs();
    let receiving = line > 0.0;

    let Some(key) = keys
        .iter()
        .copied()
        .find(|k| (magnitude - k).abs() <= 0.5)
    else {
        return SignalScore::new(50.0, format!("{magnitude:.1} is off the key numbers"));
    };

    let exact = (magnitude - key).abs() < f64::EPSILON;
    let score = match (receiving, exact) {
        (true, true) => 80.0,
        (true, false) => 68.0,
        (false, true) => 55.0,
        (false, false) => 52.0,
    };

    SignalScore::new(
        score,
        format!(
            "{} {magnitude:.1} on key margin {key:.0}",
            if receiving { "getting" } else { "laying" }
        ),
    )
}

/// Injury burden differential between the opponent and the picked team,
/// through a monotonic step function. Totals have no directional read.
pub fn injury_impact(ctx: &GameContext) -> SignalScore {
    if ctx.bet.side.is_total_side() {
        return SignalScore::neutral("injuries are not directional for totals");
    }
    if ctx.injuries.is_empty() {
        return SignalScore::neutral("no injury report");
    }
    let Some(ours) = ctx.picked_team() else {
        return SignalScore::neutral("no picked team");
    };

    let our_key = team_key(ours);
    let mut own = 0i32;
    let mut theirs = 0i32;
    for note in &ctx.injuries {
        if team_key(&note.team) == our_key {
            own += note.impact.points();
        } else {
            theirs += note.impact.points();
        }
    }

    let diff = theirs - own;
    let score = match diff {
        d if d >= 6 => 85.0,
        d if d >= 4 => 75.0,
        d if d >= 2 => 65.0,
        d if d >= 1 => 58.0,
        0 => 50.0,
        d if d >= -1 => 42.0,
        d if d >= -3 => 35.0,
        d if d >= -5 => 25.0,
        _ => 15.0,
    };

    SignalScore::new(
        score,
        format!("opponent injury burden {theirs} vs own {own} ({diff:+})"),
    )
}

/// Rest-day differential and back-to-back flags for the picked team.
pub fn rest_fatigue(ctx: &GameContext) -> SignalScore {
    if ctx.bet.side.is_total_side() {
        return SignalScore::neutral("rest edge is not directional for totals");
    }
    let Some(schedule) = ctx.schedule.as_ref() else {
        return SignalScore::neutral("no schedule data");
    };

    let (own_rest, opp_rest, own_b2b, opp_b2b) = match ctx.bet.side {
        Side::Home => (
            schedule.home_rest_days,
            schedule.away_rest_days,
            schedule.home_back_to_back,
            schedule.away_back_to_back,
        ),
        _ => (
            schedule.away_rest_days,
            schedule.home_rest_days,
            schedule.away_back_to_back,
            schedule.home_back_to_back,
        ),
    };
    let (Some(own_rest), Some(opp_rest)) = (own_rest, opp_rest) else {
        return SignalScore::neutral("rest days unknown");
    };

    let diff = own_rest as i32 - opp_rest as i32;
    let mut score: f64 = match diff {
        d if d >= 3 => 72.0,
        2 => 66.0,
        1 => 58.0,
        0 => 50.0,
        -1 => 42.0,
        -2 => 34.0,
        _ => 28.0,
    };
    if opp_b2b {
        score += 8.0;
    }
    if own_b2b {
        score -= 8.0;
    }

    SignalScore::new(
        score.clamp(15.0, 85.0),
        format!(
            "rest {own_rest}d vs {opp_rest}d{}{}",
            if opp_b2b { ", opponent on b2b" } else { "" },
            if own_b2b { ", own side on b2b" } else { "" }
        ),
    )
}

/// Contrarian read on ticket share: being against a heavy public side scores
/// up, riding with it scores down. Monotone decreasing in own ticket share.
pub fn public_fade(ctx: &GameContext) -> SignalScore {
    let Some(ticket) = ctx.market.ticket_pct else {
        return SignalScore::neutral("no ticket split");
    };

    let score = match ticket {
        t if t <= 20.0 => 78.0,
        t if t <= 30.0 => 70.0,
        t if t <= 40.0 => 60.0,
        t if t <= 60.0 => 50.0,
        t if t <= 70.0 => 42.0,
        t if t <= 80.0 => 34.0,
        _ => 28.0,
    };

    SignalScore::new(
        score,
        format!("{ticket:.0}% of tickets on this side"),
    )
}

fn key_margins(sport: Sport) -> &'static [f64] {
    match sport {
        Sport::Nfl | Sport::Ncaab => &[3.0, 7.0, 10.0, 6.0, 14.0],
        Sport::Nba => &[2.0, 5.0, 7.0],
        Sport::Mlb | Sport::Nhl => &[1.5],
    }
}

pub(crate) fn team_key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

pub(crate) fn median_f64(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
