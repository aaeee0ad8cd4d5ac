use chrono::NaiveDate;
use serde_json::Value;

use crate::types::{
    BetContext, BookOdds, GameContext, InjuryImpact, InjuryNote, MarketContext, ModelContext,
    ParlayContext, ScheduleContext, Sport,
};

/// Build a fully-defaulted GameContext from a raw remote payload. The
/// upstream shapes drift (camelCase vs snake_case, strings where numbers
/// belong, team objects vs bare names), so every field is probed under its
/// known aliases and anything unreadable simply stays None — the evaluators
/// treat that as neutral. The bet itself is the caller's selection, not part
/// of the payload.
pub fn game_context_from_value(v: &Value, bet: BetContext) -> GameContext {
    GameContext {
        sport: first_of(v, &["sport", "sportCode", "sport_code", "league"])
            .and_then(as_str_any)
            .and_then(|code| Sport::from_code(&code)),
        home: first_of(v, &["home", "homeTeam", "home_team"])
            .and_then(team_name)
            .unwrap_or_default(),
        away: first_of(v, &["away", "awayTeam", "away_team"])
            .and_then(team_name)
            .unwrap_or_default(),
        venue: first_of(v, &["venue", "stadium"]).and_then(as_str_any),
        date: first_of(v, &["date", "commenceTime", "commence_time", "startTime"])
            .and_then(as_str_any)
            .and_then(|raw| parse_date(&raw)),
        bet,
        market: parse_market(v),
        injuries: parse_injuries(v),
        schedule: parse_schedule(v),
        model: parse_model(v),
        parlay: parse_parlay(v),
    }
}

fn parse_market(v: &Value) -> MarketContext {
    // Splits may sit under a market object or at the top level.
    let root = first_of(v, &["market", "splits"]).unwrap_or(v);

    let book_odds = first_of(root, &["books", "bookOdds", "book_odds", "odds"])
        .and_then(|b| b.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|entry| {
                    let book = first_of(entry, &["book", "bookmaker", "name"])
                        .and_then(as_str_any)?;
                    let odds = first_of(entry, &["odds", "price", "american"])
                        .and_then(as_f64_any)?;
                    Some(BookOdds {
                        book,
                        odds: odds.round() as i32,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    MarketContext {
        ticket_pct: first_of(root, &["ticketPct", "ticket_pct", "tickets"]).and_then(as_f64_any),
        money_pct: first_of(root, &["moneyPct", "money_pct", "money"]).and_then(as_f64_any),
        opening_line: first_of(root, &["openingLine", "opening_line", "openLine"])
            .and_then(as_f64_any),
        current_line: first_of(root, &["currentLine", "current_line"]).and_then(as_f64_any),
        book_odds,
    }
}

fn parse_injuries(v: &Value) -> Vec<InjuryNote> {
    let Some(arr) = v.get("injuries").and_then(|x| x.as_array()) else {
        return Vec::new();
    };
    arr.iter()
        .filter_map(|entry| {
            let team = first_of(entry, &["team", "teamName", "team_name"]).and_then(as_str_any)?;
            let player = first_of(entry, &["player", "name"]).and_then(as_str_any)?;
            let impact = first_of(entry, &["impact", "severity", "status"])
                .and_then(as_str_any)
                .and_then(|s| InjuryImpact::from_label(&s))?;
            Some(InjuryNote {
                team,
                player,
                impact,
            })
        })
        .collect()
}

fn parse_schedule(v: &Value) -> Option<ScheduleContext> {
    let root = first_of(v, &["schedule", "rest"])?;
    Some(ScheduleContext {
        home_rest_days: first_of(root, &["homeRestDays", "home_rest_days"])
            .and_then(as_f64_any)
            .map(|d| d.max(0.0) as u32),
        away_rest_days: first_of(root, &["awayRestDays", "away_rest_days"])
            .and_then(as_f64_any)
            .map(|d| d.max(0.0) as u32),
        home_back_to_back: first_of(root, &["homeBackToBack", "home_b2b"])
            .and_then(|x| x.as_bool())
            .unwrap_or(false),
        away_back_to_back: first_of(root, &["awayBackToBack", "away_b2b"])
            .and_then(|x| x.as_bool())
            .unwrap_or(false),
    })
}

fn parse_model(v: &Value) -> ModelContext {
    let Some(root) = first_of(v, &["model", "modelScores", "model_scores"]) else {
        return ModelContext::default();
    };
    ModelContext {
        consensus: first_of(root, &["consensus", "ensemble"]).and_then(as_f64_any),
        matchup: first_of(root, &["matchup", "matchupScore", "matchup_score"])
            .and_then(as_f64_any),
    }
}

fn parse_parlay(v: &Value) -> Option<ParlayContext> {
    let root = v.get("parlay")?;
    let legs = first_of(root, &["legs", "legCount", "leg_count"])
        .and_then(as_f64_any)
        .filter(|n| *n >= 1.0)?;
    Some(ParlayContext {
        legs: legs as u32,
        combined_decimal_odds: first_of(
            root,
            &["combinedDecimalOdds", "combined_decimal_odds", "combinedOdds"],
        )
        .and_then(as_f64_any),
    })
}

fn first_of<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| v.get(k)).filter(|x| !x.is_null())
}

/// Team fields arrive either as a bare name or an object carrying one.
fn team_name(v: &Value) -> Option<String> {
    if let Some(s) = v.as_str() {
        let trimmed = s.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    first_of(v, &["longName", "name", "team"]).and_then(as_str_any)
}

fn as_str_any(v: &Value) -> Option<String> {
    if let Some(s) = v.as_str() {
        let trimmed = s.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    if v.is_number() {
        return Some(v.to_string());
    }
    None
}

/// Number, or a numeric string with optional percent sign and commas.
fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    let s = v.as_str()?.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    s.trim_end_matches('%').replace(',', "").parse::<f64>().ok()
}

/// Dates arrive as `YYYY-MM-DD` or a full timestamp with that prefix.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let head = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}
