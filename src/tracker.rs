use anyhow::{Result, bail};

use crate::clv::clv_for;
use crate::pick::{Pick, PickDraft, PickResult, generate_pick_id, now_rfc3339};
use crate::store::PickStore;

/// Validate the draft, stamp id and timestamp, persist, and hand back the
/// stored record. The returned pick is authoritative for this call even if
/// the backing store silently dropped the write.
pub fn record_pick(store: &dyn PickStore, draft: PickDraft) -> Result<Pick> {
    if draft.home.trim().is_empty() || draft.away.trim().is_empty() {
        bail!("pick needs both team names");
    }
    if draft.odds > -100 && draft.odds < 100 {
        bail!("invalid American odds {}", draft.odds);
    }

    let pick = Pick {
        id: generate_pick_id(),
        recorded_at: now_rfc3339(),
        sport: draft.sport,
        home: draft.home,
        away: draft.away,
        bet_type: draft.bet_type,
        side: draft.side,
        line: draft.line,
        odds: draft.odds,
        book: draft.book,
        confidence: draft.confidence,
        tier: draft.tier,
        signals: draft.signals,
        result: None,
        closing_line: None,
        clv: None,
    };
    store.put(&pick);
    Ok(pick)
}

/// Set the outcome on a stored pick. Unknown ids are a benign no-op (None).
/// Re-grading overwrites, last write wins, so corrections are one more call.
pub fn grade_pick(store: &dyn PickStore, id: &str, result: PickResult) -> Option<Pick> {
    let mut pick = store.get(id)?;
    pick.result = Some(result);
    if let Some(closing) = pick.closing_line {
        pick.clv = clv_for(pick.bet_type, pick.side, pick.line, pick.odds, closing);
    }
    store.put(&pick);
    Some(pick)
}

/// Record the closing number and derive CLV from the stored entry price.
/// For moneyline picks pass the closing American odds.
pub fn record_closing_line(store: &dyn PickStore, id: &str, closing_line: f64) -> Option<Pick> {
    let mut pick = store.get(id)?;
    pick.closing_line = Some(closing_line);
    pick.clv = clv_for(pick.bet_type, pick.side, pick.line, pick.odds, closing_line);
    store.put(&pick);
    Some(pick)
}

/// Explicit bulk wipe; the only way picks ever leave the store.
pub fn clear_history(store: &dyn PickStore) {
    store.clear();
}
