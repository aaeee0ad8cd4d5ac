use crate::types::{BetType, Side};

/// Implied win probability of an American price. Odds inside (-100, 100) are
/// not valid American odds (0 included) and return None rather than dividing
/// into nonsense.
pub fn implied_prob(odds: i32) -> Option<f64> {
    if odds >= 100 {
        Some(100.0 / (odds as f64 + 100.0))
    } else if odds <= -100 {
        let o = -odds as f64;
        Some(o / (o + 100.0))
    } else {
        None
    }
}

/// Spread CLV with both lines signed for the picked side: positive when the
/// number moved away from the entry price (entry -3 closing -5 => +2.0, the
/// bettor laid fewer points than the close demanded).
pub fn spread_clv(entry_line: f64, closing_line: f64) -> f64 {
    entry_line - closing_line
}

/// Total CLV: the Over wants the lowest number, the Under the highest.
pub fn total_clv(side: Side, entry_line: f64, closing_line: f64) -> Option<f64> {
    match side {
        Side::Over => Some(closing_line - entry_line),
        Side::Under => Some(entry_line - closing_line),
        Side::Home | Side::Away => None,
    }
}

/// Moneyline CLV in implied-probability points: positive when the market
/// closed tighter on the picked side than the entry price, i.e. the closing
/// implied probability exceeds the entry implied probability.
pub fn moneyline_clv(entry_odds: i32, closing_odds: i32) -> Option<f64> {
    let entry = implied_prob(entry_odds)?;
    let closing = implied_prob(closing_odds)?;
    Some((closing - entry) * 100.0)
}

/// CLV for a recorded pick given its closing number. For moneyline picks the
/// closing "line" is the closing American price.
pub fn clv_for(
    bet_type: BetType,
    side: Side,
    entry_line: Option<f64>,
    entry_odds: i32,
    closing_line: f64,
) -> Option<f64> {
    match bet_type {
        BetType::Spread | BetType::Prop => Some(spread_clv(entry_line?, closing_line)),
        BetType::Total => total_clv(side, entry_line?, closing_line),
        BetType::Moneyline => {
            let closing = closing_line.round() as i32;
            moneyline_clv(entry_odds, closing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implied_prob_handles_both_signs() {
        assert!((implied_prob(-110).unwrap() - 0.5238).abs() < 1e-3);
        assert!((implied_prob(150).unwrap() - 0.4).abs() < 1e-9);
        assert_eq!(implied_prob(0), None);
        assert_eq!(implied_prob(50), None);
        assert_eq!(implied_prob(-99), None);
    }

    #[test]
    fn spread_sign_convention_both_directions() {
        // Favorite line got worse after entry: positive CLV.
        assert_eq!(spread_clv(-3.0, -5.0), 2.0);
        // Favorite line got better after entry: the market disagreed.
        assert_eq!(spread_clv(-3.0, -1.0), -2.0);
        // Dog receiving more points than the close offers: positive.
        assert_eq!(spread_clv(5.0, 3.0), 2.0);
    }

    #[test]
    fn total_sign_convention_by_side() {
        assert_eq!(total_clv(Side::Over, 45.5, 48.0), Some(2.5));
        assert_eq!(total_clv(Side::Under, 48.0, 45.5), Some(2.5));
        assert_eq!(total_clv(Side::Over, 48.0, 45.5), Some(-2.5));
        assert_eq!(total_clv(Side::Home, 48.0, 45.5), None);
    }

    #[test]
    fn moneyline_probability_point_delta() {
        // Entered +150 (40.0%), closed -110 (52.4%): market moved our way.
        let clv = moneyline_clv(150, -110).unwrap();
        assert!(clv > 12.0 && clv < 13.0);
        // The other direction flips the sign.
        let clv = moneyline_clv(-110, 150).unwrap();
        assert!(clv < -12.0);
        assert_eq!(moneyline_clv(0, -110), None);
    }

    #[test]
    fn clv_for_dispatches_on_bet_type() {
        assert_eq!(
            clv_for(BetType::Spread, Side::Home, Some(-3.0), -110, -5.0),
            Some(2.0)
        );
        assert_eq!(
            clv_for(BetType::Total, Side::Over, Some(210.5), -110, 214.0),
            Some(3.5)
        );
        let ml = clv_for(BetType::Moneyline, Side::Away, None, 150, -110.0).unwrap();
        assert!(ml > 0.0);
        assert_eq!(clv_for(BetType::Spread, Side::Home, None, -110, -5.0), None);
    }
}
