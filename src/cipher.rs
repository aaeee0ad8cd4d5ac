use chrono::{Datelike, NaiveDate};

// Days between consecutive new moons.
const SYNODIC_MONTH_DAYS: f64 = 29.530588853;

// Reference new moon: 2000-01-06 18:14 UTC, truncated to the date.
const LUNAR_EPOCH_YMD: (i32, u32, u32) = (2000, 1, 6);

const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LunarPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl LunarPhase {
    pub fn label(&self) -> &'static str {
        match self {
            LunarPhase::NewMoon => "New Moon",
            LunarPhase::WaxingCrescent => "Waxing Crescent",
            LunarPhase::FirstQuarter => "First Quarter",
            LunarPhase::WaxingGibbous => "Waxing Gibbous",
            LunarPhase::FullMoon => "Full Moon",
            LunarPhase::WaningGibbous => "Waning Gibbous",
            LunarPhase::LastQuarter => "Last Quarter",
            LunarPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

/// Sum of A=1..Z=26 letter values. ASCII-only on purpose: team names arrive
/// upper/lower mixed and must encode identically regardless of locale.
pub fn ordinal_value(text: &str) -> u32 {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1)
        .sum()
}

/// Chaldean letter table (values 1-8; 9 is never assigned to a letter).
pub fn chaldean_value(text: &str) -> u32 {
    text.chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| chaldean_letter(c.to_ascii_uppercase()))
        .sum()
}

fn chaldean_letter(c: char) -> u32 {
    match c {
        'A' | 'I' | 'J' | 'Q' | 'Y' => 1,
        'B' | 'K' | 'R' => 2,
        'C' | 'G' | 'L' | 'S' => 3,
        'D' | 'M' | 'T' => 4,
        'E' | 'H' | 'N' | 'X' => 5,
        'U' | 'V' | 'W' => 6,
        'O' | 'Z' => 7,
        'F' | 'P' => 8,
        _ => 0,
    }
}

/// One round of decimal digit summing.
pub fn digit_sum(mut n: u64) -> u32 {
    let mut sum = 0u32;
    while n > 0 {
        sum += (n % 10) as u32;
        n /= 10;
    }
    sum
}

/// Repeated digit summing down to a single digit, except that 11, 22 and 33
/// are preserved unreduced (master numbers).
pub fn reduce_to_digit(mut n: u32) -> u32 {
    while n > 9 {
        if MASTER_NUMBERS.contains(&n) {
            return n;
        }
        n = digit_sum(n as u64);
    }
    n
}

/// Digit root under modulo 9, with 0 mapped to 9 for non-zero input.
/// This is the reduction the vortex signal uses to test for 3/6/9.
pub fn mod9_root(n: u64) -> u32 {
    if n == 0 {
        return 0;
    }
    let r = (n % 9) as u32;
    if r == 0 { 9 } else { r }
}

/// Life path number of a calendar date: digit-sum of year, month and day
/// combined, reduced with the master-number rule.
pub fn life_path(date: NaiveDate) -> u32 {
    let total = digit_sum(date.year().unsigned_abs() as u64)
        + digit_sum(date.month() as u64)
        + digit_sum(date.day() as u64);
    reduce_to_digit(total)
}

/// Phase of the 8-phase lunar cycle for a date, from days elapsed since the
/// reference new moon modulo the synodic month. No ephemeris lookup; date
/// precision is all the consumers need.
pub fn lunar_phase(date: NaiveDate) -> LunarPhase {
    let (ey, em, ed) = LUNAR_EPOCH_YMD;
    let epoch = NaiveDate::from_ymd_opt(ey, em, ed).expect("valid lunar epoch");
    let elapsed = (date - epoch).num_days() as f64;

    let mut cycle = elapsed % SYNODIC_MONTH_DAYS;
    if cycle < 0.0 {
        cycle += SYNODIC_MONTH_DAYS;
    }

    let idx = ((cycle / SYNODIC_MONTH_DAYS) * 8.0).floor() as usize;
    match idx.min(7) {
        0 => LunarPhase::NewMoon,
        1 => LunarPhase::WaxingCrescent,
        2 => LunarPhase::FirstQuarter,
        3 => LunarPhase::WaxingGibbous,
        4 => LunarPhase::FullMoon,
        5 => LunarPhase::WaningGibbous,
        6 => LunarPhase::LastQuarter,
        _ => LunarPhase::WaningCrescent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_is_case_insensitive_and_skips_symbols() {
        assert_eq!(ordinal_value("abc"), ordinal_value("ABC"));
        assert_eq!(ordinal_value("A-B C!"), 1 + 2 + 3);
        assert_eq!(ordinal_value(""), 0);
        assert_eq!(ordinal_value("   "), 0);
    }

    #[test]
    fn chaldean_differs_from_ordinal() {
        // LAKERS: L=3 A=1 K=2 E=5 R=2 S=3 = 16 chaldean vs 68 ordinal.
        assert_eq!(chaldean_value("Lakers"), 16);
        assert_eq!(ordinal_value("Lakers"), 68);
    }

    #[test]
    fn reduction_preserves_master_numbers() {
        assert_eq!(reduce_to_digit(29), 11); // 2+9
        assert_eq!(reduce_to_digit(22), 22);
        assert_eq!(reduce_to_digit(33), 33);
        assert_eq!(reduce_to_digit(39), 3); // 3+9=12 -> 3
        assert_eq!(reduce_to_digit(0), 0);
        assert_eq!(reduce_to_digit(9), 9);
    }

    #[test]
    fn mod9_root_hits_nine_not_zero() {
        assert_eq!(mod9_root(9), 9);
        assert_eq!(mod9_root(18), 9);
        assert_eq!(mod9_root(3), 3);
        assert_eq!(mod9_root(0), 0);
    }

    #[test]
    fn life_path_reduces_date_digits() {
        // 2024-11-07: (2+0+2+4) + (1+1) + 7 = 17 -> 8.
        let d = NaiveDate::from_ymd_opt(2024, 11, 7).unwrap();
        assert_eq!(life_path(d), 8);
    }

    #[test]
    fn lunar_epoch_is_new_moon_and_cycle_wraps() {
        let epoch = NaiveDate::from_ymd_opt(2000, 1, 6).unwrap();
        assert_eq!(lunar_phase(epoch), LunarPhase::NewMoon);
        // Half a synodic month later should land on or next to the full moon.
        let mid = epoch + chrono::Duration::days(15);
        assert_eq!(lunar_phase(mid), LunarPhase::FullMoon);
        // Dates before the epoch still resolve (negative modulo handled).
        let before = NaiveDate::from_ymd_opt(1999, 12, 20).unwrap();
        let _ = lunar_phase(before);
    }
}
