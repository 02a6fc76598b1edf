//! Age-offset parsing for immunization rules.

use chrono::{Duration, NaiveDate};

// Fixed day counts per unit. Calendar-month arithmetic is intentionally not
// used: due dates are fixed-day offsets from birth.
const DAYS_PER_WEEK: i64 = 7;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// A parsed age offset relative to birth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeOffset {
    days: i64,
}

impl AgeOffset {
    pub fn days(&self) -> i64 {
        self.days
    }
}

/// Parse an offset spec into a day offset from birth.
///
/// Accepted forms:
/// - `"Birth"` (case-insensitive): zero offset.
/// - `"<N> <unit>"` with unit in week(s)/month(s)/year(s).
/// - `"<N>-<M> <unit>"`: a range (hyphen or en-dash accepted); resolves to
///   the floored midpoint count before the unit multiplier is applied.
///
/// Anything else returns `None`. Unparseable specs are a data-quality
/// tolerance, not an error path.
pub fn parse_offset_spec(spec: &str) -> Option<AgeOffset> {
    let trimmed = spec.trim();
    if trimmed.eq_ignore_ascii_case("birth") {
        return Some(AgeOffset { days: 0 });
    }

    let mut parts = trimmed.split_whitespace();
    let amount = parts.next()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let unit_days = unit_days(unit)?;
    let count = parse_amount(amount)?;
    Some(AgeOffset {
        days: count * unit_days,
    })
}

/// Resolve a spec against a birth date.
pub fn due_date(spec: &str, birth: NaiveDate) -> Option<NaiveDate> {
    parse_offset_spec(spec).map(|offset| birth + Duration::days(offset.days))
}

fn unit_days(unit: &str) -> Option<i64> {
    match unit.to_ascii_lowercase().as_str() {
        "week" | "weeks" => Some(DAYS_PER_WEEK),
        "month" | "months" => Some(DAYS_PER_MONTH),
        "year" | "years" => Some(DAYS_PER_YEAR),
        _ => None,
    }
}

/// Parse `"N"` or `"N-M"`. Ranges resolve to `floor((N+M)/2)`.
fn parse_amount(s: &str) -> Option<i64> {
    if let Some((lo, hi)) = s.split_once(['-', '\u{2013}']) {
        let lo: i64 = lo.trim().parse().ok()?;
        let hi: i64 = hi.trim().parse().ok()?;
        if lo < 0 || hi < lo {
            return None;
        }
        Some((lo + hi) / 2)
    } else {
        s.trim().parse().ok().filter(|n: &i64| *n >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn birth_is_zero_offset() {
        let bd = date(2024, 1, 1);
        assert_eq!(due_date("Birth", bd), Some(bd));
        assert_eq!(due_date("birth", bd), Some(bd));
        assert_eq!(due_date("  BIRTH  ", bd), Some(bd));
    }

    #[test]
    fn single_unit_offsets() {
        let bd = date(2024, 1, 1);
        assert_eq!(due_date("6 Weeks", bd), Some(date(2024, 2, 12)));
        assert_eq!(due_date("10 weeks", bd), Some(date(2024, 3, 11)));
        assert_eq!(due_date("1 Week", bd), Some(date(2024, 1, 8)));
        assert_eq!(due_date("6 Months", bd), Some(date(2024, 6, 29)));
        assert_eq!(due_date("1 Year", bd), Some(date(2024, 12, 31)));
    }

    #[test]
    fn range_uses_floored_midpoint() {
        let bd = date(2024, 1, 1);
        // floor((9+12)/2) = 10 months -> 300 days
        assert_eq!(due_date("9-12 Months", bd), Some(date(2024, 10, 27)));
        // en-dash variant behaves identically
        assert_eq!(due_date("9\u{2013}12 Months", bd), Some(date(2024, 10, 27)));
        // floor((1+2)/2) = 1 week
        assert_eq!(due_date("1-2 Weeks", bd), Some(date(2024, 1, 8)));
    }

    #[test]
    fn garbage_is_none() {
        let bd = date(2024, 1, 1);
        for spec in [
            "",
            "soon",
            "6",
            "Weeks",
            "6 Fortnights",
            "6 Weeks Later",
            "-3 Weeks",
            "12-9 Months",
            "a-b Months",
        ] {
            assert_eq!(due_date(spec, bd), None, "spec {spec:?} should not parse");
        }
    }

    #[test]
    fn parse_amount_range_boundaries() {
        assert_eq!(parse_amount("9-12"), Some(10));
        assert_eq!(parse_amount("9-10"), Some(9));
        assert_eq!(parse_amount("4-4"), Some(4));
        assert_eq!(parse_amount("12-9"), None);
    }
}
