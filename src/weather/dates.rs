//! Natural-language date expressions resolved against a reference day.
//!
//! Ambiguous expressions prefer the future: `"july 1"` in August means next
//! year's July 1st, and a bare weekday means its next occurrence.

use crate::error::ResolutionError;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};

const WEEKDAYS: &[(&str, Weekday)] = &[
    ("monday", Weekday::Mon),
    ("mon", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("tue", Weekday::Tue),
    ("tues", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("wed", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("thu", Weekday::Thu),
    ("thurs", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("fri", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sat", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("sun", Weekday::Sun),
];

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sep", 9),
    ("sept", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Parse `expression` into a calendar date relative to `today`.
pub fn parse_date_expression(expression: &str, today: NaiveDate) -> Result<NaiveDate, ResolutionError> {
    let unparseable = || ResolutionError::DateUnparseable(expression.to_string());

    let normalized = normalize(expression);
    if normalized.is_empty() {
        return Err(unparseable());
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
            return Ok(date);
        }
    }

    let tokens: Vec<&str> = normalized.split(' ').collect();
    parse_relative(&tokens, today)
        .or_else(|| parse_calendar(&tokens, today))
        .ok_or_else(unparseable)
}

fn normalize(expression: &str) -> String {
    let lowered = expression
        .to_lowercase()
        .replace(',', " ")
        .replace('.', " ");
    let tokens: Vec<String> = lowered
        .split_whitespace()
        .filter(|token| !matches!(*token, "on" | "the" | "of" | "for"))
        .map(strip_ordinal)
        .collect();
    tokens.join(" ")
}

fn strip_ordinal(token: &str) -> String {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(number) = token.strip_suffix(suffix) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return number.to_string();
            }
        }
    }
    token.to_string()
}

fn parse_count(token: &str) -> Option<u32> {
    if let Ok(value) = token.parse::<u32>() {
        return Some(value);
    }
    let value = match token {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(value)
}

fn weekday(token: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, day)| *day)
}

fn month(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, month)| *month)
}

fn days_until(today: NaiveDate, target: Weekday) -> i64 {
    let from = today.weekday().num_days_from_monday() as i64;
    let to = target.num_days_from_monday() as i64;
    (to - from).rem_euclid(7)
}

fn offset(today: NaiveDate, count: u32, unit: &str) -> Option<NaiveDate> {
    match unit.trim_end_matches('s') {
        "day" => today.checked_add_signed(Duration::days(i64::from(count))),
        "week" => today.checked_add_signed(Duration::weeks(i64::from(count))),
        "month" => today.checked_add_months(Months::new(count)),
        "year" => today.checked_add_months(Months::new(count.checked_mul(12)?)),
        _ => None,
    }
}

fn upcoming_saturday(today: NaiveDate) -> NaiveDate {
    if today.weekday() == Weekday::Sun {
        return today;
    }
    today + Duration::days(days_until(today, Weekday::Sat))
}

fn parse_relative(tokens: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    match tokens {
        ["today"] | ["tonight"] | ["now"] | ["this", "evening"] | ["this", "morning"] => Some(today),
        ["tomorrow"] | ["tomorrow", _] => today.succ_opt(),
        ["yesterday"] => today.pred_opt(),
        ["day", "after", "tomorrow"] => today.checked_add_signed(Duration::days(2)),
        ["weekend"] | ["this", "weekend"] => Some(upcoming_saturday(today)),
        ["next", "weekend"] => Some(upcoming_saturday(today) + Duration::days(7)),
        ["next", "week"] => offset(today, 1, "week"),
        ["next", "month"] => offset(today, 1, "month"),
        ["next", "year"] => offset(today, 1, "year"),
        ["in", count, unit] => offset(today, parse_count(count)?, unit),
        [count, unit, "from", "now"] | [count, unit, "later"] => {
            offset(today, parse_count(count)?, unit)
        }
        ["next", day] if weekday(day).is_some() => {
            let ahead = match days_until(today, weekday(day)?) {
                0 => 7,
                n => n,
            };
            Some(today + Duration::days(ahead))
        }
        [day] | ["this", day] | ["coming", day] if weekday(day).is_some() => {
            Some(today + Duration::days(days_until(today, weekday(day)?)))
        }
        _ => None,
    }
}

fn parse_year(token: &str) -> Option<i32> {
    let year = token.parse::<i32>().ok()?;
    (1000..=9999).contains(&year).then_some(year)
}

fn parse_day(token: &str) -> Option<u32> {
    let day = token.parse::<u32>().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// The next occurrence of `month`/`day` on or after `today` when no year is given.
fn next_occurrence(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day);
    match this_year {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn upcoming_month(today: NaiveDate, month: u32) -> Option<NaiveDate> {
    if month == today.month() {
        return Some(today);
    }
    let year = if month > today.month() {
        today.year()
    } else {
        today.year() + 1
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn parse_calendar(tokens: &[&str], today: NaiveDate) -> Option<NaiveDate> {
    match tokens {
        [m] => upcoming_month(today, month(m)?),
        ["next", m] => {
            let month = month(m)?;
            let year = if month > today.month() {
                today.year()
            } else {
                today.year() + 1
            };
            NaiveDate::from_ymd_opt(year, month, 1)
        }
        [m, y] if month(m).is_some() && parse_year(y).is_some() => {
            NaiveDate::from_ymd_opt(parse_year(y)?, month(m)?, 1)
        }
        [m, d] if month(m).is_some() => next_occurrence(today, month(m)?, parse_day(d)?),
        [d, m] if month(m).is_some() => next_occurrence(today, month(m)?, parse_day(d)?),
        [m, d, y] if month(m).is_some() => {
            NaiveDate::from_ymd_opt(parse_year(y)?, month(m)?, parse_day(d)?)
        }
        [d, m, y] if month(m).is_some() => {
            NaiveDate::from_ymd_opt(parse_year(y)?, month(m)?, parse_day(d)?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A Wednesday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(expr: &str) -> NaiveDate {
        parse_date_expression(expr, today()).unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse("2025-07-01"), ymd(2025, 7, 1));
        assert_eq!(parse(" 2026/01/15 "), ymd(2026, 1, 15));
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(parse("today"), today());
        assert_eq!(parse("Tomorrow"), ymd(2025, 6, 12));
        assert_eq!(parse("tomorrow morning"), ymd(2025, 6, 12));
        assert_eq!(parse("day after tomorrow"), ymd(2025, 6, 13));
        assert_eq!(parse("in 3 days"), ymd(2025, 6, 14));
        assert_eq!(parse("in two weeks"), ymd(2025, 6, 25));
        assert_eq!(parse("5 days from now"), ymd(2025, 6, 16));
        assert_eq!(parse("in a month"), ymd(2025, 7, 11));
    }

    #[test]
    fn test_next_week_is_in_the_future() {
        assert_eq!(parse("next week"), ymd(2025, 6, 18));
        assert!(parse("next week") > today());
        assert_eq!(parse("next month"), ymd(2025, 7, 11));
        assert_eq!(parse("next year"), ymd(2026, 6, 11));
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(parse("friday"), ymd(2025, 6, 13));
        assert_eq!(parse("on Friday"), ymd(2025, 6, 13));
        assert_eq!(parse("wednesday"), today());
        assert_eq!(parse("next wednesday"), ymd(2025, 6, 18));
        assert_eq!(parse("next monday"), ymd(2025, 6, 16));
        assert_eq!(parse("this weekend"), ymd(2025, 6, 14));
        assert_eq!(parse("next weekend"), ymd(2025, 6, 21));
    }

    #[test]
    fn test_month_names_prefer_future() {
        assert_eq!(parse("July 1"), ymd(2025, 7, 1));
        assert_eq!(parse("1st of July"), ymd(2025, 7, 1));
        assert_eq!(parse("March 3"), ymd(2026, 3, 3));
        assert_eq!(parse("July 1, 2027"), ymd(2027, 7, 1));
        assert_eq!(parse("15 Aug 2025"), ymd(2025, 8, 15));
        assert_eq!(parse("december"), ymd(2025, 12, 1));
        assert_eq!(parse("january"), ymd(2026, 1, 1));
        assert_eq!(parse("june"), today());
        assert_eq!(parse("next june"), ymd(2026, 6, 1));
        assert_eq!(parse("May 2027"), ymd(2027, 5, 1));
    }

    #[test]
    fn test_unparseable() {
        for expr in ["", "someday soon", "2025-13-45", "February 30 2025", "in many days"] {
            let err = parse_date_expression(expr, today()).unwrap_err();
            assert_eq!(err, ResolutionError::DateUnparseable(expr.to_string()));
        }
    }
}
