// File: src/model/dates.rs
//! Temporal helpers shared by the fallback parser and the resolver's
//! output validation.
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Infallible HH:MM constructor for table values validated by the caller.
pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

pub fn weekday_from_name(s: &str) -> Option<Weekday> {
    match s.to_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn days_until(from: Weekday, target: Weekday) -> i64 {
    (target.num_days_from_monday() as i64 - from.num_days_from_monday() as i64).rem_euclid(7)
}

/// Nearest upcoming occurrence of `target`; rolls a full week when `today`
/// already is that weekday.
pub fn this_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let offset = days_until(today.weekday(), target);
    today + Duration::days(if offset == 0 { 7 } else { offset })
}

/// The occurrence after the immediately upcoming one ("next friday"):
/// always at least a week out.
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    today + Duration::days(days_until(today.weekday(), target) + 7)
}

/// One calendar month forward, clamped to the shorter month when needed.
pub fn plus_month(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1))
        .unwrap_or(date + Duration::days(30))
}

/// Clock time for a named period of the day ("afternoon", "late night", ...).
pub fn named_period_time(phrase: &str) -> Option<NaiveTime> {
    let time = match phrase {
        "early morning" => hm(6, 0),
        "morning" => hm(9, 0),
        "late morning" => hm(11, 0),
        "noon" | "lunch" | "lunchtime" => hm(12, 0),
        "early afternoon" => hm(13, 0),
        "afternoon" => hm(15, 0),
        "late afternoon" => hm(17, 0),
        "evening" | "dinnertime" => hm(18, 0),
        "night" | "tonight" => hm(20, 0),
        "late night" => hm(23, 0),
        "midnight" => hm(0, 0),
        _ => return None,
    };
    Some(time)
}

/// Forward-date correction: no resolved instant is ever in the past.
///
/// A past instant on the reference day means "that time, but tomorrow".
/// A past instant from a weekday / "next week" / "next month" phrase jumps
/// a full week. Anything still not in the future advances one day at a
/// time; each step strictly advances, so the loop is bounded.
pub fn correct_forward(
    candidate: NaiveDateTime,
    now: NaiveDateTime,
    weekly_phrase: bool,
) -> NaiveDateTime {
    if candidate > now {
        return candidate;
    }
    let mut adjusted = if candidate.date() == now.date() {
        candidate + Duration::days(1)
    } else if weekly_phrase {
        candidate + Duration::days(7)
    } else {
        candidate + Duration::days(1)
    };
    while adjusted <= now {
        adjusted += Duration::days(1);
    }
    adjusted
}
