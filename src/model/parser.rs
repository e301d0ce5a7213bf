// File: src/model/parser.rs
//! Deterministic fallback parser: turns a free-text task line into a
//! [`ParseResult`] without any network dependency.
//!
//! The pipeline runs fixed stages over a shrinking working buffer; each
//! stage extracts a field and removes the matched fragment so later stages
//! and the title cleanup never re-trigger on consumed text.
use crate::model::dates;
use crate::model::result::{
    ParseResult, UNTITLED_TITLE, URGENCY_TRIGGER, clamp_urgency, finalize_negotiation,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

const DATE_CONNECTOR: &str = r"(?:(?:by|due|for|before|until|till|on)\s+)?";

static RE_TODAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{DATE_CONNECTOR}today(?:'s)?\b")).expect("valid pattern")
});
static RE_TOMORROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{DATE_CONNECTOR}tomorrow(?:'s)?\b")).expect("valid pattern")
});
static RE_NEXT_WEEK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b{DATE_CONNECTOR}(?:next\s+week|in\s+a\s+week)\b"))
        .expect("valid pattern")
});
static RE_NEXT_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{DATE_CONNECTOR}(?:next\s+month|in\s+a\s+month)\b"
    ))
    .expect("valid pattern")
});

static RE_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(on|next|this|every|each|by|before|until|till|due)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
    )
    .expect("valid pattern")
});

static RE_TIME_COLON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:(?:at|by|around|until|till|before)\s+)?(\d{1,2}):([0-5][0-9])\s*(am|pm)?\b")
        .expect("valid pattern")
});
static RE_TIME_AT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:at|by|around|until|till|before)\s+(\d{1,2})\s*(am|pm)?\b")
        .expect("valid pattern")
});
static RE_TIME_AMPM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*(am|pm)\b").expect("valid pattern"));
static RE_TIME_MILITARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})\s*(?:hours|hrs|h)\b").expect("valid pattern"));

static RE_NAMED_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:in|at|by|during)\s+(?:the\s+)?|the\s+)?(early\s+morning|late\s+morning|early\s+afternoon|late\s+afternoon|late\s+night|dinnertime|lunchtime|midnight|tonight|noon|lunch|morning|afternoon|evening|night)\b",
    )
    .expect("valid pattern")
});

static RE_IN_HALF_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:in|after)\s+half\s+an?\s+hour\b").expect("valid pattern"));
static RE_IN_AN_HOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:in|after)\s+an?\s+hour\b").expect("valid pattern"));
static RE_IN_HOURS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:in|after)\s+(\d{1,3}|[a-z]+)\s*(?:hours?|hrs?)\b").expect("valid pattern")
});
static RE_IN_MINUTES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:in|after)\s+(\d{1,3}|[a-z]+)\s*(?:minutes?|mins?)\b")
        .expect("valid pattern")
});

static RE_URGENCY_LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:urgency|priority|importance)(?:\s+(?:level|rating))?\s*[:=]?\s*(\d+(?:\.\d+)?)\b")
        .expect("valid pattern")
});
static RE_URGENCY_VALUE_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:urgency|priority|importance)\b").expect("valid pattern")
});
static RE_URGENCY_VERBAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:priority|urgency)\s+(?:(?:is|of)\s+)?(high|medium|low)\b")
        .expect("valid pattern")
});

/// Trigger tokens that auto-assign urgency 4.5 when nothing explicit fired.
static RE_TRIGGER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:investor|deadline|urgent)\b").expect("valid pattern"));

/// Urgency keywords in match order. Negated and compound phrases come
/// before the plain keywords they contain, so "not urgent" never reads as
/// urgent. "urgent" itself carries the trigger value and is consumed from
/// the title; "investor"/"deadline" are content words and are not.
const URGENCY_KEYWORDS: &[(&str, f32)] = &[
    ("not urgent", 1.0),
    ("low priority", 2.0),
    ("low importance", 1.0),
    ("high priority", 4.0),
    ("urgent", URGENCY_TRIGGER),
    ("asap", 5.0),
    ("emergency", 5.0),
    ("critical", 5.0),
    ("immediate", 5.0),
    ("important", 4.0),
    ("soon", 3.0),
    ("moderate", 3.0),
    ("normal", 3.0),
    ("whenever", 1.0),
];

static URGENCY_KEYWORD_PATTERNS: Lazy<Vec<(Regex, f32)>> = Lazy::new(|| {
    URGENCY_KEYWORDS
        .iter()
        .map(|(phrase, value)| {
            let pattern = format!(r"(?i)\b{}\b", phrase.replace(' ', r"\s+"));
            (Regex::new(&pattern).expect("valid pattern"), *value)
        })
        .collect()
});

// Contextual clues for bare-hour AM/PM inference. Inherently ambiguous
// natural-language behavior; hours without any clue keep the 24-hour
// reading (known source of mis-parses, kept as documented).
static RE_PM_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:evening|tonight|night|afternoon|dinner|dinnertime)\b")
        .expect("valid pattern")
});
static RE_AM_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:morning|dawn)\b").expect("valid pattern"));
static RE_MIDNIGHT_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmidnight\b").expect("valid pattern"));

/// Words stranded at the end of a title once the fragment they introduced
/// has been consumed ("submit report by" after "friday" was extracted).
const TRAILING_CONNECTORS: &[&str] = &[
    "by", "at", "on", "in", "for", "to", "from", "before", "after", "due", "every", "each",
    "until", "till", "around", "this", "next",
];

const TITLE_PUNCTUATION: &str = ".,;:!?-\u{2013}\u{2014}\"'()[]{}";

/// Whether the text contains a 4.5-trigger keyword. Shared with the
/// resolver's output validation.
pub fn has_urgency_trigger(text: &str) -> bool {
    RE_TRIGGER.is_match(text)
}

/// Parse a free-text task line against a reference instant.
///
/// Pure and total: any input, including empty text, yields a complete
/// [`ParseResult`] with negotiation metadata for whatever is missing.
pub fn parse(input: &str, now: NaiveDateTime) -> ParseResult {
    parse_with_prior(input, now, None)
}

/// Like [`parse`], folding in the accumulated result of earlier turns so
/// already-settled fields are never requested again.
pub fn parse_with_prior(
    input: &str,
    now: NaiveDateTime,
    prior: Option<&ParseResult>,
) -> ParseResult {
    let mut buffer = input.to_string();
    let context = input.to_lowercase();

    // 1-2. Date phrases.
    let mut due_date: Option<NaiveDate> = None;
    let mut weekly_phrase = false;
    if let Some((range, date, weekly)) = match_relative_date(&buffer, now) {
        due_date = Some(date);
        weekly_phrase = weekly;
        consume(&mut buffer, range);
    }
    if let Some((range, date)) = match_weekday(&buffer, now.date()) {
        // A weekday phrase wins over a stage-1 match when both occur.
        due_date = Some(date);
        weekly_phrase = true;
        consume(&mut buffer, range);
    }

    // 3. Explicit clock time.
    let mut time: Option<NaiveTime> = None;
    if let Some((range, t)) = match_explicit_time(&buffer, &context) {
        time = Some(t);
        consume(&mut buffer, range);
    }

    // 4. Named periods and relative offsets, only without an explicit time.
    let mut absolute: Option<NaiveDateTime> = None;
    if time.is_none() {
        if let Some((range, t)) = match_named_period(&buffer) {
            time = Some(t);
            consume(&mut buffer, range);
        } else if let Some((range, dt)) = match_relative_offset(&buffer, now) {
            absolute = Some(dt);
            consume(&mut buffer, range);
        }
    } else if let Some((range, _)) = match_named_period(&buffer) {
        // Period wording that only served as an am/pm clue is still time
        // wording; it never belongs in the title.
        consume(&mut buffer, range);
    }

    // A time of day with no date phrase means today.
    if time.is_some() && due_date.is_none() {
        due_date = Some(now.date());
    }

    // 5. A date with no time of day anywhere defaults to 09:00.
    let candidate = absolute
        .or_else(|| due_date.map(|date| date.and_time(time.unwrap_or_else(|| dates::hm(9, 0)))));

    // 6. Urgency.
    let mut urgency: Option<f32> = None;
    if let Some((range, value)) = match_urgency(&buffer) {
        urgency = Some(value);
        consume(&mut buffer, range);
    } else if has_urgency_trigger(&context) {
        // Content words like "investor" stay in the title; only the score
        // is derived from them.
        urgency = Some(URGENCY_TRIGGER);
    }

    // 7. Title cleanup.
    let cleaned = clean_title(&buffer);
    let title = if cleaned.chars().count() >= 3 {
        Some(cleaned)
    } else if input.trim().is_empty() {
        None
    } else {
        Some(UNTITLED_TITLE.to_string())
    };

    // 8. Forward-date correction.
    let due = candidate.map(|dt| dates::correct_forward(dt, now, weekly_phrase));

    // 9. Negotiation metadata.
    let mut result = ParseResult {
        title,
        due_date: due,
        urgency,
        follow_up: String::new(),
        still_needed: Vec::new(),
        suggestions: Vec::new(),
    };
    match prior {
        Some(p) => result.merged_with(p, now),
        None => {
            finalize_negotiation(&mut result, now);
            result
        }
    }
}

fn consume(buffer: &mut String, range: Range<usize>) {
    buffer.replace_range(range, " ");
}

fn match_relative_date(
    buffer: &str,
    now: NaiveDateTime,
) -> Option<(Range<usize>, NaiveDate, bool)> {
    if let Some(m) = RE_TODAY.find(buffer) {
        return Some((m.range(), now.date(), false));
    }
    if let Some(m) = RE_TOMORROW.find(buffer) {
        return Some((m.range(), now.date() + Duration::days(1), false));
    }
    if let Some(m) = RE_NEXT_WEEK.find(buffer) {
        return Some((m.range(), now.date() + Duration::days(7), true));
    }
    if let Some(m) = RE_NEXT_MONTH.find(buffer) {
        return Some((m.range(), dates::plus_month(now.date()), true));
    }
    None
}

fn match_weekday(buffer: &str, today: NaiveDate) -> Option<(Range<usize>, NaiveDate)> {
    let cap = RE_WEEKDAY.captures(buffer)?;
    let whole = cap.get(0)?;
    let target = dates::weekday_from_name(cap.get(2)?.as_str())?;
    let is_next = cap
        .get(1)
        .is_some_and(|c| c.as_str().eq_ignore_ascii_case("next"));
    let date = if is_next {
        dates::next_weekday(today, target)
    } else {
        dates::this_weekday(today, target)
    };
    Some((whole.range(), date))
}

fn match_explicit_time(buffer: &str, context: &str) -> Option<(Range<usize>, NaiveTime)> {
    if let Some(cap) = RE_TIME_COLON.captures(buffer) {
        let hour = number(&cap, 1)?;
        let minute = number(&cap, 2)?;
        let marker = cap.get(3).map(|m| m.as_str().to_lowercase());
        if let Some(t) = compose_time(hour, minute, marker.as_deref(), context) {
            return Some((cap.get(0)?.range(), t));
        }
    }
    if let Some(cap) = RE_TIME_AT.captures(buffer) {
        let hour = number(&cap, 1)?;
        let marker = cap.get(2).map(|m| m.as_str().to_lowercase());
        if let Some(t) = compose_time(hour, 0, marker.as_deref(), context) {
            return Some((cap.get(0)?.range(), t));
        }
    }
    if let Some(cap) = RE_TIME_AMPM.captures(buffer) {
        let hour = number(&cap, 1)?;
        let marker = cap.get(2).map(|m| m.as_str().to_lowercase());
        if let Some(t) = compose_time(hour, 0, marker.as_deref(), context) {
            return Some((cap.get(0)?.range(), t));
        }
    }
    if let Some(cap) = RE_TIME_MILITARY.captures(buffer) {
        let whole = cap.get(0)?;
        // "in 2 hours" and "for 3 hours" are durations, not clock times.
        if !preceded_by(buffer, whole.start(), &["in", "after", "for", "every", "within"]) {
            let hour = number(&cap, 1)?;
            if hour <= 23 {
                return Some((whole.range(), dates::hm(hour, 0)));
            }
        }
    }
    None
}

fn number(cap: &regex::Captures<'_>, group: usize) -> Option<u32> {
    cap.get(group)?.as_str().parse().ok()
}

fn preceded_by(buffer: &str, start: usize, words: &[&str]) -> bool {
    buffer[..start]
        .split_whitespace()
        .next_back()
        .is_some_and(|prev| {
            let prev = prev.to_lowercase();
            words.contains(&prev.as_str())
        })
}

/// Resolves an hour/minute pair with an optional am/pm marker against the
/// surrounding text. Bare hours 1-11 become PM only on a PM clue and stay
/// as-is on an AM clue or no clue at all; 12 is noon unless a midnight
/// clue appears; 13-23 are already unambiguous.
fn compose_time(hour: u32, minute: u32, marker: Option<&str>, context: &str) -> Option<NaiveTime> {
    let resolved = match marker {
        Some("pm") => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            if hour == 12 { 12 } else { hour + 12 }
        }
        Some("am") => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            if hour == 12 { 0 } else { hour }
        }
        _ => {
            if hour > 23 {
                return None;
            }
            if hour == 12 {
                if RE_MIDNIGHT_HINT.is_match(context) { 0 } else { 12 }
            } else if (1..=11).contains(&hour)
                && !RE_AM_HINT.is_match(context)
                && RE_PM_HINT.is_match(context)
            {
                hour + 12
            } else {
                hour
            }
        }
    };
    NaiveTime::from_hms_opt(resolved, minute, 0)
}

fn match_named_period(buffer: &str) -> Option<(Range<usize>, NaiveTime)> {
    let cap = RE_NAMED_PERIOD.captures(buffer)?;
    let whole = cap.get(0)?;
    let phrase = cap
        .get(1)?
        .as_str()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let time = dates::named_period_time(&phrase)?;
    Some((whole.range(), time))
}

fn match_relative_offset(
    buffer: &str,
    now: NaiveDateTime,
) -> Option<(Range<usize>, NaiveDateTime)> {
    if let Some(m) = RE_IN_HALF_HOUR.find(buffer) {
        return Some((m.range(), now + Duration::minutes(30)));
    }
    if let Some(m) = RE_IN_AN_HOUR.find(buffer) {
        return Some((m.range(), now + Duration::hours(1)));
    }
    if let Some(cap) = RE_IN_HOURS.captures(buffer) {
        if let Some(n) = cap.get(1).and_then(|g| english_number(g.as_str())) {
            return Some((cap.get(0)?.range(), now + Duration::hours(n as i64)));
        }
    }
    if let Some(cap) = RE_IN_MINUTES.captures(buffer) {
        if let Some(n) = cap.get(1).and_then(|g| english_number(g.as_str())) {
            return Some((cap.get(0)?.range(), now + Duration::minutes(n as i64)));
        }
    }
    None
}

fn english_number(s: &str) -> Option<u32> {
    match s.to_lowercase().as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        "eleven" => Some(11),
        "twelve" => Some(12),
        _ => s.parse::<u32>().ok(),
    }
}

fn match_urgency(buffer: &str) -> Option<(Range<usize>, f32)> {
    if let Some(cap) = RE_URGENCY_LABELED.captures(buffer) {
        if let Some(value) = float(&cap, 1) {
            return Some((cap.get(0)?.range(), clamp_urgency(value)));
        }
    }
    if let Some(cap) = RE_URGENCY_VALUE_FIRST.captures(buffer) {
        if let Some(value) = float(&cap, 1) {
            return Some((cap.get(0)?.range(), clamp_urgency(value)));
        }
    }
    if let Some(cap) = RE_URGENCY_VERBAL.captures(buffer) {
        let value = match cap.get(1)?.as_str().to_lowercase().as_str() {
            "high" => 5.0,
            "medium" => 3.0,
            _ => 1.0,
        };
        return Some((cap.get(0)?.range(), value));
    }
    for (pattern, value) in URGENCY_KEYWORD_PATTERNS.iter() {
        if let Some(m) = pattern.find(buffer) {
            return Some((m.range(), *value));
        }
    }
    None
}

fn float(cap: &regex::Captures<'_>, group: usize) -> Option<f32> {
    cap.get(group)?.as_str().parse().ok()
}

fn clean_title(buffer: &str) -> String {
    let mut words: Vec<&str> = buffer
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    while let Some(last) = words.last() {
        let bare = last
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if TRAILING_CONNECTORS.contains(&bare.as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words
        .join(" ")
        .trim_matches(|c: char| c.is_whitespace() || TITLE_PUNCTUATION.contains(c))
        .to_string()
}
