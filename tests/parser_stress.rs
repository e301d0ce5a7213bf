// File: tests/parser_stress.rs
// Edge-case coverage for the fallback parser stages: time heuristics,
// weekday arithmetic, relative offsets, urgency forms, title cleanup.
use chrono::{NaiveDate, NaiveDateTime};
use quickadd::model::NeededField;
use quickadd::model::parser;

fn reference() -> NaiveDateTime {
    // Monday, 14:00.
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

// --- Weekday arithmetic ---

#[test]
fn bare_weekday_is_the_nearest_upcoming_occurrence() {
    let result = parser::parse("Dentist on friday", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 14, 9, 0)));
    assert_eq!(result.title.as_deref(), Some("Dentist"));
}

#[test]
fn next_weekday_skips_the_upcoming_occurrence() {
    let result = parser::parse("Dentist next friday", reference());
    // Upcoming Friday is 06-14; "next" pushes a week beyond it.
    assert_eq!(result.due_date, Some(at(2024, 6, 21, 9, 0)));
}

#[test]
fn bare_weekday_on_its_own_day_rolls_a_week() {
    // Reference is a Monday.
    let result = parser::parse("Standup monday", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 17, 9, 0)));
}

#[test]
fn next_weekday_on_its_own_day_is_seven_days_out() {
    let result = parser::parse("Standup next monday", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 17, 9, 0)));
}

// --- Relative dates ---

#[test]
fn next_month_advances_one_calendar_month() {
    let result = parser::parse("Renew passport next month", reference());
    assert_eq!(result.due_date, Some(at(2024, 7, 10, 9, 0)));
    assert_eq!(result.title.as_deref(), Some("Renew passport"));
}

#[test]
fn in_a_week_equals_next_week() {
    let a = parser::parse("Follow up in a week", reference());
    let b = parser::parse("Follow up next week", reference());
    assert_eq!(a.due_date, Some(at(2024, 6, 17, 9, 0)));
    assert_eq!(a.due_date, b.due_date);
    assert_eq!(a.title.as_deref(), Some("Follow up"));
}

#[test]
fn first_relative_date_match_wins() {
    // "today" outranks "tomorrow" in stage order; the second phrase is not
    // double-applied.
    let result = parser::parse("today or tomorrow", reference());
    // Today 09:00 is already past at 14:00, so it becomes tomorrow 09:00.
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 9, 0)));
}

// --- Explicit times and am/pm inference ---

#[test]
fn past_time_today_means_that_time_tomorrow() {
    let result = parser::parse("Standup at 9am", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 9, 0)));
}

#[test]
fn future_time_today_stays_today() {
    let result = parser::parse("Standup at 5pm", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 10, 17, 0)));
}

#[test]
fn colon_time_with_minutes() {
    let result = parser::parse("Train leaves tomorrow at 6:45pm", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 18, 45)));
    assert_eq!(result.title.as_deref(), Some("Train leaves"));
}

#[test]
fn bare_hour_with_pm_context_reads_as_evening() {
    let result = parser::parse("Dinner at 7", reference());
    // "dinner" is a PM clue, so 7 means 19:00.
    assert_eq!(result.due_date, Some(at(2024, 6, 10, 19, 0)));
    assert_eq!(result.title.as_deref(), Some("Dinner"));
}

#[test]
fn bare_hour_with_am_context_stays_morning() {
    let result = parser::parse("Jog at 7 in the morning tomorrow", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 7, 0)));
    // The period wording served as a clue and is not part of the title.
    assert_eq!(result.title.as_deref(), Some("Jog"));
}

#[test]
fn bare_hour_without_context_keeps_24_hour_reading() {
    // Documented ambiguity: no clue means no pm shift.
    let result = parser::parse("Sync at 5 with nobody", reference());
    // 05:00 is past at 14:00, so it rolls to tomorrow 05:00.
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 5, 0)));
}

#[test]
fn bare_twelve_is_noon_unless_midnight_context() {
    let noon = parser::parse("Meet at 12", reference());
    assert_eq!(noon.due_date, Some(at(2024, 6, 11, 12, 0)));

    let midnight = parser::parse("Take meds at 12, around midnight", reference());
    // 00:00 today is past, so it becomes tomorrow.
    assert_eq!(midnight.due_date, Some(at(2024, 6, 11, 0, 0)));
    assert_eq!(midnight.title.as_deref(), Some("Take meds"));
}

#[test]
fn military_hours_parse_without_am_pm() {
    let result = parser::parse("Ship build 17h", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 10, 17, 0)));
    assert_eq!(result.title.as_deref(), Some("Ship build"));
}

#[test]
fn duration_phrases_are_not_clock_times() {
    // "in 2 hours" is an offset from the reference, not 02:00.
    let result = parser::parse("Leave in 2 hours", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 10, 16, 0)));
    assert_eq!(result.title.as_deref(), Some("Leave"));
}

// --- Named periods and offsets ---

#[test]
fn named_periods_map_to_their_table_times() {
    let cases = [
        ("Pack bags early morning tomorrow", at(2024, 6, 11, 6, 0)),
        ("Pack bags tomorrow morning", at(2024, 6, 11, 9, 0)),
        ("Pack bags late morning tomorrow", at(2024, 6, 11, 11, 0)),
        ("Pack bags at noon tomorrow", at(2024, 6, 11, 12, 0)),
        ("Pack bags tomorrow evening", at(2024, 6, 11, 18, 0)),
        ("Pack bags late night tomorrow", at(2024, 6, 11, 23, 0)),
    ];
    for (input, expected) in cases {
        let result = parser::parse(input, reference());
        assert_eq!(result.due_date, Some(expected), "input: {input:?}");
        assert_eq!(
            result.title.as_deref(),
            Some("Pack bags"),
            "input: {input:?}"
        );
    }
}

#[test]
fn tonight_implies_today_at_twenty() {
    let result = parser::parse("Watch the game tonight", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 10, 20, 0)));
    assert_eq!(result.title.as_deref(), Some("Watch the game"));
}

#[test]
fn relative_offsets_resolve_against_the_reference() {
    let cases = [
        ("Call back in an hour", at(2024, 6, 10, 15, 0)),
        ("Call back in half an hour", at(2024, 6, 10, 14, 30)),
        ("Call back in two hours", at(2024, 6, 10, 16, 0)),
        ("Call back in 45 minutes", at(2024, 6, 10, 14, 45)),
        ("Call back after 3 hours", at(2024, 6, 10, 17, 0)),
    ];
    for (input, expected) in cases {
        let result = parser::parse(input, reference());
        assert_eq!(result.due_date, Some(expected), "input: {input:?}");
        assert_eq!(
            result.title.as_deref(),
            Some("Call back"),
            "input: {input:?}"
        );
    }
}

// --- Urgency forms ---

#[test]
fn explicit_urgency_forms() {
    let cases = [
        ("Fix login priority: 3", 3.0),
        ("Fix login urgency = 2", 2.0),
        ("Fix login 4 priority", 4.0),
        ("Fix login priority is high", 5.0),
        ("Fix login urgency of low", 1.0),
        ("Fix login importance rating 2.5", 2.5),
    ];
    for (input, expected) in cases {
        let result = parser::parse(input, reference());
        assert_eq!(result.urgency, Some(expected), "input: {input:?}");
        assert_eq!(
            result.title.as_deref(),
            Some("Fix login"),
            "input: {input:?}"
        );
    }
}

#[test]
fn numeric_urgency_is_clamped_to_range() {
    let high = parser::parse("Fix login urgency 9", reference());
    assert_eq!(high.urgency, Some(5.0));

    let low = parser::parse("Fix login priority 0", reference());
    assert_eq!(low.urgency, Some(1.0));
}

#[test]
fn urgency_keywords_map_through_the_table() {
    let cases = [
        ("Restart server asap", 5.0),
        ("Patch the emergency fix", 5.0),
        ("Reply soon", 3.0),
        ("Archive logs whenever", 1.0),
        ("Backup drive low priority", 2.0),
        ("Review deck high priority", 4.0),
        ("Water plants not urgent", 1.0),
    ];
    for (input, expected) in cases {
        let result = parser::parse(input, reference());
        assert_eq!(result.urgency, Some(expected), "input: {input:?}");
    }
}

#[test]
fn urgent_keyword_carries_the_trigger_value_and_leaves_the_title() {
    let result = parser::parse("Call plumber urgent", reference());
    assert_eq!(result.urgency, Some(4.5));
    assert_eq!(result.title.as_deref(), Some("Call plumber"));
    assert!(!result.still_needed.contains(&NeededField::Urgency));
}

#[test]
fn deadline_is_a_content_word_that_still_triggers() {
    let result = parser::parse("Finish slides before the deadline", reference());
    assert_eq!(result.urgency, Some(4.5));
    assert_eq!(
        result.title.as_deref(),
        Some("Finish slides before the deadline")
    );
}

#[test]
fn explicit_urgency_beats_the_trigger() {
    let result = parser::parse("Prep investor deck urgency 2", reference());
    assert_eq!(result.urgency, Some(2.0));
}

// --- Title cleanup ---

#[test]
fn orphaned_connectors_and_punctuation_are_stripped() {
    let result = parser::parse("Submit report by friday,", reference());
    assert_eq!(result.title.as_deref(), Some("Submit report"));
}

#[test]
fn consumed_input_collapses_to_the_untitled_placeholder() {
    let result = parser::parse("tomorrow 5pm", reference());
    assert_eq!(result.title.as_deref(), Some("Untitled Task"));
    // The placeholder still counts as a missing title.
    assert!(result.still_needed.contains(&NeededField::Title));
    assert_eq!(result.follow_up, "What would you like to call this task?");
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 17, 0)));
}

#[test]
fn short_leftovers_collapse_to_the_untitled_placeholder() {
    let result = parser::parse("Go tomorrow at 8pm", reference());
    assert_eq!(result.title.as_deref(), Some("Untitled Task"));
    assert_eq!(result.due_date, Some(at(2024, 6, 11, 20, 0)));
}

#[test]
fn possessive_today_is_consumed_cleanly() {
    let result = parser::parse("Review today's numbers at 4pm", reference());
    assert_eq!(result.due_date, Some(at(2024, 6, 10, 16, 0)));
    assert_eq!(result.title.as_deref(), Some("Review numbers"));
}
