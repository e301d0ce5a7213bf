// File: src/model/result.rs
use crate::model::dates;
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Placeholder substituted when extraction leaves no usable title.
/// Counts as missing for negotiation and merging purposes.
pub const UNTITLED_TITLE: &str = "Untitled Task";

/// Urgency auto-assigned when a trigger keyword appears without an
/// explicit urgency. Once set this way the field is never requested again.
pub const URGENCY_TRIGGER: f32 = 4.5;

const PROMPT_TITLE: &str = "What would you like to call this task?";
const PROMPT_DATE: &str = "When is this task due?";
const PROMPT_URGENCY: &str = "How urgent is this task? (1-5)";
const PROMPT_DONE: &str = "Anything else to add?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeededField {
    Title,
    Date,
    Urgency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Date,
    Time,
    DateTime,
    Urgency,
}

/// A suggestion carries either an instant or an urgency score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionValue {
    Timestamp(NaiveDateTime),
    Score(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub value: SuggestionValue,
    pub display_text: String,
}

impl Suggestion {
    /// Timestamp-valued suggestion. The value is repaired forward if it is
    /// not strictly after `now`, so every constructed suggestion satisfies
    /// the never-past invariant independently.
    pub fn upcoming(
        kind: SuggestionKind,
        when: NaiveDateTime,
        now: NaiveDateTime,
        label: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            value: SuggestionValue::Timestamp(dates::correct_forward(when, now, false)),
            display_text: label.into(),
        }
    }

    /// Urgency-valued suggestion, clamped to the valid range.
    pub fn rated(value: f32, label: impl Into<String>) -> Self {
        Self {
            kind: SuggestionKind::Urgency,
            value: SuggestionValue::Score(clamp_urgency(value)),
            display_text: label.into(),
        }
    }
}

/// The structured record both parsing paths produce.
///
/// Built fresh per call; the caller decides whether and how to store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub title: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub urgency: Option<f32>,
    pub follow_up: String,
    pub still_needed: Vec<NeededField>,
    pub suggestions: Vec<Suggestion>,
}

impl ParseResult {
    /// The title, treating the "Untitled Task" placeholder as absent.
    pub fn effective_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| *t != UNTITLED_TITLE)
    }

    /// Fold the accumulated result of earlier turns into this one.
    ///
    /// Fresh non-placeholder values win; fields the new parse left empty are
    /// filled from `prior`. Negotiation metadata is rebuilt afterwards, so a
    /// field present in either turn is never requested again.
    pub fn merged_with(mut self, prior: &ParseResult, now: NaiveDateTime) -> ParseResult {
        if self.effective_title().is_none() && prior.effective_title().is_some() {
            self.title = prior.title.clone();
        }
        if self.due_date.is_none() {
            self.due_date = prior.due_date;
        }
        if self.urgency.is_none() {
            self.urgency = prior.urgency;
        }
        finalize_negotiation(&mut self, now);
        self
    }
}

pub fn clamp_urgency(value: f32) -> f32 {
    value.clamp(1.0, 5.0)
}

/// Builds `still_needed`, default `suggestions`, and the `follow_up` prompt
/// from whichever fields ended up unset.
pub fn finalize_negotiation(result: &mut ParseResult, now: NaiveDateTime) {
    let need_title = result.effective_title().is_none();
    let need_date = result.due_date.is_none();
    let need_urgency = result.urgency.is_none();

    result.still_needed.clear();
    if need_title {
        result.still_needed.push(NeededField::Title);
    }
    if need_date {
        result.still_needed.push(NeededField::Date);
    }
    if need_urgency {
        result.still_needed.push(NeededField::Urgency);
    }

    // Suggestions for settled fields are stale; drop them before topping up.
    result.suggestions.retain(|s| match s.kind {
        SuggestionKind::Urgency => need_urgency,
        _ => need_date,
    });

    let has_date_suggestion = result
        .suggestions
        .iter()
        .any(|s| s.kind != SuggestionKind::Urgency);
    if need_date && !has_date_suggestion {
        // "Later today" only while at least two hours of the day remain.
        if now.hour() < 22 {
            result.suggestions.push(Suggestion::upcoming(
                SuggestionKind::DateTime,
                now + Duration::hours(2),
                now,
                "Later today",
            ));
        }
        let tomorrow_morning = (now.date() + Duration::days(1)).and_time(dates::hm(9, 0));
        result.suggestions.push(Suggestion::upcoming(
            SuggestionKind::DateTime,
            tomorrow_morning,
            now,
            "Tomorrow morning",
        ));
    }

    let has_urgency_suggestion = result
        .suggestions
        .iter()
        .any(|s| s.kind == SuggestionKind::Urgency);
    if need_urgency && !has_urgency_suggestion {
        result.suggestions.push(Suggestion::rated(4.0, "High"));
        result.suggestions.push(Suggestion::rated(3.0, "Medium"));
    }

    result.follow_up = if need_title {
        PROMPT_TITLE
    } else if need_date {
        PROMPT_DATE
    } else if need_urgency {
        PROMPT_URGENCY
    } else {
        PROMPT_DONE
    }
    .to_string();
}
