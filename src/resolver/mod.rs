// File: src/resolver/mod.rs
//! Intent resolver: model-backed extraction with strict output validation
//! and invariant repair. Any failure is typed and non-fatal; the caller
//! falls back to the deterministic parser with the same inputs.
pub mod provider;

pub use provider::{
    ExtractError, HttpExtractor, RawExtraction, RawSuggestion, StubExtractor, TaskExtractor,
};

use crate::model::dates;
use crate::model::parser;
use crate::model::result::{
    ParseResult, Suggestion, SuggestionValue, UNTITLED_TITLE, URGENCY_TRIGGER, clamp_urgency,
    finalize_negotiation,
};
use chrono::NaiveDateTime;

/// When the extractor supplies no title, the raw input stands in for it,
/// truncated to keep the record displayable.
const TITLE_TRUNCATE_CHARS: usize = 60;

/// Resolve free text through the extraction service.
///
/// On success the raw extraction is validated, repaired and completed into
/// a full [`ParseResult`]; on any error the caller is expected to invoke
/// [`crate::model::parser::parse`] with the same inputs — the resolver
/// surfaces no partial results.
pub async fn resolve(
    extractor: &dyn TaskExtractor,
    text: &str,
    now: NaiveDateTime,
    prior: Option<&ParseResult>,
) -> Result<ParseResult, ExtractError> {
    let raw = extractor.extract(text, now).await?;
    Ok(normalize(raw, text, now, prior))
}

/// Enforce the output contract on a raw extraction: urgency clamped to
/// [1, 5], due date pushed strictly after `now`, trigger keywords applied,
/// missing title backfilled from the input, suggestions validated, and
/// negotiation metadata assembled.
pub fn normalize(
    raw: RawExtraction,
    text: &str,
    now: NaiveDateTime,
    prior: Option<&ParseResult>,
) -> ParseResult {
    let title = raw
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| truncated_title(text))
        .map(|t| {
            if t.chars().count() >= 3 {
                t
            } else {
                UNTITLED_TITLE.to_string()
            }
        });

    let due_date = raw.due_date.map(|d| dates::correct_forward(d, now, false));

    let urgency = raw.urgency.map(clamp_urgency).or_else(|| {
        if parser::has_urgency_trigger(text) {
            Some(URGENCY_TRIGGER)
        } else {
            None
        }
    });

    let suggestions = raw
        .suggestions
        .into_iter()
        .map(|s| Suggestion {
            kind: s.kind,
            value: match s.value {
                SuggestionValue::Timestamp(t) => {
                    SuggestionValue::Timestamp(dates::correct_forward(t, now, false))
                }
                SuggestionValue::Score(v) => SuggestionValue::Score(clamp_urgency(v)),
            },
            display_text: s.display_text,
        })
        .collect();

    let mut result = ParseResult {
        title,
        due_date,
        urgency,
        follow_up: String::new(),
        still_needed: Vec::new(),
        suggestions,
    };
    match prior {
        Some(p) => result.merged_with(p, now),
        None => {
            finalize_negotiation(&mut result, now);
            result
        }
    }
}

fn truncated_title(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(TITLE_TRUNCATE_CHARS).collect())
}
