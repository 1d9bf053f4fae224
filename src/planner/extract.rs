//! Slot extraction from a single user turn.
//!
//! Each extractor looks only at the text of the current turn and only at the
//! slot it is asked about. Matching is heuristic and never fails: a miss is
//! reported as "no new information" rather than an error.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::model::{Pace, SlotValue, TravelStyle};
use super::state::ConversationStep;

/// Destination patterns in priority order. The first non-empty capture wins.
static DESTINATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(?:go to|visit|travel to|trip to)\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\b(?:planning|thinking about)\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)").unwrap(),
    ]
});

static DURATION_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(day|week)").unwrap());

static WEEKEND: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)weekend").unwrap());

const RELAXED_CUES: &[&str] = &["relax", "slow", "easy", "chill"];
const INTENSE_CUES: &[&str] = &["intense", "packed", "busy", "adventure"];

fn style_cues(style: TravelStyle) -> &'static [&'static str] {
    match style {
        TravelStyle::Luxury => &["luxury", "premium", "high-end"],
        TravelStyle::Culture => &["culture", "museum", "history", "art"],
        TravelStyle::Food => &["food", "culinary", "restaurant", "cuisine"],
        TravelStyle::Nature => &["nature", "outdoor", "hiking", "beach"],
        TravelStyle::Nightlife => &["nightlife", "party", "entertainment", "bar"],
    }
}

/// Run the extractor for `step` against `text`.
///
/// Returns `None` when the turn carries nothing for that step, and always
/// `None` once the conversation is complete. Pace always yields a value.
pub fn extract(step: ConversationStep, text: &str) -> Option<SlotValue> {
    match step {
        ConversationStep::Destination => extract_destination(text).map(SlotValue::Destination),
        ConversationStep::Duration => extract_duration(text).map(SlotValue::Duration),
        ConversationStep::Pace => Some(SlotValue::Pace(extract_pace(text))),
        ConversationStep::Style => Some(SlotValue::Styles(extract_styles(text))),
        ConversationStep::Complete => None,
    }
}

/// Destination named in `text`, if any.
pub fn extract_destination(text: &str) -> Option<String> {
    DESTINATION_PATTERNS.iter().find_map(|pattern| {
        let captured = pattern.captures(text)?.get(1)?.as_str();
        let cleaned = captured.trim().trim_end_matches(',').trim_end();
        (!cleaned.is_empty()).then(|| cleaned.to_string())
    })
}

/// Day count as a decimal string.
///
/// "weekend" means 3 days whatever else the text says. Otherwise the first
/// `<n> day(s)` or `<n> week(s)` is used, weeks multiplied by 7. When nothing
/// numeric is found the trimmed text itself is kept, so a free-form answer
/// like "about ten days" still fills the slot.
pub fn extract_duration(text: &str) -> Option<String> {
    if WEEKEND.is_match(text) {
        return Some("3".to_string());
    }

    let counted = DURATION_COUNT.captures(text).and_then(|caps| {
        let count: u32 = caps[1].parse().ok()?;
        if caps[2].eq_ignore_ascii_case("week") {
            count.checked_mul(7)
        } else {
            Some(count)
        }
    });
    if let Some(days) = counted {
        return Some(days.to_string());
    }

    let raw = text.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Relaxed cues win over intense ones; anything else is mixed.
pub fn extract_pace(text: &str) -> Pace {
    let lower = text.to_lowercase();
    if RELAXED_CUES.iter().any(|cue| contains_keyword(&lower, cue)) {
        Pace::Relaxed
    } else if INTENSE_CUES.iter().any(|cue| contains_keyword(&lower, cue)) {
        Pace::Intense
    } else {
        Pace::Mixed
    }
}

/// Every style whose cue words appear in `text`. Possibly empty.
pub fn extract_styles(text: &str) -> BTreeSet<TravelStyle> {
    let lower = text.to_lowercase();
    TravelStyle::ALL
        .into_iter()
        .filter(|style| {
            style_cues(*style)
                .iter()
                .any(|cue| contains_keyword(&lower, cue))
        })
        .collect()
}

/// Plain substring test on lowercased text: "seafood" counts as "food" and
/// "party" also counts as "art".
fn contains_keyword(haystack: &str, keyword: &str) -> bool {
    haystack.contains(keyword)
}
