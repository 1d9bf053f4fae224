//! Trip record built up over the conversation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How packed the traveler wants each day to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Relaxed,
    Mixed,
    Intense,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "relaxed",
            Self::Mixed => "mixed",
            Self::Intense => "intense",
        }
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interest category the itinerary should focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelStyle {
    Luxury,
    Culture,
    Food,
    Nature,
    Nightlife,
}

impl TravelStyle {
    pub const ALL: [TravelStyle; 5] = [
        Self::Luxury,
        Self::Culture,
        Self::Food,
        Self::Nature,
        Self::Nightlife,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Luxury => "luxury",
            Self::Culture => "culture",
            Self::Food => "food",
            Self::Nature => "nature",
            Self::Nightlife => "nightlife",
        }
    }
}

impl std::fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four planning slots.
///
/// Singular slots are overwritten on merge; `styles` only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Day count as text. Normally a decimal number, but free text is
    /// accepted when no number could be recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<Pace>,
    #[serde(default)]
    pub styles: BTreeSet<TravelStyle>,
}

/// A partial update to a `TripData`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripPatch {
    pub destination: Option<String>,
    pub duration: Option<String>,
    pub pace: Option<Pace>,
    pub styles: BTreeSet<TravelStyle>,
}

impl TripData {
    /// Apply a patch: overwrite for singular slots, union for styles.
    pub fn merge(&mut self, patch: TripPatch) {
        if let Some(destination) = patch.destination {
            self.destination = Some(destination);
        }
        if let Some(duration) = patch.duration {
            self.duration = Some(duration);
        }
        if let Some(pace) = patch.pace {
            self.pace = Some(pace);
        }
        self.styles.extend(patch.styles);
    }

    pub fn has_destination(&self) -> bool {
        non_blank(&self.destination)
    }

    pub fn has_duration(&self) -> bool {
        non_blank(&self.duration)
    }

    /// All four slots hold a value.
    pub fn is_complete(&self) -> bool {
        self.has_destination()
            && self.has_duration()
            && self.pace.is_some()
            && !self.styles.is_empty()
    }

    /// How many of the four slots hold a value.
    pub fn filled_slots(&self) -> usize {
        [
            self.has_destination(),
            self.has_duration(),
            self.pace.is_some(),
            !self.styles.is_empty(),
        ]
        .into_iter()
        .filter(|filled| *filled)
        .count()
    }

    /// Numeric day count, when the duration starts with one.
    pub fn total_days(&self) -> Option<u32> {
        self.duration.as_deref().and_then(day_count)
    }

    /// Styles as a comma-separated list, in declaration order.
    pub fn styles_label(&self) -> String {
        self.styles
            .iter()
            .map(TravelStyle::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn non_blank(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Leading positive integer of a duration string: `"7"` and `"7 days"` give
/// 7, `"about a week"` and `"0"` give `None`.
pub fn day_count(duration: &str) -> Option<u32> {
    let trimmed = duration.trim_start();
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    trimmed[..digits].parse().ok().filter(|n| *n > 0)
}

/// The value extracted for one slot from one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    Destination(String),
    Duration(String),
    Pace(Pace),
    Styles(BTreeSet<TravelStyle>),
}

impl SlotValue {
    /// Whether this value satisfies its slot on its own.
    pub fn fills_slot(&self) -> bool {
        match self {
            Self::Destination(v) | Self::Duration(v) => !v.trim().is_empty(),
            Self::Pace(_) => true,
            Self::Styles(styles) => !styles.is_empty(),
        }
    }
}

impl From<SlotValue> for TripPatch {
    fn from(value: SlotValue) -> Self {
        match value {
            SlotValue::Destination(destination) => TripPatch {
                destination: Some(destination),
                ..Default::default()
            },
            SlotValue::Duration(duration) => TripPatch {
                duration: Some(duration),
                ..Default::default()
            },
            SlotValue::Pace(pace) => TripPatch {
                pace: Some(pace),
                ..Default::default()
            },
            SlotValue::Styles(styles) => TripPatch {
                styles,
                ..Default::default()
            },
        }
    }
}
