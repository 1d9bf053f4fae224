//! Structured itinerary types produced by the parser.

use serde::{Deserialize, Serialize};

/// The three fixed parts of a day the itinerary format uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// The literal word that introduces this part of the day.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }

    /// Nominal start time shown on the timeline.
    pub fn start_time(&self) -> &'static str {
        match self {
            Self::Morning => "9:00 AM",
            Self::Afternoon => "1:00 PM",
            Self::Evening => "6:00 PM",
        }
    }

    /// Match a label at the start of `text`, e.g. `"Morning (9:00 AM)"`.
    pub fn from_prefix(text: &str) -> Option<TimeOfDay> {
        Self::ALL
            .into_iter()
            .find(|slot| text.starts_with(slot.label()))
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Activities listed under one time-of-day label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time_of_day: TimeOfDay,
    pub activities: Vec<String>,
}

impl TimeSlot {
    /// Whether any activity mentions a meal.
    pub fn includes_meal(&self) -> bool {
        self.activities.iter().any(|activity| {
            let lower = activity.to_lowercase();
            ["breakfast", "lunch", "dinner"]
                .iter()
                .any(|meal| lower.contains(meal))
        })
    }
}

/// Where a day entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOrigin {
    /// Found under a `Day N:` marker in the source text.
    Parsed,
    /// Synthesized to fill a gap in the requested day range.
    Placeholder,
}

/// One day of a parsed itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDay {
    pub day_number: u32,
    pub title: String,
    pub time_slots: Vec<TimeSlot>,
    pub tips: Vec<String>,
    pub food_highlights: Vec<String>,
    pub origin: DayOrigin,
}

impl ParsedDay {
    /// An empty entry for a day the source text did not describe.
    pub fn placeholder(day_number: u32) -> Self {
        Self {
            day_number,
            title: default_title(day_number),
            time_slots: Vec::new(),
            tips: Vec::new(),
            food_highlights: Vec::new(),
            origin: DayOrigin::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == DayOrigin::Placeholder
    }

    /// The slot for a given part of the day, if the source listed one.
    pub fn slot(&self, time_of_day: TimeOfDay) -> Option<&TimeSlot> {
        self.time_slots
            .iter()
            .find(|slot| slot.time_of_day == time_of_day)
    }
}

pub(crate) fn default_title(day_number: u32) -> String {
    format!("Day {day_number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_prefix_matching() {
        assert_eq!(
            TimeOfDay::from_prefix("Morning (9:00 AM - 12:00 PM)"),
            Some(TimeOfDay::Morning)
        );
        assert_eq!(TimeOfDay::from_prefix("Evening"), Some(TimeOfDay::Evening));
        assert_eq!(TimeOfDay::from_prefix("morning"), None);
        assert_eq!(TimeOfDay::from_prefix("Lunch"), None);
    }

    #[test]
    fn placeholder_has_default_title_and_no_content() {
        let day = ParsedDay::placeholder(4);
        assert_eq!(day.title, "Day 4");
        assert!(day.time_slots.is_empty());
        assert!(day.tips.is_empty());
        assert!(day.food_highlights.is_empty());
        assert!(day.is_placeholder());
    }

    #[test]
    fn meal_detection_is_case_insensitive() {
        let slot = TimeSlot {
            time_of_day: TimeOfDay::Afternoon,
            activities: vec!["Walk the Alfama".into(), "Late Lunch at a tasca".into()],
        };
        assert!(slot.includes_meal());

        let no_meal = TimeSlot {
            time_of_day: TimeOfDay::Morning,
            activities: vec!["Museum visit".into()],
        };
        assert!(!no_meal.includes_meal());
    }

    #[test]
    fn parsed_day_serializes_camel_case() {
        let json = serde_json::to_value(ParsedDay::placeholder(2)).unwrap();
        assert_eq!(json["dayNumber"], 2);
        assert!(json["timeSlots"].as_array().unwrap().is_empty());
        assert!(json["foodHighlights"].as_array().unwrap().is_empty());
        assert_eq!(json["origin"], "placeholder");
    }
}
