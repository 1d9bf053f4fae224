//! Day-by-day view over a stored itinerary.
//!
//! The stored document only carries raw itinerary text, so the timeline
//! re-runs the parser every time it is built.

use std::fmt::Write as _;

use chrono::Utc;
use serde::Serialize;

use crate::itinerary::{self, ParsedDay};
use crate::planner::model::day_count;
use crate::store::StoredItinerary;

/// Upper bound on the number of days the timeline will synthesize.
pub const MAX_TIMELINE_DAYS: u32 = 366;

/// Headline numbers for a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub title: String,
    pub destination: String,
    pub total_days: u32,
    /// Number of time slots across all days.
    pub total_activities: usize,
    /// Time slots that mention breakfast, lunch or dinner.
    pub total_meals: usize,
    pub description: String,
}

/// Parsed timeline for one stored itinerary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub trip: StoredItinerary,
    pub total_days: u32,
    pub days: Vec<ParsedDay>,
    /// No day markers were found; show `trip.itinerary` verbatim.
    pub raw_fallback: bool,
    current_day: u32,
}

impl Timeline {
    pub fn from_stored(trip: StoredItinerary) -> Self {
        let requested = day_count(&trip.duration).unwrap_or(0);
        if requested > MAX_TIMELINE_DAYS {
            tracing::warn!(
                "Trip duration {} exceeds {} days, not filling gaps past that",
                requested,
                MAX_TIMELINE_DAYS
            );
        }
        let requested = requested.min(MAX_TIMELINE_DAYS);

        let days = itinerary::parse(&trip.itinerary, requested);
        let raw_fallback = days.is_empty();
        if raw_fallback {
            tracing::debug!("No day markers in stored itinerary, using raw text");
        }

        let total_days = if requested > 0 {
            requested
        } else {
            u32::try_from(days.len()).unwrap_or(u32::MAX)
        };

        Self {
            trip,
            total_days,
            days,
            raw_fallback,
            current_day: 1,
        }
    }

    /// Built-in sample trip, shown when nothing has been planned yet.
    pub fn demo() -> Self {
        Self::from_stored(StoredItinerary {
            destination: "Santorini, Greece".to_string(),
            duration: "4".to_string(),
            pace: "relaxed".to_string(),
            styles: vec!["luxury".into(), "culture".into(), "food".into()],
            itinerary: DEMO_ITINERARY.to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn raw_text(&self) -> &str {
        &self.trip.itinerary
    }

    pub fn day(&self, day_number: u32) -> Option<&ParsedDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    /// The day currently selected for display.
    pub fn current(&self) -> Option<&ParsedDay> {
        self.day(self.current_day)
    }

    /// Select a day, clamped to the trip's range.
    pub fn select_day(&mut self, day_number: u32) -> u32 {
        self.current_day = day_number.clamp(1, self.last_day());
        self.current_day
    }

    pub fn next_day(&mut self) -> u32 {
        self.select_day(self.current_day.saturating_add(1))
    }

    pub fn previous_day(&mut self) -> u32 {
        self.select_day(self.current_day.saturating_sub(1))
    }

    fn last_day(&self) -> u32 {
        self.total_days.max(1)
    }

    pub fn summary(&self) -> TripSummary {
        let trip = &self.trip;
        let title = if trip.destination.is_empty() {
            "Your Trip".to_string()
        } else {
            format!("{} Adventure", trip.destination)
        };

        let total_activities = self.days.iter().map(|d| d.time_slots.len()).sum();
        let total_meals = self
            .days
            .iter()
            .flat_map(|d| &d.time_slots)
            .filter(|slot| slot.includes_meal())
            .count();

        let pace = non_empty_or(&trip.pace, "perfectly paced");
        let duration = non_empty_or(&trip.duration, "multi");
        let destination = non_empty_or(&trip.destination, "your chosen destination");
        let mut description = format!("A {pace} {duration}-day journey through {destination}");
        if !trip.styles.is_empty() {
            let _ = write!(description, " featuring {} experiences", trip.styles.join(", "));
        }
        description.push('.');

        TripSummary {
            title,
            destination: trip.destination.clone(),
            total_days: self.total_days,
            total_activities,
            total_meals,
            description,
        }
    }

    /// Plain-text rendering for terminal output.
    pub fn render_text(&self) -> String {
        let summary = self.summary();
        let mut out = String::new();
        let _ = writeln!(out, "{}", summary.title);
        let _ = writeln!(out, "{}", summary.description);

        if self.raw_fallback {
            let _ = writeln!(out, "\n{}", self.raw_text());
            return out;
        }

        let _ = writeln!(
            out,
            "{} days, {} activities, {} meals",
            summary.total_days, summary.total_activities, summary.total_meals
        );

        for day in &self.days {
            out.push('\n');
            render_day(&mut out, day);
        }
        out
    }

    /// Render only the selected day, with its position in the trip.
    pub fn render_current(&self) -> String {
        if self.raw_fallback {
            return self.raw_text().to_string();
        }
        let mut out = format!("Day {} of {}\n", self.current_day, self.total_days);
        match self.current() {
            Some(day) => render_day(&mut out, day),
            None => {
                let _ = writeln!(out, "  (nothing planned yet)");
            }
        }
        out
    }
}

fn render_day(out: &mut String, day: &ParsedDay) {
    let _ = writeln!(out, "Day {}: {}", day.day_number, day.title);
    if day.is_placeholder() {
        let _ = writeln!(out, "  (nothing planned yet)");
        return;
    }
    for slot in &day.time_slots {
        let _ = writeln!(out, "  {} ({})", slot.time_of_day, slot.time_of_day.start_time());
        for activity in &slot.activities {
            let _ = writeln!(out, "    - {activity}");
        }
    }
    render_list(out, "Tips", &day.tips);
    render_list(out, "Food", &day.food_highlights);
}

fn render_list(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {heading}:");
    for item in items {
        let _ = writeln!(out, "    - {item}");
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

const DEMO_ITINERARY: &str = "# Your Santorini Adventure Awaits!

## Trip Overview
Dramatic cliffs, sunsets over the caldera and white-washed villages. Late spring to early \
autumn is the best time to go.

## Daily Itinerary

### Day 1: Arrival & Oia
**Morning (9:00 AM - 12:00 PM)**
- Arrive and check in to a cliffside hotel in Oia
- Breakfast on the terrace

**Afternoon (12:00 PM - 6:00 PM)**
- Wander Oia's lanes and small galleries
- Lunch at a harbour taverna in Ammoudi Bay

**Evening (6:00 PM - 10:00 PM)**
- Sunset from the castle ruins
- Dinner with caldera views

**💡 Insider Tips**
- Reserve sunset tables a few days ahead
- Wear flat shoes for the marble steps

### Day 2: Fira & History
**Morning (9:00 AM - 12:00 PM)**
- Museum of Prehistoric Thera
- Greek coffee at a kafeneio

**Afternoon (12:00 PM - 6:00 PM)**
- Walk the rim path from Fira to Imerovigli
- Lunch of grilled octopus and fava

**Evening (6:00 PM - 10:00 PM)**
- Dinner at a family-run taverna
- Live bouzouki music

**🍽️ Food Highlights**
- Santorini fava
- Tomatokeftedes
- Vinsanto dessert wine

### Day 3: Beaches & Wine
**Morning (9:00 AM - 12:00 PM)**
- Red Beach and the Akrotiri excavations

**Afternoon (12:00 PM - 6:00 PM)**
- Winery tour with a tasting flight
- Late lunch in Pyrgos

**Evening (6:00 PM - 10:00 PM)**
- Spa evening at the hotel

### Day 4: Departure
**Morning (9:00 AM - 12:00 PM)**
- Breakfast and souvenir shopping
- Airport transfer

**💡 Final Tips**
- Book transfers early in high season
";
