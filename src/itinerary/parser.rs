//! Itinerary markdown → day-indexed timeline.

use std::collections::BTreeMap;

use super::model::{DayOrigin, ParsedDay, TimeSlot, default_title};
use super::scan;

/// Parse raw itinerary markdown into one entry per day.
///
/// The result is sorted by day number and covers every day in
/// `1..=total_days`; days the text does not describe are placeholders. Day
/// numbers beyond `total_days` that the text does describe are kept. A day
/// number that appears twice keeps its last occurrence.
///
/// Returns an empty vector when the text has no `Day N:` markers at all; the
/// caller should then show the raw text as-is.
pub fn parse(raw: &str, total_days: u32) -> Vec<ParsedDay> {
    let markers = scan::day_markers(raw);
    if markers.is_empty() {
        return Vec::new();
    }

    let bounds: Vec<scan::Marker> = markers.iter().map(|m| m.marker).collect();
    let mut days: BTreeMap<u32, ParsedDay> = BTreeMap::new();
    for (marker, block) in markers.iter().zip(scan::bounded_slices(raw, &bounds)) {
        days.insert(marker.day_number, parse_day(marker.day_number, block));
    }

    for day_number in 1..=total_days {
        days.entry(day_number)
            .or_insert_with(|| ParsedDay::placeholder(day_number));
    }

    days.into_values().collect()
}

/// Parse the content of a single day block (everything after `Day N:`).
pub fn parse_day(day_number: u32, block: &str) -> ParsedDay {
    ParsedDay {
        day_number,
        title: day_title(day_number, block),
        time_slots: time_slots(block),
        tips: scan::tips_section(block)
            .map(scan::list_items)
            .unwrap_or_default(),
        food_highlights: scan::food_section(block)
            .map(scan::list_items)
            .unwrap_or_default(),
        origin: DayOrigin::Parsed,
    }
}

fn day_title(day_number: u32, block: &str) -> String {
    let first_line = block.lines().next().unwrap_or("");
    let title = first_line.trim().trim_matches('*').trim();
    if title.is_empty() {
        default_title(day_number)
    } else {
        title.to_string()
    }
}

fn time_slots(block: &str) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    let mut cursor = 0;
    while let Some(label) = scan::next_slot_label(block, cursor) {
        let start = label.marker.content_start;
        let end = scan::slot_end(block, start);
        slots.push(TimeSlot {
            time_of_day: label.time_of_day,
            activities: scan::list_items(&block[start..end]),
        });
        cursor = end;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itinerary::model::TimeOfDay;

    const TWO_DAYS: &str = "\
# Your Lisbon Escape

## Trip Overview
- Lisbon is hilly, bring good shoes

## Daily Itinerary

### Day 1: Arrival & Alfama
**Morning (9:00 AM - 12:00 PM)**
- Check in at the hotel
- Breakfast at a pastelaria

**Afternoon (12:00 PM - 6:00 PM)**
- Ride tram 28
- Lunch in Graça

**Evening (6:00 PM - 10:00 PM)**
- Fado dinner in Alfama

**💡 Insider Tips**
- Buy a Viva Viagem card
- Tram 28 is busiest at noon

**🍽️ Food Highlights**
- Pastel de nata
- Grilled sardines

### Day 2: Belém
**Morning (9:00 AM - 12:00 PM)**
- Jerónimos Monastery

**Afternoon (12:00 PM - 6:00 PM)**
- MAAT riverside walk
";

    #[test]
    fn parses_single_block_example() {
        let days = parse(
            "### Day 1: Arrival\n**Morning (9-12)**\n- check in\n- breakfast\n",
            1,
        );
        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.day_number, 1);
        assert_eq!(day.title, "Arrival");
        assert_eq!(day.time_slots.len(), 1);
        assert_eq!(day.time_slots[0].time_of_day, TimeOfDay::Morning);
        assert_eq!(day.time_slots[0].activities, vec!["check in", "breakfast"]);
        assert!(day.tips.is_empty());
        assert!(day.food_highlights.is_empty());
        assert!(!day.is_placeholder());
    }

    #[test]
    fn parses_full_day_with_sections() {
        let days = parse(TWO_DAYS, 2);
        assert_eq!(days.len(), 2);

        let day1 = &days[0];
        assert_eq!(day1.title, "Arrival & Alfama");
        let order: Vec<TimeOfDay> = day1.time_slots.iter().map(|s| s.time_of_day).collect();
        assert_eq!(
            order,
            vec![TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening]
        );
        assert_eq!(
            day1.slot(TimeOfDay::Evening).unwrap().activities,
            vec!["Fado dinner in Alfama"]
        );
        assert_eq!(
            day1.tips,
            vec!["Buy a Viva Viagem card", "Tram 28 is busiest at noon"]
        );
        assert_eq!(day1.food_highlights, vec!["Pastel de nata", "Grilled sardines"]);

        let day2 = &days[1];
        assert_eq!(day2.title, "Belém");
        assert_eq!(day2.time_slots.len(), 2);
        assert_eq!(
            day2.slot(TimeOfDay::Afternoon).unwrap().activities,
            vec!["MAAT riverside walk"]
        );
        assert!(day2.slot(TimeOfDay::Evening).is_none());
    }

    #[test]
    fn overview_before_first_day_is_ignored() {
        let days = parse(TWO_DAYS, 2);
        assert!(days.iter().all(|d| {
            d.time_slots
                .iter()
                .flat_map(|s| s.activities.iter())
                .all(|a| !a.contains("good shoes"))
        }));
    }

    #[test]
    fn fills_gaps_with_placeholders() {
        let text = "### Day 1: Start\n**Morning**\n- a\n### Day 3: Middle\n**Evening**\n- b\n";
        let days = parse(text, 5);
        let numbers: Vec<u32> = days.iter().map(|d| d.day_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        for index in [1, 3, 4] {
            assert!(days[index].time_slots.is_empty());
            assert!(days[index].is_placeholder());
            assert_eq!(days[index].title, format!("Day {}", index + 1));
        }
        assert_eq!(days[2].title, "Middle");
        assert_eq!(days[2].time_slots[0].activities, vec!["b"]);
    }

    #[test]
    fn no_markers_returns_empty() {
        assert!(parse("plain prose with no day headers", 3).is_empty());
        assert!(parse("", 3).is_empty());
    }

    #[test]
    fn day_marker_mid_line_is_content() {
        let text = "### Day 1: Porto\n**Morning**\n- Return on Day 2: by train\n- Ribeira walk\n";
        let days = parse(text, 0);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].title, "Porto");
        assert_eq!(
            days[0].time_slots[0].activities,
            vec!["Return on Day 2: by train", "Ribeira walk"]
        );
    }

    #[test]
    fn duplicate_day_keeps_last_occurrence() {
        let text = "### Day 1: First draft\n**Morning**\n- a\n### Day 1: Final\n**Morning**\n- b\n";
        let days = parse(text, 1);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].title, "Final");
        assert_eq!(days[0].time_slots[0].activities, vec!["b"]);
    }

    #[test]
    fn out_of_order_days_are_sorted() {
        let text = "### Day 2: Second\n### Day 1: First\n";
        let days = parse(text, 0);
        assert_eq!(days[0].title, "First");
        assert_eq!(days[1].title, "Second");
    }

    #[test]
    fn days_beyond_requested_total_are_kept() {
        let days = parse("### Day 4: Bonus\n", 2);
        let numbers: Vec<u32> = days.iter().map(|d| d.day_number).collect();
        assert_eq!(numbers, vec![1, 2, 4]);
    }

    #[test]
    fn empty_title_falls_back_to_day_label() {
        let days = parse("### Day 2:\n**Morning**\n- x\n", 0);
        assert_eq!(days[0].title, "Day 2");
        assert_eq!(days[0].time_slots.len(), 1);
    }

    #[test]
    fn parse_is_deterministic() {
        assert_eq!(parse(TWO_DAYS, 4), parse(TWO_DAYS, 4));
    }

    #[test]
    fn malformed_input_never_panics() {
        let inputs = [
            "### Day 1: **Morning",
            "### Day 1:",
            "Day 1:💡Tips**🍽️Highlights**",
            "**Morning**Day 1: x",
            "### Day 3: ***\n**Evening***\n-\n•\n",
        ];
        for input in inputs {
            let _ = parse(input, 3);
        }
    }

    #[test]
    fn slot_content_stops_at_digit_prefixed_emphasis() {
        let text = "### Day 1: X\n**Morning**\n- a\n**2. Optional**\n- b\n";
        let days = parse(text, 1);
        assert_eq!(days[0].time_slots[0].activities, vec!["a"]);
    }
}
