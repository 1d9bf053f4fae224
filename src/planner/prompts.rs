//! Prompt text and canned assistant messages for the planning conversation.

use super::model::{Pace, TravelStyle, TripData};
use super::state::ConversationStep;

/// Persona sent as the system instruction for every generation call.
pub const SYSTEM_PROMPT: &str = "\
You are a sophisticated AI travel planner. Your personality is warm, knowledgeable and \
inspiring, like a well-traveled friend who knows the hidden gems.

Guidelines:
- Keep replies personal and engaging, with concrete, practical advice.
- Add local insight and cultural context where it helps.
- Format replies with markdown. Use emojis sparingly.
- Ask one follow-up question at a time to learn the traveler's preferences.
- Be enthusiastic but not overwhelming.";

/// Fallback reply when the conversational reply could not be generated.
pub const REPLY_APOLOGY: &str = "I apologize, but I'm having some technical difficulties. \
Let me help you with your travel planning in just a moment.";

/// What the user "says" when asking for a surprise destination.
pub const SURPRISE_REQUEST: &str = "Surprise me with an amazing destination!";

/// Shown when a surprise is requested after a destination was chosen.
pub const SURPRISE_UNAVAILABLE: &str = "You've already picked a destination! \
Let's keep planning that trip.";

/// Candidate destinations for the surprise feature, as `(name, pitch hook)`.
pub const SURPRISE_DESTINATIONS: &[(&str, &str)] = &[
    ("Santorini, Greece", "stunning sunsets and white-washed buildings"),
    ("Kyoto, Japan", "ancient temples and cherry blossoms"),
    ("Patagonia, Chile", "breathtaking landscapes and adventure"),
    ("Marrakech, Morocco", "vibrant souks and rich culture"),
    ("Bali, Indonesia", "tropical beaches and spiritual retreats"),
    ("Iceland", "the Northern Lights and dramatic landscapes"),
    ("Tuscany, Italy", "rolling hills and world-class wine"),
    ("New Zealand", "mountain scenery and outdoor adventures"),
];

/// Wrap the very first user message of a conversation.
pub fn opener_prompt(first_message: &str) -> String {
    format!(
        "A traveler just said: \"{first_message}\". Give a warm, engaging reply that helps them \
start planning their dream trip. Ask about their destination preferences if they haven't \
named one clearly."
    )
}

/// Ask for an enthusiastic pitch of a randomly chosen destination.
pub fn surprise_prompt(destination: &str, hook: &str) -> String {
    format!(
        "A traveler wants to be surprised with a destination. I've picked {destination}, known \
for {hook}. Reply with an enthusiastic, detailed description of what makes it special and ask \
how long they would like to stay."
    )
}

/// Full itinerary request. The layout it prescribes is what the itinerary
/// parser reads back.
pub fn itinerary_prompt(trip: &TripData) -> String {
    let destination = trip.destination.as_deref().unwrap_or("a destination of your choice");
    let duration = trip.duration.as_deref().unwrap_or("3");
    let pace = trip.pace.unwrap_or(Pace::Mixed);
    let styles = if trip.styles.is_empty() {
        "varied".to_string()
    } else {
        trip.styles_label()
    };

    format!(
        "Create a detailed {duration}-day itinerary for {destination} with a {pace} travel pace, \
focusing on {styles} experiences.

Format the response as a day-by-day itinerary:

## Trip Overview
- Brief destination introduction
- Best time to visit
- Travel tips

## Daily Itinerary

For each day use exactly this layout:
### Day X: [Theme]
**Morning (9:00 AM - 12:00 PM)**
- Activity, location and practical details

**Afternoon (12:00 PM - 6:00 PM)**
- Lunch recommendation and main activities

**Evening (6:00 PM - 10:00 PM)**
- Dinner suggestion and evening activities

**💡 Insider Tips**
- Local secrets, money-saving tips, etiquette

**🍽️ Food Highlights**
- Must-try dishes, restaurants, food markets

Make each day distinct and balanced for travel distances and energy levels."
    )
}

/// Recap posted right before itinerary generation starts.
pub fn summary_message(trip: &TripData) -> String {
    format!(
        "Perfect! I have everything I need to create your personalized itinerary:\n\n\
🌍 **Destination:** {}\n📅 **Duration:** {} days\n⚡ **Pace:** {}\n❤️ **Interests:** {}\n\n\
Let me craft the perfect journey for you...",
        trip.destination.as_deref().unwrap_or_default(),
        trip.duration.as_deref().unwrap_or_default(),
        trip.pace.map(|p| p.as_str()).unwrap_or_default(),
        trip.styles_label(),
    )
}

/// Posted with the raw itinerary once generation succeeds.
pub fn ready_message(trip: &TripData, itinerary: &str) -> String {
    format!(
        "🎉 **Your personalized itinerary is ready!**\n\n{itinerary}\n\n---\n\n\
*This plan is tailored to your {} {}-day journey to {}. Type /timeline to see it day by day.*",
        trip.pace.map(|p| p.as_str()).unwrap_or_default(),
        trip.duration.as_deref().unwrap_or_default(),
        trip.destination.as_deref().unwrap_or_default(),
    )
}

/// Posted when itinerary generation fails.
pub fn generation_apology(trip: &TripData) -> String {
    format!(
        "I've sketched the framework for your {} adventure, but I couldn't finish the detailed \
itinerary just now. Tell me about your interests again and I'll give it another go.",
        trip.destination.as_deref().unwrap_or("next")
    )
}

/// Short description of a pace option.
pub fn pace_description(pace: Pace) -> &'static str {
    match pace {
        Pace::Relaxed => "Plenty of downtime, 2-3 activities per day",
        Pace::Mixed => "Balanced schedule with flexibility",
        Pace::Intense => "Action-packed days, see everything",
    }
}

/// Short description of a travel style option.
pub fn style_description(style: TravelStyle) -> &'static str {
    match style {
        TravelStyle::Luxury => "Premium experiences and accommodations",
        TravelStyle::Culture => "Museums, history, and local traditions",
        TravelStyle::Food => "Culinary adventures and local cuisine",
        TravelStyle::Nature => "Outdoor activities and natural beauty",
        TravelStyle::Nightlife => "Bars, clubs, and evening entertainment",
    }
}

/// Suggested answers for the active step, shown as quick replies.
pub fn quick_options(step: ConversationStep) -> Vec<String> {
    match step {
        ConversationStep::Destination | ConversationStep::Complete => Vec::new(),
        ConversationStep::Duration => vec!["3 days".into(), "7 days".into(), "14 days".into()],
        ConversationStep::Pace => [Pace::Relaxed, Pace::Mixed, Pace::Intense]
            .into_iter()
            .map(|p| format!("{p}: {}", pace_description(p)))
            .collect(),
        ConversationStep::Style => TravelStyle::ALL
            .into_iter()
            .map(|s| format!("{s}: {}", style_description(s)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::model::TravelStyle;

    fn kyoto() -> TripData {
        TripData {
            destination: Some("Kyoto, Japan".into()),
            duration: Some("7".into()),
            pace: Some(Pace::Relaxed),
            styles: [TravelStyle::Culture, TravelStyle::Food].into_iter().collect(),
        }
    }

    #[test]
    fn itinerary_prompt_names_trip_and_layout() {
        let prompt = itinerary_prompt(&kyoto());
        assert!(prompt.contains("7-day itinerary for Kyoto, Japan"));
        assert!(prompt.contains("relaxed travel pace"));
        assert!(prompt.contains("culture, food experiences"));
        assert!(prompt.contains("### Day X:"));
        assert!(prompt.contains("**Morning"));
        assert!(prompt.contains("**💡 Insider Tips**"));
        assert!(prompt.contains("**🍽️ Food Highlights**"));
    }

    #[test]
    fn summary_lists_every_slot() {
        let summary = summary_message(&kyoto());
        assert!(summary.contains("**Destination:** Kyoto, Japan"));
        assert!(summary.contains("**Duration:** 7 days"));
        assert!(summary.contains("**Pace:** relaxed"));
        assert!(summary.contains("**Interests:** culture, food"));
    }

    #[test]
    fn ready_message_embeds_itinerary() {
        let msg = ready_message(&kyoto(), "### Day 1: Arrival");
        assert!(msg.contains("### Day 1: Arrival"));
        assert!(msg.contains("7-day journey to Kyoto, Japan"));
    }

    #[test]
    fn opener_quotes_first_message() {
        let prompt = opener_prompt("hi there");
        assert!(prompt.starts_with("A traveler just said: \"hi there\""));
    }

    #[test]
    fn quick_options_per_step() {
        assert!(quick_options(ConversationStep::Destination).is_empty());
        assert_eq!(quick_options(ConversationStep::Duration).len(), 3);
        assert_eq!(quick_options(ConversationStep::Pace).len(), 3);
        assert_eq!(quick_options(ConversationStep::Style).len(), 5);
        assert!(quick_options(ConversationStep::Pace)[0].starts_with("relaxed:"));
    }

    #[test]
    fn surprise_destinations_have_hooks() {
        assert!(!SURPRISE_DESTINATIONS.is_empty());
        for (name, hook) in SURPRISE_DESTINATIONS {
            assert!(!name.is_empty());
            assert!(!hook.is_empty());
        }
    }
}
