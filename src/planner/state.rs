//! Conversation step machine.

use serde::{Deserialize, Serialize};

use super::extract;
use super::model::{SlotValue, TripData};

/// The slot the conversation is currently asking about.
///
/// Progresses linearly: Destination → Duration → Pace → Style → Complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStep {
    #[default]
    Destination,
    Duration,
    Pace,
    Style,
    Complete,
}

impl ConversationStep {
    /// Number of slot-collecting steps.
    pub const SLOT_COUNT: usize = 4;

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: ConversationStep) -> bool {
        use ConversationStep::*;
        matches!(
            (self, target),
            (Destination, Duration) | (Duration, Pace) | (Pace, Style) | (Style, Complete)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<ConversationStep> {
        use ConversationStep::*;
        match self {
            Destination => Some(Duration),
            Duration => Some(Pace),
            Pace => Some(Style),
            Style => Some(Complete),
            Complete => None,
        }
    }

    /// 1-based position for progress display; `Complete` reports the slot count.
    pub fn number(&self) -> usize {
        match self {
            Self::Destination => 1,
            Self::Duration => 2,
            Self::Pace => 3,
            Self::Style | Self::Complete => 4,
        }
    }

    /// Question shown while this step is active.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Destination => "Where would you like to go?",
            Self::Duration => "How long is your trip?",
            Self::Pace => "What's your travel pace?",
            Self::Style => "What interests you most?",
            Self::Complete => "Your itinerary is ready",
        }
    }
}

impl std::fmt::Display for ConversationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Destination => "destination",
            Self::Duration => "duration",
            Self::Pace => "pace",
            Self::Style => "style",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Trip record plus the active step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningState {
    pub trip: TripData,
    pub step: ConversationStep,
}

/// Result of applying one user turn to a [`PlanningState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State after the turn.
    pub state: PlanningState,
    /// Value the active step's extractor produced, if any.
    pub extracted: Option<SlotValue>,
    /// Whether the step pointer moved.
    pub advanced: bool,
    /// The trip just became complete and an itinerary should be generated.
    /// When set, `state.step` is still `Style`; the caller commits `Complete`
    /// once generation succeeds.
    pub ready_for_itinerary: bool,
}

impl PlanningState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one user turn without mutating `self`.
    ///
    /// Only the active step's extractor runs. The step advances when the
    /// merged value fills that slot; leaving `Style` is held back until an
    /// itinerary exists.
    pub fn apply_turn(&self, text: &str) -> Transition {
        let extracted = extract::extract(self.step, text);
        let mut state = self.clone();

        let Some(value) = extracted.clone() else {
            return Transition {
                state,
                extracted,
                advanced: false,
                ready_for_itinerary: false,
            };
        };

        let fills = value.fills_slot();
        state.trip.merge(value.into());

        let mut advanced = false;
        let mut ready_for_itinerary = false;
        if fills {
            match self.step.next() {
                Some(ConversationStep::Complete) => {
                    ready_for_itinerary = state.trip.is_complete();
                }
                Some(next) if self.step.can_transition_to(next) => {
                    state.step = next;
                    advanced = true;
                }
                _ => {}
            }
        }

        Transition {
            state,
            extracted,
            advanced,
            ready_for_itinerary,
        }
    }

    /// Commit the terminal step after a successful itinerary generation.
    pub fn complete(&mut self) -> Result<ConversationStep, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| "Already at terminal step".to_string())?;
        if next != ConversationStep::Complete {
            return Err(format!("Cannot complete from step {}", self.step));
        }
        if !self.trip.is_complete() {
            return Err("Trip is missing required slots".to_string());
        }
        self.step = next;
        Ok(next)
    }

    /// Store a destination chosen outside of extraction and move on.
    pub fn choose_destination(&mut self, destination: &str) -> Result<ConversationStep, String> {
        if self.step != ConversationStep::Destination {
            return Err(format!("Destination is not the active step ({})", self.step));
        }
        self.trip.destination = Some(destination.to_string());
        self.step = ConversationStep::Duration;
        Ok(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::model::{Pace, TravelStyle};

    #[test]
    fn valid_transitions() {
        use ConversationStep::*;
        for (from, to) in [
            (Destination, Duration),
            (Duration, Pace),
            (Pace, Style),
            (Style, Complete),
        ] {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use ConversationStep::*;
        assert!(!Destination.can_transition_to(Pace));
        assert!(!Style.can_transition_to(Pace));
        assert!(!Complete.can_transition_to(Destination));
        assert!(!Duration.can_transition_to(Duration));
    }

    #[test]
    fn next_walks_all_steps() {
        use ConversationStep::*;
        let mut current = Destination;
        for expected in [Duration, Pace, Style, Complete] {
            current = current.next().unwrap();
            assert_eq!(current, expected);
        }
        assert!(current.next().is_none());
        assert!(current.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        use ConversationStep::*;
        for step in [Destination, Duration, Pace, Style, Complete] {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{step}\""));
        }
    }

    #[test]
    fn end_to_end_turns() {
        let state = PlanningState::new();

        let t = state.apply_turn("I want to go to Kyoto, Japan");
        assert!(t.advanced);
        assert_eq!(t.state.trip.destination.as_deref(), Some("Kyoto, Japan"));
        assert_eq!(t.state.step, ConversationStep::Duration);

        let t = t.state.apply_turn("7 days");
        assert_eq!(t.state.trip.duration.as_deref(), Some("7"));
        assert_eq!(t.state.step, ConversationStep::Pace);

        let t = t.state.apply_turn("I want a relaxed trip");
        assert_eq!(t.state.trip.pace, Some(Pace::Relaxed));
        assert_eq!(t.state.step, ConversationStep::Style);
        assert!(!t.ready_for_itinerary);

        let t = t.state.apply_turn("culture and food");
        assert_eq!(
            t.state.trip.styles,
            [TravelStyle::Culture, TravelStyle::Food].into_iter().collect()
        );
        assert!(t.state.trip.is_complete());
        assert!(t.ready_for_itinerary);
        assert!(!t.advanced);
        assert_eq!(t.state.step, ConversationStep::Style);

        let mut done = t.state;
        assert_eq!(done.complete(), Ok(ConversationStep::Complete));
    }

    #[test]
    fn no_destination_keeps_step() {
        let state = PlanningState::new();
        let t = state.apply_turn("not sure yet");
        assert!(t.extracted.is_none());
        assert!(!t.advanced);
        assert_eq!(t.state, state);
    }

    #[test]
    fn styles_accumulate_while_style_active() {
        let mut state = PlanningState {
            step: ConversationStep::Style,
            ..Default::default()
        };
        let t = state.apply_turn("food please");
        // Destination, duration and pace are missing, so not ready.
        assert!(!t.ready_for_itinerary);
        state = t.state;
        let t = state.apply_turn("some nature too");
        assert_eq!(
            t.state.trip.styles,
            [TravelStyle::Food, TravelStyle::Nature].into_iter().collect()
        );
        let t = t.state.apply_turn("nothing else");
        assert_eq!(t.state.trip.styles.len(), 2);
        assert!(!t.ready_for_itinerary);
    }

    #[test]
    fn apply_turn_does_not_mutate_input() {
        let state = PlanningState::new();
        let _ = state.apply_turn("visit Paris");
        assert_eq!(state, PlanningState::new());
    }

    #[test]
    fn complete_turn_is_inert() {
        let state = PlanningState {
            step: ConversationStep::Complete,
            ..Default::default()
        };
        let t = state.apply_turn("more food and museums");
        assert_eq!(t.extracted, None);
        assert_eq!(t.state, state);
    }

    #[test]
    fn complete_requires_full_trip() {
        let mut state = PlanningState {
            step: ConversationStep::Style,
            ..Default::default()
        };
        assert!(state.complete().is_err());
        assert_eq!(state.step, ConversationStep::Style);
    }

    #[test]
    fn choose_destination_only_on_first_step() {
        let mut state = PlanningState::new();
        assert_eq!(
            state.choose_destination("Bali, Indonesia"),
            Ok(ConversationStep::Duration)
        );
        assert!(state.choose_destination("Peru").is_err());
        assert_eq!(state.trip.destination.as_deref(), Some("Bali, Indonesia"));
    }
}
