//! Trip planning conversation.
//!
//! The traveler is asked for four things in a fixed order: destination,
//! trip length, pace and interests. Each user turn is run through the
//! extractor for the step being asked about. Once all four are known the
//! assistant generates an itinerary, which is stored for the timeline view.

pub mod assistant;
pub mod driver;
pub mod extract;
pub mod model;
pub mod prompts;
pub mod routes;
pub mod session;
pub mod state;

pub use assistant::{LlmTravelAssistant, TravelAssistant};
pub use driver::{AcceptedTurn, ConversationDriver, GeneratedItinerary, PlanningStatus, TurnOutcome};
pub use model::{Pace, TravelStyle, TripData, TripPatch};
pub use routes::{TripRouteState, trip_routes};
pub use session::run_session;
pub use state::{ConversationStep, PlanningState, Transition};
