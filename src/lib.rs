//! Conversational trip planning with a day-by-day timeline.

pub mod channels;
pub mod config;
pub mod error;
pub mod itinerary;
pub mod llm;
pub mod planner;
pub mod store;
pub mod timeline;
