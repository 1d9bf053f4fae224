//! Itinerary parsing: raw generated markdown into a structured timeline.

pub mod model;
pub mod parser;
pub mod scan;

pub use model::{DayOrigin, ParsedDay, TimeOfDay, TimeSlot};
pub use parser::parse;
