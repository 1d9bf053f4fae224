//! Persistence: libSQL document storage and the saved itinerary.

pub mod itinerary;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use itinerary::{ItineraryStore, StoredItinerary};
pub use libsql_backend::LibSqlBackend;
pub use traits::Database;
