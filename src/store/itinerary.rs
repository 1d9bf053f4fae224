//! Persisted itinerary document.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::planner::model::TripData;
use crate::store::traits::Database;

/// Document name of the finalized trip and its itinerary.
pub const TRIP_DOCUMENT: &str = "trip_itinerary";

/// Traveler namespace used by the single-user CLI.
pub const DEFAULT_TRAVELER: &str = "default";

/// A finalized trip and the raw itinerary text generated for it.
///
/// Only the raw text is stored; readers re-run the itinerary parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItinerary {
    pub destination: String,
    pub duration: String,
    pub pace: String,
    pub styles: Vec<String>,
    pub itinerary: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl StoredItinerary {
    pub fn new(trip: &TripData, itinerary: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            destination: trip.destination.clone().unwrap_or_default(),
            duration: trip.duration.clone().unwrap_or_default(),
            pace: trip.pace.map(|p| p.to_string()).unwrap_or_default(),
            styles: trip.styles.iter().map(|s| s.to_string()).collect(),
            itinerary: itinerary.into(),
            created_at,
        }
    }
}

/// Reads and writes the single itinerary document of the default traveler.
#[derive(Clone)]
pub struct ItineraryStore {
    db: Arc<dyn Database>,
}

impl ItineraryStore {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Overwrite the stored document.
    pub async fn save(&self, doc: &StoredItinerary) -> Result<(), DatabaseError> {
        let value =
            serde_json::to_value(doc).map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.db
            .put_document(DEFAULT_TRAVELER, TRIP_DOCUMENT, &value)
            .await?;
        tracing::info!("Saved itinerary for {}", doc.destination);
        Ok(())
    }

    /// The last saved document, if any.
    pub async fn load(&self) -> Result<Option<StoredItinerary>, DatabaseError> {
        let Some(value) = self
            .db
            .fetch_document(DEFAULT_TRAVELER, TRIP_DOCUMENT)
            .await?
        else {
            return Ok(None);
        };
        let doc = serde_json::from_value(value)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        Ok(Some(doc))
    }

    /// Remove the stored document. Returns whether one existed.
    pub async fn clear(&self) -> Result<bool, DatabaseError> {
        self.db
            .remove_document(DEFAULT_TRAVELER, TRIP_DOCUMENT)
            .await
    }
}
