//! Storage seam for the planner.

use async_trait::async_trait;

use crate::error::DatabaseError;

/// Named JSON documents, one namespace per traveler.
///
/// Saving under an existing name replaces the whole document.
#[async_trait]
pub trait Database: Send + Sync {
    async fn migrate(&self) -> Result<(), DatabaseError>;

    async fn fetch_document(
        &self,
        traveler: &str,
        name: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError>;

    async fn put_document(
        &self,
        traveler: &str,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<(), DatabaseError>;

    /// Returns whether a document was removed.
    async fn remove_document(&self, traveler: &str, name: &str) -> Result<bool, DatabaseError>;
}
