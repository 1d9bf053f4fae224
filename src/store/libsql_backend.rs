//! libSQL implementation of [`Database`], file-backed or in-memory.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, params};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::Database;

pub struct LibSqlBackend {
    // The connection borrows nothing from the handle, but dropping the
    // handle closes an in-memory database.
    _db: libsql::Database,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open or create the database file at `path`, creating missing parent
    /// directories, and migrate it.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| DatabaseError::Pool(format!("create {}: {e}", dir.display())))?;
        }
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("open {}: {e}", path.display())))?;
        let backend = Self::open(db).await?;
        tracing::info!("Trip database ready at {}", path.display());
        Ok(backend)
    }

    /// Private in-memory database.
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("open in-memory database: {e}")))?;
        Self::open(db).await
    }

    async fn open(db: libsql::Database) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("connect: {e}")))?;
        let backend = Self { _db: db, conn };
        backend.migrate().await?;
        Ok(backend)
    }
}

fn query_err(op: &'static str) -> impl Fn(libsql::Error) -> DatabaseError {
    move |e| DatabaseError::Query(format!("{op}: {e}"))
}

#[async_trait]
impl Database for LibSqlBackend {
    async fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).await
    }

    async fn fetch_document(
        &self,
        traveler: &str,
        name: &str,
    ) -> Result<Option<serde_json::Value>, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                "SELECT body FROM trip_documents WHERE traveler = ?1 AND name = ?2",
                params![traveler, name],
            )
            .await
            .map_err(query_err("fetch_document"))?;

        let Some(row) = rows.next().await.map_err(query_err("fetch_document"))? else {
            return Ok(None);
        };
        let body: String = row.get(0).map_err(query_err("fetch_document"))?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| DatabaseError::Serialization(format!("{traveler}/{name}: {e}")))
    }

    async fn put_document(
        &self,
        traveler: &str,
        name: &str,
        body: &serde_json::Value,
    ) -> Result<(), DatabaseError> {
        let body = serde_json::to_string(body)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;
        self.conn
            .execute(
                "INSERT INTO trip_documents (traveler, name, body, saved_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (traveler, name) DO UPDATE SET body = ?3, saved_at = ?4",
                params![traveler, name, body, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(query_err("put_document"))?;
        Ok(())
    }

    async fn remove_document(&self, traveler: &str, name: &str) -> Result<bool, DatabaseError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM trip_documents WHERE traveler = ?1 AND name = ?2",
                params![traveler, name],
            )
            .await
            .map_err(query_err("remove_document"))?;
        Ok(removed > 0)
    }
}
