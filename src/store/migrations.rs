//! Schema versioning for the planner database.
//!
//! Applied versions are recorded in `schema_version`. Each pending step runs
//! inside its own transaction together with its version row, so a failed
//! step leaves the database at the previous version.

use libsql::Connection;

use crate::error::DatabaseError;

struct SchemaStep {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Append new steps at the end; never edit an applied one.
static SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "trip_documents",
    sql: r#"
            CREATE TABLE IF NOT EXISTS trip_documents (
                traveler TEXT NOT NULL,
                name TEXT NOT NULL,
                body TEXT NOT NULL,
                saved_at TEXT NOT NULL,
                PRIMARY KEY (traveler, name)
            );
        "#,
}];

/// Latest schema version this build knows about.
pub fn latest_version() -> i64 {
    SCHEMA_STEPS.last().map(|s| s.version).unwrap_or(0)
}

/// Bring the schema up to [`latest_version`].
pub async fn migrate(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        (),
    )
    .await
    .map_err(|e| DatabaseError::Migration(format!("schema_version table: {e}")))?;

    let applied = applied_version(conn).await?;
    if applied > latest_version() {
        return Err(DatabaseError::Migration(format!(
            "database is at V{applied}, newer than this build (V{})",
            latest_version()
        )));
    }

    for step in SCHEMA_STEPS.iter().filter(|s| s.version > applied) {
        tracing::info!(version = step.version, name = step.name, "Applying schema step");
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DatabaseError::Migration(format!("V{} begin: {e}", step.version)))?;
        tx.execute_batch(step.sql).await.map_err(|e| {
            DatabaseError::Migration(format!("V{} ({}): {e}", step.version, step.name))
        })?;
        tx.execute(
            "INSERT INTO schema_version (version, name) VALUES (?1, ?2)",
            libsql::params![step.version, step.name],
        )
        .await
        .map_err(|e| DatabaseError::Migration(format!("V{} record: {e}", step.version)))?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::Migration(format!("V{} commit: {e}", step.version)))?;
    }

    Ok(())
}

/// Highest recorded version, 0 for a fresh database.
pub async fn applied_version(conn: &Connection) -> Result<i64, DatabaseError> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("read schema version: {e}")))?;
    let Some(row) = rows
        .next()
        .await
        .map_err(|e| DatabaseError::Migration(format!("read schema version: {e}")))?
    else {
        return Ok(0);
    };
    row.get::<i64>(0)
        .map_err(|e| DatabaseError::Migration(format!("decode schema version: {e}")))
}
