//! Database connection pool and utility functions.

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;
use tracing::log::LevelFilter;

use crate::store::{DocumentStore, Query};

/// Create a new database connection with configured pool settings.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt).await
}

/// Create the `documents` table and its lookup indexes if missing.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data JSONB NOT NULL DEFAULT '{}'::jsonb,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            PRIMARY KEY (collection, id)
        )",
    )
    .await?;
    db.execute_unprepared(
        "CREATE INDEX IF NOT EXISTS documents_name_idx ON documents (collection, (data ->> 'name'))",
    )
    .await?;
    db.execute_unprepared(
        "CREATE INDEX IF NOT EXISTS documents_email_idx ON documents (collection, (data ->> 'email'))",
    )
    .await?;
    Ok(())
}

/// Get PostgreSQL version string.
pub async fn get_version(db: &DatabaseConnection) -> Result<String, DbErr> {
    let result = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT version()".to_owned(),
        ))
        .await?;

    match result {
        Some(row) => {
            let version: String = row.try_get("", "version")?;
            Ok(version)
        }
        None => Ok("Unknown".to_owned()),
    }
}

/// Get document counts for the application collections.
pub async fn get_collection_counts(store: &dyn DocumentStore) -> crate::Result<CollectionCounts> {
    let departments = store.list(super::department::COLLECTION, &Query::new()).await?.len();
    let collaborators = store.list(super::collaborator::COLLECTION, &Query::new()).await?.len();

    Ok(CollectionCounts {
        departments,
        collaborators,
    })
}

/// Collection document counts.
#[derive(Debug, Clone)]
pub struct CollectionCounts {
    pub departments: usize,
    pub collaborators: usize,
}
