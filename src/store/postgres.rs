//! PostgreSQL-backed document store (one JSONB row per document).

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{Document, DocumentStore, Fields, Query};
use crate::db;
use crate::entities::{documents, prelude::*};
use crate::error::{AppError, Result};

/// Document store over a SeaORM connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    /// Connect and make sure the `documents` table exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = db::connect(database_url).await?;
        db::ensure_schema(&db).await?;
        Ok(Self { db })
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Text form of a filter value, as produced by `data ->> field`.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_document(model: documents::Model) -> Document {
    let data = match model.data {
        Value::Object(map) => map,
        _ => Fields::new(),
    };
    Document::new(model.id, data)
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn create(&self, collection: &str, data: Fields) -> Result<String> {
        let id = Uuid::new_v4().simple().to_string();
        let now = Utc::now().fixed_offset();

        let model = documents::ActiveModel {
            collection: Set(collection.to_string()),
            id: Set(id.clone()),
            data: Set(Value::Object(data)),
            created_at: Set(now),
            updated_at: Set(now),
        };
        model.insert(&self.db).await?;

        debug!("Created {collection}/{id}");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let found = Documents::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await?;
        Ok(found.map(to_document))
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let mut select = Documents::find().filter(documents::Column::Collection.eq(collection));

        if let Some((field, value)) = &query.filter {
            select = select.filter(Expr::cust_with_values(
                "data ->> $1 = $2",
                [field.clone(), value_text(value)],
            ));
        }

        // Byte-wise collation keeps the order identical to the in-memory backend.
        match &query.order_by {
            Some(field) => {
                if let Some(cursor) = &query.start_after {
                    select = select.filter(Expr::cust_with_values(
                        r#"(COALESCE(data ->> $1, '') COLLATE "C", id COLLATE "C") > ($2, $3)"#,
                        [field.clone(), cursor.sort_text(field), cursor.id.clone()],
                    ));
                }
                select = select
                    .order_by(
                        Expr::cust_with_values(r#"COALESCE(data ->> $1, '') COLLATE "C""#, [field.clone()]),
                        Order::Asc,
                    )
                    .order_by(Expr::cust(r#"id COLLATE "C""#), Order::Asc);
            }
            None => {
                if let Some(cursor) = &query.start_after {
                    select = select.filter(Expr::cust_with_values(r#"id COLLATE "C" > $1"#, [cursor.id.clone()]));
                }
                select = select.order_by(Expr::cust(r#"id COLLATE "C""#), Order::Asc);
            }
        }

        if let Some(limit) = query.limit {
            select = select.limit(limit as u64);
        }

        let rows = select.all(&self.db).await?;
        Ok(rows.into_iter().map(to_document).collect())
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<()> {
        let existing = Documents::find_by_id((collection.to_string(), id.to_string()))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{collection}/{id}")))?;

        let mut data = match existing.data.clone() {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        data.extend(patch);

        let mut active: documents::ActiveModel = existing.into();
        active.data = Set(Value::Object(data));
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(&self.db).await?;

        debug!("Updated {collection}/{id}");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        Documents::delete_by_id((collection.to_string(), id.to_string()))
            .exec(&self.db)
            .await?;
        debug!("Deleted {collection}/{id}");
        Ok(())
    }

    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let result = Documents::delete_many()
            .filter(documents::Column::Collection.eq(collection))
            .filter(documents::Column::Id.is_in(ids.iter().cloned()))
            .exec(&self.db)
            .await?;
        debug!("Deleted {} documents from {collection}", result.rows_affected);
        Ok(())
    }
}
