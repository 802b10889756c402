//! Collaborator repository with CRUD operations.

use super::paging::fetch_all;
use crate::error::Result;
use crate::models::collaborator::{Collaborator, UpdateCollaborator};
use crate::store::{Document, DocumentStore, Query, to_fields};

pub const COLLECTION: &str = "collaborators";

fn decode(doc: &Document) -> Result<Collaborator> {
    let mut collaborator: Collaborator = doc.decode()?;
    collaborator.id = doc.id.clone();
    Ok(collaborator)
}

/// List all collaborators ordered by name.
pub async fn list_all(store: &dyn DocumentStore) -> Result<Vec<Collaborator>> {
    fetch_all(store, COLLECTION, "name").await?.iter().map(decode).collect()
}

/// Get collaborator by ID.
pub async fn get_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Collaborator>> {
    store.get(COLLECTION, id).await?.as_ref().map(decode).transpose()
}

/// Create a new collaborator and return it with its assigned id.
pub async fn create(store: &dyn DocumentStore, data: &Collaborator) -> Result<Collaborator> {
    let id = store.create(COLLECTION, to_fields(data)?).await?;
    Ok(Collaborator { id, ..data.clone() })
}

/// Apply a partial update. Empty updates are skipped.
pub async fn update(store: &dyn DocumentStore, id: &str, data: UpdateCollaborator) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }
    store.update(COLLECTION, id, data.into_fields()).await
}

/// Delete a collaborator by ID.
pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<()> {
    store.delete(COLLECTION, id).await
}

/// Delete several collaborators at once.
pub async fn delete_batch(store: &dyn DocumentStore, ids: &[String]) -> Result<()> {
    store.batch_delete(COLLECTION, ids).await
}

/// Collaborators whose `managerId` is `manager_id`.
pub async fn list_reports(store: &dyn DocumentStore, manager_id: &str) -> Result<Vec<Collaborator>> {
    let query = Query::new().where_eq("managerId", manager_id);
    store.list(COLLECTION, &query).await?.iter().map(decode).collect()
}

/// Collaborators whose `departmentId` is `department_id`.
pub async fn list_by_department(store: &dyn DocumentStore, department_id: &str) -> Result<Vec<Collaborator>> {
    let query = Query::new().where_eq("departmentId", department_id);
    store.list(COLLECTION, &query).await?.iter().map(decode).collect()
}

/// Check if a collaborator already uses this email.
pub async fn email_exists(store: &dyn DocumentStore, email: &str) -> Result<bool> {
    let query = Query::new().where_eq("email", email).limit(1);
    Ok(!store.list(COLLECTION, &query).await?.is_empty())
}
