//! Department repository with CRUD operations.

use super::paging::fetch_all;
use crate::error::Result;
use crate::models::department::{Department, DepartmentForm};
use crate::store::{Document, DocumentStore, Fields};
use serde_json::Value;

pub const COLLECTION: &str = "departments";

fn decode(doc: &Document) -> Result<Department> {
    let mut department: Department = doc.decode()?;
    department.id = doc.id.clone();
    Ok(department)
}

/// List all departments ordered by name.
pub async fn list_all(store: &dyn DocumentStore) -> Result<Vec<Department>> {
    fetch_all(store, COLLECTION, "name").await?.iter().map(decode).collect()
}

/// Get department by ID.
pub async fn get_by_id(store: &dyn DocumentStore, id: &str) -> Result<Option<Department>> {
    store.get(COLLECTION, id).await?.as_ref().map(decode).transpose()
}

/// Create a new department named `name` from the form.
pub async fn create(store: &dyn DocumentStore, name: &str, form: &DepartmentForm) -> Result<Department> {
    let id = store.create(COLLECTION, form.to_fields(name)).await?;
    Ok(saved(id, name, form))
}

/// Overwrite an existing department with the form contents.
pub async fn update(store: &dyn DocumentStore, id: &str, name: &str, form: &DepartmentForm) -> Result<Department> {
    store.update(COLLECTION, id, form.to_fields(name)).await?;
    Ok(saved(id.to_string(), name, form))
}

/// Remove the manager reference of a department.
pub async fn clear_manager(store: &dyn DocumentStore, id: &str) -> Result<()> {
    let mut patch = Fields::new();
    patch.insert("manager".into(), Value::String(String::new()));
    store.update(COLLECTION, id, patch).await
}

/// Delete a department by ID.
pub async fn delete(store: &dyn DocumentStore, id: &str) -> Result<()> {
    store.delete(COLLECTION, id).await
}

fn saved(id: String, name: &str, form: &DepartmentForm) -> Department {
    Department {
        id,
        name: name.to_string(),
        manager: form.manager().map(str::to_string),
        collaborators: form.member_ids.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::store::MemoryStore;

    fn form(manager: Option<&str>) -> DepartmentForm {
        DepartmentForm {
            name: String::new(),
            manager_id: manager.map(str::to_string),
            member_ids: vec!["c1".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let dept = create(&store, "Sales", &form(Some("m1"))).await.unwrap();

        let loaded = get_by_id(&store, &dept.id).await.unwrap().unwrap();
        assert_eq!(loaded, dept);
        assert_eq!(loaded.manager.as_deref(), Some("m1"));
    }

    #[tokio::test]
    async fn test_update_removes_manager() {
        let store = MemoryStore::new();
        let dept = create(&store, "Sales", &form(Some("m1"))).await.unwrap();

        update(&store, &dept.id, "Sales", &form(None)).await.unwrap();
        let loaded = get_by_id(&store, &dept.id).await.unwrap().unwrap();
        assert_eq!(loaded.manager, None);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = MemoryStore::new();
        let err = update(&store, "missing", "Sales", &form(None)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
