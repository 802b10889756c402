//! Department save/delete workflows against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use gianged_hr::db::{collaborator, department};
use gianged_hr::models::{Collaborator, Department, DepartmentForm, Seniority, UpdateCollaborator};
use gianged_hr::services::{DeletePlan, IntegrityManager};
use gianged_hr::store::{Document, DocumentStore, Fields, MemoryStore, Query};
use gianged_hr::ui::department_panel::FormDialog;
use gianged_hr::{AppError, Result};

async fn add(store: &dyn DocumentStore, name: &str, seniority: Seniority) -> Collaborator {
    let record = Collaborator {
        name: name.to_string(),
        email: format!("{}@flugo.com", name.to_lowercase()),
        seniority: Some(seniority),
        ..Default::default()
    };
    collaborator::create(store, &record).await.unwrap()
}

async fn snapshot(store: &dyn DocumentStore) -> (Vec<Department>, Vec<Collaborator>) {
    (
        department::list_all(store).await.unwrap(),
        collaborator::list_all(store).await.unwrap(),
    )
}

fn find<'a>(collaborators: &'a [Collaborator], id: &str) -> &'a Collaborator {
    collaborators.iter().find(|c| c.id == id).unwrap()
}

fn form(name: &str, manager: Option<&Collaborator>, members: &[&Collaborator]) -> DepartmentForm {
    DepartmentForm {
        name: name.to_string(),
        manager_id: manager.map(|m| m.id.clone()),
        member_ids: members.iter().map(|c| c.id.clone()).collect(),
    }
}

#[tokio::test]
async fn test_save_assigns_members_and_manager() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let boss = add(store.as_ref(), "Marta", Seniority::Manager).await;
    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let bruno = add(store.as_ref(), "Bruno", Seniority::Senior).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;

    let saved = integrity
        .save_department(&form("Engineering", Some(&boss), &[&ana, &bruno]), &departments, &collaborators, None)
        .await
        .unwrap();
    assert_eq!(saved.name, "Engineering");
    assert_eq!(saved.manager.as_deref(), Some(boss.id.as_str()));

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert_eq!(departments.len(), 1);

    for id in [&ana.id, &bruno.id] {
        let c = find(&collaborators, id);
        assert_eq!(c.department_id.as_deref(), Some(saved.id.as_str()));
        assert_eq!(c.department_name.as_deref(), Some("Engineering"));
        assert_eq!(c.manager_id.as_deref(), Some(boss.id.as_str()));
    }

    let manager = find(&collaborators, &boss.id);
    assert_eq!(manager.department_id.as_deref(), Some(saved.id.as_str()));
    assert_eq!(manager.manager_id, None);
}

#[tokio::test]
async fn test_resave_removes_dropped_members_only() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let bruno = add(store.as_ref(), "Bruno", Seniority::Mid).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let saved = integrity
        .save_department(&form("Sales", None, &[&ana, &bruno]), &departments, &collaborators, None)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    integrity
        .save_department(&form("Sales", None, &[&ana]), &departments, &collaborators, Some(&saved.id))
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0].collaborators, vec![ana.id.clone()]);
    assert!(find(&collaborators, &ana.id).references_department(&saved.id));

    let dropped = find(&collaborators, &bruno.id);
    assert_eq!(dropped.department_id, None);
    assert_eq!(dropped.department_name, None);
    assert_eq!(dropped.manager_id, None);
}

#[tokio::test]
async fn test_rename_propagates_department_name() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let saved = integrity
        .save_department(&form("Ops", None, &[&ana]), &departments, &collaborators, None)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    integrity
        .save_department(&form("Operations", None, &[&ana]), &departments, &collaborators, Some(&saved.id))
        .await
        .unwrap();

    let (_, collaborators) = snapshot(store.as_ref()).await;
    assert_eq!(find(&collaborators, &ana.id).department_name.as_deref(), Some("Operations"));
}

#[tokio::test]
async fn test_duplicate_name_writes_nothing() {
    let store = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    integrity
        .save_department(&form("Finance", None, &[]), &departments, &collaborators, None)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let err = integrity
        .save_department(&form("  FINANCE ", None, &[&ana]), &departments, &collaborators, None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateName(_)));
    assert_eq!(store.count(department::COLLECTION).await, 1);
    let (_, collaborators) = snapshot(store.as_ref()).await;
    assert_eq!(find(&collaborators, &ana.id).department_id, None);
}

#[tokio::test]
async fn test_delete_empty_department_is_direct() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let boss = add(store.as_ref(), "Marta", Seniority::Manager).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let saved = integrity
        .save_department(&form("Design", Some(&boss), &[]), &departments, &collaborators, None)
        .await
        .unwrap();

    // The manager alone does not block deletion.
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let plan = integrity
        .request_delete_department(&saved.id, &departments, &collaborators)
        .unwrap();
    assert_eq!(plan, DeletePlan::Direct);

    integrity.confirm_direct_delete(&saved.id).await.unwrap();
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert!(departments.is_empty());
    assert_eq!(find(&collaborators, &boss.id).department_id, None);
}

#[tokio::test]
async fn test_transfer_then_delete() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let old_boss = add(store.as_ref(), "Marta", Seniority::Manager).await;
    let new_boss = add(store.as_ref(), "Paulo", Seniority::Manager).await;
    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let bruno = add(store.as_ref(), "Bruno", Seniority::Mid).await;

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let source = integrity
        .save_department(&form("Support", Some(&old_boss), &[&ana, &bruno]), &departments, &collaborators, None)
        .await
        .unwrap();
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let target = integrity
        .save_department(&form("Success", Some(&new_boss), &[]), &departments, &collaborators, None)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let DeletePlan::Transfer { pending } = integrity
        .request_delete_department(&source.id, &departments, &collaborators)
        .unwrap()
    else {
        panic!("expected a transfer");
    };
    assert_eq!(pending.len(), 2);

    integrity
        .confirm_transfer_and_delete(&source.id, &target.id, &pending)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert!(departments.iter().all(|d| d.id != source.id));
    assert!(collaborators.iter().all(|c| !c.references_department(&source.id)));
    for id in [&ana.id, &bruno.id] {
        let c = find(&collaborators, id);
        assert_eq!(c.department_id.as_deref(), Some(target.id.as_str()));
        assert_eq!(c.department_name.as_deref(), Some("Success"));
        assert_eq!(c.manager_id.as_deref(), Some(new_boss.id.as_str()));
    }
}

/// Delegates to a memory store but fails updates of one document.
struct FailingStore {
    inner: MemoryStore,
    fail_id: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn create(&self, collection: &str, data: Fields) -> Result<String> {
        self.inner.create(collection, data).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        self.inner.list(collection, query).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<()> {
        let fail = self.fail_id.lock().unwrap().as_deref() == Some(id);
        if fail {
            return Err(AppError::remote("connection reset"));
        }
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.inner.delete(collection, id).await
    }

    async fn batch_delete(&self, collection: &str, ids: &[String]) -> Result<()> {
        self.inner.batch_delete(collection, ids).await
    }
}

#[tokio::test]
async fn test_failed_transfer_keeps_source_department() {
    let failing = Arc::new(FailingStore {
        inner: MemoryStore::new(),
        fail_id: std::sync::Mutex::new(None),
    });
    let store: Arc<dyn DocumentStore> = failing.clone();
    let integrity = IntegrityManager::new(store.clone());

    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let bruno = add(store.as_ref(), "Bruno", Seniority::Junior).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let source = integrity
        .save_department(&form("Support", None, &[&ana, &bruno]), &departments, &collaborators, None)
        .await
        .unwrap();
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let target = integrity
        .save_department(&form("Success", None, &[]), &departments, &collaborators, None)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let DeletePlan::Transfer { pending } = integrity
        .request_delete_department(&source.id, &departments, &collaborators)
        .unwrap()
    else {
        panic!("expected a transfer");
    };

    *failing.fail_id.lock().unwrap() = Some(pending[1].id.clone());
    let err = integrity
        .confirm_transfer_and_delete(&source.id, &target.id, &pending)
        .await
        .unwrap_err();
    assert!(err.is_remote());

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert!(departments.iter().any(|d| d.id == source.id));
    assert!(find(&collaborators, &pending[0].id).references_department(&target.id));
    assert!(find(&collaborators, &pending[1].id).references_department(&source.id));

    // Re-running with the failure gone finishes the job.
    *failing.fail_id.lock().unwrap() = None;
    integrity
        .confirm_transfer_and_delete(&source.id, &target.id, &pending)
        .await
        .unwrap();
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert!(departments.iter().all(|d| d.id != source.id));
    assert!(collaborators.iter().all(|c| c.references_department(&target.id)));
}

#[tokio::test]
async fn test_late_joiner_blocks_transfer_delete() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let ana = add(store.as_ref(), "Ana", Seniority::Junior).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let source = integrity
        .save_department(&form("Support", None, &[&ana]), &departments, &collaborators, None)
        .await
        .unwrap();
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let target = integrity
        .save_department(&form("Success", None, &[]), &departments, &collaborators, None)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let DeletePlan::Transfer { pending } = integrity
        .request_delete_department(&source.id, &departments, &collaborators)
        .unwrap()
    else {
        panic!("expected a transfer");
    };

    // Joins after the pending list was built.
    let carla = add(store.as_ref(), "Carla", Seniority::Mid).await;
    collaborator::update(store.as_ref(), &carla.id, UpdateCollaborator::assign(&source.id, "Support", None))
        .await
        .unwrap();

    let err = integrity
        .confirm_transfer_and_delete(&source.id, &target.id, &pending)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert!(departments.iter().any(|d| d.id == source.id));
    assert!(find(&collaborators, &carla.id).references_department(&source.id));

    // A fresh request picks Carla up and the transfer completes.
    let DeletePlan::Transfer { pending } = integrity
        .request_delete_department(&source.id, &departments, &collaborators)
        .unwrap()
    else {
        panic!("expected a transfer");
    };
    assert_eq!(pending.len(), 1);
    integrity
        .confirm_transfer_and_delete(&source.id, &target.id, &pending)
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    assert!(departments.iter().all(|d| d.id != source.id));
    assert!(collaborators.iter().all(|c| !c.references_department(&source.id)));
}

#[tokio::test]
async fn test_rename_keeps_members_who_moved_away() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let integrity = IntegrityManager::new(store.clone());

    let x = add(store.as_ref(), "Xavier", Seniority::Junior).await;
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let a = integrity
        .save_department(&form("A", None, &[&x]), &departments, &collaborators, None)
        .await
        .unwrap();
    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let b = integrity
        .save_department(&form("B", None, &[]), &departments, &collaborators, None)
        .await
        .unwrap();

    collaborator::update(store.as_ref(), &x.id, UpdateCollaborator::assign(&b.id, "B", None))
        .await
        .unwrap();

    let (departments, collaborators) = snapshot(store.as_ref()).await;
    let stored_a = departments.iter().find(|d| d.id == a.id).unwrap();
    let mut dialog = FormDialog::edit(stored_a, &collaborators);
    dialog.form.name = "A2".to_string();
    integrity
        .save_department(&dialog.form, &departments, &collaborators, dialog.editing_id.as_deref())
        .await
        .unwrap();

    let (_, collaborators) = snapshot(store.as_ref()).await;
    let moved = find(&collaborators, &x.id);
    assert!(moved.references_department(&b.id));
    assert_eq!(moved.department_name.as_deref(), Some("B"));
}
