//! Collaborator wizard, quick edit and delete against the in-memory store.

use std::sync::Arc;

use gianged_hr::db::{collaborator, department};
use gianged_hr::models::{Collaborator, Department, DepartmentForm, Seniority, Status};
use gianged_hr::services::{CollaboratorService, CollaboratorWizard, IntegrityManager, QuickEdit, WizardStep};
use gianged_hr::store::{DocumentStore, MemoryStore};
use gianged_hr::AppError;

struct Fixture {
    store: Arc<MemoryStore>,
    service: CollaboratorService,
    integrity: IntegrityManager,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            service: CollaboratorService::new(store.clone()),
            integrity: IntegrityManager::new(store.clone()),
            store,
        }
    }

    fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    async fn snapshot(&self) -> (Vec<Department>, Vec<Collaborator>) {
        (
            department::list_all(self.store()).await.unwrap(),
            collaborator::list_all(self.store()).await.unwrap(),
        )
    }

    /// Create through the wizard, the way the UI does.
    async fn hire(&self, name: &str, seniority: Seniority, department_id: Option<&str>) -> Result<Collaborator, AppError> {
        let (departments, _) = self.snapshot().await;
        let mut wizard = CollaboratorWizard::new();
        wizard.basic.name = name.to_string();
        wizard.basic.email = format!("{}@flugo.com", name.to_lowercase());
        wizard.advance()?;
        wizard.professional.seniority = seniority;
        wizard.professional.department_id = department_id.map(str::to_string);
        self.service.commit(&wizard, &departments).await
    }

    async fn department(&self, name: &str, manager: Option<&Collaborator>) -> Department {
        let (departments, collaborators) = self.snapshot().await;
        let form = DepartmentForm {
            name: name.to_string(),
            manager_id: manager.map(|m| m.id.clone()),
            member_ids: vec![],
        };
        self.integrity
            .save_department(&form, &departments, &collaborators, None)
            .await
            .unwrap()
    }
}

fn find<'a>(collaborators: &'a [Collaborator], id: &str) -> &'a Collaborator {
    collaborators.iter().find(|c| c.id == id).unwrap()
}

#[tokio::test]
async fn test_wizard_creates_with_defaults_and_department_manager() {
    let fx = Fixture::new();
    let boss = fx.hire("Marta", Seniority::Manager, None).await.unwrap();
    let dept = fx.department("Engineering", Some(&boss)).await;

    let ana = fx.hire("Ana", Seniority::Junior, Some(&dept.id)).await.unwrap();
    assert!(!ana.id.is_empty());

    let (_, collaborators) = fx.snapshot().await;
    let stored = find(&collaborators, &ana.id);
    assert_eq!(stored.email, "ana@flugo.com");
    assert_eq!(stored.status, Status::Active);
    assert_eq!(stored.role.as_deref(), Some("Collaborator"));
    assert_eq!(stored.salary_base, Some(0.0));
    assert!(stored.admission_date.is_some());
    assert_eq!(stored.department_name.as_deref(), Some("Engineering"));
    assert_eq!(stored.manager_id.as_deref(), Some(boss.id.as_str()));
}

#[tokio::test]
async fn test_wizard_rejects_duplicate_email() {
    let fx = Fixture::new();
    fx.hire("Ana", Seniority::Manager, None).await.unwrap();

    let err = fx.hire("Ana", Seniority::Manager, None).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateEmail(_)));
    assert_eq!(fx.store.count(collaborator::COLLECTION).await, 1);
}

#[tokio::test]
async fn test_wizard_stops_on_invalid_basic_info() {
    let mut wizard = CollaboratorWizard::new();
    wizard.basic.name = "Ana".to_string();
    wizard.basic.email = "not-an-email".to_string();

    assert!(wizard.advance().is_err());
    assert_eq!(wizard.step, WizardStep::Basic);
}

#[tokio::test]
async fn test_manager_follows_reports_department() {
    let fx = Fixture::new();
    let boss = fx.hire("Marta", Seniority::Manager, None).await.unwrap();
    let dept = fx.department("Engineering", Some(&boss)).await;

    // Simulate a manager whose own record drifted away from the department.
    let drift = gianged_hr::models::UpdateCollaborator {
        department_id: Some(None),
        department_name: Some(None),
        ..Default::default()
    };
    collaborator::update(fx.store(), &boss.id, drift).await.unwrap();

    fx.hire("Ana", Seniority::Junior, Some(&dept.id)).await.unwrap();

    let (_, collaborators) = fx.snapshot().await;
    let manager = find(&collaborators, &boss.id);
    assert_eq!(manager.department_id.as_deref(), Some(dept.id.as_str()));
    assert_eq!(manager.department_name.as_deref(), Some("Engineering"));
}

#[tokio::test]
async fn test_quick_edit_moves_department() {
    let fx = Fixture::new();
    let sales = fx.department("Sales", None).await;
    let support = fx.department("Support", None).await;
    let ana = fx.hire("Ana", Seniority::Junior, Some(&sales.id)).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let current = find(&collaborators, &ana.id).clone();
    let mut edit = QuickEdit::from_collaborator(&current);
    edit.department_id = Some(support.id.clone());
    edit.status = Status::Inactive;

    let updated = fx
        .service
        .quick_edit(&current, &edit, &departments, &collaborators)
        .await
        .unwrap();
    assert_eq!(updated.department_name.as_deref(), Some("Support"));

    let (_, collaborators) = fx.snapshot().await;
    let stored = find(&collaborators, &ana.id);
    assert!(stored.references_department(&support.id));
    assert_eq!(stored.department_name.as_deref(), Some("Support"));
    assert_eq!(stored.status, Status::Inactive);
}

#[tokio::test]
async fn test_quick_edit_rejects_taken_email() {
    let fx = Fixture::new();
    fx.hire("Ana", Seniority::Manager, None).await.unwrap();
    let bruno = fx.hire("Bruno", Seniority::Manager, None).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let current = find(&collaborators, &bruno.id).clone();
    let mut edit = QuickEdit::from_collaborator(&current);
    edit.email = "ana@flugo.com".to_string();

    let err = fx
        .service
        .quick_edit(&current, &edit, &departments, &collaborators)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateEmail(_)));

    let (_, collaborators) = fx.snapshot().await;
    assert_eq!(find(&collaborators, &bruno.id).email, "bruno@flugo.com");
}

#[tokio::test]
async fn test_deleting_manager_clears_references() {
    let fx = Fixture::new();
    let boss = fx.hire("Marta", Seniority::Manager, None).await.unwrap();
    let dept = fx.department("Engineering", Some(&boss)).await;
    let ana = fx.hire("Ana", Seniority::Junior, Some(&dept.id)).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let deleted = fx
        .service
        .delete(&[boss.id.clone()], &departments, &collaborators)
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let (departments, collaborators) = fx.snapshot().await;
    assert_eq!(collaborators.len(), 1);
    assert_eq!(departments[0].manager, None);
    let report = find(&collaborators, &ana.id);
    assert_eq!(report.manager_id, None);
    assert!(report.references_department(&dept.id));
}

#[tokio::test]
async fn test_batch_delete() {
    let fx = Fixture::new();
    let ana = fx.hire("Ana", Seniority::Manager, None).await.unwrap();
    let bruno = fx.hire("Bruno", Seniority::Manager, None).await.unwrap();
    fx.hire("Carla", Seniority::Manager, None).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let deleted = fx
        .service
        .delete(&[ana.id.clone(), bruno.id.clone()], &departments, &collaborators)
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let (_, collaborators) = fx.snapshot().await;
    let names: Vec<_> = collaborators.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Carla"]);
}

#[tokio::test]
async fn test_demoting_manager_by_quick_edit_releases_reports() {
    let fx = Fixture::new();
    let boss = fx.hire("Marta", Seniority::Manager, None).await.unwrap();
    let dept = fx.department("Engineering", Some(&boss)).await;
    let ana = fx.hire("Ana", Seniority::Junior, Some(&dept.id)).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let current = find(&collaborators, &boss.id).clone();
    let mut edit = QuickEdit::from_collaborator(&current);
    edit.seniority = Seniority::Junior;
    edit.department_id = Some(dept.id.clone());
    edit.manager_id = None;

    fx.service
        .quick_edit(&current, &edit, &departments, &collaborators)
        .await
        .unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    assert_eq!(find(&collaborators, &boss.id).seniority, Some(Seniority::Junior));
    assert_eq!(departments[0].manager, None);
    assert_eq!(find(&collaborators, &ana.id).manager_id, None);

    // Every remaining managerId points at a manager.
    for c in &collaborators {
        if let Some(manager_id) = c.manager_id.as_deref() {
            assert!(find(&collaborators, manager_id).is_manager());
        }
    }
}

#[tokio::test]
async fn test_demoting_manager_in_wizard_releases_reports() {
    let fx = Fixture::new();
    let boss = fx.hire("Marta", Seniority::Manager, None).await.unwrap();
    let dept = fx.department("Engineering", Some(&boss)).await;
    let ana = fx.hire("Ana", Seniority::Junior, Some(&dept.id)).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let mut wizard = CollaboratorWizard::edit(find(&collaborators, &boss.id));
    wizard.advance().unwrap();
    wizard.professional.seniority = Seniority::Senior;
    wizard.professional.department_id = Some(dept.id.clone());
    fx.service.commit(&wizard, &departments).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    assert_eq!(departments[0].manager, None);
    assert_eq!(find(&collaborators, &ana.id).manager_id, None);
    let demoted = find(&collaborators, &boss.id);
    assert_eq!(demoted.seniority, Some(Seniority::Senior));
    assert_eq!(demoted.manager_id, None);
}

#[tokio::test]
async fn test_editing_manager_keeps_role() {
    let fx = Fixture::new();
    let boss = fx.hire("Marta", Seniority::Manager, None).await.unwrap();
    let dept = fx.department("Engineering", Some(&boss)).await;
    let ana = fx.hire("Ana", Seniority::Junior, Some(&dept.id)).await.unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    let current = find(&collaborators, &boss.id).clone();
    let mut edit = QuickEdit::from_collaborator(&current);
    edit.name = "Marta Lima".to_string();
    fx.service
        .quick_edit(&current, &edit, &departments, &collaborators)
        .await
        .unwrap();

    let (departments, collaborators) = fx.snapshot().await;
    assert_eq!(departments[0].manager.as_deref(), Some(boss.id.as_str()));
    assert_eq!(find(&collaborators, &ana.id).manager_id.as_deref(), Some(boss.id.as_str()));
}
