//! Department/collaborator referential integrity.
//!
//! Keeps `departmentId`, `departmentName` and `managerId` on collaborators
//! consistent with the department records across saves and deletions.
//!
//! None of the multi-step operations here are atomic: every collaborator
//! update is an independent store call. When a step fails the operation stops,
//! earlier writes stay applied, and re-running it with the same input finishes
//! the job.

use std::sync::Arc;

use tracing::{info, warn};

use crate::db::{collaborator, department};
use crate::error::{AppError, Result};
use crate::models::{Collaborator, Department, DepartmentForm, UpdateCollaborator};
use crate::store::DocumentStore;

/// Outcome of a department deletion request.
#[derive(Debug, Clone, PartialEq)]
pub enum DeletePlan {
    /// Nobody but the manager references the department.
    Direct,
    /// These collaborators must be moved to another department first.
    Transfer { pending: Vec<Collaborator> },
}

/// Manager id a collaborator should carry when placed under `manager_id`.
///
/// Managers never report to anyone, including themselves.
fn manager_for<'a>(c: &Collaborator, manager_id: Option<&'a str>) -> Option<&'a str> {
    if c.is_manager() {
        return None;
    }
    manager_id.filter(|m| *m != c.id)
}

/// Whether `c` already matches the desired assignment.
fn is_assigned(c: &Collaborator, dept: &Department, manager_id: Option<&str>) -> bool {
    c.department_id.as_deref() == Some(dept.id.as_str())
        && c.department_name.as_deref() == Some(dept.name.as_str())
        && c.manager_id.as_deref() == manager_id
}

/// Applies the department save and delete workflows against a store.
#[derive(Clone)]
pub struct IntegrityManager {
    store: Arc<dyn DocumentStore>,
}

impl IntegrityManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create (`editing_id == None`) or update a department, then align every
    /// collaborator with the form's member list.
    ///
    /// Fails before any write on an empty name, an invalid manager or a
    /// case-insensitive name clash with another department.
    pub async fn save_department(
        &self,
        form: &DepartmentForm,
        existing: &[Department],
        collaborators: &[Collaborator],
        editing_id: Option<&str>,
    ) -> Result<Department> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Department name is required"));
        }

        if let Some(manager_id) = form.manager() {
            let valid = collaborators.iter().any(|c| c.id == manager_id && c.is_manager());
            if !valid {
                return Err(AppError::validation(
                    "The department manager must be a collaborator with manager seniority",
                ));
            }
        }

        let lowered = name.to_lowercase();
        let duplicate = existing
            .iter()
            .filter(|d| Some(d.id.as_str()) != editing_id)
            .any(|d| d.name.trim().to_lowercase() == lowered);
        if duplicate {
            return Err(AppError::DuplicateName(name.to_string()));
        }

        // The department must exist under its final id before anyone points at it.
        let saved = match editing_id {
            Some(id) => department::update(self.store.as_ref(), id, name, form).await?,
            None => department::create(self.store.as_ref(), name, form).await?,
        };
        info!("Saved department '{}' ({})", saved.name, saved.id);

        let changed = self.sync_members(&saved, collaborators).await?;
        info!("Department '{}': {changed} collaborators updated", saved.name);

        Ok(saved)
    }

    /// Point members (and the manager) at `dept`; detach everyone else that
    /// still references it. Returns the number of collaborators written.
    async fn sync_members(&self, dept: &Department, collaborators: &[Collaborator]) -> Result<usize> {
        let manager_id = dept.manager.as_deref();
        let mut changed = 0;

        for c in collaborators {
            let belongs = dept.collaborators.iter().any(|id| *id == c.id) || manager_id == Some(c.id.as_str());

            let patch = if belongs {
                let target = manager_for(c, manager_id);
                if is_assigned(c, dept, target) {
                    continue;
                }
                UpdateCollaborator::assign(&dept.id, &dept.name, target)
            } else if c.references_department(&dept.id) {
                UpdateCollaborator::detach()
            } else {
                continue;
            };

            collaborator::update(self.store.as_ref(), &c.id, patch).await?;
            changed += 1;
        }

        Ok(changed)
    }

    /// Decide whether a department can be deleted right away.
    ///
    /// Every non-manager collaborator referencing the department blocks the
    /// deletion and is returned so the caller can pick a destination.
    pub fn request_delete_department(
        &self,
        department_id: &str,
        departments: &[Department],
        collaborators: &[Collaborator],
    ) -> Result<DeletePlan> {
        let dept = departments
            .iter()
            .find(|d| d.id == department_id)
            .ok_or_else(|| AppError::not_found("Department"))?;

        let pending: Vec<Collaborator> = collaborators
            .iter()
            .filter(|c| c.references_department(department_id))
            .filter(|c| dept.manager.as_deref() != Some(c.id.as_str()))
            .cloned()
            .collect();

        if pending.is_empty() {
            Ok(DeletePlan::Direct)
        } else {
            info!(
                "Department '{}' still has {} collaborators, transfer required",
                dept.name,
                pending.len()
            );
            Ok(DeletePlan::Transfer { pending })
        }
    }

    /// Move `pending` into department `to` (adopting its manager), then delete `from`.
    ///
    /// `from` is deleted only if every collaborator update succeeded.
    pub async fn confirm_transfer_and_delete(&self, from: &str, to: &str, pending: &[Collaborator]) -> Result<()> {
        let to = to.trim();
        if to.is_empty() {
            return Err(AppError::validation("Select a destination department"));
        }
        if to == from {
            return Err(AppError::validation(
                "The destination must be different from the department being deleted",
            ));
        }

        let destination = department::get_by_id(self.store.as_ref(), to)
            .await?
            .ok_or_else(|| AppError::validation("The destination department no longer exists"))?;

        for (done, c) in pending.iter().enumerate() {
            let patch = UpdateCollaborator::assign(
                &destination.id,
                &destination.name,
                manager_for(c, destination.manager.as_deref()),
            );
            if let Err(e) = collaborator::update(self.store.as_ref(), &c.id, patch).await {
                warn!(
                    "Transfer to '{}' stopped after {done} of {} collaborators; department {from} kept: {e}",
                    destination.name,
                    pending.len()
                );
                return Err(e);
            }
        }

        // Someone may have joined `from` after the pending list was built.
        let source_manager = department::get_by_id(self.store.as_ref(), from)
            .await?
            .and_then(|d| d.manager);
        let late: Vec<Collaborator> = collaborator::list_by_department(self.store.as_ref(), from)
            .await?
            .into_iter()
            .filter(|c| source_manager.as_deref() != Some(c.id.as_str()))
            .collect();
        if !late.is_empty() {
            warn!(
                "Department {from} kept: {} collaborators joined it after the transfer was prepared",
                late.len()
            );
            return Err(AppError::validation(format!(
                "{} collaborators joined the department in the meantime. Review the transfer again.",
                late.len()
            )));
        }

        self.release_manager(from).await?;
        department::delete(self.store.as_ref(), from).await?;
        info!(
            "Transferred {} collaborators to '{}' and deleted department {from}",
            pending.len(),
            destination.name
        );
        Ok(())
    }

    /// Delete a department that `request_delete_department` cleared as `Direct`.
    pub async fn confirm_direct_delete(&self, department_id: &str) -> Result<()> {
        self.release_manager(department_id).await?;
        department::delete(self.store.as_ref(), department_id).await?;
        info!("Deleted department {department_id}");
        Ok(())
    }

    /// Detach the department's manager so nothing points at it once deleted.
    async fn release_manager(&self, department_id: &str) -> Result<()> {
        let Some(dept) = department::get_by_id(self.store.as_ref(), department_id).await? else {
            return Ok(());
        };
        let Some(manager_id) = dept.manager.as_deref() else {
            return Ok(());
        };
        let Some(manager) = collaborator::get_by_id(self.store.as_ref(), manager_id).await? else {
            return Ok(());
        };
        if manager.references_department(department_id) {
            collaborator::update(self.store.as_ref(), manager_id, UpdateCollaborator::detach()).await?;
            info!("Manager '{}' left department '{}'", manager.name, dept.name);
        }
        Ok(())
    }
}
