//! Collaborator save workflow: two-step wizard, quick edit and deletion.

use std::sync::{Arc, LazyLock};

use chrono::{Local, NaiveDate};
use regex::Regex;
use tracing::info;

use crate::db::{collaborator, department};
use crate::error::{AppError, Result};
use crate::models::{Collaborator, Department, Seniority, Status, UpdateCollaborator};
use crate::store::DocumentStore;

/// Role given to new collaborators when none is entered.
pub const DEFAULT_ROLE: &str = "Collaborator";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

fn validate_salary(salary: Option<f64>) -> Result<()> {
    if salary.is_some_and(|s| s < 0.0) {
        return Err(AppError::validation("Base salary cannot be negative"));
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Inline validation messages for step 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfoErrors {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl BasicInfoErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Step 1: identity.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicInfo {
    pub name: String,
    pub email: String,
    pub active: bool,
    pub avatar_url: String,
}

impl Default for BasicInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            active: true,
            avatar_url: String::new(),
        }
    }
}

impl BasicInfo {
    pub fn from_collaborator(c: &Collaborator) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            active: c.status.is_active(),
            avatar_url: c.avatar_url.clone().unwrap_or_default(),
        }
    }

    pub fn errors(&self) -> BasicInfoErrors {
        let mut errors = BasicInfoErrors::default();
        if self.name.trim().is_empty() {
            errors.name = Some("Name is required".to_string());
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.email = Some("Email is required".to_string());
        } else if !is_valid_email(email) {
            errors.email = Some("Email is invalid".to_string());
        }
        errors
    }

    pub fn validate(&self) -> Result<()> {
        let errors = self.errors();
        match errors.name.or(errors.email) {
            Some(msg) => Err(AppError::Validation(msg)),
            None => Ok(()),
        }
    }
}

/// Step 2: role, department and compensation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfessionalInfo {
    pub seniority: Seniority,
    /// Ignored for managers.
    pub department_id: Option<String>,
    pub role: String,
    pub admission_date: Option<NaiveDate>,
    pub salary_base: Option<f64>,
}

impl ProfessionalInfo {
    pub fn from_collaborator(c: &Collaborator) -> Self {
        Self {
            seniority: c.seniority.unwrap_or_default(),
            department_id: c.department_id.clone(),
            role: c.role.clone().unwrap_or_default(),
            admission_date: c.admission_date,
            salary_base: c.salary_base,
        }
    }

    pub fn needs_department(&self) -> bool {
        self.seniority != Seniority::Manager
    }

    /// Department chosen in the form, if it still exists.
    pub fn department<'a>(&self, departments: &'a [Department]) -> Option<&'a Department> {
        let id = self.department_id.as_deref()?;
        departments.iter().find(|d| d.id == id)
    }

    /// Manager shown read-only in the form: the chosen department's manager.
    pub fn derived_manager<'a>(&self, departments: &'a [Department]) -> Option<&'a str> {
        if !self.needs_department() {
            return None;
        }
        self.department(departments)?.manager.as_deref()
    }

    pub fn validate(&self, departments: &[Department]) -> Result<()> {
        validate_salary(self.salary_base)?;
        if !self.needs_department() {
            return Ok(());
        }
        if self.department_id.as_deref().is_none_or(|id| id.trim().is_empty()) {
            return Err(AppError::validation("Select a department"));
        }
        if self.department(departments).is_none() {
            return Err(AppError::validation("The selected department no longer exists"));
        }
        Ok(())
    }
}

/// Current wizard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    Basic,
    Professional,
}

/// Two-step create/edit form state.
#[derive(Debug, Clone, Default)]
pub struct CollaboratorWizard {
    pub step: WizardStep,
    pub basic: BasicInfo,
    pub professional: ProfessionalInfo,
    editing: Option<Collaborator>,
}

impl CollaboratorWizard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wizard pre-filled for a full edit of `c`.
    pub fn edit(c: &Collaborator) -> Self {
        Self {
            step: WizardStep::Basic,
            basic: BasicInfo::from_collaborator(c),
            professional: ProfessionalInfo::from_collaborator(c),
            editing: Some(c.clone()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Stored record being edited, as it was when the wizard opened.
    pub fn editing(&self) -> Option<&Collaborator> {
        self.editing.as_ref()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|c| c.id.as_str())
    }

    /// Validate step 1 and move to step 2.
    pub fn advance(&mut self) -> Result<()> {
        self.basic.validate()?;
        self.step = WizardStep::Professional;
        Ok(())
    }

    /// Return to step 1 keeping everything entered so far.
    pub fn back(&mut self) {
        self.step = WizardStep::Basic;
    }

    /// Merge both steps into one normalized record.
    ///
    /// Department name and manager are taken from `departments`, never from
    /// the form. In edit mode the email is the stored one.
    pub fn build(&self, departments: &[Department]) -> Result<Collaborator> {
        self.basic.validate()?;
        self.professional.validate(departments)?;

        let id = self.editing_id().unwrap_or_default().to_string();
        let email = match &self.editing {
            Some(existing) => existing.email.clone(),
            None => self.basic.email.trim().to_string(),
        };

        let (department_id, department_name, manager_id) = match self.professional.department(departments) {
            Some(dept) if self.professional.needs_department() => (
                Some(dept.id.clone()),
                Some(dept.name.clone()),
                dept.manager.clone().filter(|m| *m != id),
            ),
            _ => (None, None, None),
        };

        let role = self.professional.role.trim();
        let avatar = self.basic.avatar_url.trim();

        Ok(Collaborator {
            id,
            name: self.basic.name.trim().to_string(),
            email,
            status: Status::from_active(self.basic.active),
            seniority: Some(self.professional.seniority),
            department_id,
            department_name,
            manager_id,
            role: Some(if role.is_empty() { DEFAULT_ROLE } else { role }.to_string()),
            admission_date: Some(
                self.professional
                    .admission_date
                    .unwrap_or_else(|| Local::now().date_naive()),
            ),
            salary_base: Some(self.professional.salary_base.unwrap_or(0.0)),
            avatar_url: (!avatar.is_empty()).then(|| avatar.to_string()),
        })
    }
}

/// Single-dialog edit of the most common fields.
#[derive(Debug, Clone, PartialEq)]
pub struct QuickEdit {
    pub name: String,
    pub email: String,
    pub department_id: Option<String>,
    pub seniority: Seniority,
    pub manager_id: Option<String>,
    pub salary_base: Option<f64>,
    pub status: Status,
}

impl QuickEdit {
    pub fn from_collaborator(c: &Collaborator) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            department_id: c.department_id.clone(),
            seniority: c.seniority.unwrap_or_default(),
            manager_id: c.manager_id.clone(),
            salary_base: c.salary_base,
            status: c.status,
        }
    }

    /// Patch against `current`, with department name re-derived from `departments`.
    fn to_update(
        &self,
        current: &Collaborator,
        departments: &[Department],
        collaborators: &[Collaborator],
    ) -> Result<UpdateCollaborator> {
        let name = self.name.trim();
        let email = self.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(AppError::validation("Name and email are required"));
        }
        if !is_valid_email(email) {
            return Err(AppError::validation("Email is invalid"));
        }
        validate_salary(self.salary_base)?;

        let (department_id, department_name, manager_id) = if self.seniority == Seniority::Manager {
            (None, None, None)
        } else {
            let dept_id = self
                .department_id
                .as_deref()
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| AppError::validation("Select a department"))?;
            let dept = departments
                .iter()
                .find(|d| d.id == dept_id)
                .ok_or_else(|| AppError::validation("The selected department no longer exists"))?;

            let manager_id = self.manager_id.as_deref().filter(|id| !id.is_empty());
            if let Some(manager_id) = manager_id {
                let valid = manager_id != current.id
                    && collaborators.iter().any(|c| c.id == manager_id && c.is_manager());
                if !valid {
                    return Err(AppError::validation("The selected manager is not a manager"));
                }
            }
            (
                Some(dept.id.clone()),
                Some(dept.name.clone()),
                manager_id.map(str::to_string),
            )
        };

        Ok(UpdateCollaborator {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            status: Some(self.status),
            seniority: Some(Some(self.seniority)),
            department_id: Some(department_id),
            department_name: Some(department_name),
            manager_id: Some(manager_id),
            salary_base: Some(self.salary_base),
            ..Default::default()
        })
    }
}

/// Apply an update to an in-memory copy.
fn apply(mut c: Collaborator, u: UpdateCollaborator) -> Collaborator {
    if let Some(v) = u.name {
        c.name = v;
    }
    if let Some(v) = u.email {
        c.email = v;
    }
    if let Some(v) = u.status {
        c.status = v;
    }
    if let Some(v) = u.seniority {
        c.seniority = v;
    }
    if let Some(v) = u.department_id {
        c.department_id = v;
    }
    if let Some(v) = u.department_name {
        c.department_name = v;
    }
    if let Some(v) = u.manager_id {
        c.manager_id = v;
    }
    if let Some(v) = u.role {
        c.role = v;
    }
    if let Some(v) = u.admission_date {
        c.admission_date = v;
    }
    if let Some(v) = u.salary_base {
        c.salary_base = v;
    }
    if let Some(v) = u.avatar_url {
        c.avatar_url = v;
    }
    c
}

/// Persists collaborator changes and their side effects on managers.
#[derive(Clone)]
pub struct CollaboratorService {
    store: Arc<dyn DocumentStore>,
}

impl CollaboratorService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Save the wizard's record: create (with email uniqueness check) or
    /// overwrite the edited collaborator.
    pub async fn commit(&self, wizard: &CollaboratorWizard, departments: &[Department]) -> Result<Collaborator> {
        let record = wizard.build(departments)?;

        let saved = match wizard.editing() {
            Some(previous) => {
                let id = previous.id.as_str();
                collaborator::update(self.store.as_ref(), id, UpdateCollaborator::replace_with(&record)).await?;
                info!("Updated collaborator '{}' ({id})", record.name);
                if previous.is_manager() && !record.is_manager() {
                    self.release_manager_role(id).await?;
                }
                record
            }
            None => {
                if collaborator::email_exists(self.store.as_ref(), &record.email).await? {
                    return Err(AppError::DuplicateEmail(record.email));
                }
                let created = collaborator::create(self.store.as_ref(), &record).await?;
                info!("Created collaborator '{}' ({})", created.name, created.id);
                created
            }
        };

        self.sync_manager_department(&saved).await?;
        Ok(saved)
    }

    /// Apply a quick edit to `current` and return the updated record.
    pub async fn quick_edit(
        &self,
        current: &Collaborator,
        edit: &QuickEdit,
        departments: &[Department],
        collaborators: &[Collaborator],
    ) -> Result<Collaborator> {
        let update = edit.to_update(current, departments, collaborators)?;

        if let Some(email) = &update.email
            && !email.eq_ignore_ascii_case(&current.email)
            && collaborator::email_exists(self.store.as_ref(), email).await?
        {
            return Err(AppError::DuplicateEmail(email.clone()));
        }

        collaborator::update(self.store.as_ref(), &current.id, update.clone()).await?;
        let updated = apply(current.clone(), update);
        info!("Quick-edited collaborator '{}' ({})", updated.name, updated.id);

        if current.is_manager() && !updated.is_manager() {
            self.release_manager_role(&updated.id).await?;
        }

        self.sync_manager_department(&updated).await?;
        Ok(updated)
    }

    /// After a demotion: the departments `id` led lose their manager and
    /// their reports lose their `managerId`.
    async fn release_manager_role(&self, id: &str) -> Result<()> {
        for dept in department::list_all(self.store.as_ref()).await? {
            if dept.manager.as_deref() == Some(id) {
                department::clear_manager(self.store.as_ref(), &dept.id).await?;
                info!("Department '{}' no longer has a manager", dept.name);
            }
        }

        let reports = collaborator::list_reports(self.store.as_ref(), id).await?;
        for report in &reports {
            let update = UpdateCollaborator {
                manager_id: Some(None),
                ..Default::default()
            };
            collaborator::update(self.store.as_ref(), &report.id, update).await?;
        }
        if !reports.is_empty() {
            info!("Cleared manager {id} on {} reports", reports.len());
        }
        Ok(())
    }

    /// Keep a collaborator's manager in the department they lead.
    async fn sync_manager_department(&self, saved: &Collaborator) -> Result<()> {
        let (Some(manager_id), Some(department_id)) = (saved.manager_id.as_deref(), saved.department_id.as_deref())
        else {
            return Ok(());
        };
        let Some(manager) = collaborator::get_by_id(self.store.as_ref(), manager_id).await? else {
            return Ok(());
        };

        let department_name = saved.department_name.clone();
        if manager.department_id.as_deref() == Some(department_id) && manager.department_name == department_name {
            return Ok(());
        }

        let update = UpdateCollaborator {
            department_id: Some(Some(department_id.to_string())),
            department_name: Some(department_name),
            ..Default::default()
        };
        collaborator::update(self.store.as_ref(), manager_id, update).await?;
        info!("Moved manager '{}' into department {department_id}", manager.name);
        Ok(())
    }

    /// Delete collaborators and drop references to them: departments they
    /// managed lose their manager, and their reports lose their `managerId`.
    pub async fn delete(
        &self,
        ids: &[String],
        departments: &[Department],
        collaborators: &[Collaborator],
    ) -> Result<usize> {
        match ids {
            [] => return Ok(0),
            [id] => collaborator::delete(self.store.as_ref(), id).await?,
            _ => collaborator::delete_batch(self.store.as_ref(), ids).await?,
        }
        info!("Deleted {} collaborators", ids.len());

        let removed = |id: Option<&str>| id.is_some_and(|id| ids.iter().any(|x| x == id));

        for dept in departments.iter().filter(|d| removed(d.manager.as_deref())) {
            department::clear_manager(self.store.as_ref(), &dept.id).await?;
            info!("Department '{}' no longer has a manager", dept.name);
        }

        for c in collaborators
            .iter()
            .filter(|c| !removed(Some(c.id.as_str())) && removed(c.manager_id.as_deref()))
        {
            let update = UpdateCollaborator {
                manager_id: Some(None),
                ..Default::default()
            };
            collaborator::update(self.store.as_ref(), &c.id, update).await?;
        }

        Ok(ids.len())
    }
}
