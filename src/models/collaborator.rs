//! Collaborator record and update DTO.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{empty_as_none, lenient_number};
use crate::store::Fields;

/// Employment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    #[serde(alias = "ativo")]
    Active,
    #[serde(alias = "inativo")]
    Inactive,
}

impl Status {
    pub fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Hierarchy level. Only `Manager` may lead a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    #[default]
    Junior,
    #[serde(alias = "pleno")]
    Mid,
    Senior,
    #[serde(alias = "gestor")]
    Manager,
}

impl Seniority {
    pub const ALL: [Seniority; 4] = [Self::Junior, Self::Mid, Self::Senior, Self::Manager];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Junior => "Junior",
            Self::Mid => "Mid-level",
            Self::Senior => "Senior",
            Self::Manager => "Manager",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Junior => "junior",
            Self::Mid => "mid",
            Self::Senior => "senior",
            Self::Manager => "manager",
        }
    }
}

/// Employee record as stored in the `collaborators` collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    /// Store-assigned id, kept outside the document body.
    #[serde(skip)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub seniority: Option<Seniority>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    /// Mirror of the referenced department's name.
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub salary_base: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Collaborator {
    pub fn is_manager(&self) -> bool {
        self.seniority == Some(Seniority::Manager)
    }

    /// Department name for display, `-` when unassigned.
    pub fn department_label(&self) -> &str {
        self.department_name.as_deref().unwrap_or("-")
    }

    pub fn references_department(&self, department_id: &str) -> bool {
        self.department_id.as_deref() == Some(department_id)
    }
}

/// DTO for a partial collaborator update.
///
/// `Some(None)` clears a field; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCollaborator {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<Status>,
    pub seniority: Option<Option<Seniority>>,
    pub department_id: Option<Option<String>>,
    pub department_name: Option<Option<String>>,
    pub manager_id: Option<Option<String>>,
    pub role: Option<Option<String>>,
    pub admission_date: Option<Option<NaiveDate>>,
    pub salary_base: Option<Option<f64>>,
    pub avatar_url: Option<Option<String>>,
}

impl UpdateCollaborator {
    /// Point a collaborator at a department and its manager.
    pub fn assign(department_id: &str, department_name: &str, manager_id: Option<&str>) -> Self {
        Self {
            department_id: Some(Some(department_id.to_string())),
            department_name: Some(Some(department_name.to_string())),
            manager_id: Some(manager_id.map(str::to_string)),
            ..Default::default()
        }
    }

    /// Remove the department and manager references.
    pub fn detach() -> Self {
        Self {
            department_id: Some(None),
            department_name: Some(None),
            manager_id: Some(None),
            ..Default::default()
        }
    }

    /// Overwrite every editable field with the values of `record`.
    pub fn replace_with(record: &Collaborator) -> Self {
        Self {
            name: Some(record.name.clone()),
            email: Some(record.email.clone()),
            status: Some(record.status),
            seniority: Some(record.seniority),
            department_id: Some(record.department_id.clone()),
            department_name: Some(record.department_name.clone()),
            manager_id: Some(record.manager_id.clone()),
            role: Some(record.role.clone()),
            admission_date: Some(record.admission_date),
            salary_base: Some(record.salary_base),
            avatar_url: Some(record.avatar_url.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Encode as a partial document. Cleared values are written as `""`.
    pub fn into_fields(self) -> Fields {
        fn text(v: Option<String>) -> Value {
            Value::String(v.unwrap_or_default())
        }

        let mut fields = Fields::new();
        if let Some(name) = self.name {
            fields.insert("name".into(), Value::String(name));
        }
        if let Some(email) = self.email {
            fields.insert("email".into(), Value::String(email));
        }
        if let Some(status) = self.status {
            fields.insert("status".into(), Value::String(status.as_str().into()));
        }
        if let Some(seniority) = self.seniority {
            fields.insert("seniority".into(), text(seniority.map(|s| s.as_str().to_string())));
        }
        if let Some(v) = self.department_id {
            fields.insert("departmentId".into(), text(v));
        }
        if let Some(v) = self.department_name {
            fields.insert("departmentName".into(), text(v));
        }
        if let Some(v) = self.manager_id {
            fields.insert("managerId".into(), text(v));
        }
        if let Some(v) = self.role {
            fields.insert("role".into(), text(v));
        }
        if let Some(v) = self.admission_date {
            fields.insert("admissionDate".into(), text(v.map(|d| d.format("%Y-%m-%d").to_string())));
        }
        if let Some(v) = self.salary_base {
            fields.insert("salaryBase".into(), v.map(Value::from).unwrap_or(Value::Null));
        }
        if let Some(v) = self.avatar_url {
            fields.insert("avatarUrl".into(), text(v));
        }
        fields
    }
}
