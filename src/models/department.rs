//! Department record and form DTO.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::empty_as_none;
use crate::store::Fields;

/// Department as stored in the `departments` collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Department {
    #[serde(skip)]
    pub id: String,
    pub name: String,
    /// Id of the managing collaborator.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub manager: Option<String>,
    /// Member ids declared when the department was last saved.
    ///
    /// Live membership comes from the collaborators' `departmentId`.
    #[serde(default)]
    pub collaborators: Vec<String>,
}

/// Create/edit form input for a department.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentForm {
    pub name: String,
    pub manager_id: Option<String>,
    pub member_ids: Vec<String>,
}

impl DepartmentForm {
    /// Pre-fill from an existing department.
    pub fn from_department(dept: &Department) -> Self {
        Self {
            name: dept.name.clone(),
            manager_id: dept.manager.clone(),
            member_ids: dept.collaborators.clone(),
        }
    }

    /// Manager id with blanks treated as unset.
    pub fn manager(&self) -> Option<&str> {
        self.manager_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// Full document body, written on create and on every edit.
    pub fn to_fields(&self, name: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::String(name.to_string()));
        fields.insert(
            "manager".into(),
            Value::String(self.manager().unwrap_or_default().to_string()),
        );
        fields.insert(
            "collaborators".into(),
            Value::Array(self.member_ids.iter().cloned().map(Value::String).collect()),
        );
        fields
    }
}
