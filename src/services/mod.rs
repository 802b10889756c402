//! Workflows that write to several records at once.

pub mod collaborator;
pub mod integrity;

pub use collaborator::{CollaboratorService, CollaboratorWizard, QuickEdit, WizardStep};
pub use integrity::{DeletePlan, IntegrityManager};
