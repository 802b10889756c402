//! User interface module.

pub mod app;
pub mod collaborator_panel;
pub mod collaborator_wizard;
pub mod components;
pub mod department_panel;
pub mod login_panel;

pub use app::App;
