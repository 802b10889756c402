//! Department management panel: list, create/edit form and the delete flow.

use eframe::egui::{self, Align, Layout, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, FILE_XLS, FLOPPY_DISK, PENCIL, PLUS, TRASH};

use super::components::{
    colors, danger_button, icon_button, modal, pager, panel_header, primary_button_with_icon, styled_button_with_icon,
};
use crate::listing::{ListFilters, ListState};
use crate::models::{Collaborator, Department, DepartmentForm};

/// Create/edit dialog state.
#[derive(Debug, Clone, Default)]
pub struct FormDialog {
    pub form: DepartmentForm,
    pub editing_id: Option<String>,
    pub error: Option<String>,
}

impl FormDialog {
    pub fn create() -> Self {
        Self::default()
    }

    /// Pre-fill with the department and everyone currently assigned to it.
    ///
    /// Members come from the collaborators' `departmentId`, not from the
    /// member list stored with the department, which may be stale.
    pub fn edit(dept: &Department, collaborators: &[Collaborator]) -> Self {
        let mut form = DepartmentForm::from_department(dept);
        form.member_ids = collaborators
            .iter()
            .filter(|c| c.references_department(&dept.id))
            .map(|c| c.id.clone())
            .collect();
        Self {
            form,
            editing_id: Some(dept.id.clone()),
            error: None,
        }
    }
}

/// Deletion awaiting confirmation.
#[derive(Debug, Clone)]
pub enum PendingDelete {
    /// Type the department name to confirm.
    Direct { id: String, name: String, typed: String },
    /// Members must be moved first.
    Transfer {
        id: String,
        name: String,
        pending: Vec<Collaborator>,
        destination: Option<String>,
    },
}

/// State of the departments page.
#[derive(Debug, Default)]
pub struct DepartmentPage {
    pub list: ListState,
    pub name_filter: String,
    pub form: Option<FormDialog>,
    pub pending_delete: Option<PendingDelete>,
    pub delete_error: Option<String>,
}

impl DepartmentPage {
    pub fn new(page_size: usize) -> Self {
        Self {
            list: ListState::new(page_size),
            ..Default::default()
        }
    }

    pub fn close_dialogs(&mut self) {
        self.form = None;
        self.pending_delete = None;
        self.delete_error = None;
    }
}

pub enum Action {
    None,
    Refresh,
    Export,
    Save,
    RequestDelete(String),
    ConfirmDirect(String),
    ConfirmTransfer {
        from: String,
        to: String,
        pending: Vec<Collaborator>,
    },
}

pub fn show(
    page: &mut DepartmentPage,
    ui: &mut Ui,
    departments: &[Department],
    collaborators: &[Collaborator],
    busy: bool,
) -> Action {
    let mut action = Action::None;

    panel_header(ui, "Departments");

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, !busy, PLUS, "New department").clicked() {
            page.form = Some(FormDialog::create());
        }
        ui.add_space(10.0);
        if styled_button_with_icon(ui, true, ARROWS_CLOCKWISE, "Refresh").clicked() {
            action = Action::Refresh;
        }
        ui.add_space(10.0);
        if styled_button_with_icon(ui, !departments.is_empty(), FILE_XLS, "Export to Excel").clicked() {
            action = Action::Export;
        }
        ui.add_space(20.0);
        ui.label("Name:");
        ui.add(egui::TextEdit::singleline(&mut page.name_filter).desired_width(180.0));
    });

    let filters = ListFilters {
        name: page.name_filter.clone(),
        ..Default::default()
    };
    page.list.set_filters(filters, departments);

    ui.add_space(10.0);

    let view = page.list.view(departments);
    ScrollArea::vertical()
        .id_salt("departments_scroll")
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            egui::Grid::new("departments_grid")
                .num_columns(4)
                .striped(true)
                .min_col_width(60.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.strong("Name");
                    ui.strong("Manager");
                    ui.strong("Collaborators");
                    ui.strong("Actions");
                    ui.end_row();

                    for dept in &view.rows {
                        let manager = dept
                            .manager
                            .as_deref()
                            .and_then(|id| collaborators.iter().find(|c| c.id == id))
                            .map(|c| c.name.as_str())
                            .unwrap_or("-");
                        let members = collaborators.iter().filter(|c| c.references_department(&dept.id)).count();

                        ui.label(&dept.name);
                        ui.label(manager);
                        ui.label(members.to_string());
                        ui.horizontal(|ui| {
                            if icon_button(ui, !busy, PENCIL, "Edit") {
                                page.form = Some(FormDialog::edit(dept, collaborators));
                            }
                            if icon_button(ui, !busy, TRASH, "Delete") {
                                action = Action::RequestDelete(dept.id.clone());
                            }
                        });
                        ui.end_row();
                    }
                });

            if view.rows.is_empty() {
                ui.add_space(20.0);
                ui.label(RichText::new("No departments found").weak());
            }
        });

    ui.add_space(6.0);
    if let Some(target) = pager(ui, view.page, view.total_pages) {
        page.list.set_page(target, departments);
    }

    if page.form.is_some() && show_form_dialog(page, ui.ctx(), collaborators, busy) {
        action = Action::Save;
    }

    if let Some(confirmed) = show_delete_dialog(page, ui.ctx(), departments, busy) {
        action = confirmed;
    }

    action
}

/// Returns true when the user asked to save.
fn show_form_dialog(page: &mut DepartmentPage, ctx: &egui::Context, collaborators: &[Collaborator], busy: bool) -> bool {
    let Some(dialog) = page.form.as_mut() else {
        return false;
    };

    let title = if dialog.editing_id.is_some() {
        "Edit department"
    } else {
        "New department"
    };
    let mut save = false;
    let mut cancel = false;
    let mut open = true;

    modal(title).open(&mut open).min_width(400.0).show(ctx, |ui| {
        egui::Grid::new("department_form_grid")
            .num_columns(2)
            .spacing([20.0, 8.0])
            .show(ui, |ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut dialog.form.name);
                ui.end_row();

                ui.label("Manager:");
                let selected = dialog
                    .form
                    .manager()
                    .and_then(|id| collaborators.iter().find(|c| c.id == id))
                    .map(|c| c.name.as_str())
                    .unwrap_or("None");
                egui::ComboBox::from_id_salt("department_manager")
                    .width(220.0)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut dialog.form.manager_id, None, "None");
                        for m in collaborators.iter().filter(|c| c.is_manager()) {
                            ui.selectable_value(&mut dialog.form.manager_id, Some(m.id.clone()), &m.name);
                        }
                    });
                ui.end_row();
            });

        ui.add_space(10.0);
        ui.label(RichText::new("Members").strong());
        ScrollArea::vertical()
            .id_salt("department_members_scroll")
            .max_height(220.0)
            .show(ui, |ui| {
                for c in collaborators.iter().filter(|c| !c.is_manager()) {
                    let mut member = dialog.form.member_ids.contains(&c.id);
                    let label = format!("{} ({})", c.name, c.department_label());
                    if ui.checkbox(&mut member, label).changed() {
                        if member {
                            dialog.form.member_ids.push(c.id.clone());
                        } else {
                            dialog.form.member_ids.retain(|id| *id != c.id);
                        }
                    }
                }
            });

        if let Some(error) = &dialog.error {
            ui.add_space(8.0);
            ui.colored_label(colors::ERROR, error);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                cancel = true;
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if primary_button_with_icon(ui, !busy, FLOPPY_DISK, "Save").clicked() {
                    save = true;
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    });

    if cancel || !open {
        page.form = None;
        return false;
    }
    save
}

fn show_delete_dialog(
    page: &mut DepartmentPage,
    ctx: &egui::Context,
    departments: &[Department],
    busy: bool,
) -> Option<Action> {
    let pending_delete = page.pending_delete.as_mut()?;

    let mut result = None;
    let mut cancel = false;

    match pending_delete {
        PendingDelete::Direct { id, name, typed } => {
            modal("Delete department").show(ctx, |ui| {
                ui.label(format!("Type '{name}' to delete this department."));
                ui.add_space(8.0);
                ui.text_edit_singleline(typed);
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    let matches = typed.trim() == name.as_str();
                    if danger_button(ui, matches && !busy, "Delete").clicked() {
                        result = Some(Action::ConfirmDirect(id.clone()));
                    }
                    if busy {
                        ui.spinner();
                    }
                });
            });
        }
        PendingDelete::Transfer {
            id,
            name,
            pending,
            destination,
        } => {
            modal("Transfer collaborators").min_width(420.0).show(ctx, |ui| {
                ui.label(format!(
                    "'{name}' still has {} collaborators. Move them to another department before deleting it.",
                    pending.len()
                ));
                ui.add_space(8.0);

                ScrollArea::vertical()
                    .id_salt("transfer_pending_scroll")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        for c in pending.iter() {
                            ui.label(format!("{} <{}>", c.name, c.email));
                        }
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.label("Destination:");
                    let selected = destination
                        .as_deref()
                        .and_then(|d| departments.iter().find(|x| x.id == d))
                        .map(|d| d.name.as_str())
                        .unwrap_or("Select...");
                    egui::ComboBox::from_id_salt("transfer_destination")
                        .width(200.0)
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            for dept in departments.iter().filter(|d| d.id != *id) {
                                ui.selectable_value(destination, Some(dept.id.clone()), &dept.name);
                            }
                        });
                });

                if let Some(error) = &page.delete_error {
                    ui.add_space(8.0);
                    ui.colored_label(colors::ERROR, error);
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        cancel = true;
                    }
                    let ready = destination.is_some() && !busy;
                    if danger_button(ui, ready, "Transfer and delete").clicked()
                        && let Some(to) = destination.clone()
                    {
                        result = Some(Action::ConfirmTransfer {
                            from: id.clone(),
                            to,
                            pending: pending.clone(),
                        });
                    }
                    if busy {
                        ui.spinner();
                    }
                });
            });
        }
    }

    if cancel {
        page.pending_delete = None;
        page.delete_error = None;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colab(id: &str, department_id: Option<&str>) -> Collaborator {
        Collaborator {
            id: id.to_string(),
            name: id.to_string(),
            department_id: department_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_edit_uses_live_membership() {
        let dept = Department {
            id: "a".to_string(),
            name: "A".to_string(),
            manager: None,
            // "x" was saved as a member but has since moved to "b".
            collaborators: vec!["x".to_string(), "y".to_string()],
        };
        let collaborators = vec![colab("x", Some("b")), colab("y", Some("a")), colab("z", Some("a"))];

        let dialog = FormDialog::edit(&dept, &collaborators);
        assert_eq!(dialog.editing_id.as_deref(), Some("a"));
        assert_eq!(dialog.form.name, "A");
        assert_eq!(dialog.form.member_ids, vec!["y".to_string(), "z".to_string()]);
    }
}
