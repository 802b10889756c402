//! Collaborator list with filters, pagination, selection and row actions.

use eframe::egui::{self, Align, DragValue, Layout, RichText, ScrollArea, Ui};
use egui_phosphor::regular::{ARROWS_CLOCKWISE, EYE, FILE_XLS, PENCIL, PENCIL_SIMPLE, PLUS, TRASH};

use super::collaborator_wizard::{self, WizardDialog};
use super::components::{
    colors, danger_button, icon_button, modal, pager, panel_header, primary_button_with_icon, styled_button_with_icon,
};
use crate::listing::{ListFilters, ListState};
use crate::models::{Collaborator, Department, Seniority, Status};
use crate::services::collaborator::QuickEdit;

/// Collaborators awaiting delete confirmation.
#[derive(Debug, Clone)]
pub struct DeleteConfirm {
    pub ids: Vec<String>,
    pub label: String,
}

/// State of the collaborators page.
#[derive(Debug, Default)]
pub struct CollaboratorPage {
    pub list: ListState,
    /// Filter inputs as typed; applied to `list` every frame.
    pub filters: ListFilters,
    pub wizard: Option<WizardDialog>,
    pub viewing: Option<Collaborator>,
    pub quick_edit: Option<(Collaborator, QuickEdit)>,
    pub quick_edit_error: Option<String>,
    pub confirm_delete: Option<DeleteConfirm>,
}

impl CollaboratorPage {
    pub fn new(page_size: usize) -> Self {
        Self {
            list: ListState::new(page_size),
            ..Default::default()
        }
    }

    /// Close every dialog after a successful save or delete.
    pub fn close_dialogs(&mut self) {
        self.wizard = None;
        self.viewing = None;
        self.quick_edit = None;
        self.quick_edit_error = None;
        self.confirm_delete = None;
    }
}

pub enum Action {
    None,
    Refresh,
    Export,
    Commit,
    QuickEdit,
    Delete(Vec<String>),
}

pub fn show(
    page: &mut CollaboratorPage,
    ui: &mut Ui,
    collaborators: &[Collaborator],
    departments: &[Department],
    busy: bool,
) -> Action {
    let mut action = Action::None;

    panel_header(ui, "Collaborators");

    ui.horizontal(|ui| {
        if primary_button_with_icon(ui, !busy, PLUS, "New collaborator").clicked() {
            page.wizard = Some(WizardDialog::create());
        }
        ui.add_space(10.0);
        if styled_button_with_icon(ui, true, ARROWS_CLOCKWISE, "Refresh").clicked() {
            action = Action::Refresh;
        }
        ui.add_space(10.0);
        if styled_button_with_icon(ui, !collaborators.is_empty(), FILE_XLS, "Export to Excel").clicked() {
            action = Action::Export;
        }

        let selected = page.list.selected_count();
        if selected > 0 {
            ui.add_space(20.0);
            if danger_button(ui, !busy, &format!("Delete selected ({selected})")).clicked() {
                page.confirm_delete = Some(DeleteConfirm {
                    ids: page.list.selected_ids(),
                    label: format!("{selected} selected collaborators"),
                });
            }
        }
    });

    ui.add_space(10.0);

    ui.horizontal(|ui| {
        ui.label("Name:");
        ui.add(egui::TextEdit::singleline(&mut page.filters.name).desired_width(160.0));
        ui.add_space(10.0);
        ui.label("Email:");
        ui.add(egui::TextEdit::singleline(&mut page.filters.email).desired_width(160.0));
        ui.add_space(10.0);
        ui.label("Department:");
        ui.add(egui::TextEdit::singleline(&mut page.filters.department).desired_width(140.0));

        if !page.filters.is_empty() {
            ui.add_space(10.0);
            if ui.button("Clear").clicked() {
                page.filters = ListFilters::default();
            }
        }
    });
    page.list.set_filters(page.filters.clone(), collaborators);

    ui.add_space(10.0);

    show_table(page, ui, collaborators, busy);

    if let Some(dialog) = page.wizard.as_mut() {
        match collaborator_wizard::show(dialog, ui.ctx(), departments, collaborators, busy) {
            collaborator_wizard::Action::None => {}
            collaborator_wizard::Action::Cancel => page.wizard = None,
            collaborator_wizard::Action::Commit => action = Action::Commit,
        }
    }

    if page.viewing.is_some() {
        show_view_dialog(page, ui.ctx(), collaborators);
    }

    if page.quick_edit.is_some() && show_quick_edit_dialog(page, ui.ctx(), collaborators, departments, busy) {
        action = Action::QuickEdit;
    }

    if let Some(ids) = show_delete_dialog(page, ui.ctx(), busy) {
        action = Action::Delete(ids);
    }

    action
}

fn show_table(page: &mut CollaboratorPage, ui: &mut Ui, collaborators: &[Collaborator], busy: bool) {
    let view = page.list.view(collaborators);
    let all_selected = page.list.all_visible_selected(collaborators);

    ui.label(format!(
        "Showing {} of {} collaborators",
        view.matching,
        collaborators.len()
    ));
    ui.add_space(6.0);

    let mut toggle_all = false;
    let mut toggled: Option<String> = None;

    ScrollArea::vertical()
        .id_salt("collaborators_scroll")
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui| {
            egui::Grid::new("collaborators_grid")
                .num_columns(7)
                .striped(true)
                .min_col_width(40.0)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    let mut header_checked = all_selected;
                    if ui.checkbox(&mut header_checked, "").clicked() {
                        toggle_all = true;
                    }
                    ui.strong("Name");
                    ui.strong("Email");
                    ui.strong("Department");
                    ui.strong("Seniority");
                    ui.strong("Status");
                    ui.strong("Actions");
                    ui.end_row();

                    for c in &view.rows {
                        let mut checked = page.list.is_selected(&c.id);
                        if ui.checkbox(&mut checked, "").clicked() {
                            toggled = Some(c.id.clone());
                        }
                        ui.label(&c.name);
                        ui.label(&c.email);
                        ui.label(c.department_label());
                        ui.label(c.seniority.map(|s| s.label()).unwrap_or("-"));
                        let color = if c.status.is_active() {
                            colors::SUCCESS
                        } else {
                            colors::NEUTRAL
                        };
                        ui.colored_label(color, c.status.label());

                        ui.horizontal(|ui| {
                            if icon_button(ui, true, EYE, "View") {
                                page.viewing = Some((*c).clone());
                            }
                            if icon_button(ui, !busy, PENCIL_SIMPLE, "Quick edit") {
                                page.quick_edit = Some(((*c).clone(), QuickEdit::from_collaborator(c)));
                                page.quick_edit_error = None;
                            }
                            if icon_button(ui, !busy, PENCIL, "Edit") {
                                page.wizard = Some(WizardDialog::edit(c));
                            }
                            if icon_button(ui, !busy, TRASH, "Delete") {
                                page.confirm_delete = Some(DeleteConfirm {
                                    ids: vec![c.id.clone()],
                                    label: format!("'{}'", c.name),
                                });
                            }
                        });
                        ui.end_row();
                    }
                });

            if view.rows.is_empty() {
                ui.add_space(20.0);
                ui.label(RichText::new("No collaborators found").weak());
            }
        });

    if toggle_all {
        page.list.select_all_visible(collaborators);
    }
    if let Some(id) = toggled {
        page.list.toggle(&id);
    }

    ui.add_space(6.0);
    if let Some(target) = pager(ui, view.page, view.total_pages) {
        page.list.set_page(target, collaborators);
    }
}

fn show_view_dialog(page: &mut CollaboratorPage, ctx: &egui::Context, collaborators: &[Collaborator]) {
    let Some(c) = &page.viewing else {
        return;
    };

    let manager = c
        .manager_id
        .as_deref()
        .and_then(|id| collaborators.iter().find(|m| m.id == id))
        .map(|m| m.name.as_str())
        .unwrap_or("-");

    let mut open = true;
    let mut close = false;
    modal("Collaborator").open(&mut open).show(ctx, |ui| {
        egui::Grid::new("collaborator_view_grid")
            .num_columns(2)
            .spacing([20.0, 6.0])
            .show(ui, |ui| {
                let rows = [
                    ("Name", c.name.clone()),
                    ("Email", c.email.clone()),
                    ("Status", c.status.label().to_string()),
                    ("Seniority", c.seniority.map(|s| s.label()).unwrap_or("-").to_string()),
                    ("Department", c.department_label().to_string()),
                    ("Manager", manager.to_string()),
                    ("Role", c.role.clone().unwrap_or_else(|| "-".to_string())),
                    (
                        "Admission date",
                        c.admission_date
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    (
                        "Base salary",
                        c.salary_base
                            .map(|s| format!("{s:.2}"))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                ];
                for (label, value) in rows {
                    ui.label(RichText::new(label).strong());
                    ui.label(value);
                    ui.end_row();
                }
            });
        ui.add_space(10.0);
        if ui.button("Close").clicked() {
            close = true;
        }
    });

    if close || !open {
        page.viewing = None;
    }
}

/// Returns true when the user asked to save.
fn show_quick_edit_dialog(
    page: &mut CollaboratorPage,
    ctx: &egui::Context,
    collaborators: &[Collaborator],
    departments: &[Department],
    busy: bool,
) -> bool {
    let Some((current, edit)) = page.quick_edit.as_mut() else {
        return false;
    };

    let mut save = false;
    let mut cancel = false;
    let mut open = true;

    modal("Quick edit").open(&mut open).min_width(380.0).show(ctx, |ui| {
        egui::Grid::new("quick_edit_grid")
            .num_columns(2)
            .spacing([20.0, 8.0])
            .show(ui, |ui| {
                ui.label("Name:");
                ui.text_edit_singleline(&mut edit.name);
                ui.end_row();

                ui.label("Email:");
                ui.text_edit_singleline(&mut edit.email);
                ui.end_row();

                ui.label("Seniority:");
                egui::ComboBox::from_id_salt("quick_edit_seniority")
                    .selected_text(edit.seniority.label())
                    .show_ui(ui, |ui| {
                        for seniority in Seniority::ALL {
                            ui.selectable_value(&mut edit.seniority, seniority, seniority.label());
                        }
                    });
                ui.end_row();

                if edit.seniority != Seniority::Manager {
                    ui.label("Department:");
                    let selected = edit
                        .department_id
                        .as_deref()
                        .and_then(|id| departments.iter().find(|d| d.id == id))
                        .map(|d| d.name.as_str())
                        .unwrap_or("Select...");
                    egui::ComboBox::from_id_salt("quick_edit_department")
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            for dept in departments {
                                let is_selected = edit.department_id.as_deref() == Some(dept.id.as_str());
                                if ui.selectable_label(is_selected, &dept.name).clicked() {
                                    edit.department_id = Some(dept.id.clone());
                                    edit.manager_id = dept.manager.clone().filter(|m| *m != current.id);
                                }
                            }
                        });
                    ui.end_row();

                    ui.label("Manager:");
                    let selected = edit
                        .manager_id
                        .as_deref()
                        .and_then(|id| collaborators.iter().find(|c| c.id == id))
                        .map(|c| c.name.as_str())
                        .unwrap_or("None");
                    egui::ComboBox::from_id_salt("quick_edit_manager")
                        .selected_text(selected)
                        .show_ui(ui, |ui| {
                            ui.selectable_value(&mut edit.manager_id, None, "None");
                            for m in collaborators.iter().filter(|c| c.is_manager() && c.id != current.id) {
                                ui.selectable_value(&mut edit.manager_id, Some(m.id.clone()), &m.name);
                            }
                        });
                    ui.end_row();
                }

                ui.label("Base salary:");
                let mut salary = edit.salary_base.unwrap_or(0.0);
                if ui
                    .add(DragValue::new(&mut salary).range(0.0..=f64::MAX).speed(50.0).fixed_decimals(2))
                    .changed()
                {
                    edit.salary_base = Some(salary);
                }
                ui.end_row();

                ui.label("Status:");
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut edit.status, Status::Active, Status::Active.label());
                    ui.selectable_value(&mut edit.status, Status::Inactive, Status::Inactive.label());
                });
                ui.end_row();
            });

        if let Some(error) = &page.quick_edit_error {
            ui.add_space(8.0);
            ui.colored_label(colors::ERROR, error);
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                cancel = true;
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if primary_button_with_icon(ui, !busy, PENCIL_SIMPLE, "Save").clicked() {
                    save = true;
                }
                if busy {
                    ui.spinner();
                }
            });
        });
    });

    if cancel || !open {
        page.quick_edit = None;
        page.quick_edit_error = None;
        return false;
    }
    save
}

/// Returns the ids to delete once confirmed.
fn show_delete_dialog(page: &mut CollaboratorPage, ctx: &egui::Context, busy: bool) -> Option<Vec<String>> {
    let confirm = page.confirm_delete.as_ref()?;

    let mut result = None;
    let mut cancel = false;
    modal("Delete collaborators").show(ctx, |ui| {
        ui.label(format!("Delete {}? This cannot be undone.", confirm.label));
        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                cancel = true;
            }
            if danger_button(ui, !busy, "Delete").clicked() {
                result = Some(confirm.ids.clone());
            }
            if busy {
                ui.spinner();
            }
        });
    });

    if cancel {
        page.confirm_delete = None;
    }
    result
}
