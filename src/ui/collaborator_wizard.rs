//! Two-step collaborator form dialog.

use chrono::Local;
use eframe::egui::{self, Align, DragValue, Layout, RichText, Ui};
use egui_extras::DatePickerButton;
use egui_phosphor::regular::{ARROW_LEFT, ARROW_RIGHT, FLOPPY_DISK};

use super::components::{colors, field_error, modal, primary_button_with_icon, styled_button_with_icon};
use crate::models::{Collaborator, Department, Seniority};
use crate::services::collaborator::{BasicInfoErrors, CollaboratorWizard, WizardStep};

/// Open wizard plus its inline messages.
#[derive(Debug, Default)]
pub struct WizardDialog {
    pub wizard: CollaboratorWizard,
    pub errors: BasicInfoErrors,
    pub error: Option<String>,
}

impl WizardDialog {
    pub fn create() -> Self {
        Self::default()
    }

    pub fn edit(c: &Collaborator) -> Self {
        Self {
            wizard: CollaboratorWizard::edit(c),
            ..Default::default()
        }
    }
}

pub enum Action {
    None,
    Cancel,
    Commit,
}

pub fn show(
    dialog: &mut WizardDialog,
    ctx: &egui::Context,
    departments: &[Department],
    collaborators: &[Collaborator],
    busy: bool,
) -> Action {
    let mut action = Action::None;
    let title = if dialog.wizard.is_editing() {
        "Edit collaborator"
    } else {
        "New collaborator"
    };

    let mut open = true;
    modal(title).open(&mut open).min_width(420.0).show(ctx, |ui| {
        let step_label = match dialog.wizard.step {
            WizardStep::Basic => "Step 1 of 2: Basic information",
            WizardStep::Professional => "Step 2 of 2: Professional information",
        };
        ui.label(RichText::new(step_label).weak());
        ui.add_space(10.0);

        match dialog.wizard.step {
            WizardStep::Basic => show_basic(dialog, ui),
            WizardStep::Professional => show_professional(dialog, ui, departments, collaborators),
        }

        if let Some(error) = &dialog.error {
            ui.add_space(8.0);
            ui.colored_label(colors::ERROR, error);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                action = Action::Cancel;
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| match dialog.wizard.step {
                WizardStep::Basic => {
                    if primary_button_with_icon(ui, true, ARROW_RIGHT, "Next").clicked() {
                        dialog.errors = dialog.wizard.basic.errors();
                        if dialog.wizard.advance().is_ok() {
                            dialog.error = None;
                        }
                    }
                }
                WizardStep::Professional => {
                    if primary_button_with_icon(ui, !busy, FLOPPY_DISK, "Save").clicked() {
                        match dialog.wizard.professional.validate(departments) {
                            Ok(()) => {
                                dialog.error = None;
                                action = Action::Commit;
                            }
                            Err(e) => dialog.error = Some(e.user_message("Invalid data")),
                        }
                    }
                    if busy {
                        ui.spinner();
                    }
                    if styled_button_with_icon(ui, !busy, ARROW_LEFT, "Back").clicked() {
                        dialog.wizard.back();
                    }
                }
            });
        });
    });

    if !open {
        action = Action::Cancel;
    }
    action
}

fn show_basic(dialog: &mut WizardDialog, ui: &mut Ui) {
    let editing = dialog.wizard.is_editing();
    let basic = &mut dialog.wizard.basic;

    egui::Grid::new("wizard_basic_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .show(ui, |ui| {
            ui.label("Name:");
            ui.vertical(|ui| {
                ui.text_edit_singleline(&mut basic.name);
                field_error(ui, dialog.errors.name.as_deref());
            });
            ui.end_row();

            ui.label("Email:");
            ui.vertical(|ui| {
                ui.add_enabled(!editing, egui::TextEdit::singleline(&mut basic.email));
                field_error(ui, dialog.errors.email.as_deref());
            });
            ui.end_row();

            ui.label("Avatar URL:");
            ui.add(egui::TextEdit::singleline(&mut basic.avatar_url).hint_text("optional"));
            ui.end_row();

            ui.label("Active:");
            ui.checkbox(&mut basic.active, "");
            ui.end_row();
        });
}

fn show_professional(dialog: &mut WizardDialog, ui: &mut Ui, departments: &[Department], collaborators: &[Collaborator]) {
    let professional = &mut dialog.wizard.professional;

    egui::Grid::new("wizard_professional_grid")
        .num_columns(2)
        .spacing([20.0, 8.0])
        .show(ui, |ui| {
            ui.label("Seniority:");
            egui::ComboBox::from_id_salt("wizard_seniority")
                .selected_text(professional.seniority.label())
                .show_ui(ui, |ui| {
                    for seniority in Seniority::ALL {
                        ui.selectable_value(&mut professional.seniority, seniority, seniority.label());
                    }
                });
            ui.end_row();

            if professional.needs_department() {
                ui.label("Department:");
                let selected = professional
                    .department(departments)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| "Select...".to_string());
                egui::ComboBox::from_id_salt("wizard_department")
                    .width(220.0)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for dept in departments {
                            let is_selected = professional.department_id.as_deref() == Some(dept.id.as_str());
                            if ui.selectable_label(is_selected, &dept.name).clicked() {
                                professional.department_id = Some(dept.id.clone());
                            }
                        }
                    });
                ui.end_row();

                ui.label("Manager:");
                let manager = professional
                    .derived_manager(departments)
                    .and_then(|id| collaborators.iter().find(|c| c.id == id))
                    .map(|c| c.name.as_str())
                    .unwrap_or("None");
                ui.label(RichText::new(manager).weak());
                ui.end_row();
            }

            ui.label("Role:");
            ui.add(egui::TextEdit::singleline(&mut professional.role).hint_text("Collaborator"));
            ui.end_row();

            ui.label("Admission date:");
            let mut date = professional
                .admission_date
                .unwrap_or_else(|| Local::now().date_naive());
            ui.add(DatePickerButton::new(&mut date).id_salt("wizard_admission"));
            professional.admission_date = Some(date);
            ui.end_row();

            ui.label("Base salary:");
            let mut salary = professional.salary_base.unwrap_or(0.0);
            if ui
                .add(DragValue::new(&mut salary).range(0.0..=f64::MAX).speed(50.0).fixed_decimals(2))
                .changed()
            {
                professional.salary_base = Some(salary);
            }
            ui.end_row();
        });
}
