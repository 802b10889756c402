//! Sign-in and registration view shown while no user is signed in.

use eframe::egui::{self, RichText, Ui};
use egui_phosphor::regular::{SIGN_IN, USER_PLUS};

use super::components::{colors, primary_button_with_icon};
use crate::auth::SignUpForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    Register,
}

/// Login page state.
#[derive(Debug, Default)]
pub struct LoginPage {
    pub mode: LoginMode,
    pub email: String,
    pub password: String,
    pub register: SignUpForm,
    pub error: Option<String>,
}

impl LoginPage {
    /// Forget credentials after a successful sign-in.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub enum Action {
    None,
    SignIn { email: String, password: String },
    SignUp { email: String, password: String, name: String },
}

pub fn show(page: &mut LoginPage, ui: &mut Ui, email_domain: Option<&str>, busy: bool) -> Action {
    let mut action = Action::None;

    ui.vertical_centered(|ui| {
        ui.add_space(80.0);
        ui.set_max_width(360.0);

        let title = match page.mode {
            LoginMode::SignIn => "Sign in",
            LoginMode::Register => "Create account",
        };
        ui.label(RichText::new(title).size(26.0).strong().color(colors::PRIMARY));
        ui.add_space(20.0);

        match page.mode {
            LoginMode::SignIn => {
                ui.add(egui::TextEdit::singleline(&mut page.email).hint_text("Email"));
                ui.add_space(8.0);
                ui.add(egui::TextEdit::singleline(&mut page.password).password(true).hint_text("Password"));
                ui.add_space(8.0);

                if let Some(error) = &page.error {
                    ui.colored_label(colors::ERROR, error);
                }
                ui.add_space(12.0);

                let ready = !page.email.trim().is_empty() && !page.password.is_empty();
                if primary_button_with_icon(ui, ready && !busy, SIGN_IN, "Sign in").clicked() {
                    page.error = None;
                    action = Action::SignIn {
                        email: page.email.trim().to_string(),
                        password: page.password.clone(),
                    };
                }
                if busy {
                    ui.spinner();
                }

                ui.add_space(16.0);
                if ui.link("No account yet? Register").clicked() {
                    page.mode = LoginMode::Register;
                    page.error = None;
                }
            }
            LoginMode::Register => {
                let form = &mut page.register;
                ui.add(egui::TextEdit::singleline(&mut form.name).hint_text("Name"));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut form.email).hint_text("Email"));
                    if let Some(domain) = email_domain {
                        ui.label(format!("@{domain}"));
                    }
                });
                ui.add_space(8.0);
                ui.add(egui::TextEdit::singleline(&mut form.password).password(true).hint_text("Password"));
                ui.add_space(8.0);
                ui.add(
                    egui::TextEdit::singleline(&mut form.confirm_password)
                        .password(true)
                        .hint_text("Confirm password"),
                );
                ui.add_space(8.0);

                if let Some(error) = &page.error {
                    ui.colored_label(colors::ERROR, error);
                }
                ui.add_space(12.0);

                if primary_button_with_icon(ui, !busy, USER_PLUS, "Register").clicked() {
                    match page.register.validate(email_domain) {
                        Ok(email) => {
                            page.error = None;
                            action = Action::SignUp {
                                email,
                                password: page.register.password.clone(),
                                name: page.register.name.trim().to_string(),
                            };
                        }
                        Err(e) => page.error = Some(e.user_message("Could not create the account")),
                    }
                }
                if busy {
                    ui.spinner();
                }

                ui.add_space(16.0);
                if ui.link("Already have an account? Sign in").clicked() {
                    page.mode = LoginMode::SignIn;
                    page.error = None;
                }
            }
        }
    });

    action
}
