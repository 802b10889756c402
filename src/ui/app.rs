//! Main application UI.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Align, Layout, RichText};
use egui_phosphor::regular::{BUILDINGS, SIGN_OUT, USERS};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::auth::{AuthSession, AuthUser, Subscription};
use crate::config::AppConfig;
use crate::db;
use crate::error::{AppError, Result};
use crate::export;
use crate::models::{Collaborator, Department};
use crate::services::{CollaboratorService, DeletePlan, IntegrityManager};
use crate::store::DocumentStore;

use super::collaborator_panel::{self, CollaboratorPage};
use super::components::{Notification, colors, notification_banner};
use super::department_panel::{self, DepartmentPage, PendingDelete};
use super::login_panel::{self, LoginPage};

/// Current panel being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Collaborators,
    Departments,
}

impl Panel {
    pub fn name(&self) -> &'static str {
        match self {
            Panel::Collaborators => "Collaborators",
            Panel::Departments => "Departments",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Panel::Collaborators => USERS,
            Panel::Departments => BUILDINGS,
        }
    }
}

/// Messages from async tasks to UI.
pub enum UiMessage {
    AuthChanged(Option<AuthUser>),
    /// Sign-in or sign-up finished, with the error to show if it failed.
    AuthFinished(Option<String>),

    DataLoaded {
        collaborators: Vec<Collaborator>,
        departments: Vec<Department>,
    },
    LoadError(String),

    CollaboratorSaved(Collaborator),
    CollaboratorsDeleted(usize),
    DepartmentSaved(Department),
    DepartmentDeleted,
    /// Transfer failed; the source department still exists.
    TransferFailed(String),
    OperationFailed(String),
}

/// Main application state.
pub struct App {
    rt: tokio::runtime::Runtime,
    store: Arc<dyn DocumentStore>,
    session: AuthSession,
    integrity: IntegrityManager,
    collaborator_service: CollaboratorService,
    config: AppConfig,

    tx: mpsc::UnboundedSender<UiMessage>,
    rx: mpsc::UnboundedReceiver<UiMessage>,
    _auth_subscription: Subscription,

    user: Option<AuthUser>,
    current_panel: Panel,

    collaborators: Vec<Collaborator>,
    departments: Vec<Department>,
    is_loading: bool,
    /// A mutating request is outstanding.
    busy: bool,
    notification: Option<Notification>,

    login: LoginPage,
    collaborator_page: CollaboratorPage,
    department_page: DepartmentPage,
}

impl App {
    pub fn new(
        rt: tokio::runtime::Runtime,
        store: Arc<dyn DocumentStore>,
        session: AuthSession,
        config: AppConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        let auth_tx = tx.clone();
        let subscription = session.on_auth_state_change(move |user| {
            let _ = auth_tx.send(UiMessage::AuthChanged(user.cloned()));
        });

        let page_size = config.ui.page_size;
        Self {
            integrity: IntegrityManager::new(store.clone()),
            collaborator_service: CollaboratorService::new(store.clone()),
            rt,
            store,
            session,
            config,
            tx,
            rx,
            _auth_subscription: subscription,
            user: None,
            current_panel: Panel::default(),
            collaborators: Vec::new(),
            departments: Vec::new(),
            is_loading: false,
            busy: false,
            notification: None,
            login: LoginPage::default(),
            collaborator_page: CollaboratorPage::new(page_size),
            department_page: DepartmentPage::new(page_size),
        }
    }

    /// Run `op` on the runtime and deliver its message to the UI thread.
    fn spawn_op<F>(&mut self, op: F)
    where
        F: Future<Output = UiMessage> + Send + 'static,
    {
        self.busy = true;
        let tx = self.tx.clone();
        self.rt.spawn(async move {
            let _ = tx.send(op.await);
        });
    }

    /// Reload both collections.
    pub fn load_data(&mut self) {
        self.is_loading = true;
        let store = self.store.clone();
        let tx = self.tx.clone();

        self.rt.spawn(async move {
            let result: Result<_> = async {
                let collaborators = db::collaborator::list_all(store.as_ref()).await?;
                let departments = db::department::list_all(store.as_ref()).await?;
                Ok((collaborators, departments))
            }
            .await;

            let msg = match result {
                Ok((collaborators, departments)) => UiMessage::DataLoaded {
                    collaborators,
                    departments,
                },
                Err(e) => UiMessage::LoadError(e.user_message("Failed to load data")),
            };
            let _ = tx.send(msg);
        });
    }

    fn sign_in(&mut self, email: String, password: String) {
        let session = self.session.clone();
        self.spawn_op(async move {
            match session.sign_in(&email, &password).await {
                // The auth listener reports the new user.
                Ok(_) => UiMessage::AuthFinished(None),
                Err(e) => UiMessage::AuthFinished(Some(e.user_message("Sign-in failed, try again"))),
            }
        });
    }

    fn sign_up(&mut self, email: String, password: String, name: String) {
        let session = self.session.clone();
        self.spawn_op(async move {
            match session.sign_up(&email, &password, Some(&name)).await {
                Ok(_) => UiMessage::AuthFinished(None),
                Err(e) => UiMessage::AuthFinished(Some(e.user_message("Could not create the account, try again"))),
            }
        });
    }

    fn sign_out(&mut self) {
        let session = self.session.clone();
        self.rt.spawn(async move {
            if let Err(e) = session.sign_out().await {
                error!("Sign-out failed: {e}");
            }
        });
    }

    fn commit_wizard(&mut self) {
        let Some(dialog) = &self.collaborator_page.wizard else {
            return;
        };
        let wizard = dialog.wizard.clone();
        let departments = self.departments.clone();
        let service = self.collaborator_service.clone();

        self.spawn_op(async move {
            match service.commit(&wizard, &departments).await {
                Ok(saved) => UiMessage::CollaboratorSaved(saved),
                Err(e) => UiMessage::OperationFailed(e.user_message("Failed to save collaborator")),
            }
        });
    }

    fn commit_quick_edit(&mut self) {
        let Some((current, edit)) = self.collaborator_page.quick_edit.clone() else {
            return;
        };
        let departments = self.departments.clone();
        let collaborators = self.collaborators.clone();
        let service = self.collaborator_service.clone();

        self.spawn_op(async move {
            match service.quick_edit(&current, &edit, &departments, &collaborators).await {
                Ok(saved) => UiMessage::CollaboratorSaved(saved),
                Err(e) => UiMessage::OperationFailed(e.user_message("Failed to update collaborator")),
            }
        });
    }

    fn delete_collaborators(&mut self, ids: Vec<String>) {
        let departments = self.departments.clone();
        let collaborators = self.collaborators.clone();
        let service = self.collaborator_service.clone();

        self.spawn_op(async move {
            match service.delete(&ids, &departments, &collaborators).await {
                Ok(count) => UiMessage::CollaboratorsDeleted(count),
                Err(e) => UiMessage::OperationFailed(e.user_message("Failed to delete collaborators")),
            }
        });
    }

    fn save_department(&mut self) {
        let Some(dialog) = &self.department_page.form else {
            return;
        };
        let form = dialog.form.clone();
        let editing_id = dialog.editing_id.clone();
        let departments = self.departments.clone();
        let collaborators = self.collaborators.clone();
        let integrity = self.integrity.clone();

        self.spawn_op(async move {
            let result = integrity
                .save_department(&form, &departments, &collaborators, editing_id.as_deref())
                .await;
            match result {
                Ok(saved) => UiMessage::DepartmentSaved(saved),
                Err(e) => UiMessage::OperationFailed(e.user_message("Failed to save department")),
            }
        });
    }

    fn request_delete_department(&mut self, id: &str) {
        let name = self
            .departments
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.name.clone())
            .unwrap_or_default();

        match self
            .integrity
            .request_delete_department(id, &self.departments, &self.collaborators)
        {
            Ok(DeletePlan::Direct) => {
                self.department_page.pending_delete = Some(PendingDelete::Direct {
                    id: id.to_string(),
                    name,
                    typed: String::new(),
                });
            }
            Ok(DeletePlan::Transfer { pending }) => {
                self.department_page.pending_delete = Some(PendingDelete::Transfer {
                    id: id.to_string(),
                    name,
                    pending,
                    destination: None,
                });
            }
            Err(e) => self.notify_error(e, "Failed to delete department"),
        }
        self.department_page.delete_error = None;
    }

    fn confirm_direct_delete(&mut self, id: String) {
        let integrity = self.integrity.clone();
        self.spawn_op(async move {
            match integrity.confirm_direct_delete(&id).await {
                Ok(()) => UiMessage::DepartmentDeleted,
                Err(e) => UiMessage::OperationFailed(e.user_message("Failed to delete department")),
            }
        });
    }

    fn confirm_transfer(&mut self, from: String, to: String, pending: Vec<Collaborator>) {
        let integrity = self.integrity.clone();
        self.spawn_op(async move {
            match integrity.confirm_transfer_and_delete(&from, &to, &pending).await {
                Ok(()) => UiMessage::DepartmentDeleted,
                Err(e) => UiMessage::TransferFailed(e.user_message("Transfer failed, the department was kept")),
            }
        });
    }

    fn export_current(&mut self) {
        let prefix = match self.current_panel {
            Panel::Collaborators => "collaborators",
            Panel::Departments => "departments",
        };
        let Some(path) = export::show_save_dialog(&export::generate_export_filename(prefix)) else {
            return;
        };

        let result = match self.current_panel {
            Panel::Collaborators => export::export_collaborators_to_excel(&self.collaborators, &path),
            Panel::Departments => export::export_departments_to_excel(&self.departments, &self.collaborators, &path),
        };
        match result {
            Ok(()) => {
                info!("Exported {prefix} to {}", path.display());
                self.notification = Some(Notification::success(format!("Exported to {}", path.display())));
            }
            Err(e) => self.notify_error(AppError::from(e), "Export failed"),
        }
    }

    fn notify_error(&mut self, e: AppError, fallback: &str) {
        self.notification = Some(Notification::error(e.user_message(fallback)));
    }

    /// Poll async operation results.
    fn poll_async_results(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                UiMessage::AuthChanged(user) => {
                    let signed_in = user.is_some() && self.user.is_none();
                    self.user = user;
                    if signed_in {
                        self.login.reset();
                        self.load_data();
                    } else if self.user.is_none() {
                        self.collaborators.clear();
                        self.departments.clear();
                        self.collaborator_page.close_dialogs();
                        self.department_page.close_dialogs();
                    }
                }
                UiMessage::AuthFinished(error) => {
                    self.busy = false;
                    if error.is_some() {
                        self.login.error = error;
                    }
                }
                UiMessage::DataLoaded {
                    collaborators,
                    departments,
                } => {
                    self.collaborators = collaborators;
                    self.departments = departments;
                    self.collaborator_page.list.sync(&self.collaborators);
                    self.department_page.list.sync(&self.departments);
                    self.is_loading = false;
                }
                UiMessage::LoadError(e) => {
                    self.is_loading = false;
                    self.notification = Some(Notification::error(e));
                }
                UiMessage::CollaboratorSaved(c) => {
                    self.busy = false;
                    self.collaborator_page.close_dialogs();
                    self.notification = Some(Notification::success(format!("Collaborator '{}' saved", c.name)));
                    self.load_data();
                }
                UiMessage::CollaboratorsDeleted(count) => {
                    self.busy = false;
                    self.collaborator_page.close_dialogs();
                    self.collaborator_page.list.clear_selection();
                    self.notification = Some(Notification::success(format!("{count} collaborators deleted")));
                    self.load_data();
                }
                UiMessage::DepartmentSaved(d) => {
                    self.busy = false;
                    self.department_page.close_dialogs();
                    self.notification = Some(Notification::success(format!("Department '{}' saved", d.name)));
                    self.load_data();
                }
                UiMessage::DepartmentDeleted => {
                    self.busy = false;
                    self.department_page.close_dialogs();
                    self.notification = Some(Notification::success("Department deleted"));
                    self.load_data();
                }
                UiMessage::TransferFailed(e) => {
                    self.busy = false;
                    self.department_page.delete_error = Some(e.clone());
                    self.notification = Some(Notification::error(e));
                    // Some collaborators may already have moved.
                    self.load_data();
                }
                UiMessage::OperationFailed(e) => {
                    self.busy = false;
                    self.show_operation_error(e);
                }
            }
        }
    }

    /// Put the error next to the open form, or in the banner.
    fn show_operation_error(&mut self, e: String) {
        if let Some(dialog) = self.collaborator_page.wizard.as_mut() {
            dialog.error = Some(e.clone());
        } else if self.collaborator_page.quick_edit.is_some() {
            self.collaborator_page.quick_edit_error = Some(e.clone());
        } else if let Some(dialog) = self.department_page.form.as_mut() {
            dialog.error = Some(e.clone());
        }
        self.notification = Some(Notification::error(e));
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        let Some(user) = &self.user else {
            return;
        };
        let mut sign_out = false;
        let mut next_panel = None;

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for panel in [Panel::Collaborators, Panel::Departments] {
                    let label = format!("{} {}", panel.icon(), panel.name());
                    if ui.selectable_label(self.current_panel == panel, label).clicked() {
                        next_panel = Some(panel);
                    }
                }
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button(format!("{SIGN_OUT} Sign out")).clicked() {
                        sign_out = true;
                    }
                    ui.label(RichText::new(user.label()).weak());
                    if self.is_loading {
                        ui.spinner();
                    }
                });
            });
        });

        if let Some(panel) = next_panel {
            self.current_panel = panel;
        }
        if sign_out {
            self.sign_out();
        }
    }

    fn show_notification(&mut self, ctx: &egui::Context) {
        let ttl = Duration::from_secs(self.config.ui.notification_secs);
        if self.notification.as_ref().is_some_and(|n| n.is_expired(ttl)) {
            self.notification = None;
        }
        let Some(notification) = &self.notification else {
            return;
        };

        let mut dismissed = false;
        egui::TopBottomPanel::bottom("notification_bar")
            .min_height(28.0)
            .show(ctx, |ui| {
                dismissed = notification_banner(ui, notification);
            });
        if dismissed {
            self.notification = None;
        }
        ctx.request_repaint_after(Duration::from_millis(250));
    }

    fn show_main_content(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| match self.current_panel {
            Panel::Collaborators => {
                let action = collaborator_panel::show(
                    &mut self.collaborator_page,
                    ui,
                    &self.collaborators,
                    &self.departments,
                    self.busy,
                );
                match action {
                    collaborator_panel::Action::None => {}
                    collaborator_panel::Action::Refresh => self.load_data(),
                    collaborator_panel::Action::Export => self.export_current(),
                    collaborator_panel::Action::Commit => self.commit_wizard(),
                    collaborator_panel::Action::QuickEdit => self.commit_quick_edit(),
                    collaborator_panel::Action::Delete(ids) => self.delete_collaborators(ids),
                }
            }
            Panel::Departments => {
                let action = department_panel::show(
                    &mut self.department_page,
                    ui,
                    &self.departments,
                    &self.collaborators,
                    self.busy,
                );
                match action {
                    department_panel::Action::None => {}
                    department_panel::Action::Refresh => self.load_data(),
                    department_panel::Action::Export => self.export_current(),
                    department_panel::Action::Save => self.save_department(),
                    department_panel::Action::RequestDelete(id) => self.request_delete_department(&id),
                    department_panel::Action::ConfirmDirect(id) => self.confirm_direct_delete(id),
                    department_panel::Action::ConfirmTransfer { from, to, pending } => {
                        self.confirm_transfer(from, to, pending)
                    }
                }
            }
        });
    }

    fn show_login(&mut self, ctx: &egui::Context) {
        let email_domain = self.config.auth.email_domain.clone();
        let busy = self.busy;
        let mut action = login_panel::Action::None;

        egui::CentralPanel::default().show(ctx, |ui| {
            action = login_panel::show(&mut self.login, ui, email_domain.as_deref(), busy);
            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(format!("Store: {:?}", self.config.store.backend)).color(colors::NEUTRAL));
            });
        });

        match action {
            login_panel::Action::None => {}
            login_panel::Action::SignIn { email, password } => self.sign_in(email, password),
            login_panel::Action::SignUp { email, password, name } => self.sign_up(email, password, name),
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_async_results();

        if self.busy || self.is_loading {
            ctx.request_repaint();
        }

        // Route guard: nothing but the login view until someone signs in.
        if self.user.is_none() {
            self.show_login(ctx);
            return;
        }

        self.show_top_bar(ctx);
        self.show_notification(ctx);
        self.show_main_content(ctx);
    }
}
